use core::fmt;
use std::rc::Rc;

use crate::{stability, Float, Grid, SimError};

/// Initial profile `u(x, t0)`, must be pure.
pub trait InitialCondition: Fn(Float) -> Float {}
impl<T> InitialCondition for T where T: Fn(Float) -> Float {}

/// Time step derived from a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    pub dx: Float,
    pub dt: Float,
    /// Signed Courant number `a dt / dx`.
    pub nu: Float,
    /// The state is held constant, a single step spans the whole interval.
    pub hold: bool,
}

/// Parameters of a run of `u_t + a u_x = 0` on a Dirichlet domain.
#[derive(Clone)]
pub struct SimulationConfig<'pb> {
    pub(crate) grid: Grid,
    pub(crate) horizon: Float,
    pub(crate) cfl: Float,
    pub(crate) speed: Float,
    pub(crate) u0: Rc<dyn InitialCondition + 'pb>,
    pub(crate) stride: usize,
    pub(crate) start: Float,
}

impl<'pb> SimulationConfig<'pb> {
    pub fn new(
        grid: Grid,
        horizon: Float,
        cfl: Float,
        speed: Float,
        u0: impl InitialCondition + 'pb,
    ) -> Self {
        Self {
            grid,
            horizon,
            cfl,
            speed,
            u0: Rc::new(u0),
            stride: 1,
            start: 0.0,
        }
    }

    /// Persist one snapshot every `stride` steps.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_start_time(mut self, start: Float) -> Self {
        self.start = start;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn horizon(&self) -> Float {
        self.horizon
    }

    pub fn cfl(&self) -> Float {
        self.cfl
    }

    pub fn speed(&self) -> Float {
        self.speed
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn start_time(&self) -> Float {
        self.start
    }

    pub fn initial_condition(&self) -> &dyn InitialCondition {
        &*self.u0
    }

    pub fn validate(&self) -> Result<(), SimError> {
        stability::validate_domain(self.grid.lower(), self.grid.upper())?;
        stability::validate_cfl(self.cfl)?;

        if self.stride == 0 {
            return Err(SimError::InvalidConfig(
                "snapshot stride must be at least 1".to_string(),
            ));
        }
        if !self.speed.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "advection speed must be finite, got {}",
                self.speed
            )));
        }
        if !(self.start.is_finite() && self.horizon.is_finite() && self.start < self.horizon) {
            return Err(SimError::InvalidConfig(format!(
                "time interval [{}, {}] is empty",
                self.start, self.horizon
            )));
        }

        Ok(())
    }

    /// `dt = cfl dx / |a|`, or a single step over the whole interval when the state
    /// can't move (`a = 0`, or `cfl = 0` which would never advance the clock).
    pub fn time_step(&self) -> TimeStep {
        let dx = self.grid.step_size();
        let hold = self.speed == 0.0 || self.cfl == 0.0;

        if hold {
            TimeStep {
                dx,
                dt: self.horizon - self.start,
                nu: 0.0,
                hold,
            }
        } else {
            let dt = self.cfl * dx / self.speed.abs();
            TimeStep {
                dx,
                dt,
                nu: self.speed * dt / dx,
                hold,
            }
        }
    }
}

impl fmt::Debug for SimulationConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationConfig")
            .field("grid", &self.grid)
            .field("horizon", &self.horizon)
            .field("cfl", &self.cfl)
            .field("speed", &self.speed)
            .field("u0", &"<dyn InitialCondition>")
            .field("stride", &self.stride)
            .field("start", &self.start)
            .finish()
    }
}
