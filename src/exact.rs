use std::{fmt, rc::Rc};

use faer_core::Mat;

use crate::{
    driver::{RunSummary, COORDINATE, VARIABLE},
    faer_add::broadcast_to,
    problem::InitialCondition,
    storage::Storage,
    Float, Grid, SimError,
};

/// Method of characteristics: `u(x, t) = u0(x - a t)`.
///
/// Samples `nt + 1` equally spaced times over `[0, T]`, no boundary treatment is
/// involved since the profile is exact everywhere.
#[derive(Clone)]
pub struct Exact<'pb> {
    grid: Grid,
    horizon: Float,
    steps: usize,
    speed: Float,
    u0: Rc<dyn InitialCondition + 'pb>,
    stride: usize,
}

impl<'pb> Exact<'pb> {
    pub fn new(
        grid: Grid,
        horizon: Float,
        steps: usize,
        speed: Float,
        u0: impl InitialCondition + 'pb,
    ) -> Self {
        Self {
            grid,
            horizon,
            steps,
            speed,
            u0: Rc::new(u0),
            stride: 1,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.steps == 0 {
            return Err(SimError::InvalidConfig(
                "the exact solution needs at least one time step".to_string(),
            ));
        }
        if self.stride == 0 {
            return Err(SimError::InvalidConfig(
                "snapshot stride must be at least 1".to_string(),
            ));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "horizon must be positive, got {}",
                self.horizon
            )));
        }
        if !self.speed.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "advection speed must be finite, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    pub fn run<S: Storage>(&self, mut storage: S) -> Result<RunSummary<S::Artifact>, SimError> {
        self.validate()?;

        let dt = self.horizon / self.steps as Float;
        let dx = self.grid.step_size();

        tracing::event!(
            tracing::Level::INFO,
            "start of exact advection solution (Δx={:e} ({} points), Δt={:e} ({} steps), a={})",
            dx,
            self.grid.steps(),
            dt,
            self.steps,
            self.speed,
        );

        let x = self.grid.coordinates();
        let mut u = Mat::<Float>::zeros(self.grid.steps(), 1);

        storage.declare_coordinates(COORDINATE, x.as_ref())?;
        storage.declare_variables(&[VARIABLE])?;

        let mut saved = 0;
        for k in 0..=self.steps {
            let t = dt * k as Float;
            let shift = self.speed * t;
            broadcast_to(|x| (self.u0)(x - shift), x.as_ref(), u.as_mut());

            if k % self.stride == 0 {
                storage.save(t, &[(VARIABLE, u.as_ref())])?;
                saved += 1;
                tracing::event!(tracing::Level::TRACE, "exact step {k} saved (t={t:e})");
            }
        }

        let artifact = storage.finish()?;

        tracing::event!(
            tracing::Level::INFO,
            "finished exact solution: total iterations {}, iterations saved {}",
            self.steps,
            saved
        );

        Ok(RunSummary {
            scheme: None,
            dx,
            dt,
            nu: self.speed * dt / dx,
            start: 0.0,
            horizon: self.horizon,
            iterations: self.steps,
            saved,
            artifact,
        })
    }
}

impl fmt::Debug for Exact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exact")
            .field("grid", &self.grid)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("speed", &self.speed)
            .field("u0", &"<dyn InitialCondition>")
            .field("stride", &self.stride)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn linear_profile_is_translated() {
        let grid = Grid::new(0.0, 1.0, 11).unwrap();
        let summary = Exact::new(grid, 1.0, 4, 2.0, |x| 3.0 * x)
            .run(MemoryStorage::new())
            .unwrap();

        let series = summary.artifact;
        assert_eq!(series.len(), 5);
        assert_eq!(series.times(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
        for (x, u) in series.coordinates().iter().zip(series.last("u").unwrap()) {
            assert!((u - 3.0 * (x - 2.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn stride_keeps_the_first_sample() {
        let grid = Grid::new(0.0, 1.0, 11).unwrap();
        let summary = Exact::new(grid, 1.0, 10, 1.0, |x| x)
            .with_stride(3)
            .run(MemoryStorage::new())
            .unwrap();

        // k = 0, 3, 6, 9
        assert_eq!(summary.saved, 4);
        assert_eq!(summary.artifact.times()[0], 0.0);
        assert!(summary.scheme.is_none());
    }

    #[test]
    fn zero_steps_are_rejected() {
        let grid = Grid::new(0.0, 1.0, 11).unwrap();
        assert!(matches!(
            Exact::new(grid, 1.0, 0, 1.0, |x| x).run(MemoryStorage::new()),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
