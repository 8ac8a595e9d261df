use std::fmt;

use faer_core::Mat;

use crate::{
    bc::{BoundaryCondition, Dirichlet},
    faer_add::broadcast,
    linear::UpdateOperator,
    problem::SimulationConfig,
    storage::Storage,
    Float, Scheme, SimError,
};

/// Name of the advected variable in every persisted series.
pub const VARIABLE: &str = "u";
/// Name of the spatial coordinate in every persisted series.
pub const COORDINATE: &str = "x";

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<A> {
    /// `None` for the method of characteristics.
    pub scheme: Option<Scheme>,
    pub dx: Float,
    pub dt: Float,
    pub nu: Float,
    pub start: Float,
    pub horizon: Float,
    pub iterations: usize,
    pub saved: usize,
    pub artifact: A,
}

impl<A> fmt::Display for RunSummary<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` method, Δx={:e}, Δt={:e}, ν={:e}, t∈[{}, {}] ({} iterations, {} saved)",
            self.scheme.map_or("Method of characteristics", Scheme::name),
            self.dx,
            self.dt,
            self.nu,
            self.start,
            self.horizon,
            self.iterations,
            self.saved
        )
    }
}

/// Explicit time marching of one scheme on one configuration.
pub struct Driver<'pb> {
    config: SimulationConfig<'pb>,
    scheme: Scheme,
}

impl<'pb> Driver<'pb> {
    pub fn new(config: SimulationConfig<'pb>, scheme: Scheme) -> Self {
        Self { config, scheme }
    }

    pub fn config(&self) -> &SimulationConfig<'pb> {
        &self.config
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Runs up to the horizon, streaming snapshots into `storage`.
    ///
    /// Nothing reaches `storage` unless the configuration is valid and the operator
    /// could be built. Storage errors abort the run, the artifact is then incomplete.
    pub fn run<S: Storage>(&self, mut storage: S) -> Result<RunSummary<S::Artifact>, SimError> {
        let config = &self.config;
        config.validate()?;

        let step = config.time_step();
        let grid = config.grid;
        let operator = UpdateOperator::build(self.scheme, config.speed, step.nu, grid.steps())?;
        // a held state has no inflow edge, whatever the configured speed
        let wind = if step.hold { 0.0 } else { config.speed };
        let bc = Dirichlet::new(&grid, wind, self.scheme, &*config.u0);

        tracing::event!(
            tracing::Level::INFO,
            "start of advection simulation (`{}` method, Δx={:e} ({} points), Δt={:e}, t∈[{}, {}], CFL={}, ν={:e})",
            self.scheme.name(),
            step.dx,
            grid.steps(),
            step.dt,
            config.start,
            config.horizon,
            config.cfl,
            step.nu,
        );

        let x = grid.coordinates();
        let mut u = broadcast(&*config.u0, x.as_ref());
        let mut v = Mat::<Float>::zeros(grid.steps(), 1);

        storage.declare_coordinates(COORDINATE, x.as_ref())?;
        storage.declare_variables(&[VARIABLE])?;
        storage.save(config.start, &[(VARIABLE, u.as_ref())])?;

        let mut t = config.start;
        let mut k = 1;
        let mut saved = 0;
        while t < config.horizon {
            t = config.start + step.dt * k as Float;

            if !step.hold {
                operator.apply_to(u.as_ref(), v.as_mut());
                std::mem::swap(&mut u, &mut v);
            }
            bc.apply(u.as_mut());

            if k % config.stride == 0 {
                storage.save(t, &[(VARIABLE, u.as_ref())])?;
                saved += 1;
                tracing::event!(tracing::Level::TRACE, "step {k} saved (t={t:e})");
            }

            k += 1;
        }

        let artifact = storage.finish()?;
        let summary = RunSummary {
            scheme: Some(self.scheme),
            dx: step.dx,
            dt: step.dt,
            nu: step.nu,
            start: config.start,
            horizon: config.horizon,
            iterations: k - 1,
            saved,
            artifact,
        };

        tracing::event!(
            tracing::Level::INFO,
            "finished `{}` simulation: total iterations {}, iterations saved {}",
            self.scheme.name(),
            summary.iterations,
            summary.saved
        );

        Ok(summary)
    }
}

impl fmt::Display for Driver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = self.config.time_step();
        write!(
            f,
            "`{}` method, Δt={:e}, Δx={:e} ({} points), CFL={}, a={}",
            self.scheme.name(),
            step.dt,
            step.dx,
            self.config.grid.steps(),
            self.config.cfl,
            self.config.speed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStorage, Grid};

    fn bump(x: Float) -> Float {
        (-20.0 * x * x).exp()
    }

    fn config(cfl: Float, speed: Float) -> SimulationConfig<'static> {
        SimulationConfig::new(Grid::new(-1.0, 1.0, 50).unwrap(), 0.5, cfl, speed, bump)
    }

    #[test]
    fn initial_snapshot_is_always_saved() {
        let summary = Driver::new(config(0.5, 1.0).with_stride(1000), Scheme::Upwind)
            .run(MemoryStorage::new())
            .unwrap();

        assert_eq!(summary.saved, 0);
        assert_eq!(summary.artifact.len(), 1);
        assert_eq!(summary.artifact.time(0), Some(0.0));
    }

    #[test]
    fn every_step_is_saved_by_default() {
        let summary = Driver::new(config(0.5, 1.0), Scheme::LaxWendroff)
            .run(MemoryStorage::new())
            .unwrap();

        // dt = 0.5 * 0.04 = 0.02, 25 steps to reach t = 0.5
        assert_eq!(summary.iterations, 25);
        assert_eq!(summary.saved, 25);
        assert_eq!(summary.artifact.len(), 26);
        let last = *summary.artifact.times().last().unwrap();
        assert!((last - 0.5).abs() < 1e-12);
    }

    #[test]
    fn start_time_offsets_the_clock() {
        let summary = Driver::new(config(0.5, 1.0).with_start_time(0.25), Scheme::Upwind)
            .run(MemoryStorage::new())
            .unwrap();

        let times = summary.artifact.times();
        assert_eq!(times[0], 0.25);
        assert!((times[1] - 0.27).abs() < 1e-12);
    }

    #[test]
    fn invalid_configuration_writes_nothing() {
        let mut storage = MemoryStorage::new();
        let err = Driver::new(config(1.0001, 1.0), Scheme::Fromm)
            .run(&mut storage)
            .unwrap_err();

        assert!(matches!(err, SimError::UnstableScheme { .. }));
        assert!(storage.series().is_empty());
        assert!(storage.series().coordinates().is_empty());
    }

    #[test]
    fn zero_cfl_holds_the_state() {
        let summary = Driver::new(config(0.0, 1.0), Scheme::LaxFriedrichs)
            .run(MemoryStorage::new())
            .unwrap();

        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.dt, 0.5);
        let series = summary.artifact;
        assert_eq!(series.values(VARIABLE, 0), series.values(VARIABLE, 1));
    }

    #[test]
    fn summary_mentions_the_scheme() {
        let summary = Driver::new(config(0.5, -1.0), Scheme::BeamWarming)
            .run(MemoryStorage::new())
            .unwrap();
        let text = summary.to_string();
        assert!(text.starts_with("`Beam-Warming` method"), "{text}");
        assert!(text.contains("25 iterations"), "{text}");
    }
}
