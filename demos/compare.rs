use advection::{
    driver::VARIABLE, profiles, Driver, Exact, Grid, MemoryStorage, Scheme, SimError,
    SimulationConfig,
};
use tracing::info;

// L1 distance between every scheme and the exact solution at the final time
fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt::init();

    let grid = Grid::new(-1.0, 1.0, 400)?;
    let u0 = profiles::bump(1.0, 50.0);
    let (horizon, cfl, speed) = (0.5, 0.8, 1.0);

    for scheme in Scheme::ALL {
        let config = SimulationConfig::new(grid, horizon, cfl, speed, u0.clone());
        let summary = Driver::new(config, scheme).run(MemoryStorage::new())?;
        let t = summary.artifact.times().last().copied().unwrap_or(0.0);

        let exact = Exact::new(grid, t, 1, speed, u0.clone()).run(MemoryStorage::new())?;

        let (Some(numeric), Some(reference)) =
            (summary.artifact.last(VARIABLE), exact.artifact.last(VARIABLE))
        else {
            continue;
        };
        let error: f64 = numeric
            .iter()
            .zip(reference)
            .map(|(u, v)| (u - v).abs())
            .sum::<f64>()
            * grid.step_size();

        info!("{:<28} t={t:.4} L1 error {error:e}", scheme.name());
    }

    Ok(())
}
