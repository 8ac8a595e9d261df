use advection::{
    artifact_name, profiles, Driver, FileStorage, Grid, Metadata, Scheme, SimError,
    SimulationConfig,
};
use tracing::info;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let scheme: Scheme = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("fromm")
        .parse()?;

    let config = SimulationConfig::new(
        Grid::new(-0.5, 1.0, 600)?,
        1.0,
        0.5,
        1.0,
        profiles::riemann(1.0, 0.0, 0.0),
    )
    .with_stride(2);

    let driver = Driver::new(config, scheme);
    info!("problem summary: {driver}");

    let metadata = Metadata::new(format!("Advection simulation by method {}", scheme.id()))
        .with_description(driver.to_string())
        .with_references("LeVeque, Randall J.: Numerical Methods for Conservation Laws 1992");
    let storage = FileStorage::create("bin", &artifact_name(Some(scheme)), &metadata)?;

    let summary = driver.run(storage)?;
    info!("{summary}");
    info!("written to {}", summary.artifact.display());

    Ok(())
}
