use advection::{artifact_name, profiles, Exact, FileStorage, Grid, Metadata, SimError};
use tracing::info;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt::init();

    let metadata = Metadata::new("Advection simulation by Method of Characteristics")
        .with_description("Exact solution of advection by method of characteristics")
        .with_references("LeVeque, Randall J.: Numerical Methods for Conservation Laws 1992");
    let storage = FileStorage::create("bin", &artifact_name(None), &metadata)?;

    let summary = Exact::new(
        Grid::new(-0.5, 1.0, 1500)?,
        1.0,
        200,
        1.0,
        profiles::riemann(1.0, 0.0, 0.0),
    )
    .run(storage)?;

    info!("{summary}");
    info!("written to {}", summary.artifact.display());

    Ok(())
}
