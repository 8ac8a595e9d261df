//! Explicit finite-difference schemes for the linear advection equation
//! `u_t + a u_x = 0` on a bounded domain with Dirichlet boundaries, along with the
//! exact solution by the method of characteristics.

pub mod faer_add;

pub mod bc;
pub mod driver;
pub mod error;
pub mod exact;
pub mod grid;
pub mod linear;
pub mod problem;
pub mod profiles;
pub mod scheme;
pub mod stability;
pub mod storage;

pub type Float = f64;

pub use bc::{BoundaryCondition, Dirichlet};
pub use driver::{Driver, RunSummary};
pub use error::SimError;
pub use exact::Exact;
pub use grid::Grid;
pub use linear::UpdateOperator;
pub use problem::{InitialCondition, SimulationConfig, TimeStep};
pub use scheme::Scheme;
pub use storage::{
    artifact_name, open_time_series, read_time_series, AtsWriter, FileStorage, MemoryStorage,
    Metadata, Storage, TimeSeries,
};
