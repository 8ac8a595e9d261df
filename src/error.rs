use thiserror::Error;

use crate::Float;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("impossible domain [{x0}, {xf}]: xf must be greater than x0")]
    InvalidDomain { x0: Float, xf: Float },

    #[error("unstable method: CFL number {cfl} outside of [0, 1]")]
    UnstableScheme { cfl: Float },

    #[error("unknown scheme `{0}`")]
    UnknownScheme(String),

    #[error("variable `{0}` was not declared in the storage")]
    VariableNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed time series: {0}")]
    Format(String),

    #[error("output error")]
    Io(#[from] std::io::Error),
}
