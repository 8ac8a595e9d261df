use crate::{faer_add::linspace, stability, Float, SimError};
use faer::Mat;

// grid[0] <-> lower
// grid[i] <-> lower + i * (upper - lower) / (steps - 1)
// grid[steps - 1] <-> upper
//
// `step_size` is |upper - lower| / steps, the cell width the schemes are built with,
// which is slightly smaller than the node spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    lower: Float,
    upper: Float,
    steps: usize,
    step_size: Float,
}

impl Grid {
    pub const MIN_STEPS: usize = 3;

    pub fn new(lower: Float, upper: Float, steps: usize) -> Result<Self, SimError> {
        stability::validate_domain(lower, upper)?;
        if steps < Self::MIN_STEPS {
            return Err(SimError::InvalidConfig(format!(
                "a grid needs at least {} points, got {steps}",
                Self::MIN_STEPS
            )));
        }

        Ok(Grid {
            lower,
            upper,
            steps,
            step_size: (upper - lower).abs() / steps as Float,
        })
    }

    pub fn lower(&self) -> Float {
        self.lower
    }

    pub fn upper(&self) -> Float {
        self.upper
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step_size(&self) -> Float {
        self.step_size
    }

    pub fn coordinates(&self) -> Mat<Float> {
        linspace(self.lower, self.upper, self.steps)
    }
}
