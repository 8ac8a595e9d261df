use faer_core::MatMut;
use reborrow::*;

use crate::{problem::InitialCondition, Float, Grid, Scheme};

pub trait BoundaryCondition {
    /// Re-imposes the boundary values on a freshly updated solution column.
    /// An empty column is left as is.
    fn apply(&self, u: MatMut<'_, Float>);
}

/// Clamps both edges to the initial profile evaluated at the domain bounds.
///
/// The values are those of `f(x0)` and `f(xf)` for the whole run, they are *not*
/// advected with the solution. On an inflow edge this only matches the exact
/// boundary data when `f` is constant near that edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dirichlet {
    left: Float,
    right: Float,
    auxiliary: Option<usize>,
    speed: Float,
}

impl Dirichlet {
    pub fn new(grid: &Grid, speed: Float, scheme: Scheme, f: &dyn InitialCondition) -> Self {
        Self {
            left: f(grid.lower()),
            right: f(grid.upper()),
            auxiliary: scheme.auxiliary_node(speed, grid.steps()),
            speed,
        }
    }

    pub fn left(&self) -> Float {
        self.left
    }

    pub fn right(&self) -> Float {
        self.right
    }
}

impl BoundaryCondition for Dirichlet {
    fn apply(&self, mut u: MatMut<'_, Float>) {
        let Some(last) = u.nrows().checked_sub(1) else {
            return;
        };
        u.write(0, 0, self.left);
        u.write(last, 0, self.right);

        if let Some(aux) = self.auxiliary.filter(|&aux| aux < last) {
            // the wide stencil can't reach past the edge, copy the boundary value inward
            let edge = if self.speed > 0.0 { 0 } else { last };
            let value = u.rb().read(edge, 0);
            u.write(aux, 0, value);
        }
    }
}

/// One-shot form of [`Dirichlet`].
pub fn apply(
    u: MatMut<'_, Float>,
    grid: &Grid,
    speed: Float,
    scheme: Scheme,
    f: &dyn InitialCondition,
) {
    Dirichlet::new(grid, speed, scheme, f).apply(u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faer_add::{column_from_slice, column_to_vec};

    fn ramp(x: Float) -> Float {
        10.0 + x
    }

    #[test]
    fn clamps_edges_for_every_scheme() {
        let grid = Grid::new(0.0, 4.0, 5).unwrap();
        for scheme in Scheme::ALL {
            let mut u = column_from_slice(&[0.0; 5]);
            apply(u.as_mut(), &grid, 1.0, scheme, &ramp);
            let u = column_to_vec(u.as_ref());
            assert_eq!(u[0], 10.0);
            assert_eq!(u[4], 14.0);
        }
    }

    #[test]
    fn wide_schemes_copy_the_inflow_value() {
        let grid = Grid::new(0.0, 4.0, 5).unwrap();

        let mut u = column_from_slice(&[0.0, 7.0, 7.0, 7.0, 0.0]);
        apply(u.as_mut(), &grid, 1.0, Scheme::BeamWarming, &ramp);
        assert_eq!(column_to_vec(u.as_ref()), vec![10.0, 10.0, 7.0, 7.0, 14.0]);

        let mut u = column_from_slice(&[0.0, 7.0, 7.0, 7.0, 0.0]);
        apply(u.as_mut(), &grid, -1.0, Scheme::Fromm, &ramp);
        assert_eq!(column_to_vec(u.as_ref()), vec![10.0, 7.0, 7.0, 14.0, 14.0]);
    }

    #[test]
    fn degenerate_columns_do_not_panic() {
        let grid = Grid::new(0.0, 4.0, 5).unwrap();
        let bc = Dirichlet::new(&grid, -1.0, Scheme::Fromm, &ramp);

        let mut empty = column_from_slice(&[]);
        bc.apply(empty.as_mut());
        assert!(column_to_vec(empty.as_ref()).is_empty());

        let mut single = column_from_slice(&[0.0]);
        bc.apply(single.as_mut());
        assert_eq!(column_to_vec(single.as_ref()), vec![14.0]);
    }

    #[test]
    fn narrow_schemes_leave_the_interior_alone() {
        let grid = Grid::new(0.0, 4.0, 5).unwrap();
        let mut u = column_from_slice(&[0.0, 7.0, 7.0, 7.0, 0.0]);
        apply(u.as_mut(), &grid, 1.0, Scheme::LaxWendroff, &ramp);
        assert_eq!(column_to_vec(u.as_ref()), vec![10.0, 7.0, 7.0, 7.0, 14.0]);
    }
}
