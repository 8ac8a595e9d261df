use crate::{Float, Scheme, SimError};
use faer::Mat;
use faer_core::{MatMut, MatRef, Parallelism};

// generic two-level linear numerical method matrix builder where each band is
// (m, q_m) in
// U^{n+1}_j = \sum_m q_m U^n_{j+m}
// rows whose stencil leaves the domain are left truncated, the caller overrides them
pub(crate) fn banded_matrix(size: usize, bands: &[(isize, Float)]) -> Mat<Float> {
    Mat::from_fn(size, size, |i, j| {
        let m = j as isize - i as isize;
        bands
            .iter()
            .filter(|(offset, _)| *offset == m)
            .map(|(_, q)| *q)
            .sum()
    })
}

pub(crate) fn with_identity_rows(mut a: Mat<Float>, rows: &[usize]) -> Mat<Float> {
    for &i in rows {
        for j in 0..a.ncols() {
            a.write(i, j, if i == j { 1.0 } else { 0.0 });
        }
    }
    a
}

/// Bands `(offset, coefficient)` of `scheme` for the signed Courant number `nu`.
///
/// Wind dependent schemes are written for `speed > 0` and mirrored otherwise, the
/// mirrored bands are expressed with `|nu|`.
pub fn bands(scheme: Scheme, speed: Float, nu: Float) -> Vec<(isize, Float)> {
    let forward = speed > 0.0;
    // upstream side
    let s: isize = if forward { 1 } else { -1 };
    let p = nu.abs();

    match scheme {
        Scheme::Upwind => {
            if forward {
                vec![(0, 1.0 - nu), (-1, nu)]
            } else {
                vec![(0, 1.0 + nu), (1, -nu)]
            }
        }
        Scheme::LaxFriedrichs => vec![(-1, 0.5 * (1.0 + nu)), (1, 0.5 * (1.0 - nu))],
        Scheme::LaxWendroff => vec![
            (-1, 0.5 * nu * (nu + 1.0)),
            (0, 1.0 - nu * nu),
            (1, 0.5 * nu * (nu - 1.0)),
        ],
        Scheme::BeamWarming => vec![
            (-2 * s, 0.5 * p * (p - 1.0)),
            (-s, p * (2.0 - p)),
            (0, 0.5 * (2.0 - 3.0 * p + p * p)),
        ],
        // the downstream coefficient is -(1 - nu) / 4, not -(1 - nu) nu / 4
        Scheme::Fromm => vec![
            (-2 * s, -0.25 * (1.0 - p) * p),
            (-s, 0.25 * (5.0 - p) * p),
            (0, 0.25 * (1.0 - p) * (4.0 + p)),
            (s, -0.25 * (1.0 - p)),
        ],
    }
}

/// Explicit update matrix `A` with `U^{n+1} = A U^n`.
///
/// First and last rows are identity rows (Dirichlet anchors), as is the auxiliary
/// row of wide schemes. The operator is immutable once built and constant for a
/// whole run.
#[derive(Debug, Clone)]
pub struct UpdateOperator {
    scheme: Scheme,
    courant: Float,
    matrix: Mat<Float>,
}

impl UpdateOperator {
    pub fn build(scheme: Scheme, speed: Float, nu: Float, size: usize) -> Result<Self, SimError> {
        if size < 3 {
            return Err(SimError::InvalidConfig(format!(
                "an update operator needs at least 3 nodes, got {size}"
            )));
        }

        let banded = banded_matrix(size, &bands(scheme, speed, nu));

        let mut anchors = vec![0, size - 1];
        anchors.extend(scheme.auxiliary_node(speed, size));
        let matrix = with_identity_rows(banded, &anchors);

        tracing::event!(
            tracing::Level::DEBUG,
            "built `{}` operator ({size}x{size}, ν={nu:e}, identity rows {:?})",
            scheme.name(),
            anchors
        );

        Ok(Self {
            scheme,
            courant: nu,
            matrix,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn courant(&self) -> Float {
        self.courant
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn as_ref(&self) -> MatRef<'_, Float> {
        self.matrix.as_ref()
    }

    /// `out = A u`
    pub fn apply_to(&self, u: MatRef<'_, Float>, out: MatMut<'_, Float>) {
        faer_core::mul::matmul(
            out,
            self.matrix.as_ref(),
            u,
            None,
            1.0,
            Parallelism::None,
        )
    }

    pub fn apply(&self, u: MatRef<'_, Float>) -> Mat<Float> {
        let mut out = u.to_owned();
        self.apply_to(u, out.as_mut());
        out
    }
}
