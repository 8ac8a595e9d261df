use std::{fmt, str::FromStr};

use crate::{Float, SimError};

/// Two-level explicit schemes for `u_t + a u_x = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// First-order upwind (Courant-Isaacson-Rees).
    Upwind,
    LaxFriedrichs,
    LaxWendroff,
    /// Second-order upwind, reads two upstream neighbours.
    BeamWarming,
    /// Second-order, two upstream neighbours and one downstream.
    Fromm,
}

impl Scheme {
    pub const ALL: [Scheme; 5] = [
        Scheme::Upwind,
        Scheme::LaxFriedrichs,
        Scheme::LaxWendroff,
        Scheme::BeamWarming,
        Scheme::Fromm,
    ];

    /// Number of grid points read by the update of a single node.
    pub fn stencil_width(self) -> usize {
        match self {
            Scheme::Upwind => 2,
            Scheme::LaxFriedrichs | Scheme::LaxWendroff | Scheme::BeamWarming => 3,
            Scheme::Fromm => 4,
        }
    }

    /// Whether the bands depend on the sign of the advection speed.
    pub fn is_wind_dependent(self) -> bool {
        matches!(self, Scheme::Upwind | Scheme::BeamWarming | Scheme::Fromm)
    }

    /// Schemes whose stencil reaches two nodes upstream and therefore need an extra
    /// boundary node next to the inflow edge.
    pub fn is_wide(self) -> bool {
        matches!(self, Scheme::BeamWarming | Scheme::Fromm)
    }

    /// Interior node next to the inflow edge that a wide stencil cannot update, if any.
    /// A still medium has no inflow edge, neither has a grid of fewer than 3 nodes.
    pub fn auxiliary_node(self, speed: Float, size: usize) -> Option<usize> {
        if !self.is_wide() || speed == 0.0 || size < 3 {
            None
        } else if speed > 0.0 {
            Some(1)
        } else {
            Some(size - 2)
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Scheme::Upwind => "cir",
            Scheme::LaxFriedrichs => "lax_friedrichs",
            Scheme::LaxWendroff => "lax_wendroff",
            Scheme::BeamWarming => "beam_warming",
            Scheme::Fromm => "fromm",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Upwind => "First-order upwind (CIR)",
            Scheme::LaxFriedrichs => "Lax-Friedrichs",
            Scheme::LaxWendroff => "Lax-Wendroff",
            Scheme::BeamWarming => "Beam-Warming",
            Scheme::Fromm => "Fromm",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cir" | "upwind" => Ok(Scheme::Upwind),
            "lax_friedrichs" | "lax_friedichs" => Ok(Scheme::LaxFriedrichs),
            "lax_wendroff" => Ok(Scheme::LaxWendroff),
            "beam_warming" => Ok(Scheme::BeamWarming),
            "fromm" => Ok(Scheme::Fromm),
            other => Err(SimError::UnknownScheme(other.to_string())),
        }
    }
}
