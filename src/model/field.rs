use std::fmt;
use std::str::FromStr;

use crate::FieldError;

/// Transverse axis of a corrector kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal = 0,
    Vertical = 1,
}

impl Axis {
    pub fn cell(self) -> usize {
        self as usize
    }
}

/// Plane selector for the global optics quantities (tune, chromaticity,
/// emittance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    X = 0,
    Y = 1,
}

impl Plane {
    pub fn cell(self) -> usize {
        self as usize
    }
}

impl FromStr for Plane {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Plane::X),
            "y" => Ok(Plane::Y),
            _ => Err(FieldError::UnknownPlane {
                field: s.to_string(),
                target: "transverse",
            }),
        }
    }
}

/// Phase-space coordinate selector for the per-element orbit and dispersion
/// vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitPlane {
    X = 0,
    Px = 1,
    Y = 2,
    Py = 3,
}

impl OrbitPlane {
    pub fn cell(self) -> usize {
        self as usize
    }
}

impl FromStr for OrbitPlane {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(OrbitPlane::X),
            "px" => Ok(OrbitPlane::Px),
            "y" => Ok(OrbitPlane::Y),
            "py" => Ok(OrbitPlane::Py),
            _ => Err(FieldError::UnknownPlane {
                field: s.to_string(),
                target: "phase-space",
            }),
        }
    }
}

/// The fixed enumeration of mutable element fields.
///
/// Replaces the original string-keyed handler lookup with a tagged-variant
/// dispatcher: a field name is parsed exactly once, at submission time, and
/// an unknown name fails there instead of deep inside the worker.
///
/// Control-system names map as follows: `b0` is the dipole bending angle,
/// `b<n>`/`a<n>` (n >= 1) are cells of the normal/skew polynomial field
/// coefficients, `x_kick`/`y_kick` are corrector kick angles and `f` is the
/// RF frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Cell of the normal polynomial field coefficients
    PolynomB(usize),
    /// Cell of the skew polynomial field coefficients
    PolynomA(usize),
    /// Corrector kick angle on one transverse axis
    KickAngle(Axis),
    /// RF cavity frequency
    Frequency,
    /// Dipole bending angle
    BendingAngle,
}

impl FromStr for FieldKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x_kick" => return Ok(FieldKind::KickAngle(Axis::Horizontal)),
            "y_kick" => return Ok(FieldKind::KickAngle(Axis::Vertical)),
            "f" => return Ok(FieldKind::Frequency),
            "b0" => return Ok(FieldKind::BendingAngle),
            _ => {}
        }
        if let Some(cell) = s.strip_prefix('b').and_then(|c| c.parse::<usize>().ok()) {
            return Ok(FieldKind::PolynomB(cell));
        }
        if let Some(cell) = s.strip_prefix('a').and_then(|c| c.parse::<usize>().ok()) {
            return Ok(FieldKind::PolynomA(cell));
        }
        Err(FieldError::UnknownFieldName(s.to_string()))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            FieldKind::PolynomB(cell) => write!(f, "b{cell}"),
            FieldKind::PolynomA(cell) => write!(f, "a{cell}"),
            FieldKind::KickAngle(Axis::Horizontal) => write!(f, "x_kick"),
            FieldKind::KickAngle(Axis::Vertical) => write!(f, "y_kick"),
            FieldKind::Frequency => write!(f, "f"),
            FieldKind::BendingAngle => write!(f, "b0"),
        }
    }
}
