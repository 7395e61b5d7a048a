use crate::FieldError;

use super::Axis;
use super::FieldKind;

/// Physical class of a lattice element.
///
/// Field validity depends on the class: polynomial coefficients belong to
/// magnets, the bending angle to dipoles, kick angles to correctors (and to
/// sextupoles carrying an embedded corrector winding) and the frequency to
/// RF cavities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Dipole,
    Quadrupole,
    Sextupole,
    Corrector,
    RfCavity,
    Drift,
    Marker,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Dipole => "Dipole",
            ElementKind::Quadrupole => "Quadrupole",
            ElementKind::Sextupole => "Sextupole",
            ElementKind::Corrector => "Corrector",
            ElementKind::RfCavity => "RfCavity",
            ElementKind::Drift => "Drift",
            ElementKind::Marker => "Marker",
        }
    }

    fn has_polynoms(&self) -> bool {
        matches!(
            self,
            ElementKind::Dipole | ElementKind::Quadrupole | ElementKind::Sextupole | ElementKind::Corrector
        )
    }
}

/// One mutable element record of the lattice.
///
/// The positional `index` (1-based, matching the control system convention)
/// and `name` are fixed at construction; the numeric attributes are mutated
/// in place by the recalculation worker, and by nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    index: usize,
    pub name: String,
    pub kind: ElementKind,
    pub length: f64,
    pub polynom_a: Vec<f64>,
    pub polynom_b: Vec<f64>,
    pub kick_angle: [f64; 2],
    pub bending_angle: f64,
    pub frequency: f64,
}

impl Element {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        kind: ElementKind,
        length: f64,
    ) -> Self {
        let polynom_len = if kind.has_polynoms() { 4 } else { 0 };
        Self {
            index,
            name: name.into(),
            kind,
            length,
            polynom_a: vec![0.0; polynom_len],
            polynom_b: vec![0.0; polynom_len],
            kick_angle: [0.0; 2],
            bending_angle: 0.0,
            frequency: 0.0,
        }
    }

    pub fn with_polynom_b(
        mut self,
        cell: usize,
        value: f64,
    ) -> Self {
        self.polynom_b[cell] = value;
        self
    }

    pub fn with_bending_angle(
        mut self,
        value: f64,
    ) -> Self {
        self.bending_angle = value;
        self
    }

    pub fn with_frequency(
        mut self,
        value: f64,
    ) -> Self {
        self.frequency = value;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Check that `field` exists on this element without touching it.
    ///
    /// Used on the write path at enqueue time so an unknown field fails the
    /// caller synchronously instead of surfacing from the worker later.
    pub fn validate_field(
        &self,
        field: FieldKind,
    ) -> Result<(), FieldError> {
        match field {
            FieldKind::PolynomB(cell) => self.check_polynom_cell(field, cell, self.polynom_b.len()),
            FieldKind::PolynomA(cell) => self.check_polynom_cell(field, cell, self.polynom_a.len()),
            FieldKind::KickAngle(_) => match self.kind {
                ElementKind::Corrector | ElementKind::Sextupole => Ok(()),
                _ => Err(self.unknown_field(field)),
            },
            FieldKind::Frequency => match self.kind {
                ElementKind::RfCavity => Ok(()),
                _ => Err(self.unknown_field(field)),
            },
            FieldKind::BendingAngle => match self.kind {
                ElementKind::Dipole => Ok(()),
                _ => Err(self.unknown_field(field)),
            },
        }
    }

    pub fn set_field(
        &mut self,
        field: FieldKind,
        value: f64,
    ) -> Result<(), FieldError> {
        self.validate_field(field)?;
        match field {
            FieldKind::PolynomB(cell) => self.polynom_b[cell] = value,
            FieldKind::PolynomA(cell) => self.polynom_a[cell] = value,
            FieldKind::KickAngle(axis) => self.set_kick_angle(axis, value),
            FieldKind::Frequency => self.frequency = value,
            FieldKind::BendingAngle => self.bending_angle = value,
        }
        Ok(())
    }

    pub fn get_field(
        &self,
        field: FieldKind,
    ) -> Result<f64, FieldError> {
        self.validate_field(field)?;
        Ok(match field {
            FieldKind::PolynomB(cell) => self.polynom_b[cell],
            FieldKind::PolynomA(cell) => self.polynom_a[cell],
            FieldKind::KickAngle(axis) => self.kick_angle_value(axis),
            FieldKind::Frequency => self.frequency,
            FieldKind::BendingAngle => self.bending_angle,
        })
    }

    /// A corrector embedded in a sextupole has no kick-angle attribute of its
    /// own: the kick maps onto cell 0 of the applicable polynomial
    /// coefficients, scaled by the element length. Independent correctors
    /// carry the attribute directly.
    fn set_kick_angle(
        &mut self,
        axis: Axis,
        value: f64,
    ) {
        if self.kind == ElementKind::Sextupole {
            match axis {
                Axis::Horizontal => self.polynom_b[0] = -(value / self.length),
                Axis::Vertical => self.polynom_a[0] = value / self.length,
            }
        } else {
            self.kick_angle[axis.cell()] = value;
        }
    }

    fn kick_angle_value(
        &self,
        axis: Axis,
    ) -> f64 {
        if self.kind == ElementKind::Sextupole {
            match axis {
                Axis::Horizontal => -(self.polynom_b[0] * self.length),
                Axis::Vertical => self.polynom_a[0] * self.length,
            }
        } else {
            self.kick_angle[axis.cell()]
        }
    }

    fn check_polynom_cell(
        &self,
        field: FieldKind,
        cell: usize,
        len: usize,
    ) -> Result<(), FieldError> {
        if !self.kind.has_polynoms() {
            return Err(self.unknown_field(field));
        }
        if cell >= len {
            return Err(FieldError::CellOutOfRange {
                index: self.index,
                cell,
                len,
            });
        }
        Ok(())
    }

    fn unknown_field(
        &self,
        field: FieldKind,
    ) -> FieldError {
        FieldError::UnknownField {
            index: self.index,
            kind: self.kind.as_str(),
            field: field.to_string(),
        }
    }
}
