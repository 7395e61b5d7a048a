use crate::FieldError;

use super::Element;
use super::ElementKind;
use super::FieldKind;

/// The shared mutable accelerator model: an ordered sequence of elements
/// plus the beam energy.
///
/// Exactly one coordinator owns write access; mutation happens only inside
/// the worker's apply step. The lattice is constructed once and mutated in
/// place for the coordinator's lifetime, never replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    elements: Vec<Element>,
    energy: f64,
}

impl Lattice {
    /// `energy` is the beam energy in eV.
    pub fn new(
        elements: Vec<Element>,
        energy: f64,
    ) -> Self {
        Self { elements, energy }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Total path length, in metres.
    pub fn circumference(&self) -> f64 {
        self.elements.iter().map(|e| e.length).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Element lookup by 1-based positional index.
    pub fn element(
        &self,
        index: usize,
    ) -> Result<&Element, FieldError> {
        self.elements
            .get(index.wrapping_sub(1))
            .ok_or(FieldError::IndexOutOfRange {
                index,
                len: self.elements.len(),
            })
    }

    fn element_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut Element, FieldError> {
        let len = self.elements.len();
        self.elements
            .get_mut(index.wrapping_sub(1))
            .ok_or(FieldError::IndexOutOfRange { index, len })
    }

    pub fn validate_field(
        &self,
        index: usize,
        field: FieldKind,
    ) -> Result<(), FieldError> {
        self.element(index)?.validate_field(field)
    }

    pub fn set_field(
        &mut self,
        index: usize,
        field: FieldKind,
        value: f64,
    ) -> Result<(), FieldError> {
        self.element_mut(index)?.set_field(field, value)
    }

    pub fn get_field(
        &self,
        index: usize,
        field: FieldKind,
    ) -> Result<f64, FieldError> {
        self.element(index)?.get_field(field)
    }

    /// Sum of the dipole bending angles, in degrees.
    pub fn total_bend_angle(&self) -> f64 {
        self.sum_bend_angles(|theta| theta)
    }

    /// Sum of the absolute dipole bending angles, in degrees.
    pub fn total_absolute_bend_angle(&self) -> f64 {
        self.sum_bend_angles(f64::abs)
    }

    fn sum_bend_angles(
        &self,
        map: impl Fn(f64) -> f64,
    ) -> f64 {
        let theta_sum: f64 = self
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Dipole)
            .map(|e| map(e.bending_angle))
            .sum();
        theta_sum.to_degrees()
    }
}
