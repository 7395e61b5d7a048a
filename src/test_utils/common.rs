use once_cell::sync::Lazy;

use crate::model::Element;
use crate::model::ElementKind;
use crate::model::Lattice;

static LOGGER: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    Lazy::force(&LOGGER);
}

/// A six-element demo cell covering every element class the field
/// enumeration dispatches on.
pub fn demo_lattice() -> Lattice {
    let elements = vec![
        Element::new(1, "BB1", ElementKind::Dipole, 0.95).with_bending_angle(0.196_349),
        Element::new(2, "Q1", ElementKind::Quadrupole, 0.4).with_polynom_b(1, 1.2),
        Element::new(3, "S1", ElementKind::Sextupole, 0.29).with_polynom_b(2, 6.0),
        Element::new(4, "HV1", ElementKind::Corrector, 0.1),
        Element::new(5, "RF1", ElementKind::RfCavity, 0.3).with_frequency(499.65e6),
        Element::new(6, "D1", ElementKind::Drift, 1.0),
    ];
    Lattice::new(elements, 3.0e9)
}
