use super::RefPoints;
use crate::model::OrbitPlane;
use crate::test_utils::demo_lattice;
use crate::test_utils::synthetic_data;

#[test]
fn test_refpoints_all() {
    let refpts = RefPoints::all(6);
    assert_eq!(refpts.len(), 7);
    assert_eq!(refpts.count_selected(), 7);
    assert!(refpts.is_selected(0));
    assert!(refpts.is_selected(6));
    assert!(!refpts.is_selected(7));
}

// The per-element views drop the trailing end point
#[test]
fn test_views_drop_end_point() {
    let lattice = demo_lattice();
    let data = synthetic_data(&lattice, &RefPoints::all(lattice.len()), false);

    assert_eq!(data.twiss.s_pos.len(), 7);
    assert_eq!(data.s_positions().len(), 6);
    assert_eq!(data.orbit().nrows(), 6);
    assert_eq!(data.dispersion().nrows(), 6);
    assert_eq!(data.alpha().nrows(), 6);
    assert_eq!(data.beta().nrows(), 6);
    assert_eq!(data.mu().nrows(), 6);
    assert_eq!(data.m66().shape(), &[6, 6, 6]);
    assert_eq!(data.orbit_plane(OrbitPlane::X).len(), 6);
}

#[test]
fn test_orbit_plane_selects_column() {
    let lattice = demo_lattice();
    let data = synthetic_data(&lattice, &RefPoints::all(lattice.len()), false);

    let py = data.orbit_plane(OrbitPlane::Py);
    for (i, value) in py.iter().enumerate() {
        assert_eq!(*value, data.twiss.closed_orbit[[i, 3]]);
    }
}

#[test]
fn test_fractional_tunes() {
    let lattice = demo_lattice();
    let mut data = synthetic_data(&lattice, &RefPoints::all(lattice.len()), false);
    data.tune = [14.275, -0.38];

    let [qx, qy] = data.fractional_tunes();
    assert!((qx - 0.275).abs() < 1.0e-12);
    // rem_euclid keeps the fraction in [0, 1) for negative tunes too
    assert!((qy - 0.62).abs() < 1.0e-12);
}

#[test]
fn test_total_path_length() {
    let lattice = demo_lattice();
    let data = synthetic_data(&lattice, &RefPoints::all(lattice.len()), false);
    assert!((data.total_path_length() - lattice.circumference()).abs() < 1.0e-12);
}

#[test]
fn test_emittance_disabled_leaves_none() {
    let lattice = demo_lattice();
    let data = synthetic_data(&lattice, &RefPoints::all(lattice.len()), true);
    assert!(data.emittance.is_none());
}
