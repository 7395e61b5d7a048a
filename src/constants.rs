// -
// Coordinator defaults

/// Default bound on consistency waits, in milliseconds
pub(crate) const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

// -
// Physical constants used by the radiation-derived accessors

/// Speed of light, m/s
pub(crate) const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Electron rest energy, eV
pub(crate) const ELECTRON_REST_ENERGY_EV: f64 = 510_998.946_1;

/// Quantum excitation constant Cq, m
pub(crate) const C_Q: f64 = 3.831_938_64e-13;

/// Radiation constant Cgamma, m/GeV^3
pub(crate) const C_GAMMA: f64 = 8.846_273_82e-5;
