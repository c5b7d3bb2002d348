//! Constants used throughout the echo core crate.
//!
//! Clinical thresholds and formula coefficients live here so the calculator reads as a list of
//! formulas and the report labels stay in one place.

/// Default path of the JSON store when no explicit path is configured.
pub const DEFAULT_DB_PATH: &str = "db.json";

/// `strftime` pattern of examination timestamps (`YYYYMMDD-HHMM`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M";

/// IVC maximum diameter (cm) below which the IVC counts as small for eRAP.
pub const IVC_MAX_THRESHOLD_CM: f64 = 2.1;

/// IVC collapsibility (%) above which the IVC counts as collapsing for eRAP.
pub const COLLAPSIBILITY_THRESHOLD_PCT: f64 = 50.0;

/// Circular-orifice approximation of the LVOT area (π/4).
pub const LVOT_AREA_FACTOR: f64 = 0.785;

/// Conversion factor from (mmHg / L·min⁻¹) to dynes·s·cm⁻⁵.
pub const SVR_FACTOR: f64 = 80.0;

/// Cardiac power output denominator (W).
pub const CPO_DIVISOR: f64 = 451.0;

/// Mosteller BSA denominator.
pub const MOSTELLER_DIVISOR: f64 = 3600.0;

/// Pleural effusion estimate in cc per mm of separation.
pub const PLEURAL_CC_PER_MM: f64 = 20.0;

/// Placeholder written when no urine output was measured.
pub const DATA_NOT_PROVIDED: &str = "Data not provided";
