//! Derived hemodynamic metrics.
//!
//! [`calculate`] is a pure function of the measurement set, the patient biometrics and the
//! examination time. It never returns a non-finite number: every divisor is checked and the
//! finished metric set is verified before it is handed back.
//!
//! ## Formulas
//!
//! | Metric | Formula |
//! |---|---|
//! | MAP | `(2·DBP + SBP) / 3` |
//! | LV SV | `VTI · d² · 0.785` |
//! | LV CO | `SV · HR / 1000` |
//! | Collapsibility % | `(max − min) / max · 100` |
//! | SVR | `(MAP − eRAP) / CO · 80` |
//! | BSA | `√(height · weight / 3600)` |
//! | CI | `CO / BSA` |
//! | CPO | `CO · MAP / 451` |
//! | CPI | `CPO / BSA` |
//! | Distensibility % | `(max − min) / min · 100` |
//! | Pleural effusion | `thickness_mm · 20` |
//! | Urine output | `Σ volumes / weight / hours` |

use crate::constants::{
    COLLAPSIBILITY_THRESHOLD_PCT, CPO_DIVISOR, IVC_MAX_THRESHOLD_CM, LVOT_AREA_FACTOR,
    MOSTELLER_DIVISOR, PLEURAL_CC_PER_MM, SVR_FACTOR, TIMESTAMP_FORMAT,
};
use crate::error::{CalculationError, CalculationResult};
use crate::measurement::MeasurementInput;
use crate::patient::Patient;
use api_shared::wire;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated right atrial pressure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Erap {
    Low,
    Intermediate,
    High,
}

impl Erap {
    /// Classifies eRAP from the IVC maximum diameter (cm) and its collapsibility (%).
    ///
    /// | | collapsibility > 50% | collapsibility ≤ 50% |
    /// |---|---|---|
    /// | IVC < 2.1 cm | Low (3) | Intermediate (8) |
    /// | IVC ≥ 2.1 cm | Intermediate (8) | High (15) |
    pub fn classify(ivc_max: f64, collapsibility: f64) -> Self {
        let small = ivc_max < IVC_MAX_THRESHOLD_CM;
        let collapsing = collapsibility > COLLAPSIBILITY_THRESHOLD_PCT;

        match (small, collapsing) {
            (true, true) => Erap::Low,
            (true, false) | (false, true) => Erap::Intermediate,
            (false, false) => Erap::High,
        }
    }

    /// Estimated pressure in mmHg.
    pub fn mmhg(self) -> f64 {
        match self {
            Erap::Low => 3.0,
            Erap::Intermediate => 8.0,
            Erap::High => 15.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Erap::Low => "Low",
            Erap::Intermediate => "Intermediate",
            Erap::High => "High",
        }
    }
}

impl fmt::Display for Erap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UrineSummary {
    /// Total volume in cc.
    pub total: f64,
    pub duration_hours: f64,
    /// cc/kg/h
    pub per_kg_per_hour: f64,
}

/// Everything the report shows that is not a raw reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Mean arterial pressure (mmHg).
    pub map: f64,
    /// LV stroke volume (ml).
    pub stroke_volume: f64,
    /// LV cardiac output (L/min).
    pub cardiac_output: f64,
    /// IVC collapsibility (%).
    pub collapsibility: f64,
    pub erap: Erap,
    /// Systemic vascular resistance (dynes·s·cm⁻⁵).
    pub svr: f64,
    /// Body surface area (m²).
    pub bsa: f64,
    pub cardiac_index: f64,
    pub cardiac_power_output: f64,
    pub cardiac_power_index: f64,
    /// IVC distensibility (%).
    pub distensibility: f64,
    /// Right pleural effusion estimate (cc).
    pub right_pleural_effusion: f64,
    /// Left pleural effusion estimate (cc).
    pub left_pleural_effusion: f64,
    pub urine: Option<UrineSummary>,
    /// Fluid balance (cc), carried over from the input.
    pub fluid_balance: f64,
    /// `YYYYMMDD-HHMM`
    pub timestamp: String,
}

/// Renders an examination time as `YYYYMMDD-HHMM`.
pub fn format_timestamp(recorded_at: NaiveDateTime) -> String {
    recorded_at.format(TIMESTAMP_FORMAT).to_string()
}

/// Computes the derived metrics of one examination.
///
/// # Errors
///
/// Returns `CalculationError::Domain` when `ivcMax`, `ivcMin`, cardiac output, BSA, weight or
/// the urine collection duration is zero, when `height · weight` is negative, or when any
/// reading or result is not finite.
pub fn calculate(
    input: &MeasurementInput,
    patient: &Patient,
    recorded_at: NaiveDateTime,
) -> CalculationResult<DerivedMetrics> {
    ensure_readings_finite(input)?;

    let map = (2.0 * input.diastolic + input.systolic) / 3.0;
    let stroke_volume = input.lvot_vti * input.lvot_diameter.powi(2) * LVOT_AREA_FACTOR;
    let cardiac_output = stroke_volume * input.heart_rate / 1000.0;

    let ivc_delta = input.ivc_max - input.ivc_min;
    let collapsibility =
        divide(ivc_delta, input.ivc_max, "IVC collapsibility (ivcMax is zero)")? * 100.0;
    let distensibility =
        divide(ivc_delta, input.ivc_min, "IVC distensibility (ivcMin is zero)")? * 100.0;

    let erap = Erap::classify(input.ivc_max, collapsibility);

    let svr =
        divide(map - erap.mmhg(), cardiac_output, "SVR (cardiac output is zero)")? * SVR_FACTOR;

    let radicand = patient.height * patient.weight / MOSTELLER_DIVISOR;
    if radicand < 0.0 {
        return Err(CalculationError::Domain(
            "BSA (height × weight is negative)".into(),
        ));
    }
    let bsa = radicand.sqrt();

    let cardiac_index = divide(cardiac_output, bsa, "cardiac index (BSA is zero)")?;
    let cardiac_power_output = cardiac_output * map / CPO_DIVISOR;
    let cardiac_power_index =
        divide(cardiac_power_output, bsa, "cardiac power index (BSA is zero)")?;

    let urine = match &input.urine_output {
        Some(urine) => {
            let total = urine.total();
            let per_kg = divide(total, patient.weight, "urine output per kg (weight is zero)")?;
            let per_kg_per_hour = divide(
                per_kg,
                urine.duration_hours,
                "urine output per hour (duration is zero)",
            )?;
            Some(UrineSummary {
                total,
                duration_hours: urine.duration_hours,
                per_kg_per_hour,
            })
        }
        None => None,
    };

    let metrics = DerivedMetrics {
        map,
        stroke_volume,
        cardiac_output,
        collapsibility,
        erap,
        svr,
        bsa,
        cardiac_index,
        cardiac_power_output,
        cardiac_power_index,
        distensibility,
        right_pleural_effusion: input.right_pleural * PLEURAL_CC_PER_MM,
        left_pleural_effusion: input.left_pleural * PLEURAL_CC_PER_MM,
        urine,
        fluid_balance: input.fluid_balance,
        timestamp: format_timestamp(recorded_at),
    };

    ensure_finite(&metrics)?;
    tracing::debug!(erap = %metrics.erap, map = metrics.map, "derived metrics computed");

    Ok(metrics)
}

fn divide(numerator: f64, denominator: f64, what: &str) -> CalculationResult<f64> {
    if denominator == 0.0 {
        return Err(CalculationError::Domain(what.to_string()));
    }
    Ok(numerator / denominator)
}

fn ensure_readings_finite(input: &MeasurementInput) -> CalculationResult<()> {
    let mut values = vec![
        ("tds", input.systolic),
        ("tdd", input.diastolic),
        ("hr", input.heart_rate),
        ("lvotDiameter", input.lvot_diameter),
        ("lvotVti", input.lvot_vti),
        ("ivcMax", input.ivc_max),
        ("ivcMin", input.ivc_min),
        ("fluidBalance", input.fluid_balance),
        ("rightPleural", input.right_pleural),
        ("leftPleural", input.left_pleural),
    ];
    if let Some(temperature) = input.temperature {
        values.push(("temperature", temperature));
    }
    if let Some(urine) = &input.urine_output {
        values.push(("urineDuration", urine.duration_hours));
        values.extend(urine.volumes.iter().map(|v| ("urineOutput", *v)));
    }

    match values.into_iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(CalculationError::Domain(format!(
            "{name} (reading is not a finite number)"
        ))),
        None => Ok(()),
    }
}

fn ensure_finite(metrics: &DerivedMetrics) -> CalculationResult<()> {
    let mut values = vec![
        ("MAP", metrics.map),
        ("LV SV", metrics.stroke_volume),
        ("LV CO", metrics.cardiac_output),
        ("collapsibility index", metrics.collapsibility),
        ("SVR", metrics.svr),
        ("BSA", metrics.bsa),
        ("cardiac index", metrics.cardiac_index),
        ("cardiac power output", metrics.cardiac_power_output),
        ("cardiac power index", metrics.cardiac_power_index),
        ("distensibility index", metrics.distensibility),
        ("right pleural effusion", metrics.right_pleural_effusion),
        ("left pleural effusion", metrics.left_pleural_effusion),
        ("fluid balance", metrics.fluid_balance),
    ];
    if let Some(urine) = &metrics.urine {
        values.push(("urine output", urine.total));
        values.push(("urine output per kg per hour", urine.per_kg_per_hour));
    }

    match values.into_iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(CalculationError::Domain(format!(
            "{name} (result is not a finite number)"
        ))),
        None => Ok(()),
    }
}

impl From<&DerivedMetrics> for wire::MetricsRes {
    fn from(m: &DerivedMetrics) -> Self {
        wire::MetricsRes {
            map: m.map,
            lv_sv: m.stroke_volume,
            lv_co: m.cardiac_output,
            erap: m.erap.mmhg(),
            erap_category: m.erap.label().to_string(),
            svr: m.svr,
            bsa: m.bsa,
            cardiac_index: m.cardiac_index,
            cardiac_power_output: m.cardiac_power_output,
            cardiac_power_index: m.cardiac_power_index,
            collapsibility_index: m.collapsibility,
            distensibility_index: m.distensibility,
            right_pleural_effusion: m.right_pleural_effusion,
            left_pleural_effusion: m.left_pleural_effusion,
            fluid_balance: m.fluid_balance,
            urine_output: m.urine.as_ref().map(|u| wire::UrineOutputRes {
                total_cc: u.total,
                duration_hours: u.duration_hours,
                cc_per_kg_per_hour: u.per_kg_per_hour,
            }),
            timestamp: m.timestamp.clone(),
        }
    }
}
