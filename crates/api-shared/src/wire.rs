//! JSON request and response bodies.
//!
//! Every numeric field of [`MeasurementForm`] is a raw string: parsing (comma decimal separators,
//! stray units, blanks) is a core concern and happens in `echo-core`, not during deserialisation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Generic acknowledgement body, e.g. `{ "message": "Patient data saved" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// Generic error body, e.g. `{ "error": "Patient not found" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Patient registry entry as exchanged over the API and stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientBody {
    pub name: String,
    /// Medical record number.
    pub rm: String,
    /// Weight in kg.
    pub weight: f64,
    /// Height in cm.
    pub height: f64,
    /// Left ventricular outflow tract diameter in cm.
    pub lvot_diameter: f64,
}

/// A stored examination report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExaminationBody {
    /// `YYYYMMDD-HHMM`
    pub timestamp: String,
    pub formatted_output: String,
}

/// Raw hemodynamic measurement form.
///
/// Blank strings mean "not provided". `urineOutput` is a comma-separated list of volumes in cc.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementForm {
    /// Systolic blood pressure (mmHg).
    pub tds: String,
    /// Diastolic blood pressure (mmHg).
    pub tdd: String,
    /// Heart rate (bpm).
    pub hr: String,
    pub temperature: String,
    pub urine_output: String,
    /// Urine collection duration in hours.
    pub urine_duration: String,
    pub fluid_balance: String,
    /// Blank falls back to the patient's registered LVOT diameter.
    pub lvot_diameter: String,
    pub lvot_vti: String,
    pub ivc_max: String,
    pub ivc_min: String,
    /// `Flat`, `45 degrees`, `Sitting` or blank.
    pub position: String,
    /// `+`, `-` or blank.
    pub a_line: String,
    /// Any of `bilateral`, `right lung`, `left lung`.
    pub b_line: Vec<String>,
    /// Right pleural thickness (mm).
    pub right_pleural: String,
    /// Left pleural thickness (mm).
    pub left_pleural: String,
    pub optional_notes: String,
}

/// Request to calculate, format and store an examination for a registered patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateReq {
    pub rm: String,
    pub measurements: MeasurementForm,
}

/// Urine output summary as part of [`MetricsRes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UrineOutputRes {
    pub total_cc: f64,
    pub duration_hours: f64,
    pub cc_per_kg_per_hour: f64,
}

/// Derived hemodynamic indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRes {
    pub map: f64,
    pub lv_sv: f64,
    pub lv_co: f64,
    pub erap: f64,
    /// `Low`, `Intermediate` or `High`.
    pub erap_category: String,
    pub svr: f64,
    pub bsa: f64,
    pub cardiac_index: f64,
    pub cardiac_power_output: f64,
    pub cardiac_power_index: f64,
    pub collapsibility_index: f64,
    pub distensibility_index: f64,
    pub right_pleural_effusion: f64,
    pub left_pleural_effusion: f64,
    pub fluid_balance: f64,
    pub urine_output: Option<UrineOutputRes>,
    pub timestamp: String,
}

/// Result of a server-side calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalculateRes {
    pub examination: ExaminationBody,
    pub metrics: MetricsRes,
}
