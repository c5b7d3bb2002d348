//! Measurement input and its validation from the raw form.
//!
//! [`MeasurementInput`] is the typed set of bedside readings the calculator consumes. It is built
//! from a [`wire::MeasurementForm`] with [`MeasurementInput::from_form`], which applies the
//! parsing and defaulting rules:
//!
//! - required readings must parse, otherwise `InputValidation`
//! - pleural thickness and fluid balance default to `0` when blank or invalid
//! - an unparsable temperature is treated as not measured
//! - a urine output list requires a valid duration, otherwise `DependentField`

use crate::error::{CalculationError, CalculationResult};
use crate::numeric::{parse_number, parse_number_list};
use api_shared::wire;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Patient position during the lung ultrasound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Flat,
    #[serde(rename = "45 degrees")]
    FortyFiveDegrees,
    Sitting,
}

impl Position {
    fn from_form(raw: &str) -> CalculationResult<Option<Self>> {
        match raw.trim() {
            "" => Ok(None),
            "Flat" => Ok(Some(Position::Flat)),
            "45 degrees" => Ok(Some(Position::FortyFiveDegrees)),
            "Sitting" => Ok(Some(Position::Sitting)),
            other => Err(CalculationError::InputValidation(format!(
                "unknown position '{other}'"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Flat => "Flat",
            Position::FortyFiveDegrees => "45 degrees",
            Position::Sitting => "Sitting",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A-line finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ALine {
    #[serde(rename = "+")]
    Present,
    #[serde(rename = "-")]
    Absent,
}

impl ALine {
    fn from_form(raw: &str) -> CalculationResult<Option<Self>> {
        match raw.trim() {
            "" => Ok(None),
            "+" => Ok(Some(ALine::Present)),
            "-" => Ok(Some(ALine::Absent)),
            other => Err(CalculationError::InputValidation(format!(
                "aLine must be '+' or '-', got '{other}'"
            ))),
        }
    }

    pub fn sign(self) -> &'static str {
        match self {
            ALine::Present => "+",
            ALine::Absent => "-",
        }
    }
}

/// Where more than three B-lines were seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BLineLocation {
    #[serde(rename = "bilateral")]
    Bilateral,
    #[serde(rename = "right lung")]
    RightLung,
    #[serde(rename = "left lung")]
    LeftLung,
}

impl BLineLocation {
    fn from_form(raw: &str) -> CalculationResult<Self> {
        match raw.trim() {
            "bilateral" => Ok(BLineLocation::Bilateral),
            "right lung" => Ok(BLineLocation::RightLung),
            "left lung" => Ok(BLineLocation::LeftLung),
            other => Err(CalculationError::InputValidation(format!(
                "unknown B-line location '{other}'"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BLineLocation::Bilateral => "bilateral",
            BLineLocation::RightLung => "right lung",
            BLineLocation::LeftLung => "left lung",
        }
    }
}

/// Urine volumes collected over a known period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UrineOutput {
    /// Individual volumes in cc.
    pub volumes: Vec<f64>,
    pub duration_hours: f64,
}

impl UrineOutput {
    pub fn total(&self) -> f64 {
        self.volumes.iter().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    /// Systolic blood pressure (mmHg).
    pub systolic: f64,
    /// Diastolic blood pressure (mmHg).
    pub diastolic: f64,
    /// Heart rate (bpm).
    pub heart_rate: f64,
    /// LVOT diameter (cm).
    pub lvot_diameter: f64,
    /// LVOT velocity-time integral (cm).
    pub lvot_vti: f64,
    /// IVC maximum diameter (cm).
    pub ivc_max: f64,
    /// IVC minimum diameter (cm).
    pub ivc_min: f64,
    /// Body temperature (°C).
    pub temperature: Option<f64>,
    pub urine_output: Option<UrineOutput>,
    /// Fluid balance (cc).
    pub fluid_balance: f64,
    /// Right pleural separation (mm).
    pub right_pleural: f64,
    /// Left pleural separation (mm).
    pub left_pleural: f64,
    pub position: Option<Position>,
    pub a_line: Option<ALine>,
    pub b_line: Vec<BLineLocation>,
    pub notes: Option<String>,
}

impl MeasurementInput {
    /// Validates a raw measurement form.
    ///
    /// # Errors
    ///
    /// - `InputValidation` when a required reading is blank or not a number, or an enumerated
    ///   field has an unknown value.
    /// - `DependentField` when urine output is given without a valid duration.
    pub fn from_form(form: &wire::MeasurementForm) -> CalculationResult<Self> {
        Self::from_form_with_lvot(form, None)
    }

    /// Like [`from_form`](Self::from_form), but a blank LVOT diameter falls back to
    /// `default_lvot_diameter` (the value registered for the patient).
    pub fn from_form_with_lvot(
        form: &wire::MeasurementForm,
        default_lvot_diameter: Option<f64>,
    ) -> CalculationResult<Self> {
        let lvot_diameter = match (form.lvot_diameter.trim(), default_lvot_diameter) {
            ("", Some(default)) => default,
            (raw, _) => required("lvotDiameter", raw)?,
        };

        let systolic = required("tds", &form.tds)?;
        let diastolic = required("tdd", &form.tdd)?;
        let heart_rate = required("hr", &form.hr)?;
        let lvot_vti = required("lvotVti", &form.lvot_vti)?;
        let ivc_max = required("ivcMax", &form.ivc_max)?;
        let ivc_min = required("ivcMin", &form.ivc_min)?;

        let urine_output = match form.urine_output.trim() {
            "" => None,
            raw => {
                let duration_hours = parse_number(&form.urine_duration).ok_or_else(|| {
                    CalculationError::DependentField(
                        "urineDuration is required when urineOutput is provided".into(),
                    )
                })?;
                Some(UrineOutput {
                    volumes: parse_number_list(raw),
                    duration_hours,
                })
            }
        };

        let mut b_line = Vec::new();
        for raw in &form.b_line {
            let location = BLineLocation::from_form(raw)?;
            if !b_line.contains(&location) {
                b_line.push(location);
            }
        }

        let notes = Some(form.optional_notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            systolic,
            diastolic,
            heart_rate,
            lvot_diameter,
            lvot_vti,
            ivc_max,
            ivc_min,
            temperature: parse_number(&form.temperature),
            urine_output,
            fluid_balance: or_zero(&form.fluid_balance),
            right_pleural: or_zero(&form.right_pleural),
            left_pleural: or_zero(&form.left_pleural),
            position: Position::from_form(&form.position)?,
            a_line: ALine::from_form(&form.a_line)?,
            b_line,
            notes,
        })
    }
}

fn required(field: &str, raw: &str) -> CalculationResult<f64> {
    parse_number(raw).ok_or_else(|| {
        CalculationError::InputValidation(format!("{field} is required and must be a number"))
    })
}

fn or_zero(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}
