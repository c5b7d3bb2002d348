//! Patient registry records.
//!
//! A patient is identified by its medical record number (RM). Biometrics are the ones the
//! calculator needs: weight and height for BSA and urine output per kg, and the LVOT diameter
//! that pre-fills every new examination.

use crate::error::{CalculationError, EchoResult};
use api_shared::wire;
use echo_types::{MedicalRecordNumber, NonEmptyText};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: NonEmptyText,
    pub rm: MedicalRecordNumber,
    /// Weight in kg.
    pub weight: f64,
    /// Height in cm.
    pub height: f64,
    /// LVOT diameter in cm.
    pub lvot_diameter: f64,
}

impl Patient {
    /// Builds a validated patient record.
    ///
    /// # Errors
    ///
    /// Returns `EchoError::InvalidText` for a blank name or malformed RM, and
    /// `CalculationError::InputValidation` when a biometric is not a positive number.
    pub fn new(
        name: impl AsRef<str>,
        rm: impl AsRef<str>,
        weight: f64,
        height: f64,
        lvot_diameter: f64,
    ) -> EchoResult<Self> {
        let patient = Self {
            name: NonEmptyText::new(name)?,
            rm: MedicalRecordNumber::parse(rm)?,
            weight,
            height,
            lvot_diameter,
        };
        patient.validate()?;
        Ok(patient)
    }

    /// Checks that the biometrics are positive finite numbers.
    pub fn validate(&self) -> Result<(), CalculationError> {
        for (field, value) in [
            ("weight", self.weight),
            ("height", self.height),
            ("lvotDiameter", self.lvot_diameter),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalculationError::InputValidation(format!(
                    "{field} must be a positive number"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<wire::PatientBody> for Patient {
    type Error = crate::EchoError;

    fn try_from(body: wire::PatientBody) -> EchoResult<Self> {
        Patient::new(
            body.name,
            body.rm,
            body.weight,
            body.height,
            body.lvot_diameter,
        )
    }
}

impl From<Patient> for wire::PatientBody {
    fn from(patient: Patient) -> Self {
        wire::PatientBody {
            name: patient.name.into_inner(),
            rm: patient.rm.to_string(),
            weight: patient.weight,
            height: patient.height,
            lvot_diameter: patient.lvot_diameter,
        }
    }
}
