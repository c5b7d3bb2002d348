//! Hemodynamic examination workflow.
//!
//! [`HemodynamicService`] ties the pure pieces together: validate the measurement form, calculate
//! derived metrics, format the report and append it to the examination log. Storage is injected
//! through the [`PatientRegistry`] and [`ExaminationLog`] traits so the same service runs over
//! the JSON file store in production and an in-memory store in tests.

use crate::calculator::{self, DerivedMetrics};
use crate::config::CoreConfig;
use crate::error::{EchoError, EchoResult};
use crate::examination::Examination;
use crate::measurement::MeasurementInput;
use crate::patient::Patient;
use crate::report::format_report;
use crate::repositories::{ExaminationLog, JsonFileStore, PatientRegistry};
use api_shared::wire;
use chrono::{Local, NaiveDateTime};
use echo_types::MedicalRecordNumber;
use std::sync::Arc;

/// Result of [`HemodynamicService::register_patient`].
#[derive(Clone, Debug, PartialEq)]
pub enum Registration {
    Created,
    /// The RM was already registered; the stored record is returned untouched.
    AlreadyExists(Patient),
}

/// A recorded examination together with the metrics behind its report.
#[derive(Clone, Debug, PartialEq)]
pub struct ExaminationOutcome {
    pub examination: Examination,
    pub metrics: DerivedMetrics,
}

#[derive(Clone)]
pub struct HemodynamicService {
    registry: Arc<dyn PatientRegistry>,
    log: Arc<dyn ExaminationLog>,
}

impl HemodynamicService {
    pub fn new(registry: Arc<dyn PatientRegistry>, log: Arc<dyn ExaminationLog>) -> Self {
        Self { registry, log }
    }

    /// Opens the JSON file store at the configured path for both the registry and the log.
    pub fn open(cfg: &CoreConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(cfg.db_path()));
        Self::new(store.clone(), store)
    }

    /// # Errors
    ///
    /// `EchoError::PatientNotFound` when the RM is not registered.
    pub fn find_patient(&self, rm: &MedicalRecordNumber) -> EchoResult<Patient> {
        self.registry
            .get(rm)?
            .ok_or_else(|| EchoError::PatientNotFound(rm.to_string()))
    }

    /// Validates and stores the patient, replacing any record with the same RM.
    pub fn save_patient(&self, patient: Patient) -> EchoResult<()> {
        patient.validate()?;
        self.registry.upsert(patient)
    }

    /// Stores the patient only if the RM is not registered yet.
    pub fn register_patient(&self, patient: Patient) -> EchoResult<Registration> {
        if let Some(existing) = self.registry.get(&patient.rm)? {
            tracing::info!("patient {} already registered", existing.rm);
            return Ok(Registration::AlreadyExists(existing));
        }
        self.save_patient(patient)?;
        Ok(Registration::Created)
    }

    /// Runs a full examination timestamped with the current local time.
    pub fn examine(
        &self,
        rm: &MedicalRecordNumber,
        form: &wire::MeasurementForm,
    ) -> EchoResult<ExaminationOutcome> {
        self.examine_at(rm, form, Local::now().naive_local())
    }

    /// Looks up the patient, validates the form, calculates, formats and appends the report to
    /// the log.
    ///
    /// A blank LVOT diameter in the form falls back to the patient's registered value. Nothing is
    /// appended when any step fails.
    ///
    /// # Errors
    ///
    /// - `EchoError::PatientNotFound` for an unknown RM.
    /// - `EchoError::Calculation` for invalid input or a domain error.
    /// - Store errors from the registry or the log.
    pub fn examine_at(
        &self,
        rm: &MedicalRecordNumber,
        form: &wire::MeasurementForm,
        recorded_at: NaiveDateTime,
    ) -> EchoResult<ExaminationOutcome> {
        let patient = self.find_patient(rm)?;
        let input = MeasurementInput::from_form_with_lvot(form, Some(patient.lvot_diameter))?;
        let metrics = calculator::calculate(&input, &patient, recorded_at)?;
        let report = format_report(&input, &metrics, &patient);

        let examination = Examination::new(metrics.timestamp.clone(), report);
        self.log.append(examination.clone())?;
        tracing::info!("recorded examination {} for patient {}", examination.timestamp, rm);

        Ok(ExaminationOutcome {
            examination,
            metrics,
        })
    }

    /// Appends an examination whose report was produced elsewhere.
    pub fn record_examination(&self, examination: Examination) -> EchoResult<()> {
        self.log.append(examination)
    }

    /// All examinations, newest first.
    pub fn history(&self) -> EchoResult<Vec<Examination>> {
        self.log.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalculationError;
    use crate::repositories::MemoryStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn service() -> HemodynamicService {
        let store = Arc::new(MemoryStore::new());
        HemodynamicService::new(store.clone(), store)
    }

    fn rm(value: &str) -> MedicalRecordNumber {
        MedicalRecordNumber::parse(value).expect("valid rm")
    }

    fn patient() -> Patient {
        Patient::new("Budi", "RM-001", 70.0, 170.0, 2.0).expect("valid patient")
    }

    fn form() -> wire::MeasurementForm {
        wire::MeasurementForm {
            tds: "120".into(),
            tdd: "80".into(),
            hr: "80".into(),
            lvot_vti: "20".into(),
            ivc_max: "2".into(),
            ivc_min: "1".into(),
            ..Default::default()
        }
    }

    fn recorded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .expect("date")
            .and_hms_opt(8, 5, 0)
            .expect("time")
    }

    #[test]
    fn register_does_not_overwrite_existing_patient() {
        let service = service();
        assert_eq!(
            service.register_patient(patient()).expect("register"),
            Registration::Created
        );

        let heavier = Patient::new("Budi", "RM-001", 90.0, 170.0, 2.0).expect("valid patient");
        match service.register_patient(heavier).expect("register") {
            Registration::AlreadyExists(existing) => assert_eq!(existing.weight, 70.0),
            other => panic!("unexpected registration: {other:?}"),
        }
        assert_eq!(service.find_patient(&rm("RM-001")).expect("find").weight, 70.0);
    }

    #[test]
    fn save_patient_replaces_existing_record() {
        let service = service();
        service.save_patient(patient()).expect("save");
        service
            .save_patient(Patient::new("Budi", "RM-001", 72.0, 170.0, 2.1).expect("valid"))
            .expect("save");
        assert_eq!(service.find_patient(&rm("RM-001")).expect("find").weight, 72.0);
    }

    #[test]
    fn find_unknown_patient_is_not_found() {
        let err = service().find_patient(&rm("nope")).expect_err("not found");
        assert!(matches!(err, EchoError::PatientNotFound(ref r) if r == "nope"));
    }

    #[test]
    fn examine_appends_report_with_registered_lvot() {
        let service = service();
        service.save_patient(patient()).expect("save");

        let outcome = service
            .examine_at(&rm("RM-001"), &form(), recorded_at())
            .expect("examine");

        assert_eq!(outcome.examination.timestamp, "20240307-0805");
        assert!(outcome
            .examination
            .formatted_output
            .contains("Echo Hemodinamik Budi RM RM-001 20240307-0805"));
        assert!(outcome.examination.formatted_output.contains("LVOT diameter: 2 cm"));
        assert!((outcome.metrics.map - 93.333).abs() < 1e-3);

        let history = service.history().expect("history");
        assert_eq!(history, vec![outcome.examination]);
    }

    #[test]
    fn failed_examination_is_not_logged() {
        let service = service();
        service.save_patient(patient()).expect("save");

        let mut f = form();
        f.ivc_max = "0".into();
        let err = service
            .examine_at(&rm("RM-001"), &f, recorded_at())
            .expect_err("domain error");
        assert!(matches!(
            err,
            EchoError::Calculation(CalculationError::Domain(_))
        ));
        assert!(service.history().expect("history").is_empty());
    }

    #[test]
    fn overflowing_temperature_is_left_out_of_report() {
        let service = service();
        service.save_patient(patient()).expect("save");

        let mut f = form();
        f.temperature = format!("1{}", "0".repeat(400));
        let outcome = service
            .examine_at(&rm("RM-001"), &f, recorded_at())
            .expect("examine");

        let report = &outcome.examination.formatted_output;
        assert!(!report.contains("inf"));
        assert!(!report.contains("Suhu"));
    }

    #[test]
    fn examine_unknown_patient_is_not_found() {
        let err = service()
            .examine_at(&rm("RM-404"), &form(), recorded_at())
            .expect_err("not found");
        assert!(matches!(err, EchoError::PatientNotFound(_)));
    }

    #[test]
    fn open_shares_one_file_for_registry_and_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().join("db.json")).expect("config");

        let service = HemodynamicService::open(&cfg);
        service.save_patient(patient()).expect("save");
        service
            .examine_at(&rm("RM-001"), &form(), recorded_at())
            .expect("examine");

        let reopened = HemodynamicService::open(&cfg);
        assert_eq!(reopened.find_patient(&rm("RM-001")).expect("find").name.as_str(), "Budi");
        assert_eq!(reopened.history().expect("history").len(), 1);
    }
}
