//! Storage for the patient registry and the examination log.
//!
//! Services depend on the [`PatientRegistry`] and [`ExaminationLog`] traits, never on a concrete
//! store:
//!
//! - [`json_file::JsonFileStore`] keeps both in a single pretty-printed JSON document
//!   (`{"patients": {...}, "examinations": [...]}`), the format the web front end has always used.
//! - [`memory::MemoryStore`] keeps both in process memory, for tests and throwaway sessions.

pub mod json_file;
pub mod memory;

use crate::error::EchoResult;
use crate::examination::Examination;
use crate::patient::Patient;
use echo_types::MedicalRecordNumber;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Patients keyed by medical record number.
pub trait PatientRegistry: Send + Sync {
    /// Looks up a patient. `Ok(None)` when the RM is not registered.
    fn get(&self, rm: &MedicalRecordNumber) -> EchoResult<Option<Patient>>;

    /// Inserts the patient, replacing any record with the same RM.
    fn upsert(&self, patient: Patient) -> EchoResult<()>;
}

/// Examination history, newest first.
pub trait ExaminationLog: Send + Sync {
    /// Prepends an examination to the log.
    fn append(&self, examination: Examination) -> EchoResult<()>;

    /// Returns every examination, newest first.
    fn list_all(&self) -> EchoResult<Vec<Examination>>;
}
