//! In-memory store.

use crate::error::EchoResult;
use crate::examination::Examination;
use crate::patient::Patient;
use crate::repositories::{ExaminationLog, PatientRegistry};
use echo_types::MedicalRecordNumber;
use std::collections::HashMap;
use std::sync::RwLock;

/// Patient registry and examination log that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patients: RwLock<HashMap<String, Patient>>,
    examinations: RwLock<Vec<Examination>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientRegistry for MemoryStore {
    fn get(&self, rm: &MedicalRecordNumber) -> EchoResult<Option<Patient>> {
        let patients = self.patients.read().unwrap_or_else(|p| p.into_inner());
        Ok(patients.get(rm.as_str()).cloned())
    }

    fn upsert(&self, patient: Patient) -> EchoResult<()> {
        let mut patients = self.patients.write().unwrap_or_else(|p| p.into_inner());
        patients.insert(patient.rm.to_string(), patient);
        Ok(())
    }
}

impl ExaminationLog for MemoryStore {
    fn append(&self, examination: Examination) -> EchoResult<()> {
        let mut examinations = self.examinations.write().unwrap_or_else(|p| p.into_inner());
        examinations.insert(0, examination);
        Ok(())
    }

    fn list_all(&self) -> EchoResult<Vec<Examination>> {
        let examinations = self.examinations.read().unwrap_or_else(|p| p.into_inner());
        Ok(examinations.clone())
    }
}
