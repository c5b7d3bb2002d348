//! Single-file JSON store.
//!
//! ## Storage Layout
//!
//! ```text
//! {
//!   "patients": {
//!     "<rm>": { "name": ..., "rm": ..., "weight": ..., "height": ..., "lvotDiameter": ... }
//!   },
//!   "examinations": [
//!     { "timestamp": "YYYYMMDD-HHMM", "formattedOutput": "..." }
//!   ]
//! }
//! ```
//!
//! Every operation reads the whole document, applies the change and writes it back. A missing
//! file reads as an empty store. A file that does not match the layout is an error carrying the
//! JSON path of the first mismatch, so a corrupted store is never silently replaced.
//!
//! Patient records are only checked when they are looked up. A record written by an older client
//! (an RM containing `/`) stays in the file untouched, reads as absent, and does not
//! stop the rest of the store from loading.

use crate::error::{EchoError, EchoResult};
use crate::examination::Examination;
use crate::patient::Patient;
use crate::repositories::{ExaminationLog, PatientRegistry};
use echo_types::MedicalRecordNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    patients: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    examinations: Vec<Examination>,
}

/// Patient registry and examination log backed by one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> EchoResult<StoreDocument> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("store {} not found, starting empty", self.path.display());
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(EchoError::FileRead(e)),
        };

        if contents.trim().is_empty() {
            return Ok(StoreDocument::default());
        }

        let deserializer = &mut serde_json::Deserializer::from_str(&contents);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            let path = e.path().to_string();
            let path = if path.is_empty() {
                "<root>".to_string()
            } else {
                path
            };
            EchoError::Deserialization {
                path,
                source: e.into_inner(),
            }
        })
    }

    fn save(&self, document: &StoreDocument) -> EchoResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(EchoError::StoreDirCreation)?;
            }
        }

        let json = serde_json::to_string_pretty(document).map_err(EchoError::Serialization)?;
        fs::write(&self.path, json).map_err(EchoError::FileWrite)?;
        Ok(())
    }

    fn modify<F>(&self, change: F) -> EchoResult<()>
    where
        F: FnOnce(&mut StoreDocument),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut document = self.load()?;
        change(&mut document);
        self.save(&document)
    }

    fn read(&self) -> EchoResult<StoreDocument> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.load()
    }
}

impl PatientRegistry for JsonFileStore {
    fn get(&self, rm: &MedicalRecordNumber) -> EchoResult<Option<Patient>> {
        let mut document = self.read()?;
        let Some(raw) = document.patients.remove(rm.as_str()) else {
            return Ok(None);
        };

        match serde_path_to_error::deserialize::<_, Patient>(raw) {
            Ok(patient) => Ok(Some(patient)),
            Err(e) => {
                tracing::warn!(
                    "skipping unreadable patient {} in {} at {}: {}",
                    rm,
                    self.path.display(),
                    e.path(),
                    e.inner()
                );
                Ok(None)
            }
        }
    }

    fn upsert(&self, patient: Patient) -> EchoResult<()> {
        let rm = patient.rm.to_string();
        let record = serde_json::to_value(&patient).map_err(EchoError::Serialization)?;
        self.modify(|document| {
            document.patients.insert(rm.clone(), record);
        })?;
        tracing::info!("saved patient {} to {}", rm, self.path.display());
        Ok(())
    }
}

impl ExaminationLog for JsonFileStore {
    fn append(&self, examination: Examination) -> EchoResult<()> {
        let timestamp = examination.timestamp.clone();
        self.modify(|document| {
            document.examinations.insert(0, examination);
        })?;
        tracing::info!(
            "saved examination {} to {}",
            timestamp,
            self.path.display()
        );
        Ok(())
    }

    fn list_all(&self) -> EchoResult<Vec<Examination>> {
        Ok(self.read()?.examinations)
    }
}
