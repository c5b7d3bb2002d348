//! # Echo Core
//!
//! Core logic for bedside echocardiographic hemodynamic assessment.
//!
//! This crate contains the pure calculation pipeline and its storage:
//! - Locale-tolerant parsing of bedside readings ([`numeric`], [`measurement`])
//! - Derived hemodynamic metrics ([`calculator`]) and the clinical report text ([`report`])
//! - The patient registry and examination log ([`repositories`])
//! - The examination workflow over them ([`service`])
//!
//! **No API concerns**: HTTP servers and command-line front ends belong in `api-rest` and
//! `echo-cli`.

pub mod calculator;
pub mod config;
pub mod constants;
pub mod error;
pub mod examination;
pub mod measurement;
pub mod numeric;
pub mod patient;
pub mod report;
pub mod repositories;
pub mod service;

pub use calculator::{calculate, DerivedMetrics, Erap, UrineSummary};
pub use config::{db_path_from_env_value, CoreConfig};
pub use error::{CalculationError, CalculationResult, EchoError, EchoResult};
pub use examination::Examination;
pub use measurement::{ALine, BLineLocation, MeasurementInput, Position, UrineOutput};
pub use patient::Patient;
pub use report::format_report;
pub use repositories::{ExaminationLog, JsonFileStore, MemoryStore, PatientRegistry};
pub use service::{ExaminationOutcome, HemodynamicService, Registration};

pub use echo_types::{MedicalRecordNumber, NonEmptyText};
