//! Stored examination records.

use api_shared::wire;
use serde::{Deserialize, Serialize};

/// One examination as kept in the history log.
///
/// Only the rendered report is persisted, next to the timestamp it was recorded at. Raw
/// measurements are not kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examination {
    /// `YYYYMMDD-HHMM`, local time.
    pub timestamp: String,
    pub formatted_output: String,
}

impl Examination {
    pub fn new(timestamp: impl Into<String>, formatted_output: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            formatted_output: formatted_output.into(),
        }
    }
}

impl From<wire::ExaminationBody> for Examination {
    fn from(body: wire::ExaminationBody) -> Self {
        Self {
            timestamp: body.timestamp,
            formatted_output: body.formatted_output,
        }
    }
}

impl From<Examination> for wire::ExaminationBody {
    fn from(exam: Examination) -> Self {
        Self {
            timestamp: exam.timestamp,
            formatted_output: exam.formatted_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_camel_case_fields() {
        let exam = Examination::new("20240307-0805", "report");
        let json = serde_json::to_value(&exam).unwrap();
        assert_eq!(json["timestamp"], "20240307-0805");
        assert_eq!(json["formattedOutput"], "report");
    }
}
