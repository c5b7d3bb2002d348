//! Clinician-readable examination report.
//!
//! The text is pasted verbatim into clinical notes, so labels, units and blank lines are part of
//! the contract. Sections appear in a fixed order and optional ones are left out entirely:
//!
//! ```text
//! Suhu: 37.5°C                       (only with a temperature)
//!
//! Urine output:
//! 300 cc / 6 jam (0.71 cc/kgBB/jam)  (or "Data not provided")
//! Fluid balance: -200 cc
//!
//! Echo Hemodinamik <name> RM <rm> <YYYYMMDD-HHMM>
//! TD 120 / 80 mmHg
//! ...
//! Lung Ultrasound
//! A-Lines (+), B-lines > 3 (-), Efusi pleura (-)
//! Position: Flat                     (only with a position)
//!
//! Additional Notes:                  (only with notes)
//! ...
//! ```

use crate::calculator::DerivedMetrics;
use crate::constants::DATA_NOT_PROVIDED;
use crate::measurement::{ALine, MeasurementInput};
use crate::numeric::format_number;
use crate::patient::Patient;

/// Assembles the report text of one examination.
pub fn format_report(
    input: &MeasurementInput,
    metrics: &DerivedMetrics,
    patient: &Patient,
) -> String {
    let mut output = String::from("\n");

    if let Some(temperature) = input.temperature {
        output.push_str(&format!("Suhu: {}°C\n", format_number(temperature)));
    }

    output.push_str(&urine_section(metrics));

    output.push_str(&format!(
        "Echo Hemodinamik {} RM {} {}\n",
        patient.name, patient.rm, metrics.timestamp
    ));
    output.push_str(&format!(
        "TD {} / {} mmHg\n",
        format_number(input.systolic),
        format_number(input.diastolic)
    ));
    output.push_str(&format!("MAP: {} mmHg\n", format_number(metrics.map)));
    output.push_str(&format!("HR: {} bpm\n", format_number(input.heart_rate)));
    output.push_str(&format!(
        "LVOT diameter: {} cm\n",
        format_number(input.lvot_diameter)
    ));
    output.push_str(&format!("LVOT VTI: {} cm\n", format_number(input.lvot_vti)));
    output.push_str(&format!("LV SV: {} ml\n", format_number(metrics.stroke_volume)));
    output.push_str(&format!(
        "LV CO: {} L/min\n",
        format_number(metrics.cardiac_output)
    ));
    output.push_str(&format!(
        "eRAP: {} mmHg ({} / {})\n",
        format_number(metrics.erap.mmhg()),
        format_number(input.ivc_max),
        format_number(input.ivc_min)
    ));
    output.push_str(&format!(
        "SVR: {} dynes/sec.cm-5\n\n",
        format_number(metrics.svr)
    ));

    output.push_str(&format!("BSA: {}\n", format_number(metrics.bsa)));
    output.push_str(&format!(
        "Cardiac Index: {}\n",
        format_number(metrics.cardiac_index)
    ));
    output.push_str(&format!(
        "Cardiac Power Output: {}\n",
        format_number(metrics.cardiac_power_output)
    ));
    output.push_str(&format!(
        "Cardiac Power Index: {}\n",
        format_number(metrics.cardiac_power_index)
    ));
    output.push_str(&format!(
        "Collapsibility Index: {}%\n",
        format_number(metrics.collapsibility)
    ));
    output.push_str(&format!(
        "Distensibility Index: {}%\n\n",
        format_number(metrics.distensibility)
    ));

    output.push_str(&lung_ultrasound_section(input, metrics));

    if let Some(notes) = &input.notes {
        output.push_str(&format!("\n\nAdditional Notes:\n{}\n", notes));
    }

    output.push('\n');
    output.trim().to_string()
}

fn urine_section(metrics: &DerivedMetrics) -> String {
    let urine_line = match &metrics.urine {
        Some(urine) => format!(
            "{} cc / {} jam ({} cc/kgBB/jam)",
            format_number(urine.total),
            format_number(urine.duration_hours),
            format_number(urine.per_kg_per_hour)
        ),
        None => DATA_NOT_PROVIDED.to_string(),
    };

    format!(
        "\nUrine output:\n{}\nFluid balance: {} cc\n\n",
        urine_line,
        format_number(metrics.fluid_balance)
    )
}

fn lung_ultrasound_section(input: &MeasurementInput, metrics: &DerivedMetrics) -> String {
    let mut section = String::from("Lung Ultrasound\n");

    let a_line = input.a_line.unwrap_or(ALine::Absent);
    section.push_str(&format!("A-Lines ({}), ", a_line.sign()));

    if input.b_line.is_empty() {
        section.push_str("B-lines > 3 (-)");
    } else {
        let locations: Vec<&str> = input.b_line.iter().map(|l| l.label()).collect();
        section.push_str(&format!("B-lines > 3 (+) {}", locations.join(", ")));
    }

    let mut effusions = Vec::new();
    if input.right_pleural > 0.0 {
        effusions.push(format!(
            "right: {} cc",
            format_number(metrics.right_pleural_effusion)
        ));
    }
    if input.left_pleural > 0.0 {
        effusions.push(format!(
            "left: {} cc",
            format_number(metrics.left_pleural_effusion)
        ));
    }

    if effusions.is_empty() {
        section.push_str(", Efusi pleura (-)");
    } else {
        section.push_str(&format!(
            ", Efusi pleura (+) with estimation {}",
            effusions.join(", ")
        ));
    }

    if let Some(position) = input.position {
        section.push_str(&format!("\nPosition: {}", position));
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate;
    use crate::measurement::{BLineLocation, Position, UrineOutput};
    use chrono::{NaiveDate, NaiveDateTime};

    fn recorded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 2)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn patient() -> Patient {
        Patient::new("Budi Santoso", "123456", 70.0, 170.0, 2.0).unwrap()
    }

    fn input() -> MeasurementInput {
        MeasurementInput {
            systolic: 120.0,
            diastolic: 80.0,
            heart_rate: 80.0,
            lvot_diameter: 2.0,
            lvot_vti: 20.0,
            ivc_max: 2.0,
            ivc_min: 1.0,
            temperature: None,
            urine_output: None,
            fluid_balance: 0.0,
            right_pleural: 0.0,
            left_pleural: 0.0,
            position: None,
            a_line: None,
            b_line: vec![],
            notes: None,
        }
    }

    fn render(input: &MeasurementInput) -> String {
        let metrics = calculate(input, &patient(), recorded_at()).unwrap();
        format_report(input, &metrics, &patient())
    }

    #[test]
    fn minimal_report_matches_expected_text() {
        let expected = "\
Urine output:
Data not provided
Fluid balance: 0 cc

Echo Hemodinamik Budi Santoso RM 123456 20241102-1430
TD 120 / 80 mmHg
MAP: 93.33 mmHg
HR: 80 bpm
LVOT diameter: 2 cm
LVOT VTI: 20 cm
LV SV: 62.80 ml
LV CO: 5.02 L/min
eRAP: 8 mmHg (2 / 1)
SVR: 1358.81 dynes/sec.cm-5

BSA: 1.82
Cardiac Index: 2.76
Cardiac Power Output: 1.04
Cardiac Power Index: 0.57
Collapsibility Index: 50%
Distensibility Index: 100%

Lung Ultrasound
A-Lines (-), B-lines > 3 (-), Efusi pleura (-)";

        assert_eq!(render(&input()), expected);
    }

    #[test]
    fn full_report_includes_every_optional_section() {
        let mut i = input();
        i.temperature = Some(37.55);
        i.urine_output = Some(UrineOutput {
            volumes: vec![100.0, 200.0],
            duration_hours: 6.0,
        });
        i.fluid_balance = -250.0;
        i.a_line = Some(ALine::Present);
        i.b_line = vec![BLineLocation::RightLung, BLineLocation::LeftLung];
        i.right_pleural = 10.0;
        i.left_pleural = 5.5;
        i.position = Some(Position::FortyFiveDegrees);
        i.notes = Some("Started on dobutamine".into());

        let report = render(&i);

        assert!(report.starts_with(
            "Suhu: 37.55°C\n\nUrine output:\n300 cc / 6 jam (0.71 cc/kgBB/jam)\nFluid balance: -250 cc\n\nEcho Hemodinamik"
        ));
        assert!(report.contains(
            "Lung Ultrasound\nA-Lines (+), B-lines > 3 (+) right lung, left lung, \
             Efusi pleura (+) with estimation right: 200 cc, left: 110 cc\nPosition: 45 degrees"
        ));
        assert!(report.ends_with("\n\nAdditional Notes:\nStarted on dobutamine"));
    }

    #[test]
    fn effusion_lists_only_positive_sides() {
        let mut i = input();
        i.left_pleural = 3.0;
        let report = render(&i);
        assert!(report.contains("Efusi pleura (+) with estimation left: 60 cc"));
        assert!(!report.contains("right:"));
    }

    #[test]
    fn report_never_contains_non_numbers() {
        let report = render(&input());
        assert!(!report.contains("NaN"));
        assert!(!report.contains("inf"));
    }

    #[test]
    fn report_is_deterministic() {
        assert_eq!(render(&input()), render(&input()));
    }
}
