use api_shared::wire::MeasurementForm;
use clap::{Args, Parser, Subcommand};
use echo_core::numeric::parse_number;
use echo_core::{
    db_path_from_env_value, CoreConfig, Examination, HemodynamicService, MedicalRecordNumber,
    Patient, Registration,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "echo")]
#[command(about = "Bedside echocardiographic hemodynamics CLI")]
struct Cli {
    /// JSON store path (defaults to ECHO_DB_PATH, then db.json)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a patient
    Register {
        #[arg(long)]
        name: String,
        /// Medical record number
        #[arg(long)]
        rm: String,
        /// Weight (kg)
        #[arg(long, value_parser = locale_number)]
        weight: f64,
        /// Height (cm)
        #[arg(long, value_parser = locale_number)]
        height: f64,
        /// LVOT diameter (cm)
        #[arg(long, value_parser = locale_number)]
        lvot_diameter: f64,
        /// Replace the stored record when the RM is already registered
        #[arg(long)]
        update: bool,
    },
    /// Show a registered patient
    Show {
        /// Medical record number
        rm: String,
    },
    /// Calculate and record an examination
    Calculate {
        /// Medical record number
        rm: String,
        #[command(flatten)]
        measurements: MeasurementArgs,
    },
    /// Show examination history, newest first
    History {
        /// 0 is the most recent examination
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

/// Raw readings, parsed with the same rules as the web form.
#[derive(Args, Debug)]
struct MeasurementArgs {
    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    tds: String,
    /// Diastolic blood pressure (mmHg)
    #[arg(long)]
    tdd: String,
    /// Heart rate (bpm)
    #[arg(long)]
    hr: String,
    /// LVOT VTI (cm)
    #[arg(long)]
    lvot_vti: String,
    /// IVC maximum diameter (cm)
    #[arg(long)]
    ivc_max: String,
    /// IVC minimum diameter (cm)
    #[arg(long)]
    ivc_min: String,
    /// LVOT diameter (cm), defaults to the registered value
    #[arg(long, default_value = "")]
    lvot_diameter: String,
    /// Temperature (°C)
    #[arg(long, default_value = "")]
    temperature: String,
    /// Comma-separated urine volumes (cc)
    #[arg(long, default_value = "")]
    urine_output: String,
    /// Urine collection period (hours)
    #[arg(long, default_value = "")]
    urine_duration: String,
    /// Fluid balance (cc)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    fluid_balance: String,
    /// Flat, "45 degrees" or Sitting
    #[arg(long, default_value = "")]
    position: String,
    /// + or -
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    a_line: String,
    /// bilateral, "right lung" or "left lung" (repeatable)
    #[arg(long)]
    b_line: Vec<String>,
    /// Right pleural separation (mm)
    #[arg(long, default_value = "")]
    right_pleural: String,
    /// Left pleural separation (mm)
    #[arg(long, default_value = "")]
    left_pleural: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<MeasurementArgs> for MeasurementForm {
    fn from(args: MeasurementArgs) -> Self {
        MeasurementForm {
            tds: args.tds,
            tdd: args.tdd,
            hr: args.hr,
            temperature: args.temperature,
            urine_output: args.urine_output,
            urine_duration: args.urine_duration,
            fluid_balance: args.fluid_balance,
            lvot_diameter: args.lvot_diameter,
            lvot_vti: args.lvot_vti,
            ivc_max: args.ivc_max,
            ivc_min: args.ivc_min,
            position: args.position,
            a_line: args.a_line,
            b_line: args.b_line,
            right_pleural: args.right_pleural,
            left_pleural: args.left_pleural,
            optional_notes: args.notes,
        }
    }
}

fn locale_number(raw: &str) -> Result<f64, String> {
    parse_number(raw).ok_or_else(|| format!("'{raw}' is not a number"))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("echo_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let db_path = cli
        .db
        .unwrap_or_else(|| db_path_from_env_value(std::env::var("ECHO_DB_PATH").ok()));
    let cfg = CoreConfig::new(db_path)?;
    tracing::debug!("using store {}", cfg.db_path().display());
    let service = HemodynamicService::open(&cfg);

    match cli.command {
        Some(Commands::Register {
            name,
            rm,
            weight,
            height,
            lvot_diameter,
            update,
        }) => {
            let patient = Patient::new(name, rm, weight, height, lvot_diameter)?;
            if update {
                service.save_patient(patient.clone())?;
                println!("Patient data saved");
                println!("{}", describe_patient(&patient));
            } else {
                match service.register_patient(patient.clone())? {
                    Registration::Created => {
                        println!("Patient data saved");
                        println!("{}", describe_patient(&patient));
                    }
                    Registration::AlreadyExists(existing) => {
                        println!(
                            "Medical Record Number already exists. Retrieving existing patient data."
                        );
                        println!("{}", describe_patient(&existing));
                    }
                }
            }
        }
        Some(Commands::Show { rm }) => {
            let rm = MedicalRecordNumber::parse(&rm)?;
            match service.find_patient(&rm) {
                Ok(patient) => println!("{}", describe_patient(&patient)),
                Err(echo_core::EchoError::PatientNotFound(_)) => {
                    eprintln!("Patient not found");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Calculate { rm, measurements }) => {
            let rm = MedicalRecordNumber::parse(&rm)?;
            let form = MeasurementForm::from(measurements);
            match service.examine(&rm, &form) {
                Ok(outcome) => println!("{}", outcome.examination.formatted_output),
                Err(e) if e.is_client_error() => eprintln!("Error: {}", e),
                Err(echo_core::EchoError::PatientNotFound(_)) => {
                    eprintln!("Patient not found");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::History { index }) => {
            let history = service.history()?;
            println!("{}", render_history(&history, index));
        }
        None => {
            println!("Use 'echo --help' for commands");
        }
    }

    Ok(())
}

fn describe_patient(patient: &Patient) -> String {
    format!(
        "Name: {}, RM: {}, Weight: {} kg, Height: {} cm, LVOT diameter: {} cm",
        patient.name,
        patient.rm,
        echo_core::numeric::format_number(patient.weight),
        echo_core::numeric::format_number(patient.height),
        echo_core::numeric::format_number(patient.lvot_diameter)
    )
}

fn render_history(history: &[Examination], index: usize) -> String {
    if history.is_empty() {
        return "No examination history found.".to_string();
    }
    let Some(exam) = history.get(index) else {
        return "No more records.".to_string();
    };

    let mut output = format!(
        "Examination History {} of {} ({})\n\n{}\n",
        index + 1,
        history.len(),
        exam.timestamp,
        exam.formatted_output
    );

    if index + 1 < history.len() {
        output.push_str(&format!("\nPrevious: echo history --index {}", index + 1));
    } else {
        output.push_str("\nThis is the oldest record.");
    }
    if index > 0 {
        output.push_str(&format!("\nNext: echo history --index {}", index - 1));
    } else {
        output.push_str("\nThis is the most recent record.");
    }

    output
}
