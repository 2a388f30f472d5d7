mod api;
mod config;
mod models;
mod report;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use api::mail::{appointment_mail_body, MailKind};
use api::ApiClient;
use config::Config;
use models::{Appointment, Consultation, MedicalHistory, Patient};
use report::{ReportKind, ReportOptions};
use session::Session;

/// Headless CLI client for the Consultorio practice-management backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL for this invocation (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        cedula: String,
        #[arg(long)]
        password: String,
    },
    /// Log out on the backend and clear the stored session
    Logout,
    /// Change a user's password
    Password {
        #[arg(long)]
        cedula: String,
        #[arg(long)]
        password: String,
    },
    /// Update the logged-in user's profile from a JSON object
    Profile {
        #[arg(long)]
        json: String,
    },
    /// Patient records
    Patients {
        #[command(subcommand)]
        command: PatientsCommand,
    },
    /// Consultations
    Consultations {
        #[command(subcommand)]
        command: ConsultationsCommand,
    },
    /// Medical histories
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Appointment agenda
    Agenda {
        #[command(subcommand)]
        command: AgendaCommand,
    },
    /// Patient file attachments
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },
    /// Backend-relayed notification mails
    Mail {
        #[command(subcommand)]
        command: MailCommand,
    },
    /// Dependent accounts of the practice
    Dependents {
        #[command(subcommand)]
        command: DependentsCommand,
    },
    /// Generate CSV reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PatientsCommand {
    /// List the practice's patients
    List {
        /// List every patient across practices instead
        #[arg(long)]
        all: bool,
    },
    /// Create a patient from a JSON object
    Create {
        #[arg(long)]
        json: String,
    },
    /// Update a patient from a JSON object
    Update {
        #[arg(long)]
        json: String,
    },
    /// Delete a patient by cedula
    Delete { cedula: String },
}

#[derive(Subcommand, Debug)]
enum ConsultationsCommand {
    /// List consultations, for the practice or for one patient
    List {
        #[arg(long)]
        patient: Option<String>,
    },
    /// Create a consultation from a JSON object
    Create {
        #[arg(long)]
        json: String,
    },
    /// Update a consultation from a JSON object
    Update {
        #[arg(long)]
        json: String,
    },
    /// Close a consultation by id
    Close { id: String },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// Show a patient's medical history
    Show { cedula: String },
    /// Create a medical history from a JSON object
    Create {
        #[arg(long)]
        json: String,
    },
    /// Update a medical history from a JSON object
    Update {
        #[arg(long)]
        json: String,
    },
    /// Delete a patient's medical history
    Delete { cedula: String },
}

#[derive(Subcommand, Debug)]
enum AgendaCommand {
    /// List appointments
    List,
    /// Create an appointment
    Add {
        #[arg(long)]
        patient: String,
        /// Appointment date (YYYY-MM-DD); today when omitted
        #[arg(long)]
        fecha: Option<String>,
        #[arg(long)]
        inicio: String,
        #[arg(long = "final")]
        hora_final: String,
        /// Send a confirmation mail to this address
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete an appointment by id
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum FilesCommand {
    /// Upload up to three files for a patient
    Upload {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        detalle: String,
        /// Attachment date (YYYY-MM-DD); today when omitted
        #[arg(long)]
        fecha: Option<String>,
        /// Files to upload (1 to 3)
        #[arg(required = true, num_args = 1..=3)]
        paths: Vec<PathBuf>,
    },
    /// List a patient's stored files
    List { cedula: String },
    /// Delete a stored file by registry id
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum MailCommand {
    /// Send a support request
    Support {
        #[arg(long)]
        email: String,
        #[arg(long)]
        reason: String,
    },
    /// Request a new account
    RequestAccount {
        #[arg(long)]
        email: String,
        #[arg(long)]
        reason: String,
    },
    /// Request a password reset
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
enum DependentsCommand {
    /// List dependent accounts
    List,
    /// Add a dependent account
    Add {
        #[arg(long)]
        cedula: String,
        #[arg(long)]
        password: String,
        /// Extra profile fields as a JSON object
        #[arg(long)]
        json: Option<String>,
    },
    /// Delete a dependent account
    Remove { cedula: String },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// CSV of all consultations of one patient
    Consultations {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Do not hand the file to the system opener
        #[arg(long)]
        no_share: bool,
    },
    /// CSV of monthly totals
    Monthly {
        #[arg(long)]
        year: String,
        /// Spanish month name (enero..diciembre)
        #[arg(long)]
        month: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        no_share: bool,
    },
    /// CSV of monthly totals broken down by consultation type
    Detailed {
        #[arg(long)]
        year: String,
        /// Spanish month name (enero..diciembre)
        #[arg(long)]
        month: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        no_share: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = Config::default_config_path()?;
    let mut config = Config::load(&config_path)?;
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }

    let session = Session::load_from_file();
    let client = ApiClient::new(&config, session)?;
    tracing::debug!(api = client.base_url(), "Client ready");

    match args.command {
        Command::Login { cedula, password } => {
            let session = client.login(&cedula, &password).await?;
            session
                .save_to_file()
                .context("Failed to save session file")?;
            let marker = if session.user.is_dependent() {
                " (dependent account)"
            } else {
                ""
            };
            println!(
                "Logged in as {} {}{}",
                session.user.nombre.as_deref().unwrap_or(""),
                session.user.apellidos.as_deref().unwrap_or(""),
                marker
            );
        }

        Command::Logout => {
            // Clear the local session even when the backend call fails; the
            // token is gone either way.
            if let Err(e) = client.logout().await {
                warn!("Backend logout failed: {}", e);
            }
            Session::delete_file();
            println!("Logged out");
        }

        Command::Password { cedula, password } => {
            client.change_password(&cedula, &password).await?;
            println!("Password changed for {}", cedula);
        }

        Command::Profile { json } => {
            let profile: serde_json::Value =
                serde_json::from_str(&json).context("Invalid profile JSON")?;
            client.update_profile(&profile).await?;
            println!("Profile updated");
        }

        Command::Patients { command } => run_patients(&client, command).await?,
        Command::Consultations { command } => run_consultations(&client, command).await?,
        Command::History { command } => run_history(&client, command).await?,
        Command::Agenda { command } => run_agenda(&client, command).await?,
        Command::Files { command } => run_files(&client, command).await?,
        Command::Mail { command } => run_mail(&client, command).await?,
        Command::Dependents { command } => run_dependents(&client, command).await?,
        Command::Report { command } => run_report(&client, command).await?,
    }

    Ok(())
}

async fn run_patients(client: &ApiClient, command: PatientsCommand) -> Result<()> {
    match command {
        PatientsCommand::List { all } => {
            let patients = if all {
                client.all_patients().await?
            } else {
                client.patients().await?
            };
            print_json(&patients)?;
        }
        PatientsCommand::Create { json } => {
            let patient: Patient = serde_json::from_str(&json).context("Invalid patient JSON")?;
            client.create_patient(&patient).await?;
            println!("Patient {} created", patient.id_cedula);
        }
        PatientsCommand::Update { json } => {
            let patient: Patient = serde_json::from_str(&json).context("Invalid patient JSON")?;
            client.update_patient(&patient).await?;
            println!("Patient {} updated", patient.id_cedula);
        }
        PatientsCommand::Delete { cedula } => {
            client.delete_patient(&cedula).await?;
            println!("Patient {} deleted", cedula);
        }
    }
    Ok(())
}

async fn run_consultations(client: &ApiClient, command: ConsultationsCommand) -> Result<()> {
    match command {
        ConsultationsCommand::List { patient } => match patient {
            Some(cedula) => print_json(&client.consultations_raw(&cedula).await?)?,
            None => print_json(&client.consultations().await?)?,
        },
        ConsultationsCommand::Create { json } => {
            let consultation: Consultation =
                serde_json::from_str(&json).context("Invalid consultation JSON")?;
            client.create_consultation(&consultation).await?;
            println!("Consultation created for {}", consultation.id_cedula);
        }
        ConsultationsCommand::Update { json } => {
            let consultation: Consultation =
                serde_json::from_str(&json).context("Invalid consultation JSON")?;
            client.update_consultation(&consultation).await?;
            println!("Consultation updated");
        }
        ConsultationsCommand::Close { id } => {
            client.close_consultation(&id).await?;
            println!("Consultation {} closed", id);
        }
    }
    Ok(())
}

async fn run_history(client: &ApiClient, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::Show { cedula } => {
            let history = client.medical_history(&cedula).await?;
            print_json(&history)?;
        }
        HistoryCommand::Create { json } => {
            let history: MedicalHistory =
                serde_json::from_str(&json).context("Invalid history JSON")?;
            client.create_history(&history).await?;
            println!("Medical history created for {}", history.id_cedula);
        }
        HistoryCommand::Update { json } => {
            let history: MedicalHistory =
                serde_json::from_str(&json).context("Invalid history JSON")?;
            client.update_history(&history).await?;
            println!("Medical history updated for {}", history.id_cedula);
        }
        HistoryCommand::Delete { cedula } => {
            client.delete_history(&cedula).await?;
            println!("Medical history deleted for {}", cedula);
        }
    }
    Ok(())
}

async fn run_agenda(client: &ApiClient, command: AgendaCommand) -> Result<()> {
    match command {
        AgendaCommand::List => {
            let appointments = client.appointments().await?;
            print_json(&appointments)?;
        }
        AgendaCommand::Add {
            patient,
            fecha,
            inicio,
            hora_final,
            email,
        } => {
            let fecha = fecha.unwrap_or_else(today);
            let appointment = Appointment {
                id: None,
                id_empresa: None,
                id_cedula_usuario: None,
                id_cedula_paciente: patient.clone(),
                fecha: fecha.clone(),
                hora_inicio: inicio.clone(),
                hora_final: hora_final.clone(),
                extra: serde_json::Map::new(),
            };
            client.create_appointment(&appointment).await?;
            println!("Appointment created for {} on {}", patient, fecha);

            if let Some(email) = email {
                // Confirmation mail is best-effort, the appointment already
                // exists on the backend.
                if let Err(e) = send_confirmation(client, &patient, &email, &appointment).await {
                    warn!("Could not send confirmation mail: {}", e);
                } else {
                    println!("Confirmation sent to {}", email);
                }
            }
        }
        AgendaCommand::Remove { id } => {
            client.delete_appointment(&id).await?;
            println!("Appointment {} removed", id);
        }
    }
    Ok(())
}

async fn send_confirmation(
    client: &ApiClient,
    patient_cedula: &str,
    email: &str,
    appointment: &Appointment,
) -> Result<()> {
    let patients = client.patients().await?;
    let patient_name = patients
        .iter()
        .find(|p| p.id_cedula == patient_cedula)
        .and_then(|p| p.nombre.clone())
        .unwrap_or_else(|| "Paciente".to_string());

    let user = &client.session()?.user;
    let assigned_by = format!(
        "{} {}",
        user.nombre.as_deref().unwrap_or(""),
        user.apellidos.as_deref().unwrap_or("")
    );

    let body = appointment_mail_body(
        &patient_name,
        assigned_by.trim(),
        &appointment.fecha,
        &appointment.hora_inicio,
        &appointment.hora_final,
    );
    client.send_mail(MailKind::Appointment, email, &body).await?;
    Ok(())
}

async fn run_files(client: &ApiClient, command: FilesCommand) -> Result<()> {
    match command {
        FilesCommand::Upload {
            patient,
            detalle,
            fecha,
            paths,
        } => {
            let fecha = fecha.unwrap_or_else(today);
            client.upload_files(&patient, &fecha, &detalle, &paths).await?;
            println!("Uploaded {} file(s) for {}", paths.len(), patient);
        }
        FilesCommand::List { cedula } => {
            let files = client.patient_files(&cedula).await?;
            print_json(&files)?;
        }
        FilesCommand::Delete { id } => {
            client.delete_file(&id).await?;
            println!("File {} deleted", id);
        }
    }
    Ok(())
}

async fn run_mail(client: &ApiClient, command: MailCommand) -> Result<()> {
    let (kind, email, reason) = match command {
        MailCommand::Support { email, reason } => (MailKind::Support, email, reason),
        MailCommand::RequestAccount { email, reason } => (MailKind::CreateUser, email, reason),
        MailCommand::ResetPassword { email, reason } => (MailKind::ResetPassword, email, reason),
    };
    client.send_mail(kind, &email, &reason).await?;
    println!("Mail sent to {}", email);
    Ok(())
}

async fn run_dependents(client: &ApiClient, command: DependentsCommand) -> Result<()> {
    match command {
        DependentsCommand::List => {
            let dependents = client.dependents().await?;
            print_json(&dependents)?;
        }
        DependentsCommand::Add {
            cedula,
            password,
            json,
        } => {
            let extra = match json {
                Some(text) => serde_json::from_str(&text).context("Invalid dependent JSON")?,
                None => serde_json::Value::Null,
            };
            client.create_dependent(&cedula, &password, &extra).await?;
            println!("Dependent {} added", cedula);
        }
        DependentsCommand::Remove { cedula } => {
            client.delete_dependent(&cedula).await?;
            println!("Dependent {} removed", cedula);
        }
    }
    Ok(())
}

async fn run_report(client: &ApiClient, command: ReportCommand) -> Result<()> {
    let path = match command {
        ReportCommand::Consultations {
            patient,
            out_dir,
            no_share,
        } => {
            let opts = ReportOptions { out_dir, no_share };
            report::generate_consultations(client, &patient, &opts).await?
        }
        ReportCommand::Monthly {
            year,
            month,
            out_dir,
            no_share,
        } => {
            let opts = ReportOptions { out_dir, no_share };
            report::generate_monthly(client, ReportKind::Monthly, &year, &month, &opts).await?
        }
        ReportCommand::Detailed {
            year,
            month,
            out_dir,
            no_share,
        } => {
            let opts = ReportOptions { out_dir, no_share };
            report::generate_monthly(client, ReportKind::Detailed, &year, &month, &opts).await?
        }
    };

    info!(path = %path.display(), "Report generated");
    println!("Report written to {}", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render response")?
    );
    Ok(())
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
