use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clinicsys::{
    AppointmentForm, AppointmentId, AppointmentStore, ClinicError, ConsultasClient,
    SpecialtyFilter, StatusFilter, TracingNotifier, config::Config, dashboard::Dashboard,
    models::Appointment,
};

#[derive(Parser)]
#[command(name = "clinicsys")]
#[command(about = "Clinic appointment manager backed by a /consultas REST API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary cards and the filtered appointment list
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// Scheduled, Completed, Cancelled or all
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "all")]
        specialty: String,
    },
    /// Show one appointment
    Show { id: AppointmentId },
    /// Schedule a new appointment
    Create {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        specialty: String,
        /// RFC 3339, YYYY-MM-DDTHH:MM or YYYY-MM-DD (local time)
        #[arg(long)]
        at: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Change fields of an existing appointment
    Edit {
        id: AppointmentId,
        #[arg(long)]
        patient: Option<String>,
        #[arg(long)]
        doctor: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an appointment
    Delete { id: AppointmentId },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env()?;
    let client = ConsultasClient::from_config(&cfg).context("failed to build HTTP client")?;
    tracing::debug!("using backend {}", client.base_url());

    let store = AppointmentStore::new(client, TracingNotifier);

    match run(&store, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            for line in failure_lines(&e) {
                eprintln!("{line}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(
    store: &AppointmentStore<ConsultasClient, TracingNotifier>,
    command: Commands,
) -> Result<(), ClinicError> {
    match command {
        Commands::List {
            search,
            status,
            specialty,
        } => {
            store.fetch_all().await?;
            store.set_search_text(search);
            store.set_status_filter(status);
            store.set_specialty_filter(SpecialtyFilter::from(specialty.as_str()));
            print_dashboard(&store.dashboard());
        }
        Commands::Show { id } => {
            let appt = store.load_by_id(id).await?;
            print_details(&appt);
        }
        Commands::Create {
            patient,
            doctor,
            specialty,
            at,
            notes,
        } => {
            let form = AppointmentForm {
                patient_name: patient,
                doctor_name: doctor,
                specialty,
                scheduled_at: at,
                status: String::new(),
                notes,
            };
            let created = store.create_from_form(&form).await?;
            print_details(&created);
        }
        Commands::Edit {
            id,
            patient,
            doctor,
            specialty,
            at,
            status,
            notes,
        } => {
            let current = store.load_by_id(id).await?;
            let mut form = AppointmentForm::from(&current);
            let overlay = [
                (&mut form.patient_name, patient),
                (&mut form.doctor_name, doctor),
                (&mut form.specialty, specialty),
                (&mut form.scheduled_at, at),
                (&mut form.status, status),
                (&mut form.notes, notes),
            ];
            for (slot, value) in overlay {
                if let Some(v) = value {
                    *slot = v;
                }
            }
            let saved = store.update_from_form(id, &form).await?;
            print_details(&saved);
        }
        Commands::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted appointment {id}.");
        }
    }

    Ok(())
}

/// What still has to be printed for a failed command. The store has already
/// notified every backend failure, so only validation errors are left.
fn failure_lines(err: &ClinicError) -> Vec<String> {
    match err {
        ClinicError::Validation(errors) => std::iter::once("appointment form is invalid:".to_string())
            .chain(
                errors
                    .fields
                    .iter()
                    .map(|e| format!("  {}: {}", e.field.name(), e.message)),
            )
            .collect(),
        _ => Vec::new(),
    }
}

fn print_dashboard(view: &Dashboard) {
    println!(
        "Total: {}   Scheduled today: {}   Completed: {}",
        view.stats.total, view.stats.scheduled_today, view.stats.completed
    );
    let specialties: Vec<String> = view.specialties.iter().map(ToString::to_string).collect();
    println!("Specialties: {}", specialties.join(", "));
    println!(
        "Filters: search={:?} status={} specialty={}",
        view.filters.search_text, view.filters.status_filter, view.filters.specialty_filter
    );
    println!();

    if view.visible.is_empty() {
        println!("No appointments match the current filters.");
        return;
    }

    println!(
        "{:>5}  {:<24} {:<24} {:<16} {:<17} {}",
        "ID", "PATIENT", "DOCTOR", "SPECIALTY", "WHEN", "STATUS"
    );
    for a in &view.visible {
        println!(
            "{:>5}  {:<24} {:<24} {:<16} {:<17} {}",
            a.id.to_string(),
            a.patient_name,
            a.doctor_name,
            a.specialty,
            a.scheduled_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            a.status
        );
    }
}

fn print_details(a: &Appointment) {
    println!("Appointment {}", a.id);
    println!("  Patient:   {}", a.patient_name);
    println!("  Doctor:    {}", a.doctor_name);
    println!("  Specialty: {}", a.specialty);
    println!(
        "  When:      {}",
        a.scheduled_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
    );
    println!("  Status:    {}", a.status);
    println!(
        "  Notes:     {}",
        a.notes.as_deref().unwrap_or("No additional notes.")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use clinicsys::AppointmentStatus;

    #[test]
    fn backend_failures_are_not_printed_again() {
        let err = ClinicError::Server {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(failure_lines(&err).is_empty());
        assert!(failure_lines(&ClinicError::NotFound(AppointmentId(4))).is_empty());
    }

    #[test]
    fn validation_failures_list_each_field() {
        let form = AppointmentForm {
            patient_name: "Jo".into(),
            doctor_name: "Dr. House".into(),
            specialty: "Cardiology".into(),
            scheduled_at: "2025-03-10T14:30".into(),
            status: AppointmentStatus::Scheduled.label().into(),
            notes: String::new(),
        };
        let err = ClinicError::from(form.validate().unwrap_err());
        assert_eq!(
            failure_lines(&err),
            vec![
                "appointment form is invalid:".to_string(),
                "  patient_name: Patient name is required".to_string(),
            ]
        );
    }
}
