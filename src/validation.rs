//! Form input checks, applied before anything reaches the store.

use crate::models::{
    format_local_input, parse_timestamp, Appointment, AppointmentId, AppointmentStatus,
    NewAppointment,
};

const MIN_TEXT_LEN: usize = 3;

/// Raw appointment form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub patient_name: String,
    pub doctor_name: String,
    pub specialty: String,
    pub scheduled_at: String,
    /// Empty leaves the status to the caller: `Scheduled` on create, the
    /// stored status on edit.
    pub status: String,
    pub notes: String,
}

impl From<&Appointment> for AppointmentForm {
    fn from(a: &Appointment) -> Self {
        Self {
            patient_name: a.patient_name.clone(),
            doctor_name: a.doctor_name.clone(),
            specialty: a.specialty.clone(),
            scheduled_at: format_local_input(a.scheduled_at),
            status: a.status.label().to_string(),
            notes: a.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    PatientName,
    DoctorName,
    Specialty,
    ScheduledAt,
    Status,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::PatientName => "patient_name",
            FormField::DoctorName => "doctor_name",
            FormField::Specialty => "specialty",
            FormField::ScheduledAt => "scheduled_at",
            FormField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Every failing field of one form submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid appointment form: {}", self.joined())]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub(crate) fn single(field: FormField, message: &str) -> Self {
        let mut fields = Vec::new();
        push(&mut fields, field, message);
        Self { fields }
    }

    fn joined(&self) -> String {
        self.fields
            .iter()
            .map(|e| format!("{}: {}", e.field.name(), e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub draft: NewAppointment,
    /// `None` when the status field was left empty.
    pub status: Option<AppointmentStatus>,
}

impl ValidatedForm {
    /// Full record for an update of `id`. Without a status on the form the
    /// record keeps `current`.
    pub fn into_appointment(self, id: AppointmentId, current: AppointmentStatus) -> Appointment {
        let status = self.status.unwrap_or(current);
        Appointment {
            status,
            ..self.draft.assign(id)
        }
    }
}

impl AppointmentForm {
    pub fn validate(&self) -> Result<ValidatedForm, ValidationErrors> {
        let mut errors = Vec::new();

        let patient_name = required_text(
            &self.patient_name,
            FormField::PatientName,
            "Patient name is required",
            &mut errors,
        );
        let doctor_name = required_text(
            &self.doctor_name,
            FormField::DoctorName,
            "Doctor name is required",
            &mut errors,
        );
        let specialty = required_text(
            &self.specialty,
            FormField::Specialty,
            "Specialty is required",
            &mut errors,
        );

        let scheduled_at = if self.scheduled_at.trim().is_empty() {
            push(&mut errors, FormField::ScheduledAt, "Date is required");
            None
        } else {
            let parsed = parse_timestamp(&self.scheduled_at);
            if parsed.is_none() {
                push(&mut errors, FormField::ScheduledAt, "Date is not a valid date/time");
            }
            parsed
        };

        let mut status_ok = true;
        let status = if self.status.trim().is_empty() {
            None
        } else {
            match self.status.parse::<AppointmentStatus>() {
                Ok(s) => Some(s),
                Err(_) => {
                    push(
                        &mut errors,
                        FormField::Status,
                        "Status must be Scheduled, Completed or Cancelled",
                    );
                    status_ok = false;
                    None
                }
            }
        };

        match (patient_name, doctor_name, specialty, scheduled_at) {
            (Some(patient_name), Some(doctor_name), Some(specialty), Some(scheduled_at)) if status_ok => {
                let notes = self.notes.trim();
                Ok(ValidatedForm {
                    draft: NewAppointment {
                        patient_name,
                        doctor_name,
                        specialty,
                        scheduled_at,
                        notes: (!notes.is_empty()).then(|| notes.to_string()),
                    },
                    status,
                })
            }
            _ => Err(ValidationErrors { fields: errors }),
        }
    }
}

fn required_text(
    raw: &str,
    field: FormField,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = raw.trim();
    if value.chars().count() < MIN_TEXT_LEN {
        push(errors, field, message);
        return None;
    }
    Some(value.to_string())
}

fn push(errors: &mut Vec<FieldError>, field: FormField, message: &str) {
    errors.push(FieldError {
        field,
        message: message.to_string(),
    });
}
