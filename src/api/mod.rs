use async_trait::async_trait;

use crate::error::ClinicError;
use crate::models::{Appointment, AppointmentId, NewAppointment};

pub mod consultas;

pub use consultas::ConsultasClient;

/// Backend owning the `/consultas` resource.
///
/// The store only talks to this trait, so tests and embedding applications can
/// swap the HTTP client for anything that answers the same five calls.
#[async_trait]
pub trait AppointmentApi: Send + Sync {
    /// `GET /consultas`
    async fn list(&self) -> Result<Vec<Appointment>, ClinicError>;

    /// `GET /consultas/{id}`; `ClinicError::NotFound` when the backend has no such record.
    async fn get(&self, id: AppointmentId) -> Result<Appointment, ClinicError>;

    /// `POST /consultas`; returns the record with its assigned id.
    async fn create(&self, draft: &NewAppointment) -> Result<Appointment, ClinicError>;

    /// `PUT /consultas/{id}` with the full record.
    async fn update(&self, appointment: &Appointment) -> Result<Appointment, ClinicError>;

    /// `DELETE /consultas/{id}`
    async fn delete(&self, id: AppointmentId) -> Result<(), ClinicError>;
}
