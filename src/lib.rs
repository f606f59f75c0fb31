//! ClinicSys appointment core: a client-side store mirroring the `/consultas`
//! REST resource, and the pure derivations the dashboard renders from it.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod notify;
pub mod store;
pub mod validation;

pub use api::{AppointmentApi, ConsultasClient};
pub use error::ClinicError;
pub use models::{
    Appointment, AppointmentId, AppointmentStatus, FilterState, NewAppointment, SpecialtyFilter,
    StatusFilter,
};
pub use notify::{MemoryNotifier, Notifier, TracingNotifier};
pub use store::{AppointmentStore, StoreSnapshot};
pub use validation::{AppointmentForm, ValidationErrors};
