//! Appointment store: the in-memory mirror of `/consultas` plus dashboard filters.
//!
//! Actions await the backend first and only then lock the state, so every
//! transition is applied in one critical section when its response resolves.
//! Nothing is queued or cancelled; overlapping actions are last-response-wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, TimeZone};

use crate::api::AppointmentApi;
use crate::dashboard::Dashboard;
use crate::error::ClinicError;
use crate::models::{
    Appointment, AppointmentId, FilterState, NewAppointment, SpecialtyFilter, StatusFilter,
};
use crate::notify::Notifier;
use crate::validation::{AppointmentForm, FormField, ValidationErrors};

#[derive(Debug, Default)]
struct StoreState {
    appointments: Vec<Appointment>,
    filters: FilterState,
    loading: bool,
}

/// Owned copy of the store state, the input of the dashboard derivations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub appointments: Vec<Appointment>,
    pub filters: FilterState,
    pub loading: bool,
}

struct Inner<A, N> {
    api: A,
    notifier: N,
    state: RwLock<StoreState>,
}

/// Shared handle; clones see the same collection.
pub struct AppointmentStore<A, N> {
    inner: Arc<Inner<A, N>>,
}

impl<A, N> Clone for AppointmentStore<A, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AppointmentApi, N: Notifier> AppointmentStore<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                state: RwLock::new(StoreState::default()),
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn notifier(&self) -> &N {
        &self.inner.notifier
    }

    // Guards are never held across an await.
    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /* -------------------------
       Queries
    --------------------------*/

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read_state();
        StoreSnapshot {
            appointments: state.appointments.clone(),
            filters: state.filters.clone(),
            loading: state.loading,
        }
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.read_state().appointments.clone()
    }

    pub fn filters(&self) -> FilterState {
        self.read_state().filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    /// Lookup in the in-memory collection only. May be stale.
    pub fn get_by_id(&self, id: AppointmentId) -> Option<Appointment> {
        self.read_state()
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Visible list, stats and specialty options as of `now`.
    pub fn dashboard_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Dashboard {
        Dashboard::from_snapshot(&self.snapshot(), now)
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard_at(&chrono::Local::now())
    }

    /* -------------------------
       Filter setters
    --------------------------*/

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.write_state().filters.search_text = text.into();
    }

    pub fn set_status_filter(&self, value: StatusFilter) {
        self.write_state().filters.status_filter = value;
    }

    pub fn set_specialty_filter(&self, value: SpecialtyFilter) {
        self.write_state().filters.specialty_filter = value;
    }

    pub fn reset_filters(&self) {
        self.write_state().filters = FilterState::default();
    }

    /* -------------------------
       Backend actions
    --------------------------*/

    /// Replace the whole collection with the backend's. On failure the
    /// collection is left as it was.
    pub async fn fetch_all(&self) -> Result<usize, ClinicError> {
        self.write_state().loading = true;
        tracing::debug!("fetching appointments");

        let result = self.inner.api.list().await;

        let outcome = {
            let mut state = self.write_state();
            state.loading = false;
            result.map(|items| {
                state.appointments = dedup_by_id(items);
                state.appointments.len()
            })
        };

        match outcome {
            Ok(count) => {
                tracing::info!(count, "appointments loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(code = e.code(), "fetch_all failed: {e}");
                self.inner
                    .notifier
                    .error(&format!("Could not load appointments: {e}"));
                Err(e)
            }
        }
    }

    /// Fetch one record from the backend and refresh it in the collection.
    pub async fn load_by_id(&self, id: AppointmentId) -> Result<Appointment, ClinicError> {
        match self.inner.api.get(id).await {
            Ok(appt) => {
                upsert(&mut self.write_state().appointments, appt.clone());
                Ok(appt)
            }
            Err(e) => {
                tracing::warn!(%id, code = e.code(), "load_by_id failed: {e}");
                let message = match &e {
                    ClinicError::NotFound(_) => "Appointment not found.".to_string(),
                    other => format!("Could not load appointment {id}: {other}"),
                };
                self.inner.notifier.error(&message);
                Err(e)
            }
        }
    }

    /// Create a `Scheduled` record and append what the backend returns.
    pub async fn create(&self, draft: NewAppointment) -> Result<Appointment, ClinicError> {
        match self.inner.api.create(&draft).await {
            Ok(created) => {
                upsert(&mut self.write_state().appointments, created.clone());
                tracing::info!(id = %created.id, "appointment created");
                self.inner.notifier.success(&format!(
                    "Appointment for {} created.",
                    created.patient_name
                ));
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(code = e.code(), "create failed: {e}");
                self.inner
                    .notifier
                    .error(&format!("Could not create appointment: {e}"));
                Err(e)
            }
        }
    }

    /// Validate the form, then `create`. Invalid input never reaches the backend
    /// and is not notified; the caller shows the per-field messages.
    pub async fn create_from_form(&self, form: &AppointmentForm) -> Result<Appointment, ClinicError> {
        let validated = form.validate()?;
        self.create(validated.draft).await
    }

    /// Persist the full record. The status sent is the one on `appointment`.
    pub async fn update(&self, appointment: Appointment) -> Result<Appointment, ClinicError> {
        let id = appointment.id;
        match self.inner.api.update(&appointment).await {
            Ok(saved) => {
                upsert(&mut self.write_state().appointments, saved.clone());
                tracing::info!(%id, "appointment updated");
                self.inner.notifier.success("Appointment updated.");
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(%id, code = e.code(), "update failed: {e}");
                self.inner
                    .notifier
                    .error(&format!("Could not update appointment {id}: {e}"));
                Err(e)
            }
        }
    }

    /// Validate the edit form, then `update` record `id` with its values.
    /// An empty status keeps the one held in memory; if the record is not
    /// loaded the status has to be given.
    pub async fn update_from_form(
        &self,
        id: AppointmentId,
        form: &AppointmentForm,
    ) -> Result<Appointment, ClinicError> {
        let validated = form.validate()?;
        let current = match (validated.status, self.get_by_id(id)) {
            (Some(status), _) => status,
            (None, Some(stored)) => stored.status,
            (None, None) => {
                return Err(ValidationErrors::single(FormField::Status, "Status is required").into());
            }
        };
        self.update(validated.into_appointment(id, current)).await
    }

    /// Delete on the backend, then drop the local entry. A record the backend
    /// no longer has counts as deleted.
    pub async fn delete(&self, id: AppointmentId) -> Result<(), ClinicError> {
        match self.inner.api.delete(id).await {
            Ok(()) | Err(ClinicError::NotFound(_)) => {
                self.write_state().appointments.retain(|a| a.id != id);
                tracing::info!(%id, "appointment deleted");
                self.inner.notifier.success("Appointment deleted.");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%id, code = e.code(), "delete failed: {e}");
                self.inner
                    .notifier
                    .error(&format!("Could not delete appointment {id}: {e}"));
                Err(e)
            }
        }
    }
}

/// Replace the entry with the same id in place, or append.
fn upsert(appointments: &mut Vec<Appointment>, appt: Appointment) {
    match appointments.iter_mut().find(|a| a.id == appt.id) {
        Some(slot) => *slot = appt,
        None => appointments.push(appt),
    }
}

// A backend listing the same id twice keeps the first row.
fn dedup_by_id(items: Vec<Appointment>) -> Vec<Appointment> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|a| seen.insert(a.id)).collect()
}
