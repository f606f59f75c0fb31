//! reqwest client for the `/consultas` REST resource.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::api::AppointmentApi;
use crate::config::Config;
use crate::error::ClinicError;
use crate::models::{Appointment, AppointmentId, NewAppointment, NewAppointmentBody};

const RESOURCE: &str = "consultas";

#[derive(Debug, Clone)]
pub struct ConsultasClient {
    base_url: String,
    client: Client,
}

impl ConsultasClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClinicError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ClinicError> {
        Self::new(cfg.api_base_url.clone(), cfg.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{RESOURCE}", self.base_url)
    }

    fn item_url(&self, id: AppointmentId) -> String {
        format!("{}/{RESOURCE}/{id}", self.base_url)
    }
}

/// Turn non-2xx answers into `ClinicError`. A 404 on an item route becomes
/// `NotFound` when the caller knows which id it asked for.
async fn check(resp: Response, id: Option<AppointmentId>) -> Result<Response, ClinicError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(ClinicError::NotFound(id));
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClinicError::from_error_body(status.as_u16(), &body))
}

#[async_trait]
impl AppointmentApi for ConsultasClient {
    async fn list(&self) -> Result<Vec<Appointment>, ClinicError> {
        tracing::debug!("GET /{RESOURCE}");
        let resp = self.client.get(self.collection_url()).send().await?;
        let appointments = check(resp, None).await?.json::<Vec<Appointment>>().await?;
        Ok(appointments)
    }

    async fn get(&self, id: AppointmentId) -> Result<Appointment, ClinicError> {
        tracing::debug!("GET /{RESOURCE}/{id}");
        let resp = self.client.get(self.item_url(id)).send().await?;
        Ok(check(resp, Some(id)).await?.json().await?)
    }

    async fn create(&self, draft: &NewAppointment) -> Result<Appointment, ClinicError> {
        tracing::debug!("POST /{RESOURCE}");
        let resp = self
            .client
            .post(self.collection_url())
            .json(&NewAppointmentBody::from(draft))
            .send()
            .await?;
        Ok(check(resp, None).await?.json().await?)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, ClinicError> {
        let id = appointment.id;
        tracing::debug!("PUT /{RESOURCE}/{id}");
        let resp = self
            .client
            .put(self.item_url(id))
            .json(appointment)
            .send()
            .await?;
        Ok(check(resp, Some(id)).await?.json().await?)
    }

    async fn delete(&self, id: AppointmentId) -> Result<(), ClinicError> {
        tracing::debug!("DELETE /{RESOURCE}/{id}");
        let resp = self.client.delete(self.item_url(id)).send().await?;
        check(resp, Some(id)).await?;
        Ok(())
    }
}
