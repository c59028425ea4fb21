// libs/doctor-cell/src/services/directory.rs
use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::portal::PortalClient;

use crate::models::Doctor;

/// Read-only view of the clinic's provider roster. An unknown doctor name in
/// an availability query looks vacuously free, so booking paths confirm the
/// doctor exists here first.
pub struct DoctorDirectoryService {
    portal: PortalClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            portal: PortalClient::new(config),
        }
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor roster");

        let result: Vec<Value> = self
            .portal
            .request(
                Method::GET,
                "/rest/v1/doctors?is_active=eq.true&order=name.asc",
                Some(auth_token),
                None,
            )
            .await?;

        let doctors = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    pub async fn get_by_name(&self, name: &str, auth_token: &str) -> Result<Option<Doctor>> {
        debug!("Looking up doctor: {}", name);

        let path = format!(
            "/rest/v1/doctors?name=eq.{}&is_active=eq.true",
            urlencode(name)
        );
        let result: Vec<Value> = self
            .portal
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, name: &str, auth_token: &str) -> Result<bool> {
        Ok(self.get_by_name(name, auth_token).await?.is_some())
    }

    /// Roster as the plain name list the availability calculator consumes.
    pub async fn roster_names(&self, auth_token: &str) -> Result<Vec<String>> {
        Ok(self
            .list_doctors(auth_token)
            .await?
            .into_iter()
            .map(|d| d.name)
            .collect())
    }
}

fn urlencode(raw: &str) -> String {
    raw.replace('%', "%25").replace(' ', "%20").replace('&', "%26")
}
