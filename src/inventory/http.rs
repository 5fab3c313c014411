//! HTTP client for the device inventory service.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{DeviceDirectory, DeviceRecord};
use crate::error::InventoryError;

/// Expected shape of the inventory list endpoint.
#[derive(Debug, Deserialize)]
struct DeviceListResponse {
    devices: Vec<DeviceRecord>,
}

/// Inventory client speaking the service's JSON API.
///
/// Queries `GET {base_url}/devices?hostname=A,B,C` with a bearer token and
/// deserializes the `devices` array of the response.
pub struct HttpInventory {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl HttpInventory {
    /// Create a client for the inventory service at `base_url`.
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Override the request timeout (default 10 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, InventoryError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }
}

#[async_trait]
impl DeviceDirectory for HttpInventory {
    async fn fetch_devices(
        &self,
        hostnames: &[String],
    ) -> std::result::Result<Vec<DeviceRecord>, InventoryError> {
        let url = format!("{}/devices", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/json")
            .query(&[("hostname", hostnames.join(","))])
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?;

        let body: DeviceListResponse = response.json().await.map_err(|e| {
            InventoryError::Malformed {
                message: e.to_string(),
            }
        })?;

        Ok(filter_requested(body.devices, hostnames))
    }
}

/// Keep only records that were actually requested.
///
/// The service is expected to filter, but tolerate one that echoes extra
/// records back.
fn filter_requested(devices: Vec<DeviceRecord>, hostnames: &[String]) -> Vec<DeviceRecord> {
    devices
        .into_iter()
        .filter(|d| hostnames.iter().any(|h| h == &d.hostname))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let inv = HttpInventory::new("https://inv.example.com/api/", SecretString::from("t".to_string()));
        assert_eq!(inv.base_url, "https://inv.example.com/api");
    }

    #[test]
    fn test_unrequested_records_are_dropped() {
        let devices = vec![
            DeviceRecord {
                hostname: "R1".to_string(),
                mgmt_ip: "10.0.0.1".to_string(),
                vendor: "cisco".to_string(),
                os: "iosxe".to_string(),
                model: None,
                site: None,
                role: None,
            },
            DeviceRecord {
                hostname: "R9".to_string(),
                mgmt_ip: "10.0.0.9".to_string(),
                vendor: "cisco".to_string(),
                os: "iosxe".to_string(),
                model: None,
                site: None,
                role: None,
            },
        ];

        let requested = vec!["R1".to_string(), "R2".to_string()];
        let kept = filter_requested(devices, &requested);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hostname, "R1");
    }

    #[test]
    fn test_response_shape() {
        let raw = r#"{"devices":[{"hostname":"R1","mgmt_ip":"10.0.0.1","vendor":"cisco","os":"iosxe","site":"dc1"}]}"#;
        let parsed: DeviceListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.devices.len(), 1);
        assert_eq!(parsed.devices[0].hostname, "R1");
        assert_eq!(parsed.devices[0].site.as_deref(), Some("dc1"));
        assert_eq!(parsed.devices[0].role, None);
    }
}
