//! Device inventory lookups.
//!
//! The inventory service owns the mapping from hostnames to device records
//! (management address, vendor, OS family, optional site/model/role). The
//! pipeline only depends on the [`DeviceDirectory`] trait; the HTTP client
//! is one implementation of it.

mod http;

pub use http::HttpInventory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// One device record as returned by the inventory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device hostname, unique within a run.
    pub hostname: String,

    /// Management address used to reach the device.
    pub mgmt_ip: String,

    /// Vendor name (e.g. "cisco", "arista").
    pub vendor: String,

    /// OS family (e.g. "iosxe", "eos").
    pub os: String,

    /// Hardware model, when the inventory knows it.
    #[serde(default)]
    pub model: Option<String>,

    /// Site identifier, when the inventory knows it.
    #[serde(default)]
    pub site: Option<String>,

    /// Device role, when the inventory knows it.
    #[serde(default)]
    pub role: Option<String>,
}

/// Trait for device directory lookups.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Fetch inventory records for the requested hostnames.
    ///
    /// Implementations return only records matching the request; hostnames
    /// the directory does not know are simply absent from the result.
    async fn fetch_devices(
        &self,
        hostnames: &[String],
    ) -> std::result::Result<Vec<DeviceRecord>, InventoryError>;
}
