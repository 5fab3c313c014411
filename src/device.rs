//! Device classification.
//!
//! Joins inventory records with the platform registry. Classification is
//! all-or-nothing for a batch: one unmapped (vendor, OS) pair fails the run
//! before any session is opened.

use crate::error::ClassifyError;
use crate::inventory::DeviceRecord;
use crate::platform::{PlatformEntry, PlatformRegistry};

/// A device with its platform identity resolved.
///
/// Created once per run from the inventory record and the platform
/// registry; immutable thereafter.
#[derive(Debug, Clone)]
pub struct ClassifiedDevice {
    /// Device hostname, unique within a run.
    pub hostname: String,

    /// Management address used to reach the device.
    pub mgmt_ip: String,

    /// Vendor name as reported by the inventory.
    pub vendor: String,

    /// OS family as reported by the inventory.
    pub os: String,

    /// Hardware model, if known.
    pub model: Option<String>,

    /// Site identifier, if known.
    pub site: Option<String>,

    /// Device role, if known.
    pub role: Option<String>,

    /// Resolved session and template platform identifiers.
    pub platform: PlatformEntry,
}

/// Classify a batch of inventory records against the platform registry.
///
/// Fails atomically: if any record's (vendor, OS) pair has no registry
/// entry, the whole batch is rejected and no device is classified.
pub fn classify_devices(
    records: Vec<DeviceRecord>,
) -> std::result::Result<Vec<ClassifiedDevice>, ClassifyError> {
    records
        .into_iter()
        .map(|record| {
            let platform = PlatformRegistry::global()
                .classify(&record.vendor, &record.os)
                .ok_or_else(|| ClassifyError::UnknownPlatform {
                    hostname: record.hostname.clone(),
                    vendor: record.vendor.clone(),
                    os: record.os.clone(),
                })?;

            Ok(ClassifiedDevice {
                hostname: record.hostname,
                mgmt_ip: record.mgmt_ip,
                vendor: record.vendor,
                os: record.os,
                model: record.model,
                site: record.site,
                role: record.role,
                platform,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hostname: &str, vendor: &str, os: &str) -> DeviceRecord {
        DeviceRecord {
            hostname: hostname.to_string(),
            mgmt_ip: "10.0.0.1".to_string(),
            vendor: vendor.to_string(),
            os: os.to_string(),
            model: None,
            site: None,
            role: None,
        }
    }

    #[test]
    fn test_classify_known_devices() {
        let classified = classify_devices(vec![
            record("R1", "cisco", "iosxe"),
            record("R2", "arista", "eos"),
        ])
        .unwrap();

        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].platform.session_platform, "cisco_iosxe");
        assert_eq!(classified[0].platform.template_platform, "cisco_ios");
        assert_eq!(classified[1].platform.template_platform, "arista_eos");
    }

    #[test]
    fn test_one_unknown_fails_the_batch() {
        let result = classify_devices(vec![
            record("R1", "cisco", "iosxe"),
            record("R2", "acme", "routeros"),
            record("R3", "arista", "eos"),
        ]);

        match result {
            Err(ClassifyError::UnknownPlatform { hostname, vendor, os }) => {
                assert_eq!(hostname, "R2");
                assert_eq!(vendor, "acme");
                assert_eq!(os, "routeros");
            }
            other => panic!("expected UnknownPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let classified = classify_devices(vec![record("R1", "Cisco", "IOSXE")]).unwrap();
        assert_eq!(classified[0].platform.session_platform, "cisco_iosxe");
    }
}
