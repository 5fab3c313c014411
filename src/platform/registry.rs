//! Global platform registry mapping (vendor, OS family) to platform ids.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::PlatformEntry;

/// Global platform registry, loaded once and never mutated afterwards.
static REGISTRY: Lazy<PlatformRegistry> = Lazy::new(PlatformRegistry::builtin);

/// Registry of (vendor, OS family) to platform identifier mappings.
///
/// Lookups are exact-match on the lower-cased pair. There is no partial or
/// fuzzy matching: an unmapped pair is a classification failure, handled by
/// the caller before any device is contacted.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    entries: HashMap<(String, String), PlatformEntry>,
}

impl PlatformRegistry {
    /// Get the global registry.
    pub fn global() -> &'static PlatformRegistry {
        &REGISTRY
    }

    /// Build the registry with the built-in vendor/OS mappings.
    fn builtin() -> Self {
        let mut registry = PlatformRegistry {
            entries: HashMap::new(),
        };

        registry.insert("cisco", "ios", "cisco_ios", "cisco_ios");
        registry.insert("cisco", "iosxe", "cisco_iosxe", "cisco_ios");
        registry.insert("cisco", "nxos", "cisco_nxos", "cisco_nxos");
        registry.insert("arista", "eos", "arista_eos", "arista_eos");
        registry.insert("juniper", "junos", "juniper_junos", "juniper_junos");
        registry.insert("nokia", "sros", "nokia_sros", "nokia_sros");

        registry
    }

    fn insert(
        &mut self,
        vendor: &str,
        os: &str,
        session_platform: &'static str,
        template_platform: &'static str,
    ) {
        self.entries.insert(
            (vendor.to_string(), os.to_string()),
            PlatformEntry {
                session_platform,
                template_platform,
            },
        );
    }

    /// Look up the platform entry for a (vendor, OS family) pair.
    ///
    /// Returns `None` when no entry matches; the keys are compared after
    /// lower-casing both inputs.
    pub fn classify(&self, vendor: &str, os: &str) -> Option<PlatformEntry> {
        self.entries
            .get(&(vendor.to_lowercase(), os.to_lowercase()))
            .copied()
    }

    /// Check if a (vendor, OS family) pair is registered.
    pub fn contains(&self, vendor: &str, os: &str) -> bool {
        self.classify(vendor, os).is_some()
    }

    /// Iterate all registered (vendor, OS family) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.keys()
    }
}
