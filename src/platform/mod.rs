//! Platform identity resolution for multi-vendor support.
//!
//! A device's (vendor, OS family) pair resolves to two identifiers: one
//! selecting its session profile and one selecting its command-output
//! templates. The mapping is a static table loaded once at process start.

mod registry;

pub use registry::PlatformRegistry;

/// Platform identifiers resolved for one (vendor, OS family) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformEntry {
    /// Identifier selecting the session/transport profile
    /// (e.g. "cisco_iosxe").
    pub session_platform: &'static str,

    /// Identifier selecting command-output templates (e.g. "cisco_ios").
    pub template_platform: &'static str,
}
