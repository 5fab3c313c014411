//! Per-platform session profiles.
//!
//! A profile bundles what the session layer needs to talk to one platform
//! family: the prompt pattern that delimits command output, the commands
//! that disable pagination after login, and the markers the device prints
//! when it rejects a command.

use regex::bytes::Regex;

use crate::error::SessionError;

/// Session behavior for one platform family.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    /// Platform identifier this profile was built for.
    pub platform: String,

    /// Pattern matching the device prompt at the end of output.
    pub prompt_pattern: Regex,

    /// Commands sent right after login (pagination off, width up).
    pub init_commands: Vec<&'static str>,

    /// Output substrings that indicate the device rejected the command.
    pub failed_when_contains: Vec<&'static str>,
}

impl SessionProfile {
    /// Resolve the profile for a session platform identifier.
    ///
    /// Unknown identifiers get a generic shell profile; classification has
    /// already vetted the platform, so this only covers registry entries
    /// without tuned session behavior.
    pub fn for_platform(platform: &str) -> Result<Self, SessionError> {
        match platform {
            "cisco_ios" | "cisco_iosxe" => Self::cisco(platform),
            "cisco_nxos" => Self::nxos(),
            "arista_eos" => Self::arista(),
            "juniper_junos" => Self::juniper(),
            "nokia_sros" => Self::nokia(),
            other => Self::generic(other),
        }
    }

    fn cisco(platform: &str) -> Result<Self, SessionError> {
        Ok(Self {
            platform: platform.to_string(),
            prompt_pattern: Regex::new(r"[\w.@()/:-]+[#>]\s*$")?,
            init_commands: vec!["terminal length 0", "terminal width 511"],
            failed_when_contains: vec![
                "% Invalid input detected",
                "% Incomplete command",
                "% Ambiguous command",
            ],
        })
    }

    fn nxos() -> Result<Self, SessionError> {
        Ok(Self {
            platform: "cisco_nxos".to_string(),
            prompt_pattern: Regex::new(r"[\w.@()/:-]+[#>]\s*$")?,
            init_commands: vec!["terminal length 0"],
            failed_when_contains: vec!["% Invalid command", "% Incomplete command"],
        })
    }

    fn arista() -> Result<Self, SessionError> {
        Ok(Self {
            platform: "arista_eos".to_string(),
            prompt_pattern: Regex::new(r"[\w.@()/:-]+[#>]\s*$")?,
            init_commands: vec!["terminal length 0", "terminal width 32767"],
            failed_when_contains: vec!["% Invalid input", "% Incomplete command"],
        })
    }

    fn juniper() -> Result<Self, SessionError> {
        Ok(Self {
            platform: "juniper_junos".to_string(),
            prompt_pattern: Regex::new(r"[\w.@-]+[%>#]\s*$")?,
            init_commands: vec!["set cli screen-length 0", "set cli screen-width 511"],
            failed_when_contains: vec!["unknown command", "syntax error"],
        })
    }

    fn nokia() -> Result<Self, SessionError> {
        Ok(Self {
            platform: "nokia_sros".to_string(),
            prompt_pattern: Regex::new(r"[AB]:[\w.@-]+[#\$]\s*$")?,
            init_commands: vec!["environment no more"],
            failed_when_contains: vec!["Error: Bad command", "MINOR:", "MAJOR:"],
        })
    }

    fn generic(platform: &str) -> Result<Self, SessionError> {
        Ok(Self {
            platform: platform.to_string(),
            prompt_pattern: Regex::new(r"[$#>]\s*$")?,
            init_commands: vec![],
            failed_when_contains: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_prompt_match() {
        let profile = SessionProfile::for_platform("cisco_iosxe").unwrap();
        assert!(profile.prompt_pattern.is_match(b"router1#"));
        assert!(profile.prompt_pattern.is_match(b"some output\nrouter1> "));
        assert!(!profile.prompt_pattern.is_match(b"mid output line"));
    }

    #[test]
    fn test_juniper_prompt_match() {
        let profile = SessionProfile::for_platform("juniper_junos").unwrap();
        assert!(profile.prompt_pattern.is_match(b"admin@mx1> "));
        assert!(profile.prompt_pattern.is_match(b"admin@mx1% "));
    }

    #[test]
    fn test_unknown_platform_gets_generic_profile() {
        let profile = SessionProfile::for_platform("acme_os").unwrap();
        assert!(profile.init_commands.is_empty());
        assert!(profile.prompt_pattern.is_match(b"$ "));
    }

    #[test]
    fn test_pagination_disabled_on_known_platforms() {
        for platform in ["cisco_ios", "cisco_iosxe", "cisco_nxos", "arista_eos", "juniper_junos"] {
            let profile = SessionProfile::for_platform(platform).unwrap();
            assert!(!profile.init_commands.is_empty(), "{}", platform);
        }
    }
}
