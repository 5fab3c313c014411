//! Device sessions.
//!
//! A session owns the connection to one device: open it, execute commands
//! as raw text, optionally offer an integrated structured parse, and close
//! it. Each device gets its own scoped session for the duration of its
//! commands; the collector guarantees release on every exit path.

mod buffer;
mod config;
mod profile;
mod ssh;

pub use buffer::PatternBuffer;
pub use config::{AuthMethod, HostKeyVerification, SessionConfig};
pub use profile::SessionProfile;
pub use ssh::SshSession;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::device::ClassifiedDevice;
use crate::error::{Result, SessionError};

/// Trait for device sessions.
#[async_trait]
pub trait DeviceSession: Send {
    /// Open the connection to the device.
    async fn connect(&mut self) -> Result<()>;

    /// Execute a command and return its raw text output.
    async fn execute(&mut self, command: &str) -> Result<String>;

    /// Attempt an integrated structured parse of the command.
    ///
    /// `Ok(None)` means the session has no schema for this command (or no
    /// structured parser at all); `Err` means its parser failed internally.
    /// Both are treated as engine misses upstream, never as run failures.
    async fn structured_parse(
        &mut self,
        _command: &str,
    ) -> std::result::Result<Option<Value>, SessionError> {
        Ok(None)
    }

    /// Close the connection.
    async fn disconnect(&mut self) -> Result<()>;
}

/// Produces one session per device.
///
/// The factory seam keeps the collector independent of the transport, so
/// tests can substitute scripted sessions.
pub trait SessionFactory: Send + Sync {
    /// Build an unconnected session for the device.
    fn create(&self, device: &ClassifiedDevice) -> Box<dyn DeviceSession>;
}

/// Factory for SSH-backed device sessions.
pub struct SshSessionFactory {
    username: String,
    auth: AuthMethod,
    port: u16,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl SshSessionFactory {
    /// Create a factory with shared credentials for every device.
    pub fn new(username: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            username: username.into(),
            auth,
            port: 22,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection and per-command timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Set the known_hosts file path.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}

impl SessionFactory for SshSessionFactory {
    fn create(&self, device: &ClassifiedDevice) -> Box<dyn DeviceSession> {
        let mut config = SessionConfig::new(
            device.mgmt_ip.clone(),
            self.username.clone(),
            self.auth.clone(),
        );
        config.port = self.port;
        config.timeout = self.timeout;
        config.host_key_verification = self.host_key_verification.clone();
        config.known_hosts_path = self.known_hosts_path.clone();

        Box::new(SshSession::new(
            config,
            device.platform.session_platform.to_string(),
        ))
    }
}
