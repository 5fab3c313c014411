//! Error types for netsift.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netsift operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Device classification errors
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Inventory lookup errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Device session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Parse engine chain errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Table export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Classification errors (vendor/OS to platform resolution).
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// No platform registry entry for a device's (vendor, OS) pair.
    ///
    /// Fatal for the whole batch: classification runs before any session
    /// is opened, so no device is contacted when this fires.
    #[error("Unknown platform for '{hostname}': vendor={vendor}, os={os}")]
    UnknownPlatform {
        hostname: String,
        vendor: String,
        os: String,
    },
}

/// Inventory service errors (device directory lookups).
#[derive(Error, Debug)]
pub enum InventoryError {
    /// HTTP transport or status error from the inventory service
    #[error("Inventory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Malformed inventory response: {message}")]
    Malformed { message: String },
}

/// Session layer errors (SSH connection, authentication, command execution).
#[derive(Error, Debug)]
pub enum SessionError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key changed since it was learned
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host key unknown under strict verification
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts file error
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Session used before connect() or after disconnect()
    #[error("Session not connected - call connect() first")]
    NotConnected,

    /// The remote side closed the channel mid-read
    #[error("Channel closed")]
    ChannelClosed,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Device reported a command error (platform failure marker matched)
    #[error("Command '{command}' failed: {marker}")]
    CommandFailed { command: String, marker: String },

    /// Invalid prompt pattern in a session profile
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Integrated structured parser failed internally
    #[error("Structured parse failed: {0}")]
    StructuredParse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parse engine chain errors.
///
/// Engine misses are not errors - they are swallowed by the chain and only
/// surface through the `parse_engine` provenance column. This type exists
/// for chain misconfiguration, which the standard chain cannot hit.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Every engine missed and no terminal engine accepted the output
    #[error("No parse engine produced a result for '{command}'")]
    Exhausted { command: String },
}

/// Export errors (finalizing per-command tables). Fatal for the run;
/// tables already written are left in place.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Directory creation or file write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using netsift's Error.
pub type Result<T> = std::result::Result<T, Error>;
