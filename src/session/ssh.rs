//! SSH-backed device session using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{load_secret_key, PrivateKeyWithHashAlg, PublicKey};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::buffer::PatternBuffer;
use super::config::{AuthMethod, HostKeyVerification, SessionConfig};
use super::profile::SessionProfile;
use super::DeviceSession;
use crate::error::{Result, SessionError};

/// SSH session to one device.
///
/// Opens a PTY + shell channel on connect, runs the platform profile's
/// init commands, and delimits command output by the profile's prompt
/// pattern. There is no integrated structured parser on a raw SSH
/// session, so `structured_parse` keeps its `Ok(None)` default.
pub struct SshSession {
    config: SessionConfig,
    session_platform: String,
    connection: Option<Connection>,
}

struct Connection {
    handle: Handle<SshHandler>,
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    profile: SessionProfile,
}

impl SshSession {
    /// Create an unconnected session for one device.
    pub fn new(config: SessionConfig, session_platform: String) -> Self {
        Self {
            config,
            session_platform,
            connection: None,
        }
    }

    /// Authenticate with the server.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &SessionConfig,
    ) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::None => session
                .authenticate_none(&config.username)
                .await
                .map_err(SessionError::Ssh)?
                .success(),
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(SessionError::Ssh)?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| SessionError::Key(e.to_string()))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(SessionError::Ssh)?
                    .flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(SessionError::Ssh)?
                    .success()
            }
        };

        if !success {
            return Err(SessionError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Read channel data into the buffer until the prompt matches the tail.
    async fn read_until_prompt(conn: &mut Connection, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            if conn.buffer.tail_contains(&conn.profile.prompt_pattern) {
                return Ok(());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SessionError::Timeout(timeout).into());
            }

            let msg = tokio::time::timeout(remaining, conn.channel.wait())
                .await
                .map_err(|_| SessionError::Timeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => conn.buffer.extend(data),
                Some(ChannelMsg::ExtendedData { ref data, .. }) => conn.buffer.extend(data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(SessionError::ChannelClosed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Strip the command echo and the trailing prompt line from raw output.
    fn normalize_output(raw: &str, command: &str) -> String {
        let output = raw
            .strip_prefix(command)
            .unwrap_or(raw)
            .trim_start_matches(['\r', '\n']);

        match output.rfind('\n') {
            Some(pos) => output[..pos].trim_end_matches('\r').to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn connect(&mut self) -> Result<()> {
        let config = &self.config;
        let profile = SessionProfile::for_platform(&self.session_platform)?;

        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<SessionError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| SessionError::Timeout(config.timeout))?
        .map_err(|e| {
            // Surface the detailed host-key error stored by
            // check_server_key instead of russh's generic UnknownKey.
            match host_key_error.lock() {
                Ok(mut guard) => guard.take().unwrap_or(SessionError::Ssh(e)),
                Err(_) => SessionError::Ssh(e),
            }
        })?;

        Self::authenticate(&mut session, config).await?;

        let channel = session
            .channel_open_session()
            .await
            .map_err(SessionError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(SessionError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(SessionError::Ssh)?;

        let mut conn = Connection {
            handle: session,
            channel,
            buffer: PatternBuffer::default(),
            profile,
        };

        // Drain the login banner up to the first prompt.
        Self::read_until_prompt(&mut conn, config.timeout).await?;
        conn.buffer.clear();

        let init_commands = conn.profile.init_commands.clone();
        self.connection = Some(conn);

        for command in init_commands {
            debug!("{}: init '{}'", self.config.host, command);
            self.execute(command).await?;
        }

        Ok(())
    }

    async fn execute(&mut self, command: &str) -> Result<String> {
        let timeout = self.config.timeout;
        let conn = self.connection.as_mut().ok_or(SessionError::NotConnected)?;

        conn.buffer.clear();

        let line = format!("{}\n", command);
        conn.channel
            .data(line.as_bytes())
            .await
            .map_err(SessionError::Ssh)?;

        Self::read_until_prompt(conn, timeout).await?;

        let raw = String::from_utf8_lossy(&conn.buffer.take()).to_string();
        let result = Self::normalize_output(&raw, command);

        for marker in &conn.profile.failed_when_contains {
            if result.contains(marker) {
                return Err(SessionError::CommandFailed {
                    command: command.to_string(),
                    marker: marker.to_string(),
                }
                .into());
            }
        }

        Ok(result)
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(conn) = self.connection.take() {
            if let Err(e) = conn.channel.eof().await {
                warn!("{}: channel eof failed: {}", self.config.host, e);
            }
            conn.handle
                .disconnect(russh::Disconnect::ByApplication, "", "en")
                .await
                .map_err(SessionError::Ssh)?;
        }
        Ok(())
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key error so connect() can surface it
    /// instead of the generic russh::Error::UnknownKey.
    host_key_error: Arc<Mutex<Option<SessionError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(SessionError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, SessionError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(SessionError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(SessionError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), SessionError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };

        result.map_err(|e| SessionError::KnownHosts(e.to_string()))
    }

    fn store_error(&self, error: SessionError) {
        if let Ok(mut guard) = self.host_key_error.lock() {
            *guard = Some(error);
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    Ok(true)
                }
                Err(e) => {
                    self.store_error(e);
                    Ok(false)
                }
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    self.store_error(SessionError::HostKeyUnknown {
                        host: self.host.clone(),
                        port: self.port,
                    });
                    Ok(false)
                }
                Err(e) => {
                    self.store_error(e);
                    Ok(false)
                }
            },
        }
    }
}
