//! # Netsift
//!
//! Run commands across heterogeneous network devices and sift the output
//! into normalized CSV tables.
//!
//! Netsift resolves a hostname list against a device inventory, classifies
//! each device's (vendor, OS family) pair into platform identifiers, opens
//! one SSH session per device, and runs each command through a cascade of
//! parsing strategies - the session's integrated structured parser, a
//! built-in template library, user-supplied TextFSM templates, and finally
//! a whitespace tokenizer that always succeeds. Rows are normalized,
//! stamped with device and run metadata plus the parsing engine that
//! produced them, aggregated per command across all devices, and exported
//! as one deterministic CSV table per command.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netsift::{
//!     classify_devices, collect_tables, export_tables, AuthMethod, DeviceDirectory,
//!     EngineChain, HttpInventory, SshSessionFactory,
//! };
//! use secrecy::SecretString;
//!
//! # async fn example() -> Result<(), netsift::Error> {
//! let hostnames = vec!["r1".to_string(), "r2".to_string()];
//! let commands = vec!["show ip interface brief".to_string()];
//!
//! let inventory = HttpInventory::new(
//!     "https://inventory.example.com/api",
//!     SecretString::from("token".to_string()),
//! );
//! let records = inventory.fetch_devices(&hostnames).await?;
//! let devices = classify_devices(records)?;
//!
//! let factory = SshSessionFactory::new(
//!     "admin",
//!     AuthMethod::Password(SecretString::from("secret".to_string())),
//! );
//!
//! let chain = EngineChain::standard();
//! let tables = collect_tables(&factory, &devices, &commands, &chain, None).await;
//! export_tables(&tables, "output".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod collect;
pub mod command;
pub mod device;
pub mod engine;
pub mod error;
pub mod export;
pub mod inventory;
pub mod platform;
pub mod rows;
pub mod session;

// Re-export main types for convenience
pub use aggregate::{CommandAggregator, RunBatch};
pub use collect::collect_tables;
pub use command::normalize_command;
pub use device::{classify_devices, ClassifiedDevice};
pub use engine::{EngineChain, EngineContext, EngineOutcome, EngineTag, ParseEngine, ParseResult};
pub use error::Error;
pub use export::export_tables;
pub use inventory::{DeviceDirectory, DeviceRecord, HttpInventory};
pub use platform::{PlatformEntry, PlatformRegistry};
pub use session::{
    AuthMethod, DeviceSession, HostKeyVerification, SessionConfig, SessionFactory, SshSession,
    SshSessionFactory,
};
