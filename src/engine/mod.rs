//! Parse engine cascade.
//!
//! For each (device, command) pair an ordered list of strategies is tried
//! until one yields usable rows: the session's integrated structured parser,
//! the built-in template library, an optional custom template directory, and
//! finally a whitespace tokenizer that always succeeds. Engine failures are
//! misses, never errors; only session-level failures propagate.

mod custom;
mod library;
mod structured;
mod tokens;

pub use custom::CustomTemplate;
pub use library::TemplateLibrary;
pub use structured::StructuredModel;
pub use tokens::GenericTokens;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;
use textfsm_rust::Template;

use crate::device::ClassifiedDevice;
use crate::error::{ParseError, Result};
use crate::rows::Row;
use crate::session::DeviceSession;

/// Provenance label recording which engine produced a result's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTag {
    /// Session-integrated structured model parser.
    Structured,
    /// Pre-packaged, vendor-keyed template library.
    TemplateLibrary,
    /// User-supplied template file from the configured directory.
    CustomTemplate,
    /// Terminal whitespace tokenizer.
    GenericTokens,
}

impl EngineTag {
    /// Stable string form, used as the `parse_engine` column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineTag::Structured => "structured",
            EngineTag::TemplateLibrary => "templateLibrary",
            EngineTag::CustomTemplate => "customTemplate",
            EngineTag::GenericTokens => "genericTokens",
        }
    }
}

impl fmt::Display for EngineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an engine did not produce rows.
///
/// Distinguishing "nothing applies" from "something broke" keeps the
/// fallback semantics observable without surfacing engine internals to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No schema, definition, or template applies to this (platform,
    /// command) pair.
    NoSchema,
    /// A definition applied but matched zero rows.
    Empty,
    /// The engine failed internally (malformed template, parser error).
    Error(String),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::NoSchema => f.write_str("no applicable schema"),
            MissReason::Empty => f.write_str("matched zero rows"),
            MissReason::Error(message) => write!(f, "engine error: {}", message),
        }
    }
}

/// Outcome of one engine attempt.
#[derive(Debug)]
pub enum EngineOutcome {
    /// The engine produced rows. Only the terminal engine may return an
    /// empty sequence and still be accepted.
    Rows(Vec<Row>),
    /// The engine does not apply or failed internally; the chain advances.
    Miss(MissReason),
    /// The engine is not configured for this run (e.g. no template
    /// directory); not logged as a miss.
    Skipped,
}

/// Rows plus the provenance tag of the engine that produced them.
///
/// Produced exactly once per (device, command) pair.
#[derive(Debug)]
pub struct ParseResult {
    pub tag: EngineTag,
    pub rows: Vec<Row>,
}

/// Per-(device, command) context shared by the engines in a chain.
///
/// Raw command output is fetched lazily and exactly once: the first engine
/// that needs it triggers `execute`, later engines reuse the cached text.
pub struct EngineContext<'a> {
    session: &'a mut dyn DeviceSession,
    device: &'a ClassifiedDevice,
    command: &'a str,
    templates_dir: Option<&'a Path>,
    raw: Option<String>,
}

impl<'a> EngineContext<'a> {
    /// Build a context for one (device, command) pair.
    pub fn new(
        session: &'a mut dyn DeviceSession,
        device: &'a ClassifiedDevice,
        command: &'a str,
        templates_dir: Option<&'a Path>,
    ) -> Self {
        Self {
            session,
            device,
            command,
            templates_dir,
            raw: None,
        }
    }

    /// The device being processed.
    pub fn device(&self) -> &ClassifiedDevice {
        self.device
    }

    /// The literal command text.
    pub fn command(&self) -> &str {
        self.command
    }

    /// The configured custom template directory, if any.
    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates_dir
    }

    /// Raw command output, executing the command on first use.
    pub async fn raw_output(&mut self) -> Result<&str> {
        if self.raw.is_none() {
            let text = self.session.execute(self.command).await?;
            self.raw = Some(text);
        }
        Ok(self.raw.as_deref().unwrap_or_default())
    }

    /// Ask the session for its integrated structured parse of the command.
    pub async fn structured_parse(
        &mut self,
    ) -> std::result::Result<Option<Value>, crate::error::SessionError> {
        self.session.structured_parse(self.command).await
    }
}

/// One strategy in the parse cascade.
#[async_trait]
pub trait ParseEngine: Send + Sync {
    /// The provenance tag stamped on rows this engine produces.
    fn tag(&self) -> EngineTag;

    /// Attempt to parse the command's output.
    ///
    /// Engine-internal failures are reported as [`EngineOutcome::Miss`];
    /// only session failures (connection loss, command rejection) may
    /// return `Err`.
    async fn attempt(&self, ctx: &mut EngineContext<'_>) -> Result<EngineOutcome>;
}

/// Ordered parse strategies for one (device, command) pair.
///
/// The chain stops at the first engine returning one or more rows. The last
/// engine is terminal: its row sequence is accepted even when empty, which
/// guarantees the chain always produces a result for reachable devices.
pub struct EngineChain {
    engines: Vec<Box<dyn ParseEngine>>,
}

impl EngineChain {
    /// Build a chain from an explicit engine list.
    pub fn new(engines: Vec<Box<dyn ParseEngine>>) -> Self {
        Self { engines }
    }

    /// The standard cascade: structured model, template library, custom
    /// template, generic tokenizer.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(StructuredModel),
            Box::new(TemplateLibrary),
            Box::new(CustomTemplate),
            Box::new(GenericTokens),
        ])
    }

    /// Run the cascade for the context's (device, command) pair.
    pub async fn run(&self, ctx: &mut EngineContext<'_>) -> Result<ParseResult> {
        let total = self.engines.len();
        for (index, engine) in self.engines.iter().enumerate() {
            let terminal = index + 1 == total;
            match engine.attempt(ctx).await? {
                EngineOutcome::Rows(rows) if !rows.is_empty() || terminal => {
                    debug!(
                        "{}: '{}' parsed by {} ({} rows)",
                        ctx.device().hostname,
                        ctx.command(),
                        engine.tag(),
                        rows.len()
                    );
                    return Ok(ParseResult {
                        tag: engine.tag(),
                        rows,
                    });
                }
                EngineOutcome::Rows(_) => {
                    debug!(
                        "{}: '{}' {} miss: {}",
                        ctx.device().hostname,
                        ctx.command(),
                        engine.tag(),
                        MissReason::Empty
                    );
                }
                EngineOutcome::Miss(reason) => {
                    debug!(
                        "{}: '{}' {} miss: {}",
                        ctx.device().hostname,
                        ctx.command(),
                        engine.tag(),
                        reason
                    );
                }
                EngineOutcome::Skipped => {
                    trace!(
                        "{}: '{}' {} skipped",
                        ctx.device().hostname,
                        ctx.command(),
                        engine.tag()
                    );
                }
            }
        }

        // Unreachable with the standard chain - the tokenizer is terminal
        // and never misses.
        Err(ParseError::Exhausted {
            command: ctx.command().to_string(),
        }
        .into())
    }
}

/// Apply a TextFSM template to raw output, lower-casing the header fields.
///
/// Shared by the library and custom-template engines; errors are returned
/// as strings so callers can fold them into a [`MissReason`].
pub(crate) fn apply_textfsm(
    source: &str,
    raw: &str,
) -> std::result::Result<Vec<Row>, String> {
    let template = Template::parse_str(source).map_err(|e| e.to_string())?;
    let mut parser = template.parser();
    let records: Vec<HashMap<String, String>> =
        parser.parse_text_to_dicts(raw).map_err(|e| e.to_string())?;

    let rows = records
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .map(|(field, value)| (field.to_lowercase(), Value::String(value)))
                .collect()
        })
        .collect();

    Ok(rows)
}
