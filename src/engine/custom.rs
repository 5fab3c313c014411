//! Custom template parser engine.
//!
//! Resolves a template file at
//! `{templates_dir}/{template_platform}__{normalized_command}.textfsm`.
//! An unconfigured directory or a missing file is a skip, not a miss: the
//! engine is simply absent for that (device, command) pair.

use std::fs;

use async_trait::async_trait;

use super::{apply_textfsm, EngineContext, EngineOutcome, EngineTag, MissReason, ParseEngine};
use crate::command::normalize_command;
use crate::error::Result;

/// Engine backed by user-supplied template files.
pub struct CustomTemplate;

/// Template file basename for a (template platform id, command) pair.
pub fn template_filename(template_platform: &str, command: &str) -> String {
    format!("{}__{}.textfsm", template_platform, normalize_command(command))
}

#[async_trait]
impl ParseEngine for CustomTemplate {
    fn tag(&self) -> EngineTag {
        EngineTag::CustomTemplate
    }

    async fn attempt(&self, ctx: &mut EngineContext<'_>) -> Result<EngineOutcome> {
        let Some(dir) = ctx.templates_dir() else {
            return Ok(EngineOutcome::Skipped);
        };

        let path = dir.join(template_filename(
            ctx.device().platform.template_platform,
            ctx.command(),
        ));
        if !path.exists() {
            return Ok(EngineOutcome::Skipped);
        }

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => return Ok(EngineOutcome::Miss(MissReason::Error(e.to_string()))),
        };

        let raw = ctx.raw_output().await?.to_string();
        match apply_textfsm(&source, &raw) {
            Ok(rows) if rows.is_empty() => Ok(EngineOutcome::Miss(MissReason::Empty)),
            Ok(rows) => Ok(EngineOutcome::Rows(rows)),
            Err(message) => Ok(EngineOutcome::Miss(MissReason::Error(message))),
        }
    }
}
