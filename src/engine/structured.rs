//! Structured model parser engine.
//!
//! Delegates to the device session's optional integrated structured parse.
//! Any internal parser error or "no schema" condition is a miss, never an
//! error: the session may not support structured parsing at all, and the
//! chain has lower-confidence engines to fall back to.

use async_trait::async_trait;

use super::{EngineContext, EngineOutcome, EngineTag, MissReason, ParseEngine};
use crate::error::Result;
use crate::rows::reshape_parsed;

/// Engine backed by the session's integrated structured parser.
pub struct StructuredModel;

#[async_trait]
impl ParseEngine for StructuredModel {
    fn tag(&self) -> EngineTag {
        EngineTag::Structured
    }

    async fn attempt(&self, ctx: &mut EngineContext<'_>) -> Result<EngineOutcome> {
        let parsed = match ctx.structured_parse().await {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Ok(EngineOutcome::Miss(MissReason::NoSchema)),
            Err(e) => return Ok(EngineOutcome::Miss(MissReason::Error(e.to_string()))),
        };

        match reshape_parsed(&parsed) {
            Some(rows) if rows.is_empty() => Ok(EngineOutcome::Miss(MissReason::Empty)),
            Some(rows) => Ok(EngineOutcome::Rows(rows)),
            None => Ok(EngineOutcome::Miss(MissReason::NoSchema)),
        }
    }
}
