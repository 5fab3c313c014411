//! Generic whitespace tokenizer, the terminal engine.
//!
//! Splits raw output into non-blank lines and each line on whitespace,
//! emitting positional `col1..colN` fields. Semantic structure is lost, but
//! the chain is guaranteed to terminate with *a* result for every command.

use async_trait::async_trait;
use serde_json::Value;

use super::{EngineContext, EngineOutcome, EngineTag, ParseEngine};
use crate::error::Result;
use crate::rows::Row;

/// Terminal engine emitting one row per non-blank line.
pub struct GenericTokens;

#[async_trait]
impl ParseEngine for GenericTokens {
    fn tag(&self) -> EngineTag {
        EngineTag::GenericTokens
    }

    async fn attempt(&self, ctx: &mut EngineContext<'_>) -> Result<EngineOutcome> {
        let raw = ctx.raw_output().await?;

        let mut rows = Vec::new();
        for line in raw.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let row: Row = line
                .split_whitespace()
                .enumerate()
                .map(|(index, token)| {
                    (format!("col{}", index + 1), Value::String(token.to_string()))
                })
                .collect();
            rows.push(row);
        }

        // Blank raw text yields zero rows; as the terminal engine this is
        // still a success.
        Ok(EngineOutcome::Rows(rows))
    }
}
