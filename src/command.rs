//! Command text normalization.
//!
//! The normalized form of a command doubles as the output table name and as
//! the basename component of custom template lookups, so it must be stable
//! for any given input.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").unwrap());

/// Normalize a command string into a canonical identifier.
///
/// Lower-cases the text, trims it, collapses whitespace runs to a single
/// underscore, collapses runs of non-word characters to a single underscore,
/// then strips leading and trailing underscores.
///
/// # Example
///
/// ```rust
/// use netsift::command::normalize_command;
///
/// assert_eq!(normalize_command("show ip int brief"), "show_ip_int_brief");
/// assert_eq!(normalize_command("  Show IP BGP Summary! "), "show_ip_bgp_summary");
/// ```
pub fn normalize_command(command: &str) -> String {
    let lowered = command.trim().to_lowercase();
    let collapsed = WHITESPACE_RUN.replace_all(&lowered, "_");
    let worded = NON_WORD_RUN.replace_all(&collapsed, "_");
    worded.trim_matches('_').to_string()
}
