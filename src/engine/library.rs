//! Template library parser engine.
//!
//! A pre-packaged set of TextFSM templates compiled into the binary, keyed
//! by (template platform id, literal command text). Common abbreviated
//! spellings are registered as aliases of the same template.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::{apply_textfsm, EngineContext, EngineOutcome, EngineTag, MissReason, ParseEngine};
use crate::error::Result;

const CISCO_IOS_SHOW_IP_INT_BRIEF: &str =
    include_str!("../../templates/cisco_ios__show_ip_interface_brief.textfsm");
const CISCO_IOS_SHOW_VERSION: &str =
    include_str!("../../templates/cisco_ios__show_version.textfsm");
const ARISTA_EOS_SHOW_IP_INT_BRIEF: &str =
    include_str!("../../templates/arista_eos__show_ip_interface_brief.textfsm");
const ARISTA_EOS_SHOW_VERSION: &str =
    include_str!("../../templates/arista_eos__show_version.textfsm");
const JUNIPER_JUNOS_SHOW_VERSION: &str =
    include_str!("../../templates/juniper_junos__show_version.textfsm");

static LIBRARY: Lazy<HashMap<(&'static str, &'static str), &'static str>> = Lazy::new(|| {
    let mut library = HashMap::new();

    library.insert(
        ("cisco_ios", "show ip interface brief"),
        CISCO_IOS_SHOW_IP_INT_BRIEF,
    );
    library.insert(
        ("cisco_ios", "show ip int brief"),
        CISCO_IOS_SHOW_IP_INT_BRIEF,
    );
    library.insert(("cisco_ios", "show version"), CISCO_IOS_SHOW_VERSION);

    library.insert(
        ("cisco_nxos", "show ip interface brief"),
        CISCO_IOS_SHOW_IP_INT_BRIEF,
    );
    library.insert(
        ("cisco_nxos", "show ip int brief"),
        CISCO_IOS_SHOW_IP_INT_BRIEF,
    );

    library.insert(
        ("arista_eos", "show ip interface brief"),
        ARISTA_EOS_SHOW_IP_INT_BRIEF,
    );
    library.insert(
        ("arista_eos", "show ip int brief"),
        ARISTA_EOS_SHOW_IP_INT_BRIEF,
    );
    library.insert(("arista_eos", "show version"), ARISTA_EOS_SHOW_VERSION);

    library.insert(("juniper_junos", "show version"), JUNIPER_JUNOS_SHOW_VERSION);

    library
});

/// Look up a library template by (template platform id, literal command).
pub fn lookup(template_platform: &str, command: &str) -> Option<&'static str> {
    LIBRARY.get(&(template_platform, command)).copied()
}

/// Engine backed by the built-in template library.
pub struct TemplateLibrary;

#[async_trait]
impl ParseEngine for TemplateLibrary {
    fn tag(&self) -> EngineTag {
        EngineTag::TemplateLibrary
    }

    async fn attempt(&self, ctx: &mut EngineContext<'_>) -> Result<EngineOutcome> {
        let platform = ctx.device().platform.template_platform;
        let Some(source) = lookup(platform, ctx.command()) else {
            return Ok(EngineOutcome::Miss(MissReason::NoSchema));
        };

        let raw = ctx.raw_output().await?.to_string();
        match apply_textfsm(source, &raw) {
            Ok(rows) if rows.is_empty() => Ok(EngineOutcome::Miss(MissReason::Empty)),
            Ok(rows) => Ok(EngineOutcome::Rows(rows)),
            Err(message) => Ok(EngineOutcome::Miss(MissReason::Error(message))),
        }
    }
}
