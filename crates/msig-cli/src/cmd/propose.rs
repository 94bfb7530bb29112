use super::mutate;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use msig_core::{governance::GovernanceCall, types::Identity};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProposeSubcommand {
    /// Propose adding an owner
    AddOwner { owner: String },
    /// Propose removing an owner
    RemoveOwner { owner: String },
    /// Propose a new approval threshold
    SetThreshold { threshold: u32 },
}

pub fn run(
    root: &Path,
    caller: &Identity,
    subcmd: ProposeSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let call = match subcmd {
        ProposeSubcommand::AddOwner { owner } => GovernanceCall::AddOwner {
            owner: Identity::new(&owner).with_context(|| format!("invalid owner '{owner}'"))?,
        },
        ProposeSubcommand::RemoveOwner { owner } => GovernanceCall::RemoveOwner {
            owner: Identity::new(&owner).with_context(|| format!("invalid owner '{owner}'"))?,
        },
        ProposeSubcommand::SetThreshold { threshold } => GovernanceCall::SetThreshold { threshold },
    };

    let index = mutate(root, |w| w.propose(caller, &call))
        .with_context(|| format!("failed to propose {call}"))?;

    if json {
        print_json(&serde_json::json!({
            "index": index,
            "call": call,
        }))?;
    } else {
        println!("Proposed [{index}]: {call}");
    }
    Ok(())
}
