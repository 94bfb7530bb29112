use super::load_wallet;
use crate::output::{print_json, print_table};
use msig_core::types::Identity;
use std::path::Path;

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    let owners = wallet.list_owners();

    if json {
        print_json(&serde_json::json!({
            "owners": owners,
            "threshold": wallet.threshold(),
        }))?;
        return Ok(());
    }

    let rows = owners
        .iter()
        .enumerate()
        .map(|(i, o)| vec![i.to_string(), o.to_string()])
        .collect();
    print_table(&["#", "OWNER"], rows);
    println!();
    println!(
        "Threshold: {} of {}",
        wallet.threshold(),
        wallet.registry().owner_count()
    );
    Ok(())
}

pub fn is_owner(root: &Path, identity: &Identity, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    let owner = wallet.is_owner(identity);

    if json {
        print_json(&serde_json::json!({ "identity": identity, "owner": owner }))?;
    } else {
        println!("{owner}");
    }
    Ok(())
}

pub fn owner_at(root: &Path, position: usize, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    let Some(owner) = wallet.owner_at(position) else {
        anyhow::bail!(
            "no owner at position {position} ({} owners)",
            wallet.registry().owner_count()
        );
    };

    if json {
        print_json(&serde_json::json!({ "position": position, "owner": owner }))?;
    } else {
        println!("{owner}");
    }
    Ok(())
}
