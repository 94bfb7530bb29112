use crate::output::print_json;
use anyhow::Context;
use msig_core::{config, config::Config, paths, types::Identity, wallet::Wallet};
use std::path::Path;

pub fn run(root: &Path, creator: Identity, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let wallet = Wallet::init(root, creator.clone()).context("failed to initialize wallet")?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| config::default_wallet_name(&creator));
        Config::new(name).save(root).context("failed to write config")?;
    }

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "owners": wallet.list_owners(),
            "threshold": wallet.threshold(),
        }))?;
    } else {
        println!("Initialized wallet at {}", paths::msig_dir(root).display());
        println!("Owner: {creator} (threshold 1)");
    }
    Ok(())
}
