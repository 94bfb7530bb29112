use super::{load_wallet, mutate, Session};
use crate::dispatch::OutboxDispatcher;
use crate::output::{print_json, print_table};
use anyhow::Context;
use msig_core::{
    action::Action,
    config::Config,
    types::{ActionIndex, Identity, Payload, Target},
};
use std::path::Path;

pub fn submit(
    root: &Path,
    caller: &Identity,
    target: &str,
    amount: u64,
    payload: &str,
    json: bool,
) -> anyhow::Result<()> {
    let target: Target = target
        .parse()
        .with_context(|| format!("invalid target '{target}'"))?;
    let payload: Payload = payload.parse().context("invalid payload")?;

    let index = mutate(root, |w| w.submit(caller, target.clone(), amount, payload.clone()))
        .context("failed to submit action")?;

    if json {
        print_json(&serde_json::json!({
            "index": index,
            "proposer": caller,
            "target": target,
            "amount": amount,
            "payload": payload,
        }))?;
    } else {
        println!("Submitted [{index}]: {target} amount={amount} payload={payload}");
    }
    Ok(())
}

pub fn confirm(root: &Path, caller: &Identity, index: ActionIndex, json: bool) -> anyhow::Result<()> {
    let count = mutate(root, |w| {
        w.confirm(caller, index)?;
        Ok(w.action(index)?.confirmation_count())
    })
    .with_context(|| format!("failed to confirm action {index}"))?;

    if json {
        print_json(&serde_json::json!({
            "index": index,
            "caller": caller,
            "confirmations": count,
        }))?;
    } else {
        println!("Confirmed [{index}] ({count} confirmation(s))");
    }
    Ok(())
}

pub fn revoke(root: &Path, caller: &Identity, index: ActionIndex, json: bool) -> anyhow::Result<()> {
    let count = mutate(root, |w| {
        w.revoke(caller, index)?;
        Ok(w.action(index)?.confirmation_count())
    })
    .with_context(|| format!("failed to revoke confirmation on action {index}"))?;

    if json {
        print_json(&serde_json::json!({
            "index": index,
            "caller": caller,
            "confirmations": count,
        }))?;
    } else {
        println!("Revoked confirmation on [{index}] ({count} remaining)");
    }
    Ok(())
}

pub fn execute(root: &Path, caller: &Identity, index: ActionIndex, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut dispatcher =
        OutboxDispatcher::new(root, config.dispatch).context("cannot dispatch")?;

    let mut session = Session::open(root)?;
    let result = session.wallet.execute(caller, index, &mut dispatcher);
    session.commit()?;
    // Flush only once the executed flag is on disk.
    let dispatched = dispatcher
        .flush()
        .with_context(|| format!("action {index} is executed but its call was not written"))?;
    result.with_context(|| format!("failed to execute action {index}"))?;

    if json {
        print_json(&serde_json::json!({
            "index": index,
            "caller": caller,
            "executed": true,
            "dispatched": dispatched,
        }))?;
    } else {
        println!("Executed [{index}]");
    }
    Ok(())
}

pub fn show(root: &Path, index: ActionIndex, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    let action = wallet
        .get_action(index)
        .context("failed to read action")?;
    let threshold = wallet.threshold();

    if json {
        print_json(&serde_json::json!({
            "action": action,
            "status": action.status(),
            "confirmations": action.confirmation_count(),
            "threshold": threshold,
        }))?;
        return Ok(());
    }

    println!("Action [{}]", action.index);
    println!("  status:        {}", action.status());
    println!("  proposer:      {}", action.proposer);
    println!("  target:        {}", action.target);
    println!("  amount:        {}", action.amount);
    println!("  payload:       {}", action.payload);
    if let Some(call) = action.governance_call() {
        println!("  governance:    {call}");
    }
    println!("  submitted:     {}", action.submitted_at.to_rfc3339());
    println!(
        "  confirmations: {}/{} [{}]",
        action.confirmation_count(),
        threshold,
        action
            .confirmed_by
            .iter()
            .map(|o| o.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(msig_core::action::Outcome::Failed { reason }) = &action.outcome {
        println!("  failure:       {reason}");
    }
    Ok(())
}

pub fn list(root: &Path, pending_only: bool, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    let actions: Vec<&Action> = if pending_only {
        wallet.pending().collect()
    } else {
        wallet.actions().iter().collect()
    };

    if json {
        print_json(&actions)?;
        return Ok(());
    }

    if actions.is_empty() {
        println!("No actions.");
        return Ok(());
    }

    let threshold = wallet.threshold();
    let rows = actions
        .iter()
        .map(|a| {
            let what = a
                .governance_call()
                .map(|c| c.to_string())
                .unwrap_or_else(|| format!("{} amount={}", a.target, a.amount));
            vec![
                a.index.to_string(),
                a.status().to_string(),
                format!("{}/{}", a.confirmation_count(), threshold),
                a.proposer.to_string(),
                what,
            ]
        })
        .collect();
    print_table(&["INDEX", "STATUS", "CONF", "PROPOSER", "ACTION"], rows);
    Ok(())
}

pub fn count(root: &Path, json: bool) -> anyhow::Result<()> {
    let wallet = load_wallet(root)?;
    if json {
        print_json(&serde_json::json!({ "count": wallet.count() }))?;
    } else {
        println!("{}", wallet.count());
    }
    Ok(())
}
