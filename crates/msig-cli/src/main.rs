mod cmd;
mod dispatch;
mod output;
mod root;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, propose::ProposeSubcommand};
use msig_core::types::{ActionIndex, Identity};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "msig",
    about = "Multi-party authorization wallet: owners submit, confirm, and execute actions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Wallet root (default: auto-detect from .msig/)
    #[arg(long, global = true, env = "MSIG_ROOT")]
    root: Option<PathBuf>,

    /// Identity the command runs as
    #[arg(long = "as", global = true, env = "MSIG_CALLER")]
    caller: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a wallet whose sole owner is the creator
    Init {
        /// Initial owner (defaults to --as)
        #[arg(long)]
        owner: Option<String>,

        /// Wallet name written to config.yaml
        #[arg(long)]
        name: Option<String>,
    },

    /// List owners and the current threshold
    Owners,

    /// Check whether an identity is an owner
    IsOwner { identity: String },

    /// Print the owner at a position in the owner list (0-based)
    OwnerAt { position: usize },

    /// Submit an action against an account
    Submit {
        /// Destination identity, or `registry` for governance
        #[arg(long)]
        target: String,

        #[arg(long, default_value = "0")]
        amount: u64,

        /// Hex payload, 0x-prefixed
        #[arg(long, default_value = "0x")]
        payload: String,
    },

    /// Submit a governance action against the owner registry
    Propose {
        #[command(subcommand)]
        subcommand: ProposeSubcommand,
    },

    /// Confirm a pending action
    Confirm { index: ActionIndex },

    /// Withdraw your confirmation from a pending action
    Revoke { index: ActionIndex },

    /// Execute an action that has reached quorum
    Execute { index: ActionIndex },

    /// Show one action
    Show { index: ActionIndex },

    /// List actions
    List {
        /// Only actions not yet executed
        #[arg(long)]
        pending: bool,
    },

    /// Number of actions ever submitted
    Count,

    /// Show the event journal
    Events {
        /// Only the most recent N events
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Inspect and validate config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let json = cli.json;
    let as_caller = cli.caller.as_deref();

    let result = match cli.command {
        Commands::Init { owner, name } => owner
            .as_deref()
            .or(as_caller)
            .context("no initial owner: pass --owner <identity> or --as <identity>")
            .and_then(|raw| {
                Identity::new(raw).with_context(|| format!("invalid owner '{raw}'"))
            })
            .and_then(|creator| cmd::init::run(&root, creator, name.as_deref(), json)),
        Commands::Owners => cmd::owner::list(&root, json),
        Commands::IsOwner { identity } => Identity::new(&identity)
            .with_context(|| format!("invalid identity '{identity}'"))
            .and_then(|id| cmd::owner::is_owner(&root, &id, json)),
        Commands::OwnerAt { position } => cmd::owner::owner_at(&root, position, json),
        Commands::Submit {
            target,
            amount,
            payload,
        } => cmd::caller(as_caller).and_then(|caller| {
            cmd::action::submit(&root, &caller, &target, amount, &payload, json)
        }),
        Commands::Propose { subcommand } => cmd::caller(as_caller)
            .and_then(|caller| cmd::propose::run(&root, &caller, subcommand, json)),
        Commands::Confirm { index } => cmd::caller(as_caller)
            .and_then(|caller| cmd::action::confirm(&root, &caller, index, json)),
        Commands::Revoke { index } => cmd::caller(as_caller)
            .and_then(|caller| cmd::action::revoke(&root, &caller, index, json)),
        Commands::Execute { index } => cmd::caller(as_caller)
            .and_then(|caller| cmd::action::execute(&root, &caller, index, json)),
        Commands::Show { index } => cmd::action::show(&root, index, json),
        Commands::List { pending } => cmd::action::list(&root, pending, json),
        Commands::Count => cmd::action::count(&root, json),
        Commands::Events { limit } => cmd::events::run(&root, limit, json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
