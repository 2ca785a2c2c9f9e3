mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{phase::PhaseSubcommand, sandbox::SandboxSubcommand, session::SessionSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hookguard",
    about = "Gate agent tool calls against declarative workflow rules",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .hookguard/ or .git/)
    #[arg(long, global = true, env = "HOOKGUARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enforce one tool invocation read as JSON from stdin (hook protocol:
    /// exit 0 with an advisory on stdout, exit 1 with a banner on stderr)
    Hook {
        /// Never auto-activate a profile from the prompt
        #[arg(long)]
        no_auto_select: bool,
    },

    /// Show or drive the persisted TDD phase
    Phase {
        #[command(subcommand)]
        subcommand: PhaseSubcommand,
    },

    /// Check a command or write path against the active sandbox policy
    Sandbox {
        #[command(subcommand)]
        subcommand: SandboxSubcommand,
    },

    /// Validate agent-generated text for required skill invocations
    Validate {
        /// Required skill name (repeatable)
        #[arg(long = "require")]
        required: Vec<String>,

        /// Suggested skill name (repeatable)
        #[arg(long = "suggest")]
        suggested: Vec<String>,

        /// Retry cap for the feedback loop
        #[arg(long, default_value = "3")]
        max_retries: u32,

        /// Current attempt number (caller-threaded)
        #[arg(long, default_value = "1")]
        attempt: u32,

        /// Text to validate (omit to read stdin)
        text: Option<String>,
    },

    /// Show or clear the active session
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
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

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Hook { no_auto_select } => cmd::hook::run(&root, no_auto_select, cli.json),
        Commands::Phase { subcommand } => cmd::phase::run(&root, subcommand, cli.json),
        Commands::Sandbox { subcommand } => cmd::sandbox::run(&root, subcommand, cli.json),
        Commands::Validate {
            required,
            suggested,
            max_retries,
            attempt,
            text,
        } => cmd::validate::run(&required, &suggested, max_retries, attempt, text, cli.json),
        Commands::Session { subcommand } => cmd::session::run(&root, subcommand, cli.json),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
