mod channel;
mod output;
mod prompt;
mod shell;

use clap::Parser;
use std::path::PathBuf;
use toolsubmit_core::Theme;

#[derive(Parser)]
#[command(
    name = "toolsubmit",
    about = "Generate a tool listing from a repository README and open a prefilled submission issue",
    version
)]
pub(crate) struct Cli {
    /// Repository directory (prompted for when omitted in interactive mode)
    path: Option<PathBuf>,

    /// README to read instead of auto-detecting one
    #[arg(long)]
    readme: Option<PathBuf>,

    /// Model passed to the AI CLI
    #[arg(long, env = "TOOLSUBMIT_MODEL")]
    model: Option<String>,

    /// No prompts, no browser: print the submission URL and exit
    #[arg(long, short = 'y')]
    headless: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// AI CLI executable (default: claude on PATH)
    #[arg(long, env = "TOOLSUBMIT_CLI_PATH")]
    cli_path: Option<String>,

    /// Listing page theme
    #[arg(long)]
    theme: Option<Theme>,

    /// Config file (default: ~/.config/toolsubmit/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the metadata and URL as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Never offer to open the browser
    #[arg(long)]
    no_open: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = shell::run(cli) {
        if e.downcast_ref::<prompt::Cancelled>().is_some() {
            eprintln!("Cancelled.");
            return;
        }
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
