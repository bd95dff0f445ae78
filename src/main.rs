use anyhow::Result;
use clap::Parser;

mod cmd;
mod repl;
mod utils;

use dispatchkit::{DispatchConfig, Dispatcher, UsageOptions, render_json};

/// dispatchkit demo host.
///
/// Everything after the global flags is handed to the dispatch engine as-is:
///   dispatchkit add 5 7             pair overload
///   dispatchkit add 5 7 87.6        sequence overload
///   dispatchkit add -p 2 10 3       option before positionals
///   dispatchkit echo --case=upper hi
///   dispatchkit history --last 3
///
/// With no command the usage screen is printed (`--json` for a machine
/// readable catalog). `--repl` reads command lines from stdin instead, so the
/// history ledger persists between lines.
///
/// Global flags / env:
///   -v / -vv          Increase verbosity
///   -q / --quiet      Errors only
///   --case-sensitive  Exact command-name matching
///   --width N         Wrap usage at N columns (0 = no wrapping; default COLUMNS)
///   NO_COLOR          Disable colored usage output
#[derive(Parser, Debug)]
#[command(
    name = "dispatchkit",
    version,
    author,
    about = "dispatchkit - declarative command dispatch demo",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Match command names exactly instead of ignoring case
    #[arg(long)]
    case_sensitive: bool,

    /// Usage wrap width (0 disables wrapping)
    #[arg(long, value_name = "COLUMNS")]
    width: Option<usize>,

    /// Print the command catalog as JSON
    #[arg(long)]
    json: bool,

    /// Read command lines from stdin
    #[arg(long, conflicts_with = "args")]
    repl: bool,

    /// Command name followed by its arguments and options
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    args: Vec<String>,
}

impl Cli {
    fn dispatch_config(&self) -> DispatchConfig {
        let mut usage = UsageOptions::detect()
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_description(env!("CARGO_PKG_DESCRIPTION"));
        usage.program_name = "dispatchkit".to_string();
        if let Some(width) = self.width {
            usage.max_width = width;
        }
        DispatchConfig {
            ignore_case: !self.case_sensitive,
            usage,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let mut dispatcher = Dispatcher::with_config(cli.dispatch_config());
    cmd::register_all(&mut dispatcher)?;
    tracing::debug!(commands = dispatcher.catalog().len(), "commands registered");

    if cli.repl {
        return repl::run_stdin(&dispatcher);
    }
    if cli.json && cli.args.is_empty() {
        println!("{}", serde_json::to_string_pretty(&render_json(dispatcher.catalog()))?);
        return Ok(());
    }
    dispatcher.handle(&cli.args)
}
