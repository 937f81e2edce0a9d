use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sealer::cli::{
    handle_config_command, handle_edit_command, handle_new_command, handle_show_command,
    handle_version_command, Context, EditArgs, NewArgs, ShowArgs,
};
use sealer::config::{SealerPaths, Settings};

/// Environment variable holding the log filter
const LOG_ENV: &str = "KUBECTL_SEALER_LOG";

#[derive(Parser)]
#[command(
    name = "kubectl-sealer",
    author = "Kaylee Beyene",
    version,
    about = "Edit SealedSecrets as plain Secrets",
    long_about = "kubectl-sealer decrypts a SealedSecret, opens it in your editor as a \
                  plain Secret, and seals it again. Only values you changed are \
                  re-encrypted, so the sealed manifest changes as little as possible."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit a SealedSecret in plain Secret format and re-encrypt afterwards
    Edit(EditArgs),

    /// Decrypt a SealedSecret and print it as a Secret
    Show(ShowArgs),

    /// Create a new SealedSecret
    New(NewArgs),

    /// Show current configuration and paths
    Config,

    /// Print version information
    Version,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = SealerPaths::new()?;
    let settings = Settings::load(&paths)?;
    let ctx = Context::new(paths, settings);

    match cli.command {
        Commands::Edit(args) => handle_edit_command(&ctx, args)?,
        Commands::Show(args) => handle_show_command(&ctx, args)?,
        Commands::New(args) => handle_new_command(&ctx, args)?,
        Commands::Config => handle_config_command(&ctx)?,
        Commands::Version => handle_version_command(),
    }

    Ok(())
}
