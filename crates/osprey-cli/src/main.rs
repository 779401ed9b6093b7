use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use osprey_cli::{OutputFormat, commands};

#[derive(Parser)]
#[command(name = "osprey")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Audit a website's performance, SEO, and growth readiness",
    long_about = "Osprey runs a battery of concurrent analyzers against a domain, \
                  scores the results against industry benchmarks, and produces \
                  prioritized issues, quick wins, and recommendations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full audit against a domain
    Audit {
        /// Domain to audit (scheme and path are stripped)
        #[arg(value_name = "DOMAIN")]
        domain: String,

        /// Wall-clock budget in seconds for the whole audit
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Ignore cached analyzer results from earlier runs
        #[arg(long)]
        no_cache: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Show the builtin benchmark thresholds for an industry
    Benchmarks {
        /// Industry tag (saas, ecommerce, media, finance, healthcare,
        /// education, local-services, unknown)
        #[arg(value_name = "INDUSTRY")]
        industry: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Audit {
            domain,
            timeout,
            no_cache,
            format,
        } => commands::audit::execute(&domain, timeout, no_cache, format).await,
        Commands::Benchmarks { industry, format } => {
            commands::benchmarks::execute(&industry, format)
        }
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("osprey=debug,osprey_core=debug,osprey_analyzers=debug,osprey_engine=debug")
    } else {
        EnvFilter::new("osprey=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
