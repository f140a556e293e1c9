use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use quickpack::commands::{email::EmailCommand, serve::serve};
use quickpack_config::Environment;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_BIN_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let config = quickpack_config::load().context("Failed to load config")?;

    init_tracing(config.environment);

    match cli.command {
        Command::Serve => serve(config).await?,
        Command::Email { command } => command.invoke(config).await?,
        Command::CheckConfig { verbose } => {
            verbose.then(|| println!("{config:#?}"));
        }
        Command::Completion { .. } => {}
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the REST API server that relays the Quick Pack forms
    #[command(aliases(["run", "start", "r", "s"]))]
    Serve,
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Validate configuration
    CheckConfig {
        /// Print a debug representation of the config
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(environment: Environment) {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let pretty = pretty_logs(
        environment,
        std::env::var("RUST_LOG_PRETTY").ok().as_deref(),
    );
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if pretty {
        Box::new(fmt_layer.pretty())
    } else {
        Box::new(fmt_layer)
    };

    let default_directives = match environment {
        Environment::Development => "info,lettre=debug",
        Environment::Production | Environment::Test | Environment::Other => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}

/// Multi-line output in development unless `RUST_LOG_PRETTY` says otherwise.
fn pretty_logs(environment: Environment, pretty: Option<&str>) -> bool {
    pretty.map_or(environment.is_development(), |pretty| pretty == "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format() {
        for (environment, pretty, expected) in [
            (Environment::Development, None, true),
            (Environment::Development, Some("0"), false),
            (Environment::Production, None, false),
            (Environment::Production, Some("1"), true),
            (Environment::Other, Some("yes"), false),
        ] {
            assert_eq!(pretty_logs(environment, pretty), expected, "{environment:?} {pretty:?}");
        }
    }

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }
}
