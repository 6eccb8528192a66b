//! azprov - provision Azure virtual machines
//!
//! This is the main entry point for the azprov CLI.

mod cli;
mod config;

use azprov::error::Error;
use azprov::modules::ModuleError;
use azprov::provider::ProviderError;
use cli::commands::{catalog, CommandContext};
use cli::output::OutputFormatter;
use cli::{completions, Cli, Commands};
use config::{Config, LoggingConfig};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for a configuration file that could not be read or parsed
const CONFIG_EXIT_CODE: i32 = 4;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::new(!cli.no_color, cli.is_json(), cli.verbosity())
                .error(&format!("{:#}", e));
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    init_logging(cli.verbosity(), &config.logging);
    debug!(version = azprov::version(), simulate = cli.simulate, "Starting azprov");

    let mut ctx = CommandContext::new(&cli, config);

    let result = match &cli.command {
        Commands::Locations => catalog::locations(&mut ctx).await,
        Commands::ResourceGroup(args) => args.execute(&mut ctx).await,
        Commands::Storage(args) => args.execute(&mut ctx).await,
        Commands::Network(args) => args.execute(&mut ctx).await,
        Commands::Sizes(args) => args.execute(&mut ctx).await,
        Commands::Publishers(args) => args.execute(&mut ctx).await,
        Commands::Vm(args) => args.execute(&mut ctx).await,
        Commands::Rdp(args) => args.execute(&mut ctx).await,
        Commands::Apply(args) => args.execute(&mut ctx).await,
        Commands::Completions(args) => {
            completions::print_completions(args.shell);
            Ok(0)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            exit_code_for(&e)
        }
    };

    ctx.output.flush();
    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` wins over `-v`, which wins over the configured level.
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays parseable.
    if logging.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbosity >= 3),
            )
            .with(env_filter)
            .init();
    }
}

/// Maps the first typed error in the chain to its exit code.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<Error>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<ModuleError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<ProviderError>().is_some() {
            return 3;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_survive_context() {
        let err = anyhow::Error::from(Error::MissingParameter("location".into()))
            .context("while listing sizes");
        assert_eq!(exit_code_for(&err), 2);

        let err = anyhow::Error::from(ModuleError::Provisioning(Error::Provider(
            ProviderError::NotFound("rg".into()),
        )));
        assert_eq!(exit_code_for(&err), 3);

        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }
}
