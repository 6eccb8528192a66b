//! Subcommands module for azprov CLI
//!
//! This module contains all the subcommand implementations.

pub mod apply;
pub mod catalog;
pub mod group;
pub mod network;
pub mod rdp;
pub mod storage;
pub mod vm;

use crate::cli::output::OutputFormatter;
use crate::config::Config;
use anyhow::{Context, Result};
use azprov::error::Error;
use azprov::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry, ModuleStatus};
use azprov::provider::azure::TokenRequest;
use azprov::provider::{AzureRmClient, AzureRmSettings, CloudProvider, InMemoryProvider};
use azprov::provision::{RdpLauncher, SystemRdpLauncher};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Check mode (dry-run)
    pub check_mode: bool,
    /// Use the in-memory provider
    pub simulate: bool,
    provider: Option<Arc<dyn CloudProvider>>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.is_json(), cli.verbosity());

        Self {
            config,
            output,
            check_mode: cli.check_mode,
            simulate: cli.simulate,
            provider: None,
        }
    }

    /// Returns the provider, connecting on first use.
    ///
    /// With `--simulate` this is an in-memory provider preloaded with a
    /// small catalog; otherwise a token is acquired and an ARM client built.
    pub async fn provider(&mut self) -> Result<Arc<dyn CloudProvider>> {
        if let Some(provider) = &self.provider {
            return Ok(Arc::clone(provider));
        }

        let provider: Arc<dyn CloudProvider> = if self.simulate {
            debug!("Using simulated provider");
            Arc::new(InMemoryProvider::sample())
        } else {
            Arc::new(self.connect_azure().await?)
        };

        self.provider = Some(Arc::clone(&provider));
        Ok(provider)
    }

    async fn connect_azure(&self) -> Result<AzureRmClient> {
        let azure = &self.config.azure;
        let http = reqwest::Client::builder()
            .timeout(azure.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let request = TokenRequest {
            source: azure.auth,
            access_token: azure.access_token.clone(),
            authority_host: azure.authority_host.clone(),
            ..TokenRequest::default()
        };
        let token = request
            .acquire(&http)
            .await
            .map_err(Error::from)
            .context("Failed to acquire an Azure access token")?;

        let subscription_id = azure
            .subscription_id
            .clone()
            .or(token.subscription_id)
            .ok_or_else(|| {
                Error::Config(
                    "no subscription configured; set azure.subscription_id or AZURE_SUBSCRIPTION_ID"
                        .to_string(),
                )
            })?;

        let mut settings = AzureRmSettings::new(subscription_id, token.token)
            .with_endpoint(azure.endpoint.clone())
            .with_poll_interval(azure.poll_interval());
        settings.request_timeout = azure.request_timeout();
        settings.operation_timeout = azure.operation_timeout();

        let client = AzureRmClient::new(settings).map_err(Error::from)?;
        debug!(subscription = %client.subscription_id(), "Connected to Azure Resource Manager");
        Ok(client)
    }

    /// The RDP client configured for this run.
    pub fn rdp_launcher(&self) -> SystemRdpLauncher {
        let default = SystemRdpLauncher::platform_default();
        match &self.config.rdp.program {
            Some(program) => {
                let args = if self.config.rdp.args.is_empty() {
                    default.args_for(azprov::provision::rdp::ADDRESS_PLACEHOLDER)
                } else {
                    self.config.rdp.args.clone()
                };
                SystemRdpLauncher::new(program.clone(), args)
            }
            None => default,
        }
    }

    /// Module context for this run.
    pub async fn module_context(&mut self) -> Result<ModuleContext> {
        let provider = self.provider().await?;
        let rdp: Arc<dyn RdpLauncher> = Arc::new(self.rdp_launcher());
        Ok(ModuleContext::new(provider)
            .with_check_mode(self.check_mode)
            .with_rdp_launcher(rdp))
    }

    /// The region given on the command line, else the configured default.
    pub fn location(&self, given: Option<&String>) -> Result<String> {
        given
            .cloned()
            .or_else(|| self.config.default_location().map(str::to_string))
            .ok_or_else(|| {
                Error::MissingParameter(
                    "location (pass a region or set defaults.location)".to_string(),
                )
                .into()
            })
    }

    /// Runs one module with a spinner and prints its result.
    ///
    /// Returns the exit code for the command: 0 unless the module reported
    /// a failure.
    pub async fn run_module(
        &mut self,
        module: &str,
        params: ModuleParams,
        message: &str,
    ) -> Result<i32> {
        let context = self.module_context().await?;
        let registry = ModuleRegistry::with_builtins();
        let output = self
            .with_spinner(message, registry.execute(module, &params, &context))
            .await?;
        self.print_output(&output)?;
        Ok(if output.status == ModuleStatus::Failed { 1 } else { 0 })
    }

    /// Prints a module result: the whole output as JSON, or a status line.
    pub fn print_output(&self, output: &ModuleOutput) -> Result<()> {
        if self.output.is_json() {
            return self.output.json(output);
        }
        if self.check_mode {
            self.output.info("Running in check mode; no changes were made");
        }
        self.output.module_result(output);
        Ok(())
    }

    /// Runs `work` behind a spinner.
    pub async fn with_spinner<T, F>(&self, message: &str, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let spinner = self.output.create_spinner(message);
        let result = work.await;
        if let Some(sp) = spinner {
            sp.finish_and_clear();
        }
        result
    }
}
