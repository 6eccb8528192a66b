//! CLI module for azprov
//!
//! Argument parsing and subcommand dispatch. Each provisioning operation has
//! its own subcommand; `apply` runs a deployment file.

pub mod commands;
pub mod completions;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// azprov - provision Azure virtual machines
///
/// Creates resource groups, storage accounts, networks and VMs through the
/// Azure Resource Manager API, and opens RDP sessions to the result.
#[derive(Parser, Debug, Clone)]
#[command(name = "azprov")]
#[command(author = "azprov Contributors")]
#[command(version)]
#[command(about = "Provision Azure virtual machines and their supporting resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "AZPROV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use an in-memory provider instead of Azure
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Preview changes without making them
    #[arg(long = "check", global = true)]
    pub check_mode: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the regions available to the subscription
    Locations,

    /// Ensure a resource group exists
    #[command(name = "resource-group")]
    ResourceGroup(commands::group::ResourceGroupArgs),

    /// Create a storage account
    Storage(commands::storage::StorageArgs),

    /// Create a public IP, security group, virtual network and network interface
    Network(commands::network::NetworkArgs),

    /// List the VM sizes offered in a region
    Sizes(commands::catalog::SizesArgs),

    /// Find VM image publishers in a region
    Publishers(commands::catalog::PublishersArgs),

    /// Create a virtual machine
    Vm(commands::vm::VmArgs),

    /// Open a remote desktop session to a VM
    Rdp(commands::rdp::RdpArgs),

    /// Run a deployment file
    Apply(commands::apply::ApplyArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

/// Arguments for the completions command
#[derive(Parser, Debug, Clone)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}
