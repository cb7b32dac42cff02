//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::catalog::NetworkType;
use crate::instances::InstanceFamily;
use crate::marketplace::DEFAULT_API_URL;

/// Hyperbolic - Manage GPU instances on the Hyperbolic marketplace.
#[derive(Parser, Debug)]
#[command(name = "hyperbolic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the credential file (defaults to ~/.hyperbolic/config.json).
    #[arg(short, long, global = true, env = "HYPERBOLIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the Hyperbolic API.
    #[arg(long, global = true, env = "HYPERBOLIC_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save your Hyperbolic API key.
    Auth {
        /// API key from the Hyperbolic settings page.
        api_key: String,
    },

    /// List your instances, or show one in detail.
    Instances {
        /// Instance ID to show in detail.
        instance_id: Option<String>,
    },

    /// Terminate an instance.
    Terminate {
        /// Spot instance ID or on-demand rental ID.
        instance_id: String,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show your account credit balance.
    Balance,

    /// Show your account information and balance.
    Account,

    /// View available spot GPUs, cheapest first.
    Spot {
        /// Include nodes with no free GPUs.
        #[arg(long)]
        all: bool,
    },

    /// View available spot compute, grouped by GPU model.
    View {
        /// Include nodes with no free GPUs.
        #[arg(long)]
        all: bool,
    },

    /// View on-demand GPU configurations and pricing.
    Ondemand,

    /// Rent a GPU instance.
    Rent {
        /// Marketplace to rent from.
        #[command(subcommand)]
        market: RentCommands,
    },
}

/// Marketplaces GPUs can be rented from.
#[derive(Subcommand, Debug)]
pub enum RentCommands {
    /// Rent containerized GPUs on a spot node (see `hyperbolic spot`).
    Spot {
        /// Cluster name of the node.
        #[arg(long)]
        cluster_name: String,

        /// Node name.
        #[arg(long)]
        node_name: String,

        /// Number of GPUs to rent.
        #[arg(long, default_value_t = 1)]
        gpu_count: u32,

        /// Ports to expose, at most two (e.g. --ports 8080,3000).
        #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u16).range(1..))]
        ports: Vec<u16>,
    },

    /// Rent an on-demand VM or bare-metal fleet (see `hyperbolic ondemand`).
    Ondemand {
        /// Instance type.
        #[arg(long, value_enum)]
        instance_type: RentalKind,

        /// Number of GPUs to rent.
        #[arg(long, default_value_t = 1)]
        gpu_count: u32,

        /// Network fabric, required for bare metal.
        #[arg(long, value_enum, required_if_eq("instance_type", "bare-metal"))]
        network_type: Option<NetworkArg>,
    },
}

/// On-demand instance types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RentalKind {
    /// Virtual machine.
    VirtualMachine,
    /// Bare-metal fleet, in multiples of 8 GPUs.
    BareMetal,
}

impl From<RentalKind> for InstanceFamily {
    fn from(kind: RentalKind) -> Self {
        match kind {
            RentalKind::VirtualMachine => Self::VirtualMachine,
            RentalKind::BareMetal => Self::BareMetal,
        }
    }
}

/// Bare-metal network fabrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    /// Ethernet.
    Ethernet,
    /// `InfiniBand`.
    Infiniband,
}

impl From<NetworkArg> for NetworkType {
    fn from(network: NetworkArg) -> Self {
        match network {
            NetworkArg::Ethernet => Self::Ethernet,
            NetworkArg::Infiniband => Self::Infiniband,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_instance_detail() {
        let cli = Cli::try_parse_from(["hyperbolic", "instances", "777", "--output", "json"])
            .expect("should parse");

        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Instances { instance_id: Some(ref id) } if id == "777"
        ));
    }

    #[test]
    fn test_parse_terminate_with_yes() {
        let cli = Cli::try_parse_from(["hyperbolic", "terminate", "abc123", "-y"])
            .expect("should parse");

        assert!(matches!(
            cli.command,
            Commands::Terminate { ref instance_id, yes: true } if instance_id == "abc123"
        ));
    }

    #[test]
    fn test_terminate_requires_id() {
        assert!(Cli::try_parse_from(["hyperbolic", "terminate"]).is_err());
    }

    #[test]
    fn test_parse_spot_all() {
        let cli = Cli::try_parse_from(["hyperbolic", "spot", "--all"]).expect("should parse");
        assert!(matches!(cli.command, Commands::Spot { all: true }));

        let cli = Cli::try_parse_from(["hyperbolic", "view"]).expect("should parse");
        assert!(matches!(cli.command, Commands::View { all: false }));
    }

    #[test]
    fn test_parse_rent_spot_ports() {
        let cli = Cli::try_parse_from([
            "hyperbolic", "rent", "spot", "--cluster-name", "cluster-1", "--node-name", "node-1",
            "--gpu-count", "2", "--ports", "8080,3000",
        ])
        .expect("should parse");

        let Commands::Rent {
            market: RentCommands::Spot { cluster_name, node_name, gpu_count, ports },
        } = cli.command
        else {
            panic!("expected rent spot");
        };
        assert_eq!(cluster_name, "cluster-1");
        assert_eq!(node_name, "node-1");
        assert_eq!(gpu_count, 2);
        assert_eq!(ports, [8080, 3000]);
    }

    #[test]
    fn test_rent_spot_rejects_port_zero_and_missing_node() {
        assert!(Cli::try_parse_from([
            "hyperbolic", "rent", "spot", "--cluster-name", "c", "--node-name", "n", "--ports", "0",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["hyperbolic", "rent", "spot", "--cluster-name", "c"]).is_err());
    }

    #[test]
    fn test_rent_bare_metal_requires_network() {
        assert!(Cli::try_parse_from([
            "hyperbolic", "rent", "ondemand", "--instance-type", "bare-metal", "--gpu-count", "16",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "hyperbolic", "rent", "ondemand", "--instance-type", "bare-metal",
            "--network-type", "infiniband", "--gpu-count", "16",
        ])
        .expect("should parse");

        assert!(matches!(
            cli.command,
            Commands::Rent {
                market: RentCommands::Ondemand {
                    instance_type: RentalKind::BareMetal,
                    gpu_count: 16,
                    network_type: Some(NetworkArg::Infiniband),
                },
            }
        ));
    }

    #[test]
    fn test_rental_kind_maps_to_family() {
        assert_eq!(InstanceFamily::from(RentalKind::VirtualMachine), InstanceFamily::VirtualMachine);
        assert_eq!(NetworkType::from(NetworkArg::Ethernet), NetworkType::Ethernet);
    }
}
