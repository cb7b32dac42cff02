//! Rental orders, validated before anything is sent.

use std::fmt;
use tracing::info;

use crate::error::{RentalError, Result};
use crate::instances::InstanceFamily;
use crate::marketplace::{
    ContainerImage, HyperbolicClient, OnDemandRental, SpotRentRequest, SpotRentResponse,
};

/// Most ports a spot container can expose.
pub const MAX_SPOT_PORTS: usize = 2;

/// Image requested when a spot rental exposes ports.
pub const SPOT_SSH_IMAGE: &str = "ghcr.io/hyperboliclabs/hyper-dos/sshbox";

/// Bare-metal network fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Ethernet.
    Ethernet,
    /// `InfiniBand`.
    Infiniband,
}

impl NetworkType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Infiniband => "infiniband",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ethernet => "Ethernet",
            Self::Infiniband => "InfiniBand",
        })
    }
}

/// A spot rental on a named node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotOrder {
    request: SpotRentRequest,
}

impl SpotOrder {
    /// Validates the order. Exposing ports swaps in the SSH image.
    ///
    /// # Errors
    ///
    /// Returns an error for more than [`MAX_SPOT_PORTS`] ports, port 0, or
    /// zero GPUs.
    pub fn new(cluster_name: &str, node_name: &str, gpu_count: u32, ports: &[u16]) -> Result<Self> {
        if ports.len() > MAX_SPOT_PORTS {
            return Err(RentalError::TooManyPorts {
                count: ports.len(),
                max: MAX_SPOT_PORTS,
            }
            .into());
        }
        if let Some(&port) = ports.iter().find(|&&port| port == 0) {
            return Err(RentalError::InvalidPort { port }.into());
        }
        if gpu_count == 0 {
            return Err(RentalError::NoGpus.into());
        }

        let image = (!ports.is_empty()).then(|| ContainerImage {
            name: SPOT_SSH_IMAGE.to_string(),
            ports: ports.to_vec(),
        });

        Ok(Self {
            request: SpotRentRequest {
                cluster_name: cluster_name.to_string(),
                node_name: node_name.to_string(),
                gpu_count,
                image,
            },
        })
    }

    /// Request body.
    #[must_use]
    pub const fn request(&self) -> &SpotRentRequest {
        &self.request
    }

    /// Whether public ports were requested.
    #[must_use]
    pub const fn exposes_ports(&self) -> bool {
        self.request.image.is_some()
    }

    /// Sends the order. `None` means upstream accepted it with an
    /// unreadable body.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn submit(&self, client: &HyperbolicClient) -> Result<Option<SpotRentResponse>> {
        info!(
            "Renting {} GPU(s) on {}/{}",
            self.request.gpu_count, self.request.cluster_name, self.request.node_name
        );
        client.rent_spot(&self.request).await
    }
}

/// An on-demand rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDemandOrder {
    /// A virtual machine.
    VirtualMachine {
        /// GPUs to rent.
        gpu_count: u32,
    },
    /// A bare-metal fleet.
    BareMetal {
        /// GPUs to rent.
        gpu_count: u32,
        /// Fabric.
        network: NetworkType,
    },
}

impl OnDemandOrder {
    /// Validates the order. `network` is ignored for virtual machines.
    ///
    /// # Errors
    ///
    /// Returns an error for spot, zero GPUs, or bare metal without a
    /// network type.
    pub fn new(
        family: InstanceFamily,
        gpu_count: u32,
        network: Option<NetworkType>,
    ) -> Result<Self> {
        if !family.is_on_demand() {
            return Err(RentalError::NotOnDemand {
                family: family.to_string(),
            }
            .into());
        }
        if gpu_count == 0 {
            return Err(RentalError::NoGpus.into());
        }

        match (family, network) {
            (InstanceFamily::BareMetal, Some(network)) => Ok(Self::BareMetal { gpu_count, network }),
            (InstanceFamily::BareMetal, None) => Err(RentalError::NetworkTypeRequired.into()),
            _ => Ok(Self::VirtualMachine { gpu_count }),
        }
    }

    /// Family of the rental.
    #[must_use]
    pub const fn family(&self) -> InstanceFamily {
        match self {
            Self::VirtualMachine { .. } => InstanceFamily::VirtualMachine,
            Self::BareMetal { .. } => InstanceFamily::BareMetal,
        }
    }

    /// GPUs to rent.
    #[must_use]
    pub const fn gpu_count(&self) -> u32 {
        match self {
            Self::VirtualMachine { gpu_count } | Self::BareMetal { gpu_count, .. } => *gpu_count,
        }
    }

    /// Fabric, bare metal only.
    #[must_use]
    pub const fn network(&self) -> Option<NetworkType> {
        match self {
            Self::VirtualMachine { .. } => None,
            Self::BareMetal { network, .. } => Some(*network),
        }
    }

    /// Sends the order. `None` means upstream accepted it with an
    /// unreadable body.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn submit(&self, client: &HyperbolicClient) -> Result<Option<OnDemandRental>> {
        info!("Renting {} with {} GPU(s)", self.family(), self.gpu_count());
        match *self {
            Self::VirtualMachine { gpu_count } => client.rent_virtual_machine(gpu_count).await,
            Self::BareMetal { gpu_count, network } => {
                client.rent_bare_metal(network.as_str(), gpu_count).await
            }
        }
    }
}
