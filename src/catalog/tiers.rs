//! On-demand pricing tiers.

use std::fmt;

use crate::config::DisplayDefaults;
use crate::error::{ApiError, Result};
use crate::marketplace::{BareMetalOption, OnDemandOptions};

use super::orders::NetworkType;

/// GPUs per bare-metal node; bare-metal sizes are multiples of it.
pub const BARE_METAL_NODE_GPUS: u32 = 8;

/// What a tier rents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    /// A virtual machine.
    VirtualMachine,
    /// A bare-metal fleet on the given fabric.
    BareMetal(NetworkType),
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VirtualMachine => f.write_str("Virtual Machine"),
            Self::BareMetal(network) => write!(f, "Bare Metal ({network})"),
        }
    }
}

/// One row of the on-demand pricing table.
#[derive(Debug, Clone, PartialEq)]
pub struct OnDemandTier {
    /// GPU model rented.
    pub gpu_model: String,
    /// Instance kind.
    pub kind: TierKind,
    /// Rentable GPU counts, ready to display.
    pub counts: String,
    /// Dollars per GPU per hour.
    pub price_per_gpu: f64,
}

impl OnDemandTier {
    /// Builds the tiers: one VM row priced at its smallest size, plus a
    /// bare-metal row per fabric with capacity left.
    ///
    /// # Errors
    ///
    /// Returns an error if no virtual-machine size is offered.
    pub fn from_options(
        options: &OnDemandOptions,
        defaults: &DisplayDefaults,
    ) -> Result<Vec<Self>> {
        let mut sizes = options.virtual_machine_options.clone();
        sizes.sort_by_key(|size| size.gpu_count);

        let Some(smallest) = sizes.first() else {
            return Err(ApiError::invalid_response(
                "virtual machine options",
                "no virtual machine options available",
            )
            .into());
        };

        let mut tiers = vec![Self {
            gpu_model: defaults.on_demand_gpu_model.clone(),
            kind: TierKind::VirtualMachine,
            counts: sizes
                .iter()
                .map(|size| size.gpu_count.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            price_per_gpu: smallest.cost_per_hour,
        }];

        let bare_metal = &options.bare_metal_options;
        for (network, option) in [
            (NetworkType::Ethernet, bare_metal.ethernet),
            (NetworkType::Infiniband, bare_metal.infiniband),
        ] {
            if let Some(tier) = Self::bare_metal(network, option, defaults) {
                tiers.push(tier);
            }
        }

        Ok(tiers)
    }

    fn bare_metal(
        network: NetworkType,
        option: BareMetalOption,
        defaults: &DisplayDefaults,
    ) -> Option<Self> {
        (option.gpu_count > 0).then(|| Self {
            gpu_model: defaults.on_demand_gpu_model.clone(),
            kind: TierKind::BareMetal(network),
            counts: format!(
                "{BARE_METAL_NODE_GPUS}–{} (×{BARE_METAL_NODE_GPUS})",
                option.gpu_count
            ),
            price_per_gpu: option.cost_per_hour,
        })
    }

    /// Price of the tier of the given kind, if offered.
    #[must_use]
    pub fn price_of(tiers: &[Self], kind: TierKind) -> Option<f64> {
        tiers
            .iter()
            .find(|tier| tier.kind == kind)
            .map(|tier| tier.price_per_gpu)
    }
}
