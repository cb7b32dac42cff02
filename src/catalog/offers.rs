//! Spot availability.

use std::cmp::Ordering;

use crate::config::DisplayDefaults;
use crate::instances::HourlyPrice;
use crate::marketplace::{MarketplaceListing, MarketplaceNode};

/// Sort order of an availability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOrder {
    /// Cheapest first, ties broken by GPU model.
    PriceFirst,
    /// GPU model first, ties broken by price.
    ModelFirst,
}

/// A listed spot node reduced to its table columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotOffer {
    /// Node name.
    pub node: String,
    /// Cluster name.
    pub cluster: String,
    /// First GPU's model, or the spot placeholder.
    pub gpu_model: String,
    /// GPUs installed.
    pub gpus_total: u32,
    /// GPUs still free.
    pub gpus_available: u32,
    /// Price of one GPU.
    pub price: HourlyPrice,
    /// Billing period (`hourly`).
    pub period: String,
    /// Virtual cores of the first CPU.
    pub cpu_cores: u32,
    /// Capacity of the first memory bank, GB.
    pub ram_gb: u64,
    /// Capacity of the first disk, GB.
    pub storage_gb: u64,
    /// Region.
    pub region: String,
}

impl SpotOffer {
    /// Reduces a listed node.
    #[must_use]
    pub fn from_node(node: &MarketplaceNode, defaults: &DisplayDefaults) -> Self {
        let hw = &node.hardware;

        Self {
            node: node.id.clone(),
            cluster: node.cluster_name.clone(),
            gpu_model: hw
                .gpus
                .first()
                .map_or_else(|| defaults.spot_gpu_model.clone(), |gpu| gpu.model.clone()),
            gpus_total: node.gpus_total,
            gpus_available: node.available_gpus(),
            price: HourlyPrice::per_gpu(node.pricing.price.amount, 1),
            period: node.pricing.price.period.clone(),
            cpu_cores: hw.cpus.first().map_or(0, |cpu| cpu.virtual_cores),
            ram_gb: hw.ram.first().map_or(0, |ram| ram.capacity),
            storage_gb: hw.storage.first().map_or(0, |disk| disk.capacity),
            region: node.location.region.clone(),
        }
    }
}

/// Listed nodes chosen for display.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSelection {
    /// Offers in display order.
    pub offers: Vec<SpotOffer>,
    /// Nodes in the listing before filtering.
    pub listed: usize,
    /// Whether fully reserved nodes were kept.
    pub show_all: bool,
}

impl OfferSelection {
    /// Keeps nodes with free GPUs (all nodes with `show_all`) and orders them.
    #[must_use]
    pub fn new(
        listing: &MarketplaceListing,
        show_all: bool,
        order: OfferOrder,
        defaults: &DisplayDefaults,
    ) -> Self {
        let mut nodes: Vec<&MarketplaceNode> = listing
            .instances
            .iter()
            .filter(|node| show_all || node.available_gpus() > 0)
            .collect();
        nodes.sort_by(|a, b| compare(a, b, order));

        Self {
            offers: nodes
                .into_iter()
                .map(|node| SpotOffer::from_node(node, defaults))
                .collect(),
            listed: listing.instances.len(),
            show_all,
        }
    }

    /// Nodes left out because none of their GPUs are free.
    #[must_use]
    pub fn hidden(&self) -> usize {
        self.listed.saturating_sub(self.offers.len())
    }
}

/// Sort key: the raw first GPU model, empty when the node lists none.
fn model_key(node: &MarketplaceNode) -> &str {
    node.hardware.gpus.first().map_or("", |gpu| gpu.model.as_str())
}

fn compare(a: &MarketplaceNode, b: &MarketplaceNode, order: OfferOrder) -> Ordering {
    let price = a.pricing.price.amount.total_cmp(&b.pricing.price.amount);
    let model = model_key(a).cmp(model_key(b));

    match order {
        OfferOrder::PriceFirst => price.then(model),
        OfferOrder::ModelFirst => model.then(price),
    }
}
