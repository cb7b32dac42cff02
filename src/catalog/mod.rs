//! Marketplace browsing and rental orders.
//!
//! This module handles:
//! - Selecting and ordering listed spot nodes for the availability tables
//! - Summarizing on-demand virtual-machine and bare-metal pricing tiers
//! - Validating spot and on-demand rental orders before they are sent

mod offers;
mod orders;
mod tiers;

pub use offers::{OfferOrder, OfferSelection, SpotOffer};
pub use orders::{NetworkType, OnDemandOrder, SpotOrder, MAX_SPOT_PORTS, SPOT_SSH_IMAGE};
pub use tiers::{OnDemandTier, TierKind, BARE_METAL_NODE_GPUS};
