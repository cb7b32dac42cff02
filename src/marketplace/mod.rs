//! Hyperbolic marketplace API integration module.
//!
//! This module provides the wire types of the instance, rental, browsing
//! and account endpoints, the HTTP client, and the [`InstanceApi`] trait
//! the instance layer is written against.

mod api;
mod client;
mod types;

pub use api::InstanceApi;
pub use client::{HyperbolicClient, DEFAULT_API_URL};
pub use types::{
    AccountBalance, AccountSummary, BareMetalOption, BareMetalOptions, BareMetalRentalRequest,
    Capacity, ContainerImage, MarketplaceListing, MarketplaceNode, NodeCpu, NodeHardware,
    NodeLocation, NodeNetworking, NodeSpecs, OnDemandOptions, OnDemandRental, PortForward,
    PortMapping, RentalMeta, RentalRef, SpotGpu, SpotHardware, SpotInstance, SpotInstanceDetails,
    SpotInstanceList, SpotPrice, SpotPricing, SpotRentRequest, SpotRentResponse,
    TerminateRentalRequest, TerminateSpotRequest, UserProfile, VirtualMachineOption,
    VirtualMachineRentalRequest, VmGpu, VmResources,
};
