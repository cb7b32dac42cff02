//! Hyperbolic marketplace API types.
//!
//! Three resource families share no schema: spot instances use string IDs
//! and a nested hardware/pricing block, while virtual-machine and bare-metal
//! rentals share one envelope with integer IDs and a `meta` block whose
//! populated fields depend on the rental kind.
//!
//! Upstream sends `null` freely; every collection, string and numeric field
//! here decodes `null` as its default so a single sparse record never fails
//! a listing.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Decodes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Spot instances
// ============================================================================

/// Envelope of `GET /v1/marketplace/instances`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotInstanceList {
    /// Instances owned by the caller.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<SpotInstance>,
}

/// A containerized spot rental.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotInstance {
    /// Unique spot instance identifier.
    pub id: String,
    /// When the container started.
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    /// When the container stopped, if it has.
    #[serde(default)]
    pub end: Option<String>,
    /// When the rental was created.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Full SSH command; empty while provisioning.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ssh_command: String,
    /// Publicly exposed ports.
    #[serde(default, deserialize_with = "null_as_default")]
    pub port_mappings: Vec<PortMapping>,
    /// Status, hardware and pricing of the backing node.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instance: SpotInstanceDetails,
}

/// A public port exposed by a spot instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Public hostname.
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    /// URL scheme (`http`, `tcp`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocol: String,
    /// Port number.
    #[serde(default, deserialize_with = "null_as_default")]
    pub port: u16,
}

/// Node-level details nested in a spot instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotInstanceDetails {
    /// Node identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Lifecycle status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Hardware inventory.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hardware: SpotHardware,
    /// Per-GPU pricing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing: SpotPricing,
    /// GPUs allocated to this rental.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_count: u32,
}

/// Hardware inventory of a spot node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotHardware {
    /// GPUs on the node.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus: Vec<SpotGpu>,
}

/// A GPU entry in spot hardware.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotGpu {
    /// Model name, often vendor-prefixed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    /// GPU memory in MiB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram: u64,
}

/// Pricing block of a spot node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotPricing {
    /// Price per GPU.
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: SpotPrice,
}

/// Per-GPU price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotPrice {
    /// Amount in hundredths of a dollar, per GPU.
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    /// Billing period (`hourly`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
}

// ============================================================================
// On-demand rentals (virtual machine and bare metal)
// ============================================================================

/// A virtual-machine or bare-metal rental.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDemandRental {
    /// Rental ID, unique only within its own family.
    pub id: i64,
    /// Creation timestamp.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Owning user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    /// Start timestamp.
    #[serde(default, deserialize_with = "null_as_default")]
    pub started_at: String,
    /// Termination timestamp, if terminated.
    #[serde(default)]
    pub terminated_at: Option<String>,
    /// Provider-side identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_id: String,
    /// Backing provider.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rental_provider: String,
    /// Cost in hundredths of a dollar per hour for the whole allocation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost_per_hour: i64,
    /// Lifecycle status (case varies upstream).
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Kind-specific metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: RentalMeta,
}

/// Metadata block of an on-demand rental.
///
/// Virtual machines populate `resources`, `ssh_command`, the IP fields and
/// `port_forwards`; bare-metal rentals populate `node_count`,
/// `specs_per_node`, `network_type`, `node_networking` and `username`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalMeta {
    /// Human-readable rental name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-form tags.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Public IP of a VM.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub public_ip: String,
    /// Flat GPU count present on some records.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_count: u32,
    /// Structured VM resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<VmResources>,
    /// Internal IP of a VM.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub internal_ip: String,
    /// Rental type reported by upstream.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rental_type: String,
    /// Inline SSH command of a VM.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub ssh_command: String,
    /// VM port forwards.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub port_forwards: Vec<PortForward>,
    /// Installed operating system.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub operating_system: String,
    /// Number of bare-metal nodes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_count: u32,
    /// Bare-metal fleet network (`ethernet` or `infiniband`).
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub network_type: String,
    /// Hardware of each bare-metal node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs_per_node: Option<NodeSpecs>,
    /// SSH username shared by all bare-metal nodes.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Addresses of each bare-metal node.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub node_networking: Vec<NodeNetworking>,
}

/// Structured resources of a VM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmResources {
    /// Memory in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram_gb: u32,
    /// Disk in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_gb: u32,
    /// Virtual CPUs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub vcpu_count: u32,
    /// GPU model name to allocated count, ordered by model name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus: BTreeMap<String, VmGpu>,
}

/// GPU allocation of one model in a VM.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VmGpu {
    /// Number of GPUs of this model.
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u32,
}

/// Hardware of a single bare-metal node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpecs {
    /// Memory in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram_gb: u32,
    /// CPU cores.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_count: u32,
    /// CPU model.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_model: String,
    /// GPUs per node.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_count: u32,
    /// GPU model.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_model: String,
    /// Disk in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_gb: u32,
}

/// Addresses of one bare-metal node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeNetworking {
    /// Public IP.
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_ip: String,
    /// Private IP.
    #[serde(default, deserialize_with = "null_as_default")]
    pub private_ip: String,
}

/// A VM port forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForward {
    /// Port reachable from outside.
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_port: u16,
    /// Port inside the VM.
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal_port: u16,
}

/// ID-only view of a rental, used to route terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRef {
    /// Rental ID.
    pub id: i64,
}

// ============================================================================
// Marketplace availability
// ============================================================================

/// Envelope of `POST /v1/marketplace`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceListing {
    /// Spot nodes currently listed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<MarketplaceNode>,
}

/// A spot node offered for rent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceNode {
    /// Node name, passed as `node_name` when renting.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Node status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Hardware inventory.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hardware: NodeHardware,
    /// GPUs installed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus_total: u32,
    /// GPUs already rented out.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus_reserved: u32,
    /// Hosting location.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: NodeLocation,
    /// Per-GPU pricing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing: SpotPricing,
    /// Cluster the node belongs to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_name: String,
    /// Hosting supplier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub supplier_id: String,
}

impl MarketplaceNode {
    /// GPUs still free to rent.
    #[must_use]
    pub const fn available_gpus(&self) -> u32 {
        self.gpus_total.saturating_sub(self.gpus_reserved)
    }
}

/// Hardware inventory of a listed node. Only the first entry of each kind
/// is shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeHardware {
    /// CPUs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpus: Vec<NodeCpu>,
    /// GPUs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpus: Vec<SpotGpu>,
    /// Disks, capacity in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage: Vec<Capacity>,
    /// Memory banks, capacity in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram: Vec<Capacity>,
}

/// A CPU of a listed node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeCpu {
    /// CPU model.
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    /// Virtual cores.
    #[serde(default, deserialize_with = "null_as_default")]
    pub virtual_cores: u32,
}

/// Storage or memory capacity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Capacity {
    /// Capacity in GB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: u64,
}

/// Location of a listed node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeLocation {
    /// Region name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
}

/// A virtual-machine size on offer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineOption {
    /// GPUs in this size.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_count: u32,
    /// Dollars per GPU per hour.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost_per_hour: f64,
}

/// Bare-metal capacity on one network fabric.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalOption {
    /// Largest rentable GPU count; zero when sold out.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpu_count: u32,
    /// Dollars per GPU per hour.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost_per_hour: f64,
}

/// Body of `GET /v2/marketplace/bare-metal-options`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BareMetalOptions {
    /// Ethernet fleets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ethernet: BareMetalOption,
    /// `InfiniBand` fleets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub infiniband: BareMetalOption,
}

/// Both on-demand option sets, as printed by `--output json`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDemandOptions {
    /// Virtual-machine sizes.
    pub virtual_machine_options: Vec<VirtualMachineOption>,
    /// Bare-metal capacity.
    pub bare_metal_options: BareMetalOptions,
}

// ============================================================================
// Requests and account
// ============================================================================

/// Body of the spot termination request.
#[derive(Debug, Clone, Serialize)]
pub struct TerminateSpotRequest {
    /// Spot instance ID.
    pub id: String,
}

/// Body of an on-demand termination request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRentalRequest {
    /// Rental ID.
    pub rental_id: i64,
}

/// Container image of a spot rental; sent only when ports are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerImage {
    /// Image reference.
    pub name: String,
    /// Ports to expose publicly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,
}

/// Body of `POST /v1/marketplace/instances/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotRentRequest {
    /// Cluster of the node.
    pub cluster_name: String,
    /// Node to rent on.
    pub node_name: String,
    /// GPUs to rent.
    pub gpu_count: u32,
    /// Image override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ContainerImage>,
}

/// Answer to a spot rental request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotRentResponse {
    /// ID of the new spot instance.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instance_id: String,
    /// Initial status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Free-form message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Body of `POST /v2/marketplace/virtual-machine-rentals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineRentalRequest {
    /// Marketplace configuration.
    pub config_id: String,
    /// GPUs to rent; this endpoint takes the count as a string.
    pub gpu_count: String,
}

/// Body of `POST /v2/marketplace/bare-metal-rentals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalRentalRequest {
    /// Marketplace configuration.
    pub config_id: String,
    /// `ethernet` or `infiniband`.
    pub network_type: String,
    /// GPUs to rent, a multiple of the node size.
    pub gpu_count: u32,
}

/// The caller's profile from `GET /users/me`.
///
/// The API key the endpoint echoes back is not kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Account email.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Login provider.
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider: String,
    /// Whether the email is verified.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_verified: bool,
    /// Whether the account is active.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    /// Account role.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// Referral code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub referral_code: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Account credit balance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Credits in hundredths of a dollar.
    #[serde(default, deserialize_with = "null_as_default")]
    pub credits: i64,
}

impl AccountBalance {
    /// Balance in dollars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dollars(&self) -> f64 {
        self.credits as f64 / 100.0
    }
}

/// Profile and balance together.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountSummary {
    /// Profile.
    pub user: UserProfile,
    /// Credit balance.
    pub balance: AccountBalance,
}
