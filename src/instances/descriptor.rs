//! Display attributes derived from raw instance records.
//!
//! Each family stores GPU, price and access information in different,
//! partially optional fields. This module resolves them into one set of
//! attributes, falling back to placeholders instead of failing when a field
//! is missing.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::DisplayDefaults;
use crate::marketplace::{NodeNetworking, OnDemandRental, RentalMeta, SpotInstance};

use super::family::InstanceFamily;

/// Vendor prefixes stripped from GPU model names, longest first.
const GPU_VENDOR_PREFIXES: &[&str] = &["NVIDIA-GeForce-", "NVIDIA-"];

/// SKU tokens upstream reports in lowercase.
const GPU_SKU_CASING: &[(&str, &str)] = &[("h100-sxm5-80gb", "H100-SXM5-80GB")];

/// Statuses in which access details are not published yet.
const STARTING_STATUSES: &[&str] = &["pending", "starting", "provisioning", "initializing"];

/// Username used when only a bare public IP is known.
const GENERIC_SSH_USER: &str = "user";

/// Topology label for virtual machines.
const VM_TOPOLOGY: &str = "Ethernet";

/// Topology label for bare metal without an explicit network type.
const DEFAULT_BARE_METAL_TOPOLOGY: &str = "Standard";

/// Placeholder while an instance is still coming up.
pub const SSH_AVAILABLE_WHEN_READY: &str = "Available when ready";

/// Placeholder when no access details exist.
pub const SSH_NOT_AVAILABLE: &str = "SSH details not available";

/// Strips vendor prefixes and normalizes known SKU casing.
///
/// ```
/// use hyperbolic_cli::instances::clean_gpu_model;
///
/// assert_eq!(clean_gpu_model("NVIDIA-GeForce-h100-sxm5-80gb"), "H100-SXM5-80GB");
/// assert_eq!(clean_gpu_model("NVIDIA-A100-80GB"), "A100-80GB");
/// ```
#[must_use]
pub fn clean_gpu_model(model: &str) -> String {
    let mut cleaned = model.to_string();
    for prefix in GPU_VENDOR_PREFIXES {
        cleaned = cleaned.replace(prefix, "");
    }
    for (raw, canonical) in GPU_SKU_CASING {
        cleaned = cleaned.replace(raw, canonical);
    }
    cleaned
}

/// Returns true if `status` means the instance has not finished starting.
#[must_use]
pub fn is_starting_up(status: &str) -> bool {
    let status = status.trim();
    STARTING_STATUSES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(status))
}

/// GPU allocation, per node and across the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuCount {
    /// GPUs on each node.
    pub per_node: u32,
    /// Number of nodes, at least 1.
    pub node_count: u32,
}

impl GpuCount {
    /// A single-node allocation.
    #[must_use]
    pub const fn single(count: u32) -> Self {
        Self {
            per_node: count,
            node_count: 1,
        }
    }

    /// A fleet allocation; a node count of 0 is treated as 1.
    #[must_use]
    pub const fn per_node(per_node: u32, node_count: u32) -> Self {
        Self {
            per_node,
            node_count: if node_count == 0 { 1 } else { node_count },
        }
    }

    /// GPUs across all nodes.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.per_node.saturating_mul(self.node_count)
    }

    /// Returns true if the allocation spans more than one node.
    #[must_use]
    pub const fn is_multi_node(&self) -> bool {
        self.node_count > 1
    }
}

impl fmt::Display for GpuCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_multi_node() {
            write!(f, "{}×{}", self.per_node, self.node_count)
        } else {
            write!(f, "{}", self.total())
        }
    }
}

impl Serialize for GpuCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("GpuCount", 3)?;
        state.serialize_field("per_node", &self.per_node)?;
        state.serialize_field("node_count", &self.node_count)?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

/// Hourly price in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HourlyPrice(pub f64);

impl HourlyPrice {
    /// Price of a spot rental: the per-GPU amount (hundredths) times GPUs.
    #[must_use]
    pub fn per_gpu(hundredths: f64, gpus: u32) -> Self {
        Self(hundredths / 100.0 * f64::from(gpus))
    }

    /// Price of an on-demand rental, already for the whole allocation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn per_allocation(hundredths: i64) -> Self {
        Self(hundredths as f64 / 100.0)
    }

    /// Dollars per hour.
    #[must_use]
    pub const fn dollars(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for HourlyPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}/hr", self.0)
    }
}

/// How to reach an instance over SSH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "commands", rename_all = "snake_case")]
pub enum SshAccess {
    /// One command per node; a single entry for single-node instances.
    Ready(Vec<String>),
    /// The instance is still starting.
    AvailableWhenReady,
    /// Nothing is known about access.
    NotAvailable,
}

impl SshAccess {
    /// Access through a single command.
    #[must_use]
    pub fn command(command: impl Into<String>) -> Self {
        Self::Ready(vec![command.into()])
    }

    /// The placeholder appropriate for `status`.
    #[must_use]
    pub fn placeholder(status: &str) -> Self {
        if is_starting_up(status) {
            Self::AvailableWhenReady
        } else {
            Self::NotAvailable
        }
    }

    /// Commands, empty for placeholders.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        match self {
            Self::Ready(commands) => commands,
            Self::AvailableWhenReady | Self::NotAvailable => &[],
        }
    }
}

impl fmt::Display for SshAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(commands) if commands.len() == 1 => f.write_str(&commands[0]),
            Self::Ready(commands) => {
                for (i, command) in commands.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "Node {}: {command}", i + 1)?;
                }
                Ok(())
            }
            Self::AvailableWhenReady => f.write_str(SSH_AVAILABLE_WHEN_READY),
            Self::NotAvailable => f.write_str(SSH_NOT_AVAILABLE),
        }
    }
}

/// Public and private address of one node. Either may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeAddress {
    /// Public IP.
    pub public_ip: String,
    /// Private IP.
    pub private_ip: String,
}

impl From<&NodeNetworking> for NodeAddress {
    fn from(networking: &NodeNetworking) -> Self {
        Self {
            public_ip: networking.public_ip.clone(),
            private_ip: networking.private_ip.clone(),
        }
    }
}

/// Network topology and per-node addresses of an on-demand rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDescription {
    /// Topology label (`Ethernet`, `Infiniband`, `Standard`).
    pub topology: String,
    /// Node addresses, in upstream order.
    pub nodes: Vec<NodeAddress>,
}

impl NetworkDescription {
    /// Address lines: one line for a single node, enumerated otherwise.
    #[must_use]
    pub fn address_lines(&self) -> Vec<String> {
        match self.nodes.as_slice() {
            [] => Vec::new(),
            [node] => {
                let mut lines = Vec::new();
                if !node.public_ip.is_empty() {
                    lines.push(format!("Public IP: {}", node.public_ip));
                }
                if !node.private_ip.is_empty() {
                    lines.push(format!("Private IP: {}", node.private_ip));
                }
                lines
            }
            nodes => nodes
                .iter()
                .enumerate()
                .map(|(i, node)| {
                    format!(
                        "Node {}: Public IP {}, Private IP {}",
                        i + 1,
                        node.public_ip,
                        node.private_ip
                    )
                })
                .collect(),
        }
    }
}

/// Uniform display attributes of one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    /// Cleaned GPU model.
    pub gpu_model: String,
    /// GPU allocation.
    pub gpu_count: GpuCount,
    /// Hourly price.
    pub price: HourlyPrice,
    /// SSH access or placeholder.
    pub ssh: SshAccess,
    /// Network description, on-demand rentals only.
    pub network: Option<NetworkDescription>,
}

impl ResourceDescriptor {
    /// Derives attributes of a spot instance.
    #[must_use]
    pub fn from_spot(spot: &SpotInstance, defaults: &DisplayDefaults) -> Self {
        let gpu_model = spot
            .instance
            .hardware
            .gpus
            .first()
            .map(|gpu| gpu.model.as_str())
            .filter(|model| !model.is_empty())
            .map_or_else(|| defaults.spot_gpu_model.clone(), clean_gpu_model);

        let gpu_count = GpuCount::single(spot.instance.gpu_count);
        let price = HourlyPrice::per_gpu(spot.instance.pricing.price.amount, gpu_count.total());

        let ssh = if spot.ssh_command.trim().is_empty() {
            SshAccess::placeholder(&spot.instance.status)
        } else {
            SshAccess::command(spot.ssh_command.trim())
        };

        Self {
            gpu_model,
            gpu_count,
            price,
            ssh,
            network: None,
        }
    }

    /// Derives attributes of a virtual-machine or bare-metal rental.
    #[must_use]
    pub fn from_rental(
        rental: &OnDemandRental,
        family: InstanceFamily,
        defaults: &DisplayDefaults,
    ) -> Self {
        let meta = &rental.meta;

        Self {
            gpu_model: rental_gpu_model(meta)
                .map_or_else(|| defaults.on_demand_gpu_model.clone(), clean_gpu_model),
            gpu_count: rental_gpu_count(meta),
            price: HourlyPrice::per_allocation(rental.cost_per_hour),
            ssh: rental_ssh_access(meta, &rental.status),
            network: Some(rental_network(meta, family)),
        }
    }
}

/// First non-empty of: per-node GPU model, then the smallest VM resource
/// model name.
fn rental_gpu_model(meta: &RentalMeta) -> Option<&str> {
    meta.specs_per_node
        .as_ref()
        .map(|specs| specs.gpu_model.as_str())
        .filter(|model| !model.is_empty())
        .or_else(|| {
            meta.resources
                .as_ref()
                .and_then(|resources| resources.gpus.keys().find(|model| !model.is_empty()))
                .map(String::as_str)
        })
}

/// First non-zero of: per-node GPU count (times nodes), summed VM
/// resources, flat `gpu_count`.
fn rental_gpu_count(meta: &RentalMeta) -> GpuCount {
    if let Some(per_node) = meta
        .specs_per_node
        .as_ref()
        .map(|specs| specs.gpu_count)
        .filter(|count| *count > 0)
    {
        return GpuCount::per_node(per_node, meta.node_count);
    }

    let summed = meta.resources.as_ref().map_or(0, |resources| {
        resources
            .gpus
            .values()
            .fold(0_u32, |acc, gpu| acc.saturating_add(gpu.count))
    });
    if summed > 0 {
        return GpuCount::single(summed);
    }

    GpuCount::single(meta.gpu_count)
}

fn rental_ssh_access(meta: &RentalMeta, status: &str) -> SshAccess {
    if !meta.ssh_command.trim().is_empty() {
        return SshAccess::command(meta.ssh_command.trim());
    }

    if !meta.node_networking.is_empty() && !meta.username.is_empty() {
        return SshAccess::Ready(
            meta.node_networking
                .iter()
                .map(|node| format!("ssh {}@{}", meta.username, node.public_ip))
                .collect(),
        );
    }

    if !meta.public_ip.is_empty() {
        return SshAccess::command(format!("ssh {GENERIC_SSH_USER}@{}", meta.public_ip));
    }

    SshAccess::placeholder(status)
}

fn rental_network(meta: &RentalMeta, family: InstanceFamily) -> NetworkDescription {
    let topology = match family {
        InstanceFamily::BareMetal if !meta.network_type.trim().is_empty() => {
            title_case(meta.network_type.trim())
        }
        InstanceFamily::BareMetal => DEFAULT_BARE_METAL_TOPOLOGY.to_string(),
        InstanceFamily::VirtualMachine | InstanceFamily::Spot => VM_TOPOLOGY.to_string(),
    };

    let nodes = if !meta.node_networking.is_empty() {
        meta.node_networking.iter().map(NodeAddress::from).collect()
    } else if !meta.public_ip.is_empty() || !meta.internal_ip.is_empty() {
        vec![NodeAddress {
            public_ip: meta.public_ip.clone(),
            private_ip: meta.internal_ip.clone(),
        }]
    } else {
        Vec::new()
    };

    NetworkDescription { topology, nodes }
}

/// Lowercases `value` and capitalizes the first letter of each word.
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;

    for c in value.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::{
        NodeSpecs, SpotGpu, SpotHardware, SpotInstanceDetails, SpotPrice, SpotPricing, VmGpu,
        VmResources,
    };
    use std::collections::BTreeMap;

    fn spot(status: &str, gpus: u32, amount: f64, ssh: &str) -> SpotInstance {
        SpotInstance {
            id: String::from("quiet-fox-42"),
            ssh_command: ssh.to_string(),
            instance: SpotInstanceDetails {
                status: status.to_string(),
                gpu_count: gpus,
                hardware: SpotHardware {
                    gpus: vec![SpotGpu {
                        model: String::from("NVIDIA-GeForce-RTX-4090"),
                        ram: 24_564,
                    }],
                },
                pricing: SpotPricing {
                    price: SpotPrice {
                        amount,
                        period: String::from("hourly"),
                    },
                },
                ..SpotInstanceDetails::default()
            },
            ..SpotInstance::default()
        }
    }

    fn bare_metal(per_node: u32, nodes: u32) -> OnDemandRental {
        OnDemandRental {
            id: 777,
            cost_per_hour: 2400,
            status: String::from("running"),
            meta: RentalMeta {
                node_count: nodes,
                network_type: String::from("INFINIBAND"),
                specs_per_node: Some(NodeSpecs {
                    gpu_count: per_node,
                    gpu_model: String::from("NVIDIA-h100-sxm5-80gb"),
                    ..NodeSpecs::default()
                }),
                ..RentalMeta::default()
            },
            ..OnDemandRental::default()
        }
    }

    fn vm_with_gpus(gpus: &[(&str, u32)]) -> OnDemandRental {
        let gpus: BTreeMap<String, VmGpu> = gpus
            .iter()
            .map(|(model, count)| ((*model).to_string(), VmGpu { count: *count }))
            .collect();

        OnDemandRental {
            id: 501,
            cost_per_hour: 149,
            status: String::from("running"),
            meta: RentalMeta {
                resources: Some(VmResources {
                    gpus,
                    ..VmResources::default()
                }),
                ..RentalMeta::default()
            },
            ..OnDemandRental::default()
        }
    }

    #[test]
    fn test_clean_gpu_model() {
        assert_eq!(clean_gpu_model("NVIDIA-GeForce-h100-sxm5-80gb"), "H100-SXM5-80GB");
        assert_eq!(clean_gpu_model("NVIDIA-H100-80GB-HBM3"), "H100-80GB-HBM3");
        assert_eq!(clean_gpu_model("NVIDIA-GeForce-RTX-4090"), "RTX-4090");
        assert_eq!(clean_gpu_model("AMD-MI300X"), "AMD-MI300X");
    }

    #[test]
    fn test_starting_statuses_ignore_case() {
        assert!(is_starting_up("Provisioning"));
        assert!(is_starting_up("PENDING"));
        assert!(is_starting_up("initializing"));
        assert!(!is_starting_up("running"));
        assert!(!is_starting_up("terminated"));
    }

    #[test]
    fn test_spot_price_is_per_gpu() {
        let descriptor = ResourceDescriptor::from_spot(
            &spot("online", 2, 150.0, ""),
            &DisplayDefaults::default(),
        );
        assert_eq!(descriptor.price.to_string(), "$3.00/hr");
        assert_eq!(descriptor.gpu_model, "RTX-4090");
        assert_eq!(descriptor.gpu_count.to_string(), "2");
    }

    #[test]
    fn test_on_demand_price_is_per_allocation() {
        let mut vm = vm_with_gpus(&[("NVIDIA-h100-sxm5-80gb", 8)]);
        vm.cost_per_hour = 149;

        let descriptor = ResourceDescriptor::from_rental(
            &vm,
            InstanceFamily::VirtualMachine,
            &DisplayDefaults::default(),
        );
        assert_eq!(descriptor.price.to_string(), "$1.49/hr");
        assert_eq!(descriptor.gpu_count.total(), 8);
    }

    #[test]
    fn test_bare_metal_gpu_count_spans_nodes() {
        let descriptor = ResourceDescriptor::from_rental(
            &bare_metal(8, 4),
            InstanceFamily::BareMetal,
            &DisplayDefaults::default(),
        );

        assert_eq!(descriptor.gpu_count.to_string(), "8×4");
        assert_eq!(descriptor.gpu_count.total(), 32);
        assert_eq!(descriptor.gpu_count.per_node, 8);
        assert_eq!(descriptor.gpu_model, "H100-SXM5-80GB");
    }

    #[test]
    fn test_single_node_bare_metal_shows_plain_count() {
        let descriptor = ResourceDescriptor::from_rental(
            &bare_metal(8, 1),
            InstanceFamily::BareMetal,
            &DisplayDefaults::default(),
        );
        assert_eq!(descriptor.gpu_count.to_string(), "8");
    }

    #[test]
    fn test_vm_gpu_count_sums_models_and_picks_smallest_name() {
        let vm = vm_with_gpus(&[("NVIDIA-h100-sxm5-80gb", 2), ("NVIDIA-A100", 1)]);
        let descriptor = ResourceDescriptor::from_rental(
            &vm,
            InstanceFamily::VirtualMachine,
            &DisplayDefaults::default(),
        );

        assert_eq!(descriptor.gpu_count.total(), 3);
        assert_eq!(descriptor.gpu_model, "A100");
    }

    #[test]
    fn test_flat_gpu_count_fallback_and_default_model() {
        let mut vm = vm_with_gpus(&[]);
        vm.meta.gpu_count = 4;

        let defaults = DisplayDefaults::default().with_on_demand_gpu_model("B200");
        let descriptor =
            ResourceDescriptor::from_rental(&vm, InstanceFamily::VirtualMachine, &defaults);

        assert_eq!(descriptor.gpu_count.total(), 4);
        assert_eq!(descriptor.gpu_model, "B200");
    }

    #[test]
    fn test_spot_without_hardware_uses_default_model() {
        let mut instance = spot("online", 1, 99.0, "");
        instance.instance.hardware.gpus.clear();

        let descriptor = ResourceDescriptor::from_spot(&instance, &DisplayDefaults::default());
        assert_eq!(descriptor.gpu_model, "N/A");

        let defaults = DisplayDefaults::default().with_spot_gpu_model("unknown");
        let descriptor = ResourceDescriptor::from_spot(&instance, &defaults);
        assert_eq!(descriptor.gpu_model, "unknown");
    }

    #[test]
    fn test_ssh_prefers_explicit_command() {
        let mut vm = vm_with_gpus(&[("NVIDIA-h100-sxm5-80gb", 1)]);
        vm.meta.ssh_command = String::from("ssh ubuntu@198.51.100.4 -p 30022");
        vm.meta.public_ip = String::from("198.51.100.4");

        let ssh = rental_ssh_access(&vm.meta, &vm.status);
        assert_eq!(ssh.to_string(), "ssh ubuntu@198.51.100.4 -p 30022");
    }

    #[test]
    fn test_ssh_per_node_commands() {
        let mut bm = bare_metal(8, 2);
        bm.meta.username = String::from("ubuntu");
        bm.meta.node_networking = vec![
            NodeNetworking {
                public_ip: String::from("203.0.113.10"),
                private_ip: String::from("10.0.0.10"),
            },
            NodeNetworking {
                public_ip: String::from("203.0.113.11"),
                private_ip: String::from("10.0.0.11"),
            },
        ];

        let ssh = rental_ssh_access(&bm.meta, &bm.status);
        assert_eq!(
            ssh.to_string(),
            "Node 1: ssh ubuntu@203.0.113.10\nNode 2: ssh ubuntu@203.0.113.11"
        );
        assert_eq!(ssh.commands().len(), 2);

        bm.meta.node_networking.truncate(1);
        let ssh = rental_ssh_access(&bm.meta, &bm.status);
        assert_eq!(ssh.to_string(), "ssh ubuntu@203.0.113.10");
    }

    #[test]
    fn test_ssh_from_bare_public_ip() {
        let mut vm = vm_with_gpus(&[]);
        vm.meta.public_ip = String::from("198.51.100.4");

        let ssh = rental_ssh_access(&vm.meta, &vm.status);
        assert_eq!(ssh.to_string(), "ssh user@198.51.100.4");
    }

    #[test]
    fn test_ssh_placeholders_depend_on_status() {
        let meta = RentalMeta::default();

        let starting = rental_ssh_access(&meta, "provisioning");
        let running = rental_ssh_access(&meta, "running");

        assert_eq!(starting, SshAccess::AvailableWhenReady);
        assert_eq!(running, SshAccess::NotAvailable);
        assert_ne!(starting.to_string(), running.to_string());
        assert!(starting.commands().is_empty());
    }

    #[test]
    fn test_spot_ssh_placeholder() {
        let descriptor =
            ResourceDescriptor::from_spot(&spot("Starting", 1, 99.0, "  "), &DisplayDefaults::default());
        assert_eq!(descriptor.ssh, SshAccess::AvailableWhenReady);
    }

    #[test]
    fn test_network_topology_labels() {
        let bm = bare_metal(8, 2);
        let network = rental_network(&bm.meta, InstanceFamily::BareMetal);
        assert_eq!(network.topology, "Infiniband");

        let mut unlabeled = bare_metal(8, 2);
        unlabeled.meta.network_type.clear();
        let network = rental_network(&unlabeled.meta, InstanceFamily::BareMetal);
        assert_eq!(network.topology, "Standard");

        let mut vm = vm_with_gpus(&[]);
        vm.meta.network_type = String::from("infiniband");
        vm.meta.public_ip = String::from("198.51.100.4");
        vm.meta.internal_ip = String::from("10.1.0.4");
        let network = rental_network(&vm.meta, InstanceFamily::VirtualMachine);
        assert_eq!(network.topology, "Ethernet");
        assert_eq!(
            network.address_lines(),
            ["Public IP: 198.51.100.4", "Private IP: 10.1.0.4"]
        );
    }

    #[test]
    fn test_multi_node_address_lines() {
        let network = NetworkDescription {
            topology: String::from("Ethernet"),
            nodes: vec![
                NodeAddress {
                    public_ip: String::from("203.0.113.10"),
                    private_ip: String::from("10.0.0.10"),
                },
                NodeAddress {
                    public_ip: String::from("203.0.113.11"),
                    private_ip: String::from("10.0.0.11"),
                },
            ],
        };

        assert_eq!(
            network.address_lines(),
            [
                "Node 1: Public IP 203.0.113.10, Private IP 10.0.0.10",
                "Node 2: Public IP 203.0.113.11, Private IP 10.0.0.11",
            ]
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ETHERNET"), "Ethernet");
        assert_eq!(title_case("infiniband"), "Infiniband");
        assert_eq!(title_case("roce v2"), "Roce V2");
    }
}
