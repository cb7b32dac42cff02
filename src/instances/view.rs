//! Family-agnostic instance views.

use serde::Serialize;

use crate::config::DisplayDefaults;
use crate::marketplace::{OnDemandRental, PortForward, PortMapping, SpotInstance};

use super::descriptor::ResourceDescriptor;
use super::family::InstanceFamily;
use super::timestamp::Uptime;

/// MiB per GiB, for spot GPU memory.
const MIB_PER_GIB: u64 = 1024;

/// A publicly reachable spot port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposedPort {
    /// Port number.
    pub port: u16,
    /// Public URL (`{protocol}://{domain}:{port}`).
    pub url: String,
}

impl From<&PortMapping> for ExposedPort {
    fn from(mapping: &PortMapping) -> Self {
        Self {
            port: mapping.port,
            url: format!("{}://{}:{}", mapping.protocol, mapping.domain, mapping.port),
        }
    }
}

/// Hardware facts that only some records carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HardwareSummary {
    /// Memory in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<u32>,
    /// Disk in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_gb: Option<u32>,
    /// Virtual CPUs (VMs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpu_count: Option<u32>,
    /// CPU cores per node (bare metal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u32>,
    /// CPU model per node (bare metal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,
    /// Memory of one GPU in GB (spot).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_ram_gb: Option<u64>,
}

/// Display-ready record of one instance, whatever its family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInstanceView {
    /// Family the record came from.
    pub family: InstanceFamily,
    /// Display ID: the spot string ID or the stringified rental ID.
    pub id: String,
    /// Upstream status, as reported.
    pub status: String,
    /// Rental name, empty for spot instances.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// GPU, price, SSH and network attributes.
    #[serde(flatten)]
    pub resources: ResourceDescriptor,
    /// Elapsed running time.
    pub uptime: Uptime,
    /// Creation timestamp, as reported.
    pub created: String,
    /// Start timestamp, as reported.
    pub started: String,
    /// End or termination timestamp, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<String>,
    /// Hardware summary.
    pub hardware: HardwareSummary,
    /// Installed operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    /// Exposed ports, spot only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ExposedPort>,
    /// Port forwards, VMs only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_forwards: Vec<PortForward>,
}

impl NormalizedInstanceView {
    /// Builds the view of a spot instance.
    #[must_use]
    pub fn from_spot(spot: &SpotInstance, defaults: &DisplayDefaults) -> Self {
        let gpu_ram_gb = spot
            .instance
            .hardware
            .gpus
            .first()
            .map(|gpu| gpu.ram / MIB_PER_GIB);

        Self {
            family: InstanceFamily::Spot,
            id: spot.id.clone(),
            status: spot.instance.status.clone(),
            name: String::new(),
            resources: ResourceDescriptor::from_spot(spot, defaults),
            uptime: Uptime::since(&spot.start, spot.end.as_deref()),
            created: spot.created.clone(),
            started: spot.start.clone(),
            ended: non_empty(spot.end.as_deref()),
            hardware: HardwareSummary {
                gpu_ram_gb,
                ..HardwareSummary::default()
            },
            operating_system: None,
            ports: spot.port_mappings.iter().map(ExposedPort::from).collect(),
            port_forwards: Vec::new(),
        }
    }

    /// Builds the view of a virtual-machine or bare-metal rental.
    #[must_use]
    pub fn from_rental(
        rental: &OnDemandRental,
        family: InstanceFamily,
        defaults: &DisplayDefaults,
    ) -> Self {
        let meta = &rental.meta;

        let hardware = if let Some(resources) = &meta.resources {
            HardwareSummary {
                ram_gb: Some(resources.ram_gb),
                storage_gb: Some(resources.storage_gb),
                vcpu_count: Some(resources.vcpu_count),
                ..HardwareSummary::default()
            }
        } else if let Some(specs) = &meta.specs_per_node {
            HardwareSummary {
                ram_gb: Some(specs.ram_gb),
                storage_gb: Some(specs.storage_gb),
                cpu_count: Some(specs.cpu_count),
                cpu_model: non_empty(Some(specs.cpu_model.as_str())),
                ..HardwareSummary::default()
            }
        } else {
            HardwareSummary::default()
        };

        Self {
            family,
            id: rental.id.to_string(),
            status: rental.status.clone(),
            name: meta.name.clone(),
            resources: ResourceDescriptor::from_rental(rental, family, defaults),
            uptime: Uptime::since(&rental.started_at, rental.terminated_at.as_deref()),
            created: rental.created_at.clone(),
            started: rental.started_at.clone(),
            ended: non_empty(rental.terminated_at.as_deref()),
            hardware,
            operating_system: non_empty(Some(meta.operating_system.as_str())),
            ports: Vec::new(),
            port_forwards: meta.port_forwards.clone(),
        }
    }

    /// Exposed port numbers joined by commas, or `None` when there are none.
    #[must_use]
    pub fn port_list(&self) -> String {
        if self.ports.is_empty() {
            return String::from("None");
        }

        self.ports
            .iter()
            .map(|p| p.port.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
