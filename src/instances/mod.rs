//! Instance normalization and aggregation.
//!
//! This module handles:
//! - Parsing heterogeneous timestamps and rendering uptime
//! - Deriving GPU, price, SSH and network attributes from raw records
//! - Resolving an opaque ID across spot, VM and bare-metal collections
//! - Fetching all collections concurrently and routing terminations

mod descriptor;
mod family;
mod registry;
mod service;
mod timestamp;
mod view;

pub use descriptor::{
    clean_gpu_model, is_starting_up, GpuCount, HourlyPrice, NetworkDescription, NodeAddress,
    ResourceDescriptor, SshAccess, SSH_AVAILABLE_WHEN_READY, SSH_NOT_AVAILABLE,
};
pub use family::InstanceFamily;
pub use registry::{InstanceId, InstanceRecord, InstanceRegistry};
pub use service::{InstanceDetail, InstanceService, TerminatedInstance};
pub use timestamp::{parse_timestamp, Uptime, UNKNOWN_UPTIME};
pub use view::{ExposedPort, HardwareSummary, NormalizedInstanceView};
