//! Instance families.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three resource families the marketplace exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceFamily {
    /// Containerized, interruptible rental with a string ID.
    Spot,
    /// On-demand virtual machine with an integer ID.
    VirtualMachine,
    /// On-demand bare-metal fleet with an integer ID.
    BareMetal,
}

impl InstanceFamily {
    /// Returns true for virtual-machine and bare-metal rentals.
    #[must_use]
    pub const fn is_on_demand(self) -> bool {
        matches!(self, Self::VirtualMachine | Self::BareMetal)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spot => "Spot",
            Self::VirtualMachine => "Virtual Machine",
            Self::BareMetal => "Bare Metal",
        }
    }
}

impl fmt::Display for InstanceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_demand_families() {
        assert!(!InstanceFamily::Spot.is_on_demand());
        assert!(InstanceFamily::VirtualMachine.is_on_demand());
        assert!(InstanceFamily::BareMetal.is_on_demand());
        assert_eq!(InstanceFamily::BareMetal.to_string(), "Bare Metal");
    }
}
