//! In-memory union of the three instance collections.
//!
//! Lookups search spot instances first, then virtual machines, then bare
//! metal, and return the first match. Rental IDs are only unique within
//! their own family, so a VM and a bare-metal rental sharing a number
//! always resolve to the VM.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::config::DisplayDefaults;
use crate::marketplace::{OnDemandRental, SpotInstance};

use super::family::InstanceFamily;
use super::view::NormalizedInstanceView;

/// An instance ID classified by shape.
///
/// Upstream issues integer IDs for rentals and non-numeric IDs for spot
/// instances. This is the only place that assumption is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceId {
    /// Non-numeric: can only name a spot instance.
    Spot(String),
    /// Integer: names a VM or bare-metal rental.
    OnDemand(i64),
}

impl InstanceId {
    /// Classifies a user-supplied ID.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        value
            .parse::<i64>()
            .map_or_else(|_| Self::Spot(value.to_string()), Self::OnDemand)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spot(id) => f.write_str(id),
            Self::OnDemand(id) => write!(f, "{id}"),
        }
    }
}

/// A record matched by [`InstanceRegistry::find_by_id`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum InstanceRecord<'a> {
    /// A spot instance.
    Spot(&'a SpotInstance),
    /// A virtual-machine rental.
    VirtualMachine(&'a OnDemandRental),
    /// A bare-metal rental.
    BareMetal(&'a OnDemandRental),
}

impl InstanceRecord<'_> {
    /// Family of the matched record.
    #[must_use]
    pub const fn family(&self) -> InstanceFamily {
        match self {
            Self::Spot(_) => InstanceFamily::Spot,
            Self::VirtualMachine(_) => InstanceFamily::VirtualMachine,
            Self::BareMetal(_) => InstanceFamily::BareMetal,
        }
    }

    /// Normalizes the record for display.
    #[must_use]
    pub fn describe(&self, defaults: &DisplayDefaults) -> NormalizedInstanceView {
        match self {
            Self::Spot(spot) => NormalizedInstanceView::from_spot(spot, defaults),
            Self::VirtualMachine(rental) | Self::BareMetal(rental) => {
                NormalizedInstanceView::from_rental(rental, self.family(), defaults)
            }
        }
    }
}

/// All instances fetched in one invocation, in upstream order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceRegistry {
    /// Spot instances.
    pub spot_instances: Vec<SpotInstance>,
    /// Virtual-machine rentals.
    pub vm_instances: Vec<OnDemandRental>,
    /// Bare-metal rentals.
    pub bm_instances: Vec<OnDemandRental>,
}

impl InstanceRegistry {
    /// Creates a registry from the three fetched collections.
    #[must_use]
    pub const fn new(
        spot_instances: Vec<SpotInstance>,
        vm_instances: Vec<OnDemandRental>,
        bm_instances: Vec<OnDemandRental>,
    ) -> Self {
        Self {
            spot_instances,
            vm_instances,
            bm_instances,
        }
    }

    /// Returns true if no collection holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spot_instances.is_empty() && self.vm_instances.is_empty() && self.bm_instances.is_empty()
    }

    /// Total number of records across families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spot_instances.len() + self.vm_instances.len() + self.bm_instances.len()
    }

    /// Finds a record by ID.
    ///
    /// Spot IDs are matched exactly first. Only an integer ID can match a
    /// rental, and virtual machines are searched before bare metal.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<InstanceRecord<'_>> {
        let id = id.trim();

        if let Some(spot) = self.spot_instances.iter().find(|s| s.id == id) {
            debug!("Resolved {id} to a spot instance");
            return Some(InstanceRecord::Spot(spot));
        }

        let InstanceId::OnDemand(rental_id) = InstanceId::parse(id) else {
            debug!("{id} is not numeric and matches no spot instance");
            return None;
        };

        let found = self
            .vm_instances
            .iter()
            .find(|r| r.id == rental_id)
            .map(InstanceRecord::VirtualMachine)
            .or_else(|| {
                self.bm_instances
                    .iter()
                    .find(|r| r.id == rental_id)
                    .map(InstanceRecord::BareMetal)
            });

        match &found {
            Some(record) => debug!("Resolved {id} to a {} rental", record.family()),
            None => debug!("No rental matches {id}"),
        }

        found
    }

    /// Normalized views of every record: spot, then VM, then bare metal.
    #[must_use]
    pub fn views(&self, defaults: &DisplayDefaults) -> Vec<NormalizedInstanceView> {
        let spot = self
            .spot_instances
            .iter()
            .map(|s| NormalizedInstanceView::from_spot(s, defaults));
        let vm = self.vm_instances.iter().map(|r| {
            NormalizedInstanceView::from_rental(r, InstanceFamily::VirtualMachine, defaults)
        });
        let bm = self
            .bm_instances
            .iter()
            .map(|r| NormalizedInstanceView::from_rental(r, InstanceFamily::BareMetal, defaults));

        spot.chain(vm).chain(bm).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(id: &str) -> SpotInstance {
        SpotInstance {
            id: id.to_string(),
            ..SpotInstance::default()
        }
    }

    fn rental(id: i64) -> OnDemandRental {
        OnDemandRental {
            id,
            ..OnDemandRental::default()
        }
    }

    fn registry() -> InstanceRegistry {
        InstanceRegistry::new(
            vec![spot("abc123"), spot("quiet-fox-42")],
            vec![rental(501), rental(900)],
            vec![rental(777), rental(900)],
        )
    }

    #[test]
    fn test_instance_id_parse() {
        assert_eq!(InstanceId::parse("501"), InstanceId::OnDemand(501));
        assert_eq!(InstanceId::parse(" 777 "), InstanceId::OnDemand(777));
        assert_eq!(InstanceId::parse("abc123"), InstanceId::Spot(String::from("abc123")));
        assert_eq!(InstanceId::parse("12.5"), InstanceId::Spot(String::from("12.5")));
        assert_eq!(InstanceId::OnDemand(501).to_string(), "501");
    }

    #[test]
    fn test_find_each_family() {
        let registry = registry();

        let found = registry.find_by_id("abc123").map(|r| r.family());
        assert_eq!(found, Some(InstanceFamily::Spot));

        let found = registry.find_by_id("501").map(|r| r.family());
        assert_eq!(found, Some(InstanceFamily::VirtualMachine));

        let found = registry.find_by_id("777").map(|r| r.family());
        assert_eq!(found, Some(InstanceFamily::BareMetal));
    }

    #[test]
    fn test_colliding_rental_id_resolves_to_vm() {
        let registry = registry();
        let found = registry.find_by_id("900").map(|r| r.family());
        assert_eq!(found, Some(InstanceFamily::VirtualMachine));
    }

    #[test]
    fn test_numeric_input_never_matches_non_numeric_spot() {
        let registry = InstanceRegistry::new(vec![spot("abc123")], Vec::new(), Vec::new());
        assert!(registry.find_by_id("123").is_none());
    }

    #[test]
    fn test_non_numeric_input_never_matches_rental() {
        let registry = registry();
        assert!(registry.find_by_id("501a").is_none());
        assert!(registry.find_by_id("missing").is_none());
    }

    #[test]
    fn test_numeric_spot_id_is_found_first() {
        let registry = InstanceRegistry::new(vec![spot("501")], vec![rental(501)], Vec::new());
        let found = registry.find_by_id("501").map(|r| r.family());
        assert_eq!(found, Some(InstanceFamily::Spot));
    }

    #[test]
    fn test_views_keep_family_order() {
        let registry = registry();
        let families: Vec<InstanceFamily> = registry
            .views(&DisplayDefaults::default())
            .iter()
            .map(|v| v.family)
            .collect();

        assert_eq!(registry.len(), 6);
        assert_eq!(
            families,
            [
                InstanceFamily::Spot,
                InstanceFamily::Spot,
                InstanceFamily::VirtualMachine,
                InstanceFamily::VirtualMachine,
                InstanceFamily::BareMetal,
                InstanceFamily::BareMetal,
            ]
        );
    }

    #[test]
    fn test_registry_json_shape() {
        let json = serde_json::to_value(InstanceRegistry::default()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"spot_instances": [], "vm_instances": [], "bm_instances": []})
        );
        assert!(InstanceRegistry::default().is_empty());
    }

    #[test]
    fn test_record_serializes_raw() {
        let registry = registry();
        let record = registry.find_by_id("777").expect("found");
        let json = serde_json::to_value(record).expect("serialize");
        assert_eq!(json["id"], 777);
    }
}
