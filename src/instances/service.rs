//! Aggregation and dispatch over the three instance families.
//!
//! Collections are fetched concurrently and joined; the first failure aborts
//! the whole operation so a listing never mixes real data with a silently
//! missing family.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::DisplayDefaults;
use crate::error::{HyperbolicError, Result};
use crate::marketplace::InstanceApi;

use super::family::InstanceFamily;
use super::registry::{InstanceId, InstanceRegistry};
use super::view::NormalizedInstanceView;

/// A resolved instance: its normalized view plus the raw upstream record.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceDetail {
    /// Display-ready view.
    pub view: NormalizedInstanceView,
    /// Upstream record as JSON.
    pub raw: serde_json::Value,
}

/// Outcome of a successful termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminatedInstance {
    /// Family the termination was routed to.
    pub family: InstanceFamily,
    /// ID that was terminated.
    pub id: String,
}

/// Instance operations over an [`InstanceApi`].
#[derive(Debug, Clone)]
pub struct InstanceService<A> {
    api: A,
    defaults: DisplayDefaults,
}

impl<A: InstanceApi> InstanceService<A> {
    /// Creates a service with the default display placeholders.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::with_defaults(api, DisplayDefaults::default())
    }

    /// Creates a service with custom display placeholders.
    #[must_use]
    pub const fn with_defaults(api: A, defaults: DisplayDefaults) -> Self {
        Self { api, defaults }
    }

    /// Display placeholders in use.
    #[must_use]
    pub const fn defaults(&self) -> &DisplayDefaults {
        &self.defaults
    }

    /// Fetches all three collections concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any of the three fetches.
    pub async fn list_all(&self) -> Result<InstanceRegistry> {
        info!("Fetching spot, virtual machine and bare-metal instances");

        let (spot, vm, bm) = tokio::try_join!(
            self.api.list_spot_instances(),
            self.api.list_virtual_machine_rentals(),
            self.api.list_bare_metal_rentals(),
        )?;

        let registry = InstanceRegistry::new(spot, vm, bm);
        debug!("Fetched {} instances", registry.len());
        Ok(registry)
    }

    /// Resolves one instance by ID.
    ///
    /// Returns `None` if no collection holds a matching record.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection fails to load.
    pub async fn detail(&self, id: &str) -> Result<Option<InstanceDetail>> {
        let registry = self.list_all().await?;

        let Some(record) = registry.find_by_id(id) else {
            return Ok(None);
        };

        let raw = serde_json::to_value(record)
            .map_err(|e| HyperbolicError::internal(format!("Failed to encode instance: {e}")))?;

        Ok(Some(InstanceDetail {
            view: record.describe(&self.defaults),
            raw,
        }))
    }

    /// Terminates an instance, routing to the endpoint of its family.
    ///
    /// Non-numeric IDs are sent to the spot endpoint. Numeric IDs are looked
    /// up in the VM and bare-metal ID listings; `None` is returned if
    /// neither holds the ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a routing lookup or the termination call fails.
    pub async fn terminate(&self, id: &str) -> Result<Option<TerminatedInstance>> {
        let rental_id = match InstanceId::parse(id) {
            InstanceId::Spot(spot_id) => {
                info!("Terminating spot instance {spot_id}");
                self.api.terminate_spot_instance(&spot_id).await?;
                return Ok(Some(TerminatedInstance {
                    family: InstanceFamily::Spot,
                    id: spot_id,
                }));
            }
            InstanceId::OnDemand(rental_id) => rental_id,
        };

        let family = match self.resolve_on_demand_family(rental_id).await? {
            Some(InstanceFamily::VirtualMachine) => {
                self.api.terminate_virtual_machine_rental(rental_id).await?;
                InstanceFamily::VirtualMachine
            }
            Some(InstanceFamily::BareMetal) => {
                self.api.terminate_bare_metal_rental(rental_id).await?;
                InstanceFamily::BareMetal
            }
            Some(InstanceFamily::Spot) | None => return Ok(None),
        };

        info!("Terminated {family} rental {rental_id}");
        Ok(Some(TerminatedInstance {
            family,
            id: rental_id.to_string(),
        }))
    }

    /// Determines whether a rental ID belongs to a VM or a bare-metal rental.
    ///
    /// VMs win when both listings contain the ID.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either ID listing.
    pub async fn resolve_on_demand_family(&self, rental_id: i64) -> Result<Option<InstanceFamily>> {
        let (vm_ids, bm_ids) = tokio::try_join!(
            self.api.list_virtual_machine_rental_ids(),
            self.api.list_bare_metal_rental_ids(),
        )?;

        let family = if vm_ids.iter().any(|r| r.id == rental_id) {
            Some(InstanceFamily::VirtualMachine)
        } else if bm_ids.iter().any(|r| r.id == rental_id) {
            Some(InstanceFamily::BareMetal)
        } else {
            None
        };

        debug!("Rental {rental_id} routes to {family:?}");
        Ok(family)
    }
}
