//! Instance API trait definition.
//!
//! This is the boundary between the instance aggregation layer and the
//! transport. Each call is a single upstream request with no retry.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{OnDemandRental, RentalRef, SpotInstance};

/// Operations the instance layer needs from the marketplace.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    /// Lists the caller's spot instances.
    async fn list_spot_instances(&self) -> Result<Vec<SpotInstance>>;

    /// Lists the caller's virtual-machine rentals.
    async fn list_virtual_machine_rentals(&self) -> Result<Vec<OnDemandRental>>;

    /// Lists the caller's bare-metal rentals.
    async fn list_bare_metal_rentals(&self) -> Result<Vec<OnDemandRental>>;

    /// Lists virtual-machine rental IDs only.
    async fn list_virtual_machine_rental_ids(&self) -> Result<Vec<RentalRef>>;

    /// Lists bare-metal rental IDs only.
    async fn list_bare_metal_rental_ids(&self) -> Result<Vec<RentalRef>>;

    /// Terminates a spot instance.
    async fn terminate_spot_instance(&self, instance_id: &str) -> Result<()>;

    /// Terminates a virtual-machine rental.
    async fn terminate_virtual_machine_rental(&self, rental_id: i64) -> Result<()>;

    /// Terminates a bare-metal rental.
    async fn terminate_bare_metal_rental(&self, rental_id: i64) -> Result<()>;
}
