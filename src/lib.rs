// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Hyperbolic CLI
//!
//! A command-line client for GPU instances rented on the Hyperbolic
//! marketplace.
//!
//! ## Overview
//!
//! The marketplace exposes three kinds of instance, each with its own
//! schema and ID type:
//!
//! - **Spot** instances: containerized, string IDs, billed per GPU
//! - **Virtual-machine** rentals: integer IDs, billed per allocation
//! - **Bare-metal** rentals: multi-node fleets, integer IDs, billed per allocation
//!
//! This crate fetches all three concurrently, resolves an opaque ID against
//! them, and normalizes GPU, price, uptime, SSH and network details into
//! one view. It also browses what is available to rent and places spot and
//! on-demand rental orders.
//!
//! ## Modules
//!
//! - [`config`]: API key storage and display defaults
//! - [`marketplace`]: Hyperbolic API client and wire types
//! - [`instances`]: Normalization, lookup and termination routing
//! - [`catalog`]: Availability tables and rental orders
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use hyperbolic_cli::{HyperbolicClient, InstanceService};
//!
//! # async fn example() -> hyperbolic_cli::Result<()> {
//! let client = HyperbolicClient::new("my-api-key")?;
//! let service = InstanceService::new(client);
//!
//! if let Some(detail) = service.detail("777").await? {
//!     println!("{} GPUs at {}", detail.view.resources.gpu_count, detail.view.resources.price);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod instances;
pub mod marketplace;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::{OfferSelection, OnDemandOrder, OnDemandTier, SpotOrder};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{CredentialStore, DisplayDefaults};
pub use error::{HyperbolicError, Result};
pub use instances::{
    InstanceFamily, InstanceRegistry, InstanceService, NormalizedInstanceView, Uptime,
};
pub use marketplace::{HyperbolicClient, InstanceApi};
