//! Configuration module for the Hyperbolic client.
//!
//! This module handles:
//! - Storing and resolving the API key (`~/.hyperbolic/config.json`)
//! - Display fallbacks injected into the instance normalizer

mod credentials;
mod display;

pub use credentials::{
    default_credentials_path, CredentialStore, StoredCredentials, API_KEY_ENV,
};
pub use display::{DisplayDefaults, DEFAULT_ON_DEMAND_GPU_MODEL, DEFAULT_SPOT_GPU_MODEL};
