//! Hyperbolic API client implementation.
//!
//! This module provides the HTTP client for the Hyperbolic marketplace REST
//! API. Every request is attempted exactly once. Only the public spot
//! listing may be fetched without an API key.

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::error::{ApiError, HyperbolicError, Result};

use super::api::InstanceApi;
use super::types::{
    AccountBalance, AccountSummary, BareMetalOptions, BareMetalRentalRequest, MarketplaceListing,
    OnDemandOptions, OnDemandRental, RentalRef, SpotInstance, SpotInstanceList, SpotRentRequest,
    SpotRentResponse, TerminateRentalRequest, TerminateSpotRequest, UserProfile,
    VirtualMachineOption, VirtualMachineRentalRequest,
};

/// Hyperbolic API base URL.
pub const DEFAULT_API_URL: &str = "https://api.hyperbolic.xyz";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SPOT_INSTANCES_PATH: &str = "/v1/marketplace/instances";
const SPOT_TERMINATE_PATH: &str = "/v1/marketplace/instances/terminate";
const VM_RENTALS_PATH: &str = "/v2/marketplace/virtual-machine-rentals";
const VM_TERMINATE_PATH: &str = "/v2/marketplace/virtual-machine-rentals/terminate";
const BM_RENTALS_PATH: &str = "/v2/marketplace/bare-metal-rentals";
const BM_TERMINATE_PATH: &str = "/v2/marketplace/bare-metal-rentals/terminate";
const BALANCE_PATH: &str = "/billing/get_current_balance";
const USER_PATH: &str = "/users/me";
const MARKETPLACE_PATH: &str = "/v1/marketplace";
const SPOT_CREATE_PATH: &str = "/v1/marketplace/instances/create";
const VM_OPTIONS_PATH: &str = "/v2/marketplace/virtual-machine-options";
const BM_OPTIONS_PATH: &str = "/v2/marketplace/bare-metal-options";

/// Marketplace configuration of on-demand H100 virtual machines.
const VM_CONFIG_ID: &str = "c6fd6253-cbb6-4ea8-a20c-47644b431f1c";
/// Marketplace configuration of on-demand H100 bare-metal fleets.
const BM_CONFIG_ID: &str = "a3111bd4-550a-47d0-838a-0a52bff2ae3f";

/// Hyperbolic API client.
#[derive(Debug, Clone)]
pub struct HyperbolicClient {
    /// HTTP client.
    client: Client,
    /// API key; `None` sends no `Authorization` header.
    api_key: Option<String>,
    /// Base URL without trailing slash.
    base_url: String,
}

impl HyperbolicClient {
    /// Creates a new client against the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    /// Creates a client against a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        Self::build(Some(api_key.to_string()), base_url)
    }

    /// Creates a client that sends no API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn anonymous(base_url: &str) -> Result<Self> {
        Self::build(None, base_url)
    }

    fn build(api_key: Option<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry an API key.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one authenticated request and returns the raw status and body.
    ///
    /// # Errors
    ///
    /// Returns a network error if no response was received.
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let url = format!("{}{path}", self.base_url);
        trace!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(api_key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {api_key}"));
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

        Ok((status, bytes.to_vec()))
    }

    /// Sends a request and fails on any non-2xx status.
    async fn fetch_ok(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<u8>> {
        let (status, bytes) = self.fetch(method, path, body).await?;

        if !status.is_success() {
            return Err(HyperbolicError::Api(ApiError::upstream(
                status.as_u16(),
                String::from_utf8_lossy(&bytes),
            )));
        }

        Ok(bytes)
    }

    /// GETs a path and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T> {
        let bytes = self.fetch_ok(Method::GET, path, None).await?;
        decode(&bytes, resource)
    }

    /// POSTs a JSON body and decodes the JSON answer.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        resource: &str,
    ) -> Result<T> {
        let bytes = self.fetch_ok(Method::POST, path, Some(body)).await?;
        decode(&bytes, resource)
    }

    /// POSTs a request whose success does not depend on a readable answer.
    async fn post_accepted<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        resource: &str,
    ) -> Result<Option<T>> {
        let bytes = self.fetch_ok(Method::POST, path, Some(body)).await?;

        match decode(&bytes, resource) {
            Ok(answer) => Ok(Some(answer)),
            Err(e) => {
                debug!("Ignoring unreadable {resource} answer: {e}");
                Ok(None)
            }
        }
    }

    /// POSTs a JSON body, accepting any 2xx answer.
    async fn post(&self, path: &str, body: serde_json::Value) -> Result<()> {
        self.fetch_ok(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    /// Fetches the account credit balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn current_balance(&self) -> Result<AccountBalance> {
        info!("Fetching account balance");
        self.get_json(BALANCE_PATH, "account balance").await
    }

    /// Fetches the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn current_user(&self) -> Result<UserProfile> {
        info!("Fetching user profile");
        self.get_json(USER_PATH, "user profile").await
    }

    /// Fetches profile and balance concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error of either call.
    pub async fn account(&self) -> Result<AccountSummary> {
        let (user, balance) = tokio::try_join!(self.current_user(), self.current_balance())?;
        Ok(AccountSummary { user, balance })
    }

    /// Fetches every spot node listed on the marketplace.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn marketplace_listing(&self) -> Result<MarketplaceListing> {
        info!("Fetching marketplace listing");
        let body = serde_json::json!({ "filters": {} });
        let listing: MarketplaceListing = self
            .post_json(MARKETPLACE_PATH, body, "marketplace listing")
            .await?;
        debug!("Marketplace lists {} nodes", listing.instances.len());
        Ok(listing)
    }

    /// Fetches virtual-machine sizes and bare-metal capacity concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error of either call.
    pub async fn on_demand_options(&self) -> Result<OnDemandOptions> {
        info!("Fetching on-demand options");
        let (virtual_machine_options, bare_metal_options) = tokio::try_join!(
            self.get_json::<Vec<VirtualMachineOption>>(VM_OPTIONS_PATH, "virtual machine options"),
            self.get_json::<BareMetalOptions>(BM_OPTIONS_PATH, "bare-metal options"),
        )?;

        Ok(OnDemandOptions {
            virtual_machine_options,
            bare_metal_options,
        })
    }

    /// Requests a spot rental.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn rent_spot(&self, request: &SpotRentRequest) -> Result<Option<SpotRentResponse>> {
        let body = to_body(request)?;
        self.post_accepted(SPOT_CREATE_PATH, body, "spot rental").await
    }

    /// Requests an on-demand virtual machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn rent_virtual_machine(&self, gpu_count: u32) -> Result<Option<OnDemandRental>> {
        let body = to_body(&VirtualMachineRentalRequest {
            config_id: VM_CONFIG_ID.to_string(),
            gpu_count: gpu_count.to_string(),
        })?;
        self.post_accepted(VM_RENTALS_PATH, body, "virtual machine rental").await
    }

    /// Requests an on-demand bare-metal fleet.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn rent_bare_metal(
        &self,
        network_type: &str,
        gpu_count: u32,
    ) -> Result<Option<OnDemandRental>> {
        let body = to_body(&BareMetalRentalRequest {
            config_id: BM_CONFIG_ID.to_string(),
            network_type: network_type.to_string(),
            gpu_count,
        })?;
        self.post_accepted(BM_RENTALS_PATH, body, "bare-metal rental").await
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], resource: &str) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| HyperbolicError::Api(ApiError::invalid_response(resource, e.to_string())))
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| HyperbolicError::internal(format!("Failed to encode request: {e}")))
}

#[async_trait]
impl InstanceApi for HyperbolicClient {
    async fn list_spot_instances(&self) -> Result<Vec<SpotInstance>> {
        info!("Listing spot instances");
        let list: SpotInstanceList = self.get_json(SPOT_INSTANCES_PATH, "spot instances").await?;
        debug!("Found {} spot instances", list.instances.len());
        Ok(list.instances)
    }

    async fn list_virtual_machine_rentals(&self) -> Result<Vec<OnDemandRental>> {
        info!("Listing virtual machine rentals");
        let rentals: Vec<OnDemandRental> = self
            .get_json(VM_RENTALS_PATH, "virtual machine rentals")
            .await?;
        debug!("Found {} virtual machine rentals", rentals.len());
        Ok(rentals)
    }

    async fn list_bare_metal_rentals(&self) -> Result<Vec<OnDemandRental>> {
        info!("Listing bare-metal rentals");
        let rentals: Vec<OnDemandRental> = self
            .get_json(BM_RENTALS_PATH, "bare-metal rentals")
            .await?;
        debug!("Found {} bare-metal rentals", rentals.len());
        Ok(rentals)
    }

    async fn list_virtual_machine_rental_ids(&self) -> Result<Vec<RentalRef>> {
        self.get_json(VM_RENTALS_PATH, "virtual machine rental ids").await
    }

    async fn list_bare_metal_rental_ids(&self) -> Result<Vec<RentalRef>> {
        self.get_json(BM_RENTALS_PATH, "bare-metal rental ids").await
    }

    async fn terminate_spot_instance(&self, instance_id: &str) -> Result<()> {
        info!("Terminating spot instance: {instance_id}");
        let body = to_body(&TerminateSpotRequest {
            id: instance_id.to_string(),
        })?;
        self.post(SPOT_TERMINATE_PATH, body).await
    }

    async fn terminate_virtual_machine_rental(&self, rental_id: i64) -> Result<()> {
        info!("Terminating virtual machine rental: {rental_id}");
        let body = to_body(&TerminateRentalRequest { rental_id })?;
        self.post(VM_TERMINATE_PATH, body).await
    }

    async fn terminate_bare_metal_rental(&self, rental_id: i64) -> Result<()> {
        info!("Terminating bare-metal rental: {rental_id}");
        let body = to_body(&TerminateRentalRequest { rental_id })?;
        self.post(BM_TERMINATE_PATH, body).await
    }
}
