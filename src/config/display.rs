//! Display fallbacks used when upstream records omit a value.

/// GPU model shown for spot instances with no hardware entry.
pub const DEFAULT_SPOT_GPU_MODEL: &str = "N/A";

/// GPU model shown for on-demand rentals with no recorded model.
///
/// The on-demand marketplace only offers this SKU, so older rentals that
/// predate per-rental GPU metadata are displayed with it.
pub const DEFAULT_ON_DEMAND_GPU_MODEL: &str = "H100-SXM5-80GB";

/// Placeholder strings substituted for absent upstream fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDefaults {
    /// GPU model for spot instances without hardware details.
    pub spot_gpu_model: String,
    /// GPU model for VM and bare-metal rentals without a model.
    pub on_demand_gpu_model: String,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            spot_gpu_model: DEFAULT_SPOT_GPU_MODEL.to_string(),
            on_demand_gpu_model: DEFAULT_ON_DEMAND_GPU_MODEL.to_string(),
        }
    }
}

impl DisplayDefaults {
    /// Overrides the on-demand GPU model placeholder.
    #[must_use]
    pub fn with_on_demand_gpu_model(mut self, model: &str) -> Self {
        self.on_demand_gpu_model = model.to_string();
        self
    }

    /// Overrides the spot GPU model placeholder.
    #[must_use]
    pub fn with_spot_gpu_model(mut self, model: &str) -> Self {
        self.spot_gpu_model = model.to_string();
        self
    }
}
