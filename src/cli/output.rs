//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::catalog::{
    NetworkType, OfferSelection, OnDemandOrder, OnDemandTier, SpotOffer, SpotOrder, TierKind,
    BARE_METAL_NODE_GPUS,
};
use crate::config::DisplayDefaults;
use crate::instances::{
    is_starting_up, HourlyPrice, InstanceDetail, InstanceFamily, InstanceRegistry,
    NormalizedInstanceView, SshAccess, TerminatedInstance,
};
use crate::marketplace::{
    AccountBalance, AccountSummary, MarketplaceListing, OnDemandOptions, OnDemandRental,
    SpotRentResponse,
};

use super::commands::OutputFormat;

/// Hint printed under a non-empty listing.
const DETAIL_HINT: &str = "Run 'hyperbolic instances <instance-id>' to view full instance information, port forwards, ip addresses, and more.";

/// Printed after a successful rental.
const STATUS_HINT: &str = "To view the status and get the SSH command, run:\n  hyperbolic instances\n";

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Spot instance row for table display.
#[derive(Tabled)]
struct SpotRow {
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "INSTANCE ID")]
    id: String,
    #[tabled(rename = "GPU MODEL")]
    gpu_model: String,
    #[tabled(rename = "COUNT")]
    gpu_count: String,
    #[tabled(rename = "SSH COMMAND")]
    ssh: String,
    #[tabled(rename = "PORTS")]
    ports: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "UPTIME")]
    uptime: String,
}

/// On-demand rental row for table display.
#[derive(Tabled)]
struct OnDemandRow {
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TYPE")]
    family: String,
    #[tabled(rename = "INSTANCE ID")]
    id: String,
    #[tabled(rename = "GPU MODEL")]
    gpu_model: String,
    #[tabled(rename = "COUNT")]
    gpu_count: String,
    #[tabled(rename = "SSH COMMAND")]
    ssh: String,
    #[tabled(rename = "NETWORKING")]
    networking: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "UPTIME")]
    uptime: String,
}

/// Spot availability row, cheapest first.
#[derive(Tabled)]
struct OfferRow {
    #[tabled(rename = "GPU MODEL")]
    gpu_model: String,
    #[tabled(rename = "COUNT")]
    count: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "CLUSTER")]
    cluster: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "CPU CORES")]
    cpu_cores: u32,
    #[tabled(rename = "RAM (GB)")]
    ram_gb: u64,
    #[tabled(rename = "STORAGE (GB)")]
    storage_gb: u64,
    #[tabled(rename = "REGION")]
    region: String,
}

/// Spot availability row grouped by model.
#[derive(Tabled)]
struct OfferViewRow {
    #[tabled(rename = "ID")]
    node: String,
    #[tabled(rename = "GPU MODEL")]
    gpu_model: String,
    #[tabled(rename = "GPU COUNT")]
    gpus_total: u32,
    #[tabled(rename = "AVAILABLE")]
    gpus_available: u32,
    #[tabled(rename = "CPU CORES")]
    cpu_cores: u32,
    #[tabled(rename = "RAM (GB)")]
    ram_gb: u64,
    #[tabled(rename = "STORAGE (GB)")]
    storage_gb: u64,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "REGION")]
    region: String,
    #[tabled(rename = "CLUSTER NAME")]
    cluster: String,
}

/// On-demand pricing row.
#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "GPU TYPE")]
    gpu_model: String,
    #[tabled(rename = "INSTANCE TYPE")]
    kind: String,
    #[tabled(rename = "COUNT")]
    counts: String,
    #[tabled(rename = "PRICE/GPU/HR")]
    price: String,
}

impl From<&SpotOffer> for OfferRow {
    fn from(offer: &SpotOffer) -> Self {
        Self {
            gpu_model: offer.gpu_model.clone(),
            count: format!("{}/{}", offer.gpus_available, offer.gpus_total),
            price: format!("${:.2}", offer.price.dollars()),
            cluster: offer.cluster.clone(),
            node: offer.node.clone(),
            cpu_cores: offer.cpu_cores,
            ram_gb: offer.ram_gb,
            storage_gb: offer.storage_gb,
            region: offer.region.clone(),
        }
    }
}

impl From<&SpotOffer> for OfferViewRow {
    fn from(offer: &SpotOffer) -> Self {
        Self {
            node: offer.node.clone(),
            gpu_model: offer.gpu_model.clone(),
            gpus_total: offer.gpus_total,
            gpus_available: offer.gpus_available,
            cpu_cores: offer.cpu_cores,
            ram_gb: offer.ram_gb,
            storage_gb: offer.storage_gb,
            price: format!("${:.2}/{}", offer.price.dollars(), offer.period),
            region: offer.region.clone(),
            cluster: offer.cluster.clone(),
        }
    }
}

impl From<&OnDemandTier> for TierRow {
    fn from(tier: &OnDemandTier) -> Self {
        Self {
            gpu_model: tier.gpu_model.clone(),
            kind: tier.kind.to_string(),
            counts: tier.counts.clone(),
            price: format!("${:.2}", tier.price_per_gpu),
        }
    }
}

impl From<&NormalizedInstanceView> for SpotRow {
    fn from(view: &NormalizedInstanceView) -> Self {
        Self {
            status: OutputFormatter::format_status(&view.status),
            id: view.id.clone(),
            gpu_model: view.resources.gpu_model.clone(),
            gpu_count: view.resources.gpu_count.to_string(),
            ssh: OutputFormatter::ssh_cell(&view.resources.ssh),
            ports: view.port_list(),
            price: view.resources.price.to_string(),
            uptime: view.uptime.to_string(),
        }
    }
}

impl From<&NormalizedInstanceView> for OnDemandRow {
    fn from(view: &NormalizedInstanceView) -> Self {
        Self {
            status: OutputFormatter::format_status(&view.status),
            family: view.family.to_string(),
            id: view.id.clone(),
            gpu_model: view.resources.gpu_model.clone(),
            gpu_count: view.resources.gpu_count.to_string(),
            ssh: OutputFormatter::ssh_cell(&view.resources.ssh),
            networking: view
                .resources
                .network
                .as_ref()
                .map_or_else(String::new, |n| n.topology.clone()),
            price: view.resources.price.to_string(),
            uptime: view.uptime.to_string(),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the instance listing.
    #[must_use]
    pub fn format_listing(
        &self,
        registry: &InstanceRegistry,
        defaults: &DisplayDefaults,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(registry).unwrap_or_default(),
            OutputFormat::Text => Self::format_listing_text(registry, defaults),
        }
    }

    /// Formats the listing as tables.
    fn format_listing_text(registry: &InstanceRegistry, defaults: &DisplayDefaults) -> String {
        if registry.is_empty() {
            return String::from("No instances found.\n");
        }

        let views = registry.views(defaults);
        let (on_demand, spot): (Vec<_>, Vec<_>) =
            views.iter().partition(|v| v.family.is_on_demand());

        let mut output = String::new();

        if !spot.is_empty() {
            output.push_str("SPOT INSTANCES:\n");
            let rows: Vec<SpotRow> = spot.into_iter().map(SpotRow::from).collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        if !on_demand.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("ON-DEMAND INSTANCES:\n");
            let rows: Vec<OnDemandRow> = on_demand.into_iter().map(OnDemandRow::from).collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let _ = write!(output, "\n{DETAIL_HINT}\n");
        output
    }

    /// Formats a single instance.
    ///
    /// JSON output is the raw upstream record.
    #[must_use]
    pub fn format_detail(&self, detail: &InstanceDetail) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&detail.raw).unwrap_or_default(),
            OutputFormat::Text if detail.view.family == InstanceFamily::Spot => {
                Self::format_spot_detail(&detail.view)
            }
            OutputFormat::Text => Self::format_on_demand_detail(&detail.view),
        }
    }

    fn format_spot_detail(view: &NormalizedInstanceView) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "Instance ID: {}", view.id);
        let _ = writeln!(output, "Status: {}", Self::format_status(&view.status));
        let _ = writeln!(output, "Created: {}", view.created);
        Self::write_run_times(&mut output, view, "Ended");

        let _ = writeln!(output, "GPU Model: {}", view.resources.gpu_model);
        let _ = writeln!(output, "GPU Count: {}", view.resources.gpu_count);
        if let Some(ram) = view.hardware.gpu_ram_gb {
            let _ = writeln!(output, "GPU RAM: {ram} GB");
        }
        let _ = writeln!(output, "Price: {}", view.resources.price);
        Self::write_ssh(&mut output, &view.resources.ssh);

        if view.ports.is_empty() {
            output.push_str("No ports exposed\n");
        }
        for port in &view.ports {
            let _ = writeln!(output, "Public URL for port {}: {}", port.port, port.url);
        }

        output
    }

    fn format_on_demand_detail(view: &NormalizedInstanceView) -> String {
        let mut output = String::new();
        let gpus = view.resources.gpu_count;

        let _ = writeln!(output, "Instance Details: {}", view.id);
        let _ = writeln!(output, "Type: {}", view.family);
        let _ = writeln!(output, "Status: {}", Self::format_status(&view.status));
        if !view.name.is_empty() {
            let _ = writeln!(output, "Name: {}", view.name);
        }
        if !view.created.is_empty() {
            let _ = writeln!(output, "Created: {}", view.created);
        }
        Self::write_run_times(&mut output, view, "Terminated");

        if gpus.is_multi_node() {
            let _ = writeln!(output, "Total GPUs: {} ({gpus})", gpus.total());
            let _ = writeln!(output, "Node Count: {}", gpus.node_count);
            let _ = writeln!(output, "GPUs per Node: {}", gpus.per_node);
        } else {
            let _ = writeln!(output, "GPU Count: {}", gpus.total());
        }
        let _ = writeln!(output, "GPU Model: {}", view.resources.gpu_model);

        let hw = &view.hardware;
        if let Some(ram) = hw.ram_gb {
            let _ = writeln!(output, "RAM: {ram} GB");
        }
        if let Some(storage) = hw.storage_gb {
            let _ = writeln!(output, "Storage: {storage} GB");
        }
        if let Some(vcpus) = hw.vcpu_count {
            let _ = writeln!(output, "vCPU Count: {vcpus}");
        }
        if let Some(cpus) = hw.cpu_count {
            let _ = writeln!(output, "CPU Count: {cpus}");
        }
        if let Some(model) = &hw.cpu_model {
            let _ = writeln!(output, "CPU Model: {model}");
        }

        let _ = writeln!(output, "Price: {}", view.resources.price);
        if let Some(network) = &view.resources.network {
            let _ = writeln!(output, "Network Type: {}", network.topology);
        }
        if let Some(os) = &view.operating_system {
            let _ = writeln!(output, "Operating System: {os}");
        }
        Self::write_ssh(&mut output, &view.resources.ssh);

        if !view.port_forwards.is_empty() {
            output.push_str("Port Forwards:\n");
            for forward in &view.port_forwards {
                let _ = writeln!(
                    output,
                    "  External Port {} → Internal Port {}",
                    forward.external_port, forward.internal_port
                );
            }
        }

        if let Some(network) = &view.resources.network {
            let lines = network.address_lines();
            if network.nodes.len() > 1 {
                let _ = writeln!(output, "Network Information ({} nodes):", network.nodes.len());
            } else if !lines.is_empty() {
                output.push_str("Network Information:\n");
            }
            for line in lines {
                let _ = writeln!(output, "  {line}");
            }
        }

        output
    }

    /// Writes the start time, uptime and end time lines.
    fn write_run_times(output: &mut String, view: &NormalizedInstanceView, end_label: &str) {
        if !view.started.is_empty() {
            let _ = writeln!(output, "Started: {}", view.started);
            let _ = writeln!(output, "Uptime: {}", view.uptime);
        }
        if let Some(ended) = &view.ended {
            let _ = writeln!(output, "{end_label}: {ended}");
        }
    }

    fn write_ssh(output: &mut String, ssh: &SshAccess) {
        if ssh.commands().len() > 1 {
            output.push_str("SSH Commands:\n");
            for line in ssh.to_string().lines() {
                let _ = writeln!(output, "  {line}");
            }
        } else {
            let _ = writeln!(output, "SSH Command: {ssh}");
        }
    }

    /// Formats an instance that could not be found.
    #[must_use]
    pub fn format_not_found(&self, id: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "status": "not_found",
                "id": id,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => format!("Instance '{id}' not found.\n"),
        }
    }

    /// Formats a successful termination.
    #[must_use]
    pub fn format_terminated(&self, terminated: &TerminatedInstance) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(terminated).unwrap_or_default(),
            OutputFormat::Text => format!(
                "{} Successfully terminated {} instance {}\n",
                "✓".green(),
                terminated.family,
                terminated.id
            ),
        }
    }

    /// Formats the account balance.
    #[must_use]
    pub fn format_balance(&self, balance: &AccountBalance) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(balance).unwrap_or_default(),
            OutputFormat::Text => format!("Balance: ${:.2}\n", balance.dollars()),
        }
    }

    /// Formats the account profile and balance.
    #[must_use]
    pub fn format_account(&self, account: &AccountSummary) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(account).unwrap_or_default(),
            OutputFormat::Text => format!(
                "Email: {}\nBalance: ${:.2}\n",
                account.user.email,
                account.balance.dollars()
            ),
        }
    }

    /// Formats spot availability, cheapest first.
    ///
    /// JSON output is the full listing, unfiltered.
    #[must_use]
    pub fn format_spot_offers(
        &self,
        listing: &MarketplaceListing,
        selection: &OfferSelection,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(listing).unwrap_or_default(),
            OutputFormat::Text => {
                let rows: Vec<OfferRow> = selection.offers.iter().map(OfferRow::from).collect();
                let mut output = String::from("Prices are shown per GPU per hour in USD.\n");
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                Self::write_selection_footer(&mut output, selection);
                output
            }
        }
    }

    /// Formats spot availability grouped by GPU model.
    ///
    /// JSON output is the full listing, unfiltered.
    #[must_use]
    pub fn format_offer_view(
        &self,
        listing: &MarketplaceListing,
        selection: &OfferSelection,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(listing).unwrap_or_default(),
            OutputFormat::Text => {
                let rows: Vec<OfferViewRow> =
                    selection.offers.iter().map(OfferViewRow::from).collect();
                let mut output = Table::new(rows).to_string();
                output.push('\n');
                Self::write_selection_footer(&mut output, selection);
                output
            }
        }
    }

    fn write_selection_footer(output: &mut String, selection: &OfferSelection) {
        let _ = write!(
            output,
            "\nShowing {} instances with available GPUs.\n",
            selection.offers.len()
        );
        if !selection.show_all && selection.hidden() > 0 {
            let _ = writeln!(output, "Use --all flag to show all {} instances.", selection.listed);
        }
    }

    /// Formats on-demand pricing.
    ///
    /// JSON output is both raw option sets.
    #[must_use]
    pub fn format_on_demand_options(
        &self,
        options: &OnDemandOptions,
        tiers: &[OnDemandTier],
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(options).unwrap_or_default(),
            OutputFormat::Text => {
                let rows: Vec<TierRow> = tiers.iter().map(TierRow::from).collect();
                let mut output = Table::new(rows).to_string();
                output.push('\n');

                let _ = write!(
                    output,
                    "\nBare Metal instances can be configured in multiples of {BARE_METAL_NODE_GPUS} GPUs, subject to availability.\n"
                );
                let ethernet = OnDemandTier::price_of(tiers, TierKind::BareMetal(NetworkType::Ethernet));
                let infiniband =
                    OnDemandTier::price_of(tiers, TierKind::BareMetal(NetworkType::Infiniband));
                if let (Some(base), Some(fabric)) = (ethernet, infiniband) {
                    let _ = write!(
                        output,
                        "\nInfiniBand adds ${:.2} to the base price of ${base:.2}/hr\n",
                        fabric - base
                    );
                }
                output.push_str("For rental options, run: `hyperbolic rent ondemand --help`\n");
                output
            }
        }
    }

    /// Formats an accepted spot rental. `response` is `None` when upstream
    /// answered with an unreadable body.
    #[must_use]
    pub fn format_spot_rented(
        &self,
        order: &SpotOrder,
        response: Option<&SpotRentResponse>,
    ) -> String {
        let request = order.request();

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "status": "requested",
                "request": request,
                "response": response,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = match response.filter(|r| !r.instance_id.is_empty()) {
                    Some(r) => format!(
                        "{} Successfully requested GPU instance: {}\n",
                        "✓".green(),
                        r.instance_id
                    ),
                    None => format!("{} Successfully requested GPU instance.\n", "✓".green()),
                };
                let _ = write!(
                    output,
                    "Configuration: {}/{} with {} GPU(s)\n\n{STATUS_HINT}",
                    request.cluster_name, request.node_name, request.gpu_count
                );
                if order.exposes_ports() {
                    output.push_str(
                        "\nTo view public URLs for exposed ports, run:\n  hyperbolic instances <instance-id>\n",
                    );
                }
                output
            }
        }
    }

    /// Formats an accepted on-demand rental. `rental` is `None` when
    /// upstream answered with an unreadable body.
    #[must_use]
    pub fn format_on_demand_rented(
        &self,
        order: &OnDemandOrder,
        rental: Option<&OnDemandRental>,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "status": "requested",
                "family": order.family(),
                "gpu_count": order.gpu_count(),
                "network_type": order.network().map(NetworkType::as_str),
                "rental": rental,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = match rental {
                    Some(r) => format!(
                        "{} Successfully requested on-demand GPU instance with id: {}\n",
                        "✓".green(),
                        r.id
                    ),
                    None => format!("{} Successfully requested on-demand GPU instance.\n", "✓".green()),
                };
                let _ = write!(output, "Configuration: {} with {} GPU(s)", order.family(), order.gpu_count());
                if let Some(network) = order.network() {
                    let _ = write!(output, ", {network} network");
                }
                output.push('\n');
                if let Some(r) = rental {
                    let _ = writeln!(output, "Total cost: {}", HourlyPrice::per_allocation(r.cost_per_hour));
                }
                let _ = write!(output, "\n{STATUS_HINT}");
                output
            }
        }
    }

    /// Formats confirmation that the API key was saved.
    #[must_use]
    pub fn format_key_saved(&self, path: &Path) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "status": "success",
                "path": path,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => format!(
                "{} API key saved successfully to {}\n",
                "✓".green(),
                path.display()
            ),
        }
    }

    /// Formats an upstream status with color.
    fn format_status(status: &str) -> String {
        match status.trim().to_ascii_lowercase().as_str() {
            "running" | "online" => status.green().to_string(),
            s if is_starting_up(s) => status.yellow().to_string(),
            "terminated" | "terminating" | "failed" | "stopped" | "error" => {
                status.red().to_string()
            }
            _ => status.dimmed().to_string(),
        }
    }

    /// SSH table cell: commands one per line, or the placeholder.
    fn ssh_cell(ssh: &SshAccess) -> String {
        match ssh {
            SshAccess::Ready(commands) => commands.join("\n"),
            SshAccess::AvailableWhenReady | SshAccess::NotAvailable => ssh.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::{
        NodeNetworking, NodeSpecs, OnDemandRental, PortForward, RentalMeta, SpotInstance,
        SpotInstanceDetails,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn registry() -> InstanceRegistry {
        InstanceRegistry::new(
            vec![SpotInstance {
                id: String::from("abc123"),
                instance: SpotInstanceDetails {
                    status: String::from("running"),
                    gpu_count: 1,
                    ..SpotInstanceDetails::default()
                },
                ..SpotInstance::default()
            }],
            vec![OnDemandRental {
                id: 501,
                cost_per_hour: 149,
                status: String::from("running"),
                meta: RentalMeta {
                    gpu_count: 1,
                    public_ip: String::from("198.51.100.4"),
                    port_forwards: vec![PortForward {
                        external_port: 30022,
                        internal_port: 22,
                    }],
                    ..RentalMeta::default()
                },
                ..OnDemandRental::default()
            }],
            vec![OnDemandRental {
                id: 777,
                cost_per_hour: 2400,
                status: String::from("running"),
                meta: RentalMeta {
                    node_count: 2,
                    username: String::from("ubuntu"),
                    network_type: String::from("infiniband"),
                    specs_per_node: Some(NodeSpecs {
                        gpu_count: 8,
                        ..NodeSpecs::default()
                    }),
                    node_networking: vec![
                        NodeNetworking {
                            public_ip: String::from("203.0.113.10"),
                            private_ip: String::from("10.0.0.10"),
                        },
                        NodeNetworking {
                            public_ip: String::from("203.0.113.11"),
                            private_ip: String::from("10.0.0.11"),
                        },
                    ],
                    ..RentalMeta::default()
                },
                ..OnDemandRental::default()
            }],
        )
    }

    fn detail(id: &str) -> InstanceDetail {
        let registry = registry();
        let record = registry.find_by_id(id).expect("record");
        InstanceDetail {
            view: record.describe(&DisplayDefaults::default()),
            raw: serde_json::to_value(record).expect("json"),
        }
    }

    #[test]
    fn test_empty_listing() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_listing(&InstanceRegistry::default(), &DisplayDefaults::default());
        assert_eq!(output, "No instances found.\n");
    }

    #[test]
    fn test_listing_tables() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_listing(&registry(), &DisplayDefaults::default());

        assert!(output.contains("SPOT INSTANCES:"));
        assert!(output.contains("ON-DEMAND INSTANCES:"));
        assert!(output.contains("abc123"));
        assert!(output.contains("Virtual Machine"));
        assert!(output.contains("Bare Metal"));
        assert!(output.contains("8×2"));
        assert!(output.contains("Infiniband"));
        assert!(output.contains("$1.49/hr"));
        assert!(output.contains(DETAIL_HINT));
    }

    #[test]
    fn test_listing_json_shape() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_listing(&registry(), &DisplayDefaults::default());
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["spot_instances"][0]["id"], "abc123");
        assert_eq!(json["vm_instances"][0]["id"], 501);
        assert_eq!(json["bm_instances"][0]["id"], 777);
    }

    #[test]
    fn test_bare_metal_detail() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_detail(&detail("777"));

        assert!(output.contains("Type: Bare Metal"));
        assert!(output.contains("Total GPUs: 16 (8×2)"));
        assert!(output.contains("SSH Commands:"));
        assert!(output.contains("  Node 2: ssh ubuntu@203.0.113.11"));
        assert!(output.contains("Network Information (2 nodes):"));
        assert!(output.contains("  Node 1: Public IP 203.0.113.10, Private IP 10.0.0.10"));
    }

    #[test]
    fn test_vm_detail() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_detail(&detail("501"));

        assert!(output.contains("Type: Virtual Machine"));
        assert!(output.contains("GPU Count: 1"));
        assert!(output.contains("SSH Command: ssh user@198.51.100.4"));
        assert!(output.contains("External Port 30022 → Internal Port 22"));
        assert!(output.contains("Network Type: Ethernet"));
        assert!(output.contains("  Public IP: 198.51.100.4"));
    }

    #[test]
    fn test_spot_detail() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_detail(&detail("abc123"));

        assert!(output.contains("Instance ID: abc123"));
        assert!(output.contains("SSH Command: SSH details not available"));
        assert!(output.contains("No ports exposed"));
    }

    #[test]
    fn test_detail_json_is_raw_record() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_detail(&detail("777"));
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["costPerHour"], 2400);
        assert_eq!(json["meta"]["node_count"], 2);
    }

    #[test]
    fn test_balance_and_termination() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);

        assert_eq!(
            formatter.format_balance(&AccountBalance { credits: 12_345 }),
            "Balance: $123.45\n"
        );

        let output = formatter.format_terminated(&TerminatedInstance {
            family: InstanceFamily::BareMetal,
            id: String::from("777"),
        });
        assert!(output.contains("Successfully terminated Bare Metal instance 777"));

        assert_eq!(formatter.format_not_found("nope"), "Instance 'nope' not found.\n");
    }

    fn account() -> AccountSummary {
        AccountSummary {
            user: crate::marketplace::UserProfile {
                email: String::from("dev@example.com"),
                ..crate::marketplace::UserProfile::default()
            },
            balance: AccountBalance { credits: 2_050 },
        }
    }

    #[test]
    fn test_account_text_and_json() {
        let text = OutputFormatter::new(OutputFormat::Text).format_account(&account());
        assert_eq!(text, "Email: dev@example.com\nBalance: $20.50\n");

        let json = OutputFormatter::new(OutputFormat::Json).format_account(&account());
        let json: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(json["user"]["email"], "dev@example.com");
        assert_eq!(json["balance"]["credits"], 2050);
    }

    fn marketplace() -> MarketplaceListing {
        serde_json::from_value(serde_json::json!({
            "instances": [
                {
                    "id": "node-a", "cluster_name": "cluster-1", "gpus_total": 8, "gpus_reserved": 3,
                    "hardware": {"gpus": [{"model": "NVIDIA-H100", "ram": 81559}], "cpus": [{"virtual_cores": 64}]},
                    "location": {"region": "us-east"},
                    "pricing": {"price": {"amount": 150, "period": "hourly"}}
                },
                {
                    "id": "node-full", "cluster_name": "cluster-2", "gpus_total": 8, "gpus_reserved": 8,
                    "pricing": {"price": {"amount": 99, "period": "hourly"}}
                }
            ]
        }))
        .expect("listing")
    }

    #[test]
    fn test_spot_offers_table() {
        use crate::catalog::OfferOrder;

        plain();
        let listing = marketplace();
        let selection =
            OfferSelection::new(&listing, false, OfferOrder::PriceFirst, &DisplayDefaults::default());
        let output = OutputFormatter::new(OutputFormat::Text).format_spot_offers(&listing, &selection);

        assert!(output.starts_with("Prices are shown per GPU per hour in USD."));
        assert!(output.contains("5/8"));
        assert!(output.contains("$1.50"));
        assert!(!output.contains("node-full"));
        assert!(output.contains("Showing 1 instances with available GPUs."));
        assert!(output.contains("Use --all flag to show all 2 instances."));
    }

    #[test]
    fn test_offer_view_with_all() {
        use crate::catalog::OfferOrder;

        plain();
        let listing = marketplace();
        let selection =
            OfferSelection::new(&listing, true, OfferOrder::ModelFirst, &DisplayDefaults::default());
        let output = OutputFormatter::new(OutputFormat::Text).format_offer_view(&listing, &selection);

        assert!(output.contains("CLUSTER NAME"));
        assert!(output.contains("$0.99/hourly"));
        assert!(output.contains("N/A"));
        assert!(output.contains("Showing 2 instances with available GPUs."));
        assert!(!output.contains("--all"));

        let json = OutputFormatter::new(OutputFormat::Json).format_offer_view(&listing, &selection);
        let json: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(json["instances"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_on_demand_pricing_text() {
        use crate::marketplace::{BareMetalOption, BareMetalOptions, VirtualMachineOption};

        plain();
        let options = OnDemandOptions {
            virtual_machine_options: vec![
                VirtualMachineOption { gpu_count: 8, cost_per_hour: 1.39 },
                VirtualMachineOption { gpu_count: 1, cost_per_hour: 1.49 },
            ],
            bare_metal_options: BareMetalOptions {
                ethernet: BareMetalOption { gpu_count: 64, cost_per_hour: 1.99 },
                infiniband: BareMetalOption { gpu_count: 32, cost_per_hour: 2.49 },
            },
        };
        let tiers = OnDemandTier::from_options(&options, &DisplayDefaults::default()).expect("tiers");
        let output =
            OutputFormatter::new(OutputFormat::Text).format_on_demand_options(&options, &tiers);

        assert!(output.contains("Virtual Machine"));
        assert!(output.contains("1, 8"));
        assert!(output.contains("Bare Metal (InfiniBand)"));
        assert!(output.contains("8–32 (×8)"));
        assert!(output.contains("InfiniBand adds $0.50 to the base price of $1.99/hr"));

        let json = OutputFormatter::new(OutputFormat::Json).format_on_demand_options(&options, &tiers);
        let json: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(json["virtualMachineOptions"][0]["gpuCount"], 8);
        assert_eq!(json["bareMetalOptions"]["infiniband"]["gpuCount"], 32);
    }

    #[test]
    fn test_spot_rented() {
        plain();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let order = SpotOrder::new("cluster-1", "node-a", 2, &[8080]).expect("order");
        let response = SpotRentResponse {
            instance_id: String::from("quiet-fox-42"),
            ..SpotRentResponse::default()
        };

        let output = formatter.format_spot_rented(&order, Some(&response));
        assert!(output.contains("Successfully requested GPU instance: quiet-fox-42"));
        assert!(output.contains("Configuration: cluster-1/node-a with 2 GPU(s)"));
        assert!(output.contains("hyperbolic instances <instance-id>"));

        let order = SpotOrder::new("cluster-1", "node-a", 1, &[]).expect("order");
        let output = formatter.format_spot_rented(&order, None);
        assert!(output.contains("Successfully requested GPU instance.\n"));
        assert!(!output.contains("exposed ports"));
    }

    #[test]
    fn test_on_demand_rented() {
        plain();
        let order =
            OnDemandOrder::new(InstanceFamily::BareMetal, 16, Some(NetworkType::Infiniband)).expect("order");
        let rental = OnDemandRental {
            id: 912,
            cost_per_hour: 3984,
            ..OnDemandRental::default()
        };

        let output = OutputFormatter::new(OutputFormat::Text).format_on_demand_rented(&order, Some(&rental));
        assert!(output.contains("Successfully requested on-demand GPU instance with id: 912"));
        assert!(output.contains("Configuration: Bare Metal with 16 GPU(s), InfiniBand network"));
        assert!(output.contains("Total cost: $39.84/hr"));

        let json = OutputFormatter::new(OutputFormat::Json).format_on_demand_rented(&order, None);
        let json: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(json["family"], "bare-metal");
        assert_eq!(json["network_type"], "infiniband");
        assert!(json["rental"].is_null());
    }
}
