//! RouterOS script rendering.
//!
//! Output layout:
//!
//! ```text
//! # Generated on Tue Jan 02 15:04:05 UTC 2024
//! # Mikrotik Blacklist (standard)
//! # Total entries: 2
//! #
//! # Sources:
//! #   - DShield: 2 entries
//! #
//! # This list is generated automatically by routeros-blacklist 0.1.0
//! # Do not edit manually.
//! :local ips { \
//! {"1.2.3.0/24"};\
//! {"5.6.7.8/32"};\
//! }
//! :foreach i in=$ips do={
//!   /ip firewall address-list add list=pwlgrzs-blacklist address=$i
//! }
//! ```
//!
//! Rendering is pure: the same inputs and timestamp always give the same bytes.

use chrono::{DateTime, Utc};

use crate::address::{AddressSet, NetworkAddress, SourceCount};
use crate::config::Mode;
use crate::context::RunContext;

/// Header timestamp, e.g. `Tue Jan 02 15:04:05 UTC 2024`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%a %b %d %H:%M:%S %Z %Y").to_string()
}

/// One element of the literal list.
///
/// The last element is rendered exactly like the others.
pub fn render_entry(address: &NetworkAddress) -> String {
    format!("{{\"{}\"}};\\", address)
}

/// Renders address sets into RouterOS `.rsc` scripts
pub struct ScriptRenderer<'a> {
    ctx: &'a RunContext,
    address_list: &'a str,
}

impl<'a> ScriptRenderer<'a> {
    pub fn new(ctx: &'a RunContext, address_list: &'a str) -> Self {
        Self { ctx, address_list }
    }

    /// Render the full script. Addresses come out in their total order.
    pub fn render(&self, mode: Mode, addresses: &AddressSet, counts: &SourceCount) -> String {
        let mut script = self.header(mode, addresses.len(), counts);

        script.push_str(":local ips { \\\n");
        for address in addresses {
            script.push_str(&render_entry(address));
            script.push('\n');
        }
        script.push_str("}\n");

        script.push_str(&self.trailer());
        script
    }

    fn header(&self, mode: Mode, total: usize, counts: &SourceCount) -> String {
        let mut header = format!(
            "# Generated on {}\n# Mikrotik Blacklist ({})\n# Total entries: {}\n#\n# Sources:\n",
            format_timestamp(self.ctx.started_at()),
            mode,
            total
        );

        // SourceCount is keyed by name, so this is already sorted
        for (name, count) in counts {
            header.push_str(&format!("#   - {}: {} entries\n", name, count));
        }

        header.push_str(&format!(
            "#\n# This list is generated automatically by {}\n# Do not edit manually.\n",
            self.ctx.generator()
        ));
        header
    }

    fn trailer(&self) -> String {
        format!(
            ":foreach i in=$ips do={{\n  /ip firewall address-list add list={} address=$i\n}}\n",
            self.address_list
        )
    }
}
