// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Machine-readable address map.
//!
//! JSON object keyed by node name with the resolved `(base, end, length)`
//! of every bus window and peripheral range, for external tooling.

use anyhow::Result;
use socmap_core::{RangeDimensions, Soc};
use std::collections::BTreeMap;

pub fn generate_address_map(soc: &Soc) -> Result<String> {
    let mut entries: BTreeMap<String, RangeDimensions> = BTreeMap::new();
    for bus in soc.buses() {
        for (name, dims) in bus.node().addr_ranges().get_dimensions(false) {
            entries.insert(name, dims);
        }
    }
    for peripheral in soc.peripherals() {
        for (name, dims) in peripheral.addr_ranges().get_dimensions(false) {
            entries.insert(name, dims);
        }
    }
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::demo_soc;

    #[test]
    fn map_holds_every_node() {
        let json = generate_address_map(&demo_soc()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let map = parsed.as_object().unwrap();
        for name in ["SYSBUS", "PBUS_0", "BRAM_0", "UART_0", "TIM_0"] {
            assert!(map.contains_key(name), "missing {name}");
        }
        assert_eq!(map["UART_0"]["base"], 0x10000000u64);
        assert_eq!(map["UART_0"]["length"], 0x1000u64);
    }
}
