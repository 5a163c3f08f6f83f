// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Reachability matrix dump.
//!
//! A CSV with one row per peripheral range (merged when the set is
//! contiguous and uniformly reachable) and one column per bus, answering
//! "can masters behind this bus address this range".

use anyhow::Result;
use socmap_core::Soc;
use std::fmt::Write;

pub fn generate_reachability_dump(soc: &Soc) -> Result<String> {
    let bus_names: Vec<String> = soc
        .buses()
        .iter()
        .map(|b| b.full_name().to_string())
        .collect();

    let mut csv = String::new();
    write!(csv, "range")?;
    for bus in &bus_names {
        write!(csv, ",{bus}")?;
    }
    csv.push('\n');

    for peripheral in soc.peripherals() {
        for (name, reachable) in peripheral.addr_ranges().get_reachable_from(false) {
            write!(csv, "{name}")?;
            for bus in &bus_names {
                let mark = if reachable.iter().any(|r| r == bus) {
                    "Y"
                } else {
                    "N"
                };
                write!(csv, ",{mark}")?;
            }
            csv.push('\n');
        }
    }
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::demo_soc;

    #[test]
    fn matrix_marks_the_propagated_reachability() {
        let csv = generate_reachability_dump(&demo_soc()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("range,SYSBUS,PBUS_0"));
        // BRAM_0 hangs off the root only; the UART is behind both buses.
        assert!(csv.contains("BRAM_0,Y,N"));
        assert!(csv.contains("UART_0,Y,Y"));
        assert!(csv.contains("TIM_0,Y,Y"));
    }
}
