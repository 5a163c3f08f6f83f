// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! C driver header generation.
//!
//! One `_BASE_ADDR`/`_END_ADDR` pair per driver-backed peripheral, merged
//! across contiguous range sets, for the hardware abstraction layer.

use anyhow::Result;
use socmap_core::Soc;
use std::fmt::Write;

pub fn generate_driver_header(soc: &Soc) -> Result<String> {
    let mut header = String::new();
    header.push_str("/* Generated by socmap. Do not edit. */\n");
    header.push_str("#ifndef SOCMAP_PERIPHERALS_H\n");
    header.push_str("#define SOCMAP_PERIPHERALS_H\n\n");

    for peripheral in soc.peripherals() {
        if !peripheral.supports_driver() {
            continue;
        }
        for (name, dims) in peripheral.addr_ranges().get_dimensions(false) {
            writeln!(header, "#define {name}_BASE_ADDR {:#x}UL", dims.base)?;
            writeln!(header, "#define {name}_END_ADDR {:#x}UL", dims.end)?;
        }
    }

    header.push_str("\n#endif /* SOCMAP_PERIPHERALS_H */\n");
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::demo_soc;

    #[test]
    fn defines_cover_driver_backed_peripherals() {
        let header = generate_driver_header(&demo_soc()).unwrap();
        assert!(header.contains("#define UART_0_BASE_ADDR 0x10000000UL"));
        assert!(header.contains("#define UART_0_END_ADDR 0x10001000UL"));
        assert!(header.contains("#define TIM_0_BASE_ADDR 0x10001000UL"));
    }

    #[test]
    fn memories_have_no_driver_defines() {
        let header = generate_driver_header(&demo_soc()).unwrap();
        assert!(!header.contains("BRAM_0_BASE_ADDR"));
    }

    #[test]
    fn inclusion_guard_is_present() {
        let header = generate_driver_header(&demo_soc()).unwrap();
        assert!(header.starts_with("/* Generated by socmap. Do not edit. */\n#ifndef SOCMAP_PERIPHERALS_H"));
        assert!(header.ends_with("#endif /* SOCMAP_PERIPHERALS_H */\n"));
    }
}
