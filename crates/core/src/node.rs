// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Common identity wrapper for every tree member, bus or peripheral.

use crate::addr::AddrRanges;
use socmap_config::SocResult;

/// Identity, assigned address ranges, and clock wiring of one tree node.
///
/// `full_name` is globally unique across the configuration (enforced by the
/// name registry at construction); `base_name` is the type tag used for
/// legality checks.
#[derive(Debug, Clone)]
pub struct Node {
    base_name: String,
    full_name: String,
    addr_ranges: AddrRanges,
    clock_domain: String,
    clock_frequency: u32,
}

impl Node {
    pub fn new(
        base_name: impl Into<String>,
        addr_ranges: AddrRanges,
        clock_domain: impl Into<String>,
        clock_frequency: u32,
    ) -> Self {
        let full_name = addr_ranges.full_name().to_string();
        Self {
            base_name: base_name.into(),
            full_name,
            addr_ranges,
            clock_domain: clock_domain.into(),
            clock_frequency,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn addr_ranges(&self) -> &AddrRanges {
        &self.addr_ranges
    }

    pub(crate) fn addr_ranges_mut(&mut self) -> &mut AddrRanges {
        &mut self.addr_ranges
    }

    pub fn clock_domain(&self) -> &str {
        &self.clock_domain
    }

    pub fn clock_frequency(&self) -> u32 {
        self.clock_frequency
    }

    pub fn base_addr(&self) -> u64 {
        self.addr_ranges.base_addr()
    }

    pub fn end_addr(&self) -> u128 {
        self.addr_ranges.end_addr()
    }

    pub(crate) fn split_addr_ranges(&mut self) -> SocResult<()> {
        self.addr_ranges.split_all()
    }
}
