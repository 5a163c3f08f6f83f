// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Clock-domain bookkeeping.
//!
//! Clock domains are declared per child in the bus records; the engine only
//! has to answer two questions: does a bus source its own clock or forward
//! its parent's, and are the root-mandated peripherals wired to the root's
//! own domain.

use crate::bus::Bus;
use socmap_config::{SocError, SocResult};

/// Peripheral type tags that must sit in the root bus's own clock domain.
pub const ROOT_CLOCKED_PERIPHERALS: &[&str] = &["PLIC", "BRAM", "DM"];

/// A bus sources its own clock unless its domain name textually references
/// its parent, in which case the parent's clock is forwarded. Decided once
/// at construction and read-only thereafter.
pub fn generates_own_clock(parent_full_name: Option<&str>, clock_domain: &str) -> bool {
    match parent_full_name {
        None => true,
        Some(parent) => !clock_domain.contains(parent),
    }
}

/// Enforce the root clock allow-list on the root bus's direct peripherals.
pub fn check_root_clocks(root: &Bus, main_clock_domain: &str) -> SocResult<()> {
    for peripheral in root.core().peripherals() {
        if ROOT_CLOCKED_PERIPHERALS.contains(&peripheral.base_name())
            && peripheral.node().clock_domain() != main_clock_domain
        {
            return Err(SocError::ClockDomain(format!(
                "{} must be wired to the {main_clock_domain} clock domain, not {}",
                peripheral.full_name(),
                peripheral.node().clock_domain()
            )));
        }
    }
    Ok(())
}
