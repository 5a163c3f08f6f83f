// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Declarative record validation.
//!
//! Each record type has a fixed table of rules evaluated in sequence; a rule
//! either accepts the record or produces the taxonomy error that invalidates
//! the run. The field set per record type is fixed, so plain function
//! tables are enough — no reflection.

use crate::error::{SocError, SocResult};
use crate::naming;
use crate::{BusRecord, Protocol, SystemRecord};
use anyhow::Result;

const SUPPORTED_CORES: &[&str] = &[
    "CORE_PICORV32",
    "CORE_CV32E40P",
    "CORE_IBEX",
    "CORE_MICROBLAZEV_RV32",
    "CORE_MICROBLAZEV_RV64",
    "CORE_DUAL_MICROBLAZEV_RV32",
    "CORE_CV64A6",
    "CORE_CV64A6_ARA",
];

fn in_range(value: u32, min: u32, max: u32) -> bool {
    (min..=max).contains(&value)
}

type BusRule = fn(&BusRecord) -> SocResult<()>;

fn rule_id_width(r: &BusRecord) -> SocResult<()> {
    if !in_range(r.id_width, 4, 32) {
        return Err(SocError::Legality(format!(
            "id_width {} is outside the supported range [4, 32]",
            r.id_width
        )));
    }
    Ok(())
}

fn rule_num_slave_if(r: &BusRecord) -> SocResult<()> {
    if !in_range(r.num_slave_if, 1, 16) {
        return Err(SocError::Legality(format!(
            "num_slave_if {} is outside the supported range [1, 16]",
            r.num_slave_if
        )));
    }
    Ok(())
}

fn rule_child_widths(r: &BusRecord) -> SocResult<()> {
    for &width in &r.child_addr_widths {
        if !(1..=64).contains(&width) {
            return Err(SocError::Legality(format!(
                "child address width {width} is outside the supported range [1, 64]"
            )));
        }
    }
    Ok(())
}

fn rule_master_count(r: &BusRecord) -> SocResult<()> {
    if r.num_master_if as usize != r.child_names.len() {
        return Err(SocError::CountMismatch(format!(
            "num_master_if {} does not match the {} entries of child_names",
            r.num_master_if,
            r.child_names.len()
        )));
    }
    Ok(())
}

fn rule_range_lists(r: &BusRecord) -> SocResult<()> {
    let expected = r.num_master_if as usize * r.children_num_ranges;
    if expected != r.child_base_addrs.len() {
        return Err(SocError::CountMismatch(format!(
            "num_master_if * children_num_ranges ({expected}) does not match the {} entries of child_base_addrs",
            r.child_base_addrs.len()
        )));
    }
    if expected != r.child_addr_widths.len() {
        return Err(SocError::CountMismatch(format!(
            "num_master_if * children_num_ranges ({expected}) does not match the {} entries of child_addr_widths",
            r.child_addr_widths.len()
        )));
    }
    Ok(())
}

fn rule_slave_count(r: &BusRecord) -> SocResult<()> {
    if r.num_slave_if as usize != r.master_names.len() {
        return Err(SocError::CountMismatch(format!(
            "num_slave_if {} does not match the {} entries of master_names",
            r.num_slave_if,
            r.master_names.len()
        )));
    }
    Ok(())
}

fn rule_clock_domain_count(r: &BusRecord) -> SocResult<()> {
    if !r.child_clock_domains.is_empty() && r.child_clock_domains.len() != r.child_names.len() {
        return Err(SocError::CountMismatch(format!(
            "child_clock_domains has {} entries but child_names has {}",
            r.child_clock_domains.len(),
            r.child_names.len()
        )));
    }
    Ok(())
}

fn rule_protocol_min_width(r: &BusRecord) -> SocResult<()> {
    let protocol = Protocol::parse(&r.protocol)?;
    let min = protocol.min_child_width();
    if r.child_addr_widths.iter().any(|&w| w < min) {
        return Err(SocError::Legality(format!(
            "a child address width is below the {} minimum of {min} bits",
            protocol.as_str()
        )));
    }
    Ok(())
}

fn rule_loopback_single_range(r: &BusRecord) -> SocResult<()> {
    if r.loopback && r.children_num_ranges != 1 {
        return Err(SocError::LoopbackPrecondition(
            "children_num_ranges must be 1 when activating loopback".to_string(),
        ));
    }
    Ok(())
}

fn rule_loopback_axi_width(r: &BusRecord) -> SocResult<()> {
    // Loopback consumes one address bit internally to double every child
    // range, so 12-bit AXI4 ranges cannot shrink below the protocol floor.
    if r.loopback
        && Protocol::parse(&r.protocol)? == Protocol::Axi4
        && r.child_addr_widths.iter().any(|&w| w <= 12)
    {
        return Err(SocError::LoopbackPrecondition(
            "when enabling loopback every child address width must exceed 12 bits under AXI4"
                .to_string(),
        ));
    }
    Ok(())
}

const BUS_RULES: &[BusRule] = &[
    rule_id_width,
    rule_num_slave_if,
    rule_child_widths,
    rule_master_count,
    rule_range_lists,
    rule_slave_count,
    rule_clock_domain_count,
    rule_protocol_min_width,
    rule_loopback_single_range,
    rule_loopback_axi_width,
];

/// Validate a bus record against the full rule table. Disabled buses only
/// carry their sentinel protocol, so they skip the table entirely.
pub fn validate_bus(record: &BusRecord) -> SocResult<()> {
    if record.is_disabled() {
        return Ok(());
    }
    for rule in BUS_RULES {
        rule(record)?;
    }
    Ok(())
}

type SystemRule = fn(&SystemRecord) -> SocResult<()>;

fn rule_phys_addr_width(r: &SystemRecord) -> SocResult<()> {
    if !in_range(u32::from(r.phys_addr_width), 32, 64) {
        return Err(SocError::Legality(format!(
            "phys_addr_width {} is outside the supported range [32, 64]",
            r.phys_addr_width
        )));
    }
    Ok(())
}

fn rule_xlen(r: &SystemRecord) -> SocResult<()> {
    if r.xlen != 32 && r.xlen != 64 {
        return Err(SocError::Legality(format!(
            "xlen {} is unsupported (32 or 64)",
            r.xlen
        )));
    }
    Ok(())
}

fn rule_core_supported(r: &SystemRecord) -> SocResult<()> {
    if !SUPPORTED_CORES.contains(&r.core_selector.as_str()) {
        return Err(SocError::Legality(format!(
            "core_selector {} is unsupported",
            r.core_selector
        )));
    }
    Ok(())
}

fn rule_xlen_matches_width(r: &SystemRecord) -> SocResult<()> {
    if r.xlen == 32 && r.phys_addr_width != 32 {
        return Err(SocError::Legality(
            "phys_addr_width must be 32 when xlen is 32".to_string(),
        ));
    }
    if r.xlen == 64 && r.phys_addr_width == 32 {
        return Err(SocError::Legality(
            "phys_addr_width must be in (32, 64] when xlen is 64".to_string(),
        ));
    }
    Ok(())
}

fn rule_xlen_matches_core(r: &SystemRecord) -> SocResult<()> {
    let needs_64 = ["CORE_MICROBLAZEV_RV64", "CORE_CV64A6", "CORE_CV64A6_ARA"];
    let needs_32 = [
        "CORE_PICORV32",
        "CORE_CV32E40P",
        "CORE_IBEX",
        "CORE_MICROBLAZEV_RV32",
        "CORE_DUAL_MICROBLAZEV_RV32",
    ];
    let core = r.core_selector.as_str();
    if (needs_64.contains(&core) && r.xlen == 32) || (needs_32.contains(&core) && r.xlen == 64) {
        return Err(SocError::Legality(format!(
            "xlen={} does not match the {core} data width",
            r.xlen
        )));
    }
    Ok(())
}

const SYSTEM_RULES: &[SystemRule] = &[
    rule_phys_addr_width,
    rule_xlen,
    rule_core_supported,
    rule_xlen_matches_width,
    rule_xlen_matches_core,
];

/// Validate the system record: rule table plus the clock-name cross-check
/// that needs the naming convention.
pub fn validate_system(record: &SystemRecord) -> Result<()> {
    for rule in SYSTEM_RULES {
        rule(record)?;
    }
    let main_mhz = naming::clock_frequency_mhz(&record.main_clock_domain)?;
    if record.core_selector == "CORE_CV64A6_ARA" && main_mhz > 50 {
        anyhow::bail!(
            "CORE_CV64A6_ARA supports a maximum main clock frequency of 50 MHz (configured with {})",
            record.main_clock_domain
        );
    }
    Ok(())
}
