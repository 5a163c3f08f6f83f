// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Recursive tree construction.
//!
//! The factory turns flat records into the bus tree: top-down recursion,
//! bottom-up completion. A parent is not finished until every descendant is,
//! because a child activating loopback mutates the parent's interface
//! counters. Global full-name uniqueness is enforced by a registry threaded
//! through the recursion by reference; there is no ambient state.

use crate::addr::AddrRanges;
use crate::bus::{Bus, BusCore, BusKind, LeafBus, NonLeafBus, ParentLink};
use crate::clock;
use crate::node::Node;
use crate::peripherals::Peripheral;
use anyhow::{bail, Context, Result};
use socmap_config::{naming, validate, RecordProvider, SocError, SystemRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// The set of full names already claimed across the whole configuration.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, full_name: &str) -> Result<(), SocError> {
        if !self.names.insert(full_name.to_string()) {
            return Err(SocError::DuplicateName(full_name.to_string()));
        }
        Ok(())
    }
}

/// Build the bus named `full_name` and, recursively, its whole subtree.
///
/// `assigned` is the window the parent carved out for this bus (the fixed
/// `[0, 2^phys_addr_width)` window for the root). Returns `None` when the
/// record's protocol is the `DISABLE` sentinel.
pub(crate) fn build_bus(
    full_name: &str,
    assigned: AddrRanges,
    clock_domain: &str,
    parent: Option<ParentLink<'_>>,
    system: &SystemRecord,
    provider: &dyn RecordProvider,
    registry: &mut NameRegistry,
) -> Result<Option<Bus>> {
    let record = provider.bus_record(full_name)?;
    if record.is_disabled() {
        info!(bus = full_name, "bus is disabled, skipping its subtree");
        return Ok(None);
    }
    validate::validate_bus(&record)
        .with_context(|| format!("while validating the record of {full_name}"))?;
    registry.register(full_name)?;

    let base_name = naming::base_name(full_name)?;
    let kind = BusKind::from_base_name(&base_name)?;
    match (&parent, kind) {
        (None, BusKind::Sysbus) => {}
        (None, other) => bail!("the root bus must be a SYSBUS, not a {}", other.as_str()),
        (Some(_), BusKind::Sysbus) => {
            return Err(SocError::Legality(
                "SYSBUS is the root bus and cannot appear as a child".to_string(),
            )
            .into())
        }
        (Some(_), _) => {}
    }

    let protocol = socmap_config::Protocol::parse(&record.protocol)?;
    if !kind.legal_protocols().contains(&protocol) {
        return Err(SocError::Legality(format!(
            "{} does not speak {} ({full_name})",
            kind.as_str(),
            protocol.as_str()
        ))
        .into());
    }
    let (addr_width, data_width) = match kind {
        BusKind::Sysbus => (system.phys_addr_width, system.xlen),
        BusKind::Pbus => (32, 32),
        // The high-performance bus inherits the parent's address width.
        BusKind::Hpbus => match &parent {
            Some(link) => (link.addr_width, 512),
            None => unreachable!("HPBUS always has a parent"),
        },
    };
    if kind == BusKind::Pbus && record.num_slave_if != 1 {
        return Err(SocError::Legality(format!(
            "{full_name} must have exactly one slave interface, not {}",
            record.num_slave_if
        ))
        .into());
    }
    for &width in &record.child_addr_widths {
        if width > addr_width {
            return Err(SocError::Legality(format!(
                "a child address width of {width} bits exceeds the {addr_width} bits routed by {full_name}"
            ))
            .into());
        }
    }

    let clock_frequency = naming::clock_frequency_mhz(clock_domain)?;
    let node = Node::new(&base_name, assigned, clock_domain, clock_frequency);
    let own_link = ParentLink {
        full_name: node.full_name(),
        base_addr: node.base_addr(),
        addr_width,
    };

    let mut peripherals = Vec::new();
    let mut children_buses = Vec::new();
    let mut master_names = record.master_names.clone();
    let mut num_slave_if = record.num_slave_if;

    for (i, child_name) in record.child_names.iter().enumerate() {
        let spans: Vec<(u64, u8)> = (i * record.children_num_ranges
            ..(i + 1) * record.children_num_ranges)
            .map(|j| (record.child_base_addrs[j], record.child_addr_widths[j]))
            .collect();
        let child_ranges = AddrRanges::new(child_name, &spans)
            .with_context(|| format!("while placing {child_name} under {full_name}"))?;
        // Leaf buses forward their own clock domain to every child.
        let child_domain = if kind.is_leaf() || record.child_clock_domains.is_empty() {
            clock_domain
        } else {
            record.child_clock_domains[i].as_str()
        };

        if naming::is_bus_name(child_name) {
            if kind.is_leaf() {
                return Err(SocError::Legality(format!(
                    "{child_name} cannot sit under the leaf bus {full_name}"
                ))
                .into());
            }
            let built = build_bus(
                child_name,
                child_ranges,
                child_domain,
                Some(own_link),
                system,
                provider,
                registry,
            )?;
            if let Some(child_bus) = built {
                if child_bus.loopback() {
                    // Parent side of loopback: accept one more inbound
                    // master, driven by the child's dedicated interface.
                    master_names.push(child_name.clone());
                    num_slave_if += 1;
                }
                children_buses.push(child_bus);
            }
        } else {
            registry.register(child_name)?;
            let child_base = naming::base_name(child_name)?;
            let child_id = naming::instance_id(child_name)?;
            let child_frequency = naming::clock_frequency_mhz(child_domain)?;
            debug!(peripheral = %child_name, bus = full_name, "instantiating peripheral");
            peripherals.push(Peripheral::build(
                &child_base,
                child_id,
                child_ranges,
                child_domain,
                child_frequency,
            )?);
        }
    }

    let core = BusCore {
        node,
        kind,
        protocol,
        id_width: record.id_width,
        num_master_if: record.num_master_if,
        num_slave_if,
        master_names,
        data_width,
        addr_width,
        children_num_ranges: record.children_num_ranges,
        peripherals,
    };

    let bus = if kind.is_leaf() {
        if record.loopback {
            return Err(SocError::LoopbackPrecondition(format!(
                "the leaf bus {full_name} cannot activate loopback"
            ))
            .into());
        }
        Bus::Leaf(LeafBus { core })
    } else {
        let mut nonleaf = NonLeafBus {
            core,
            children_buses,
            loopback: false,
            loopback_window: None,
            generates_own_clock: clock::generates_own_clock(
                parent.as_ref().map(|p| p.full_name),
                clock_domain,
            ),
        };
        if record.loopback {
            let Some(link) = &parent else {
                return Err(SocError::LoopbackPrecondition(
                    "the root bus cannot activate loopback".to_string(),
                )
                .into());
            };
            nonleaf
                .activate_loopback(link)
                .with_context(|| format!("while activating loopback on {full_name}"))?;
        }
        Bus::NonLeaf(nonleaf)
    };
    Ok(Some(bus))
}
