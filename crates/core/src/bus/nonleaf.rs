// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Non-leaf buses: sub-bus children, loopback, and per-subtree clock
//! aggregation.

use super::{Bus, BusCore, ParentLink};
use crate::addr::{AddrRange, AddrRanges};
use socmap_config::{Protocol, SocError, SocResult};
use std::collections::BTreeMap;
use tracing::warn;

/// A bus whose children may include further buses.
#[derive(Debug, Clone)]
pub struct NonLeafBus {
    pub(crate) core: BusCore,
    pub(crate) children_buses: Vec<Bus>,
    pub(crate) loopback: bool,
    pub(crate) loopback_window: Option<AddrRanges>,
    pub(crate) generates_own_clock: bool,
}

impl NonLeafBus {
    pub fn core(&self) -> &BusCore {
        &self.core
    }

    pub fn children_buses(&self) -> &[Bus] {
        &self.children_buses
    }

    /// True when this bus sources its own clock rather than forwarding
    /// the parent's. Derived once at construction.
    pub fn generates_own_clock(&self) -> bool {
        self.generates_own_clock
    }

    /// Direct children grouped by declared clock domain, for the clock
    /// generators. Domain names sort lexicographically; members keep
    /// declaration order (peripherals first, then sub-buses).
    pub fn clock_domains(&self) -> BTreeMap<String, Vec<String>> {
        let mut domains: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for peripheral in &self.core.peripherals {
            domains
                .entry(peripheral.node().clock_domain().to_string())
                .or_default()
                .push(peripheral.full_name().to_string());
        }
        for child in &self.children_buses {
            domains
                .entry(child.node().clock_domain().to_string())
                .or_default()
                .push(child.full_name().to_string());
        }
        domains
    }

    /// Turn on loopback: this bus gains a dedicated outbound interface
    /// through which its masters can address everything in the parent's
    /// space outside this bus's own window.
    ///
    /// Every precondition is checked before the first mutation, so a
    /// failure leaves the bus exactly as declared. Must run after the
    /// children are built, since their ranges get split here.
    pub(crate) fn activate_loopback(&mut self, parent: &ParentLink<'_>) -> SocResult<()> {
        let full_name = self.core.full_name().to_string();

        if self.core.children_num_ranges != 1 {
            return Err(SocError::LoopbackPrecondition(format!(
                "{full_name} is already multi-range (children_num_ranges = {})",
                self.core.children_num_ranges
            )));
        }
        let child_ranges: Vec<&AddrRanges> = self
            .core
            .peripherals
            .iter()
            .map(|p| p.addr_ranges())
            .chain(self.children_buses.iter().map(|b| b.node().addr_ranges()))
            .collect();
        for ranges in &child_ranges {
            for range in ranges.iter() {
                if self.core.protocol == Protocol::Axi4 && range.width() <= 12 {
                    return Err(SocError::LoopbackPrecondition(format!(
                        "{} is only {} bits wide; every range under the loopback bus \
                         {full_name} must exceed 12 bits under AXI4",
                        range.name(),
                        range.width()
                    )));
                }
                if range.width() < 2 {
                    return Err(SocError::LoopbackPrecondition(format!(
                        "{} is too narrow to split under the loopback bus {full_name}",
                        range.name()
                    )));
                }
            }
        }
        let base = self.core.node.base_addr();
        if !base.is_power_of_two() {
            return Err(SocError::LoopbackPrecondition(format!(
                "the base address {base:#x} of {full_name} is not a power of two"
            )));
        }
        let end = self.core.node.end_addr();
        let after_base = u64::try_from(end).map_err(|_| {
            SocError::LoopbackPrecondition(format!(
                "the window of {full_name} reaches the top of the address space, \
                 leaving no room for a loopback window"
            ))
        })?;

        // Complement of this bus's window within the parent's: everything
        // before the base, and everything after the end. The after width is
        // the trailing-zero count of the end address, which keeps the
        // synthesized range power-of-two aligned.
        let before_width = base.trailing_zeros() as u8;
        let after_width = after_base.trailing_zeros() as u8;
        let window = AddrRanges::new(
            parent.full_name,
            &[(parent.base_addr, before_width), (after_base, after_width)],
        )?;

        // Point of no return: every check has passed.
        self.core.children_num_ranges = 2;
        self.core.num_master_if += 1;
        for peripheral in &mut self.core.peripherals {
            peripheral.node_mut().split_addr_ranges()?;
        }
        for child in &mut self.children_buses {
            child.core_mut().node.addr_ranges_mut().split_all()?;
        }

        warn!(
            bus = %full_name,
            upper_bound = format_args!("{:#x}", window.end_addr()),
            "loopback reaches addresses up to the reported upper bound"
        );
        self.loopback = true;
        self.loopback_window = Some(window);
        Ok(())
    }

    /// Apply `f` to every address range in this bus's subtree, excluding
    /// the bus's own assigned ranges.
    pub(crate) fn visit_subtree_ranges_mut(&mut self, f: &mut dyn FnMut(&mut AddrRange)) {
        for peripheral in &mut self.core.peripherals {
            for range in peripheral.node_mut().addr_ranges_mut().iter_mut() {
                f(range);
            }
        }
        for child in &mut self.children_buses {
            for range in child.core_mut().node.addr_ranges_mut().iter_mut() {
                f(range);
            }
            match child {
                Bus::Leaf(leaf) => {
                    for peripheral in &mut leaf.core.peripherals {
                        for range in peripheral.node_mut().addr_ranges_mut().iter_mut() {
                            f(range);
                        }
                    }
                }
                Bus::NonLeaf(nonleaf) => nonleaf.visit_subtree_ranges_mut(f),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusKind;
    use crate::node::Node;
    use crate::peripherals::Peripheral;

    fn hp_peripheral(name: &str, base: u64, width: u8) -> Peripheral {
        let base_name = socmap_config::naming::base_name(name).unwrap();
        let ranges = AddrRanges::new(name, &[(base, width)]).unwrap();
        Peripheral::build(&base_name, Some(0), ranges, "DDR_300", 300).unwrap()
    }

    fn hp_bus(base: u64, width: u8, peripherals: Vec<Peripheral>) -> NonLeafBus {
        let ranges = AddrRanges::new("HPBUS_0", &[(base, width)]).unwrap();
        NonLeafBus {
            core: BusCore {
                node: Node::new("HPBUS", ranges, "HP_CLK_300", 300),
                kind: BusKind::Hpbus,
                protocol: Protocol::Axi4,
                id_width: 4,
                num_master_if: peripherals.len() as u32,
                num_slave_if: 1,
                master_names: vec!["SYSBUS".to_string()],
                data_width: 512,
                addr_width: 32,
                children_num_ranges: 1,
                peripherals,
            },
            children_buses: Vec::new(),
            loopback: false,
            loopback_window: None,
            generates_own_clock: true,
        }
    }

    const PARENT: ParentLink<'static> = ParentLink {
        full_name: "SYSBUS",
        base_addr: 0,
        addr_width: 32,
    };

    #[test]
    fn loopback_synthesizes_the_complement_window() {
        let mut bus = hp_bus(
            0x4000_0000,
            30,
            vec![hp_peripheral("DDR4CH_0", 0x4000_0000, 29)],
        );
        bus.activate_loopback(&PARENT).unwrap();

        let window = bus.loopback_window.as_ref().unwrap();
        assert_eq!(window.full_name(), "SYSBUS");
        let spans: Vec<(u64, u128)> = window.iter().map(|r| (r.base(), r.end())).collect();
        assert_eq!(spans, vec![(0, 0x4000_0000), (0x8000_0000, 0x1_0000_0000)]);

        assert_eq!(bus.core.children_num_ranges, 2);
        assert_eq!(bus.core.num_master_if, 2);
        // The DDR channel's single range became two half-width halves.
        assert_eq!(bus.core.peripherals[0].addr_ranges().len(), 2);
    }

    #[test]
    fn loopback_window_ports_belong_to_the_loopback_bus() {
        let mut bus = hp_bus(
            0x4000_0000,
            30,
            vec![hp_peripheral("DDR4CH_0", 0x4000_0000, 29)],
        );
        bus.activate_loopback(&PARENT).unwrap();
        let bus = Bus::NonLeaf(bus);

        // The dedicated outbound interface sits in this bus's own crossbar
        // port order, sorted in with the real children by base address.
        let ordered: Vec<&str> = bus
            .get_ordered_children_ranges()
            .iter()
            .map(|r| r.full_name())
            .collect();
        assert_eq!(ordered, vec!["SYSBUS", "DDR4CH_0"]);
    }

    #[test]
    fn non_power_of_two_base_fails_before_any_mutation() {
        let mut bus = hp_bus(
            0x6000_0000,
            28,
            vec![hp_peripheral("DDR4CH_0", 0x6000_0000, 27)],
        );
        let err = bus.activate_loopback(&PARENT).unwrap_err();
        assert!(matches!(err, SocError::LoopbackPrecondition(_)));
        assert_eq!(bus.core.children_num_ranges, 1);
        assert_eq!(bus.core.num_master_if, 1);
        assert_eq!(bus.core.peripherals[0].addr_ranges().len(), 1);
        assert!(bus.loopback_window.is_none());
    }

    #[test]
    fn narrow_axi4_ranges_block_loopback() {
        let mut bus = hp_bus(0x4000_0000, 30, vec![hp_peripheral("HLS_0", 0x4000_0000, 12)]);
        let err = bus.activate_loopback(&PARENT).unwrap_err();
        assert!(matches!(err, SocError::LoopbackPrecondition(_)));
    }

    #[test]
    fn window_at_the_top_of_the_space_is_rejected() {
        let mut bus = hp_bus(
            0x8000_0000_0000_0000,
            63,
            vec![hp_peripheral("DDR4CH_0", 0x8000_0000_0000_0000, 62)],
        );
        let err = bus.activate_loopback(&PARENT).unwrap_err();
        assert!(matches!(err, SocError::LoopbackPrecondition(_)));
    }

    #[test]
    fn clock_domains_group_direct_children() {
        let bus = hp_bus(
            0x4000_0000,
            30,
            vec![
                hp_peripheral("DDR4CH_0", 0x4000_0000, 29),
                hp_peripheral("DDR4CH_1", 0x6000_0000, 29),
            ],
        );
        let domains = bus.clock_domains();
        assert_eq!(
            domains.get("DDR_300").map(Vec::len),
            Some(2),
            "{domains:?}"
        );
    }
}
