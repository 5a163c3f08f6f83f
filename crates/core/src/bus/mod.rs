// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The interconnect tree.
//!
//! A bus is either a leaf (children are peripherals only) or a non-leaf
//! (children may include further buses). The two variants share `BusCore`
//! and are closed under `Bus`; recursion over the tree is pattern matching,
//! never dynamic dispatch.
//!
//! The whole-tree validation passes live here: `sanitize_addr_ranges`
//! (overlap and containment), `check_legals` (allow-lists), and
//! `add_reachability` (monotonic downward union). Loopback reachability is
//! a separate pass that runs after the downward propagation has converged,
//! because it copies each loopback bus's completed reachable-from set.

use crate::addr::AddrRanges;
use crate::node::Node;
use crate::peripherals::Peripheral;
use socmap_config::{Profile, Protocol, SocError, SocResult};
use std::collections::BTreeSet;

mod leaf;
mod nonleaf;

pub use leaf::LeafBus;
pub use nonleaf::NonLeafBus;

/// Identity of the bus that assigned a window to one of its children.
/// Passed down during construction instead of a parent back-pointer.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink<'a> {
    pub full_name: &'a str,
    pub base_addr: u64,
    pub addr_width: u8,
}

/// Bus type tags and their per-kind legality tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Sysbus,
    Pbus,
    Hpbus,
}

impl BusKind {
    pub fn from_base_name(base_name: &str) -> SocResult<Self> {
        match base_name {
            "SYSBUS" => Ok(BusKind::Sysbus),
            "PBUS" => Ok(BusKind::Pbus),
            "HPBUS" => Ok(BusKind::Hpbus),
            other => Err(SocError::Legality(format!(
                "unsupported bus type {other}"
            ))),
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, BusKind::Pbus)
    }

    pub fn legal_protocols(self) -> &'static [Protocol] {
        match self {
            BusKind::Sysbus | BusKind::Hpbus => &[Protocol::Axi4],
            BusKind::Pbus => &[Protocol::Axi4Lite],
        }
    }

    pub fn legal_peripherals(self, profile: Profile) -> &'static [&'static str] {
        match (self, profile) {
            (BusKind::Sysbus, Profile::Base) => &["BRAM", "DM", "PLIC"],
            (BusKind::Sysbus, Profile::Hpc) => &["BRAM", "DM", "PLIC", "DDR4CH", "HLS", "CDMA"],
            (BusKind::Pbus, _) => &["UART", "GPIOIN", "GPIOOUT", "TIM"],
            (BusKind::Hpbus, _) => &["DDR4CH", "HLS", "CDMA"],
        }
    }

    pub fn legal_sub_buses(self, profile: Profile) -> &'static [&'static str] {
        match (self, profile) {
            (BusKind::Sysbus, Profile::Base) => &["PBUS"],
            (BusKind::Sysbus, Profile::Hpc) => &["PBUS", "HPBUS"],
            (BusKind::Pbus, _) | (BusKind::Hpbus, _) => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BusKind::Sysbus => "SYSBUS",
            BusKind::Pbus => "PBUS",
            BusKind::Hpbus => "HPBUS",
        }
    }
}

/// Fields shared by leaf and non-leaf buses.
#[derive(Debug, Clone)]
pub struct BusCore {
    pub(crate) node: Node,
    pub(crate) kind: BusKind,
    pub(crate) protocol: Protocol,
    pub(crate) id_width: u32,
    pub(crate) num_master_if: u32,
    pub(crate) num_slave_if: u32,
    pub(crate) master_names: Vec<String>,
    pub(crate) data_width: u32,
    pub(crate) addr_width: u8,
    pub(crate) children_num_ranges: usize,
    pub(crate) peripherals: Vec<Peripheral>,
}

impl BusCore {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn full_name(&self) -> &str {
        self.node.full_name()
    }

    pub fn kind(&self) -> BusKind {
        self.kind
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn id_width(&self) -> u32 {
        self.id_width
    }

    pub fn num_master_if(&self) -> u32 {
        self.num_master_if
    }

    pub fn num_slave_if(&self) -> u32 {
        self.num_slave_if
    }

    pub fn master_names(&self) -> &[String] {
        &self.master_names
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn addr_width(&self) -> u8 {
        self.addr_width
    }

    pub fn children_num_ranges(&self) -> usize {
        self.children_num_ranges
    }

    pub fn peripherals(&self) -> &[Peripheral] {
        &self.peripherals
    }

    /// Union of the reachable-from sets across the bus's own ranges, i.e.
    /// the buses a transaction can come through to reach this one.
    fn own_reachable_set(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for range in self.node.addr_ranges().iter() {
            set.extend(range.reachable_from().iter().cloned());
        }
        set
    }
}

/// A node of the interconnect tree.
#[derive(Debug, Clone)]
pub enum Bus {
    Leaf(LeafBus),
    NonLeaf(NonLeafBus),
}

impl Bus {
    pub fn core(&self) -> &BusCore {
        match self {
            Bus::Leaf(b) => &b.core,
            Bus::NonLeaf(b) => &b.core,
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut BusCore {
        match self {
            Bus::Leaf(b) => &mut b.core,
            Bus::NonLeaf(b) => &mut b.core,
        }
    }

    pub fn node(&self) -> &Node {
        self.core().node()
    }

    pub fn full_name(&self) -> &str {
        self.core().full_name()
    }

    /// Direct sub-buses; empty for a leaf.
    pub fn children_buses(&self) -> &[Bus] {
        match self {
            Bus::Leaf(_) => &[],
            Bus::NonLeaf(b) => &b.children_buses,
        }
    }

    /// True when this bus was constructed with loopback active.
    pub fn loopback(&self) -> bool {
        match self {
            Bus::Leaf(_) => false,
            Bus::NonLeaf(b) => b.loopback,
        }
    }

    /// The synthesized complement window of a loopback bus.
    pub fn loopback_window(&self) -> Option<&AddrRanges> {
        match self {
            Bus::Leaf(_) => None,
            Bus::NonLeaf(b) => b.loopback_window.as_ref(),
        }
    }

    /// Peripherals of this bus; with `recursive` also every descendant's.
    pub fn peripherals(&self, recursive: bool) -> Vec<&Peripheral> {
        let mut out: Vec<&Peripheral> = self.core().peripherals.iter().collect();
        if recursive {
            for child in self.children_buses() {
                out.extend(child.peripherals(true));
            }
        }
        out
    }

    /// Direct sub-buses; with `recursive` the whole bus subtree, preorder.
    pub fn buses(&self, recursive: bool) -> Vec<&Bus> {
        let mut out = Vec::new();
        for child in self.children_buses() {
            out.push(child);
            if recursive {
                out.extend(child.buses(true));
            }
        }
        out
    }

    /// All direct children's range sets sorted ascending by base address.
    /// On a loopback bus the list also carries the bus's own synthesized
    /// window: the extra outbound interface belongs to this bus's crossbar,
    /// not the parent's.
    ///
    /// Generators assign physical interconnect port indices by this order,
    /// so ties break by base address only and repeated calls on an
    /// unmodified tree return the same sequence.
    pub fn get_ordered_children_ranges(&self) -> Vec<&AddrRanges> {
        let mut out: Vec<&AddrRanges> = Vec::new();
        for peripheral in &self.core().peripherals {
            out.push(peripheral.addr_ranges());
        }
        for child in self.children_buses() {
            out.push(child.node().addr_ranges());
        }
        if let Some(window) = self.loopback_window() {
            out.push(window);
        }
        out.sort_by_key(|ranges| ranges.base_addr());
        out
    }

    /// Overlap and containment checking over the direct children, then
    /// recursively over every sub-bus.
    pub fn sanitize_addr_ranges(&self) -> SocResult<()> {
        let bus_name = self.full_name();
        let own = self.node().addr_ranges();
        let mut children: Vec<&AddrRanges> = Vec::new();
        for peripheral in &self.core().peripherals {
            children.push(peripheral.addr_ranges());
        }
        for child in self.children_buses() {
            children.push(child.node().addr_ranges());
        }

        for i in 0..children.len() {
            for j in i + 1..children.len() {
                if children[i].overlaps(children[j]) {
                    return Err(SocError::Overlap {
                        bus: bus_name.to_string(),
                        first: children[i].full_name().to_string(),
                        second: children[j].full_name().to_string(),
                    });
                }
            }
        }
        for child in &children {
            for range in child.iter() {
                if !own.contains(range) {
                    return Err(SocError::Containment {
                        bus: bus_name.to_string(),
                        node: child.full_name().to_string(),
                    });
                }
            }
        }

        for child in self.children_buses() {
            child.sanitize_addr_ranges()?;
        }
        Ok(())
    }

    /// Allow-list checking of every child's type tag, recursively.
    pub fn check_legals(&self, profile: Profile) -> SocResult<()> {
        let kind = self.core().kind;
        let legal_peripherals = kind.legal_peripherals(profile);
        for peripheral in &self.core().peripherals {
            if !legal_peripherals.contains(&peripheral.base_name()) {
                return Err(SocError::Legality(format!(
                    "{} is not a legal peripheral of {} (a {})",
                    peripheral.full_name(),
                    self.full_name(),
                    kind.as_str()
                )));
            }
        }
        let legal_sub_buses = kind.legal_sub_buses(profile);
        for child in self.children_buses() {
            if !legal_sub_buses.contains(&child.core().kind.as_str()) {
                return Err(SocError::Legality(format!(
                    "{} is not a legal sub-bus of {} (a {})",
                    child.full_name(),
                    self.full_name(),
                    kind.as_str()
                )));
            }
            child.check_legals(profile)?;
        }
        Ok(())
    }

    /// Downward reachability propagation: every direct child range gains
    /// this bus's full name plus everything already reachable from this
    /// bus. Union only, never removal.
    pub fn add_reachability(&mut self) {
        let mut inherited = self.core().own_reachable_set();
        inherited.insert(self.full_name().to_string());

        match self {
            Bus::Leaf(leaf) => {
                for peripheral in &mut leaf.core.peripherals {
                    for range in peripheral.node_mut().addr_ranges_mut().iter_mut() {
                        range.extend_reachable(inherited.iter().cloned());
                    }
                }
            }
            Bus::NonLeaf(nonleaf) => {
                for peripheral in &mut nonleaf.core.peripherals {
                    for range in peripheral.node_mut().addr_ranges_mut().iter_mut() {
                        range.extend_reachable(inherited.iter().cloned());
                    }
                }
                for child in &mut nonleaf.children_buses {
                    for range in child.core_mut().node.addr_ranges_mut().iter_mut() {
                        range.extend_reachable(inherited.iter().cloned());
                    }
                    child.add_reachability();
                }
            }
        }
    }

    /// Inject loopback reachability: every descendant range of this bus
    /// that falls inside a loopback child's complement window gains that
    /// child's name and everything that can reach the child.
    ///
    /// Runs only after `add_reachability` has converged over the whole
    /// tree, so the copied sets are complete.
    pub fn apply_loopback_reachability(&mut self) {
        if let Bus::NonLeaf(nonleaf) = self {
            let mut injections: Vec<(AddrRanges, BTreeSet<String>)> = Vec::new();
            for child in &nonleaf.children_buses {
                if let Some(window) = child.loopback_window() {
                    let mut set = child.core().own_reachable_set();
                    set.insert(child.full_name().to_string());
                    injections.push((window.clone(), set));
                }
            }
            for (window, set) in &injections {
                nonleaf.visit_subtree_ranges_mut(&mut |range| {
                    if window.contains(range) {
                        range.extend_reachable(set.iter().cloned());
                    }
                });
            }
            for child in &mut nonleaf.children_buses {
                child.apply_loopback_reachability();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn peripheral(name: &str, base: u64, width: u8) -> Peripheral {
        let base_name = socmap_config::naming::base_name(name).unwrap();
        let ranges = AddrRanges::new(name, &[(base, width)]).unwrap();
        Peripheral::build(&base_name, None, ranges, "PBUS_CLK_20", 20).unwrap()
    }

    fn leaf_bus(name: &str, base: u64, width: u8, peripherals: Vec<Peripheral>) -> Bus {
        let ranges = AddrRanges::new(name, &[(base, width)]).unwrap();
        Bus::Leaf(LeafBus {
            core: BusCore {
                node: Node::new("PBUS", ranges, "PBUS_CLK_20", 20),
                kind: BusKind::Pbus,
                protocol: Protocol::Axi4Lite,
                id_width: 4,
                num_master_if: peripherals.len() as u32,
                num_slave_if: 1,
                master_names: vec!["SYSBUS".to_string()],
                data_width: 32,
                addr_width: 32,
                children_num_ranges: 1,
                peripherals,
            },
        })
    }

    #[test]
    fn ordered_children_ranges_sort_by_base_and_stay_stable() {
        let bus = leaf_bus(
            "PBUS_0",
            0x0000,
            16,
            vec![
                peripheral("TIM_0", 0x4000, 12),
                peripheral("UART_0", 0x1000, 12),
                peripheral("GPIOIN_0", 0x2000, 12),
            ],
        );
        let first: Vec<String> = bus
            .get_ordered_children_ranges()
            .iter()
            .map(|r| r.full_name().to_string())
            .collect();
        assert_eq!(first, vec!["UART_0", "GPIOIN_0", "TIM_0"]);
        let second: Vec<String> = bus
            .get_ordered_children_ranges()
            .iter()
            .map(|r| r.full_name().to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn overlapping_siblings_are_fatal() {
        let bus = leaf_bus(
            "PBUS_0",
            0x0000,
            16,
            vec![
                peripheral("UART_0", 0x1000, 12),
                peripheral("TIM_0", 0x0000, 13),
            ],
        );
        let err = bus.sanitize_addr_ranges().unwrap_err();
        assert!(matches!(err, SocError::Overlap { .. }));
    }

    #[test]
    fn child_outside_the_parent_window_is_fatal() {
        let bus = leaf_bus("PBUS_0", 0x0000, 14, vec![peripheral("UART_0", 0x4000, 12)]);
        let err = bus.sanitize_addr_ranges().unwrap_err();
        assert!(matches!(err, SocError::Containment { .. }));
    }

    #[test]
    fn illegal_peripheral_type_is_flagged() {
        let bus = leaf_bus("PBUS_0", 0x0000, 16, vec![peripheral("PLIC", 0x1000, 12)]);
        let err = bus.check_legals(Profile::Base).unwrap_err();
        assert!(matches!(err, SocError::Legality(_)));
    }

    #[test]
    fn reachability_propagates_downward() {
        let mut bus = leaf_bus("PBUS_0", 0x0000, 16, vec![peripheral("UART_0", 0x1000, 12)]);
        // The parent stamped this bus's own window first.
        for range in bus.core_mut().node.addr_ranges_mut().iter_mut() {
            range.add_reachable("SYSBUS");
        }
        bus.add_reachability();
        let uart = &bus.core().peripherals()[0];
        let reachable = uart.addr_ranges().get_reachable_from(false);
        assert_eq!(reachable[0].1, vec!["PBUS_0", "SYSBUS"]);
    }

    #[test]
    fn kind_tables_follow_the_profile() {
        assert!(!BusKind::Sysbus
            .legal_peripherals(Profile::Base)
            .contains(&"DDR4CH"));
        assert!(BusKind::Sysbus
            .legal_peripherals(Profile::Hpc)
            .contains(&"DDR4CH"));
        assert!(BusKind::Sysbus.legal_sub_buses(Profile::Hpc).contains(&"HPBUS"));
        assert!(BusKind::Hpbus.legal_sub_buses(Profile::Hpc).is_empty());
        assert!(BusKind::Pbus.is_leaf());
        assert!(BusKind::from_base_name("QBUS").is_err());
    }
}
