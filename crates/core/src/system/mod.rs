// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Root composition: one `Soc` per configuration run.
//!
//! `Soc::build` is the single construction entry point for the root bus.
//! Build once, validate, hand to generators, discard; nothing mutates the
//! tree after the passes complete.

use crate::addr::AddrRanges;
use crate::bus::Bus;
use crate::clock;
use crate::factory::{self, NameRegistry};
use crate::peripherals::Peripheral;
use anyhow::{anyhow, Context, Result};
use socmap_config::{RecordProvider, SystemRecord};
use tracing::info;

/// The fully built and validated interconnect tree.
#[derive(Debug)]
pub struct Soc {
    system: SystemRecord,
    root: Bus,
}

impl Soc {
    /// Build the whole tree from the system record and the bus records, then
    /// run the four ordered whole-tree passes: sanitize (overlap and
    /// containment), legality (allow-lists), reachability (downward union
    /// followed by loopback injection), and clock consistency.
    pub fn build(system: SystemRecord, provider: &dyn RecordProvider) -> Result<Self> {
        let mut registry = NameRegistry::new();
        let window = AddrRanges::new("SYSBUS", &[(0, system.phys_addr_width)])?;
        let mut root = factory::build_bus(
            "SYSBUS",
            window,
            &system.main_clock_domain,
            None,
            &system,
            provider,
            &mut registry,
        )
        .context("while building the bus tree")?
        .ok_or_else(|| anyhow!("the root bus record is disabled"))?;

        info!("bus tree built, running the validation passes");
        root.sanitize_addr_ranges()?;
        root.check_legals(system.profile)?;
        root.add_reachability();
        root.apply_loopback_reachability();
        clock::check_root_clocks(&root, &system.main_clock_domain)?;
        info!("address map is consistent");

        Ok(Self { system, root })
    }

    pub fn system(&self) -> &SystemRecord {
        &self.system
    }

    pub fn root(&self) -> &Bus {
        &self.root
    }

    /// Every peripheral in the tree, preorder.
    pub fn peripherals(&self) -> Vec<&Peripheral> {
        self.root.peripherals(true)
    }

    /// Every bus in the tree, preorder, root first.
    pub fn buses(&self) -> Vec<&Bus> {
        let mut out = vec![&self.root];
        out.extend(self.root.buses(true));
        out
    }

    /// The memory block the system boots from.
    pub fn boot_memory(&self) -> Result<&Peripheral> {
        self.peripherals()
            .into_iter()
            .find(|p| p.is_memory() && p.full_name() == self.system.boot_memory_block)
            .ok_or_else(|| {
                anyhow!(
                    "the boot memory block {} does not exist in the tree",
                    self.system.boot_memory_block
                )
            })
    }
}
