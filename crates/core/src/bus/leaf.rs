// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Leaf buses: children are peripherals only.

use super::BusCore;

/// A bus with no sub-buses. It forwards its own clock domain to every
/// child, so no per-child clock bookkeeping exists here.
#[derive(Debug, Clone)]
pub struct LeafBus {
    pub(crate) core: BusCore,
}

impl LeafBus {
    pub fn core(&self) -> &BusCore {
        &self.core
    }
}
