// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Address-space hierarchy engine.
//!
//! Compiles validated configuration records into a bus/peripheral tree with
//! a fully resolved address map: power-of-two range arithmetic, the loopback
//! complement-window mechanism, and reachability/clock-domain propagation.
//! Everything here is single-threaded and build-then-freeze: a `Soc` is
//! constructed once per run, queried by generators, and discarded.

pub mod addr;
pub mod bus;
pub mod clock;
pub mod factory;
pub mod node;
pub mod peripherals;
pub mod system;

pub use addr::{AddrRange, AddrRanges, RangeDimensions};
pub use bus::{Bus, BusCore, BusKind, LeafBus, NonLeafBus};
pub use factory::NameRegistry;
pub use node::Node;
pub use peripherals::{Peripheral, PeripheralKind};
pub use system::Soc;
