// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Artifact generators.
//!
//! Every generator takes the finished `&Soc` and produces text; none of
//! them mutate the tree. The tree accessors they rely on are
//! `get_ordered_children_ranges`, `get_dimensions`, `get_reachable_from`
//! and the per-bus scalar fields.

pub mod dump;
pub mod header;
pub mod linker;
pub mod map;

pub use dump::generate_reachability_dump;
pub use header::generate_driver_header;
pub use linker::generate_linker_script;
pub use map::generate_address_map;
