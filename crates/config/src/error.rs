// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Fatal error taxonomy shared by the validation layer and the tree engine.
//!
//! The compiler is all-or-nothing: every variant aborts the run. Errors are
//! raised at the point of detection and carried up through `anyhow` to the
//! CLI, which maps them to a non-zero exit status.

/// A configuration error that invalidates the whole compilation.
#[derive(Debug, thiserror::Error)]
pub enum SocError {
    /// Base address does not have its low `width` bits clear.
    #[error("base address {base:#x} is not aligned to an address width of {width} bits in {name}")]
    Alignment { name: String, base: u64, width: u8 },

    /// Two sibling address ranges intersect.
    #[error("address ranges of {first} overlap with {second} in {bus}")]
    Overlap {
        bus: String,
        first: String,
        second: String,
    },

    /// A child range is not fully inside any of its parent's assigned ranges.
    #[error("address ranges of {node} are not fully contained in the ranges of {bus}")]
    Containment { bus: String, node: String },

    /// A child type, protocol or width is not permitted where it appears.
    #[error("{0}")]
    Legality(String),

    /// A declared count field disagrees with the length of its list.
    #[error("{0}")]
    CountMismatch(String),

    /// Loopback was requested on a bus that cannot support it.
    #[error("{0}")]
    LoopbackPrecondition(String),

    /// A node is wired to a clock domain it must not use.
    #[error("{0}")]
    ClockDomain(String),

    /// Two nodes share a full name somewhere in the configuration.
    #[error("there are multiple nodes with the same full name ({0})")]
    DuplicateName(String),
}

pub type SocResult<T> = Result<T, SocError>;
