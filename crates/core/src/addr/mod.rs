// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Power-of-two address range arithmetic.
//!
//! `AddrRange` is one contiguous, aligned interval; `AddrRanges` is the set
//! of ranges assigned to a single node, sorted by base address. A range name
//! identifies a range of addresses rather than a node: a node with one range
//! names it after itself, a node with several uses `_range_<i>` suffixes.
//! This matters for reachability, where a bus connected in loopback may be
//! able to address only some ranges of a sibling node.
//!
//! End addresses are the first address *outside* the range and are computed
//! in `u128` because a 64-bit-wide range based at 0 ends at `2^64`.

use serde::Serialize;
use socmap_config::{SocError, SocResult};
use std::collections::BTreeSet;

/// One aligned `[base, base + 2^width)` interval with its reachability set.
#[derive(Debug, Clone)]
pub struct AddrRange {
    name: String,
    base: u64,
    width: u8,
    reachable_from: BTreeSet<String>,
}

/// Geometry of a range (or of a merged contiguous set), for generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeDimensions {
    pub base: u64,
    pub end: u128,
    pub length: u128,
}

impl AddrRange {
    pub fn new(name: impl Into<String>, base: u64, width: u8) -> SocResult<Self> {
        let name = name.into();
        if width == 0 || width > 64 {
            return Err(SocError::Legality(format!(
                "address width {width} of {name} is outside the supported range [1, 64]"
            )));
        }
        // The low `width` bits of the base must all be zero.
        let mask = (1u128 << width) - 1;
        if (base as u128) & mask != 0 {
            return Err(SocError::Alignment { name, base, width });
        }
        Ok(Self {
            name,
            base,
            width,
            reachable_from: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// First address outside the range.
    pub fn end(&self) -> u128 {
        self.base as u128 + self.length()
    }

    pub fn length(&self) -> u128 {
        1u128 << self.width
    }

    /// True when `other` lies fully inside `self`.
    pub fn contains(&self, other: &AddrRange) -> bool {
        self.base <= other.base && self.end() >= other.end()
    }

    /// True when the two intervals share at least one address.
    pub fn overlaps(&self, other: &AddrRange) -> bool {
        !(self.end() <= other.base as u128 || self.base as u128 >= other.end())
    }

    /// Halve the range in place and return the upper half as a new sibling.
    ///
    /// The kept half retains the base; the sibling starts where the kept
    /// half now ends. Both get `width - 1` and the sibling inherits a copy
    /// of the current reachability set.
    pub fn split(&mut self, kept_name: String, sibling_name: String) -> SocResult<AddrRange> {
        if self.width == 1 {
            return Err(SocError::LoopbackPrecondition(format!(
                "range {} is too narrow to split",
                self.name
            )));
        }
        self.width -= 1;
        self.name = kept_name;
        let sibling_base = self.end() as u64;
        let mut sibling = AddrRange::new(sibling_name, sibling_base, self.width)?;
        sibling.reachable_from = self.reachable_from.clone();
        Ok(sibling)
    }

    pub fn add_reachable(&mut self, bus_full_name: &str) {
        self.reachable_from.insert(bus_full_name.to_string());
    }

    pub fn extend_reachable<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.reachable_from.extend(names);
    }

    pub fn reachable_from(&self) -> &BTreeSet<String> {
        &self.reachable_from
    }
}

/// Rewrite or append a `_range_<i>` suffix.
fn range_suffixed(name: &str, i: usize) -> String {
    if let Some(pos) = name.rfind("_range_") {
        let digits = &name[pos + "_range_".len()..];
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return format!("{}_range_{i}", &name[..pos]);
        }
    }
    format!("{name}_range_{i}")
}

/// The named, sorted set of address ranges belonging to one node.
#[derive(Debug, Clone)]
pub struct AddrRanges {
    full_name: String,
    ranges: Vec<AddrRange>,
    contiguous: bool,
}

impl AddrRanges {
    /// Build from `(base, width)` spans. A single span is named after the
    /// owner; multiple spans get `_range_<i>` suffixes.
    pub fn new(full_name: impl Into<String>, spans: &[(u64, u8)]) -> SocResult<Self> {
        let full_name = full_name.into();
        if spans.is_empty() {
            return Err(SocError::CountMismatch(format!(
                "{full_name} declares no address ranges"
            )));
        }
        let mut ranges = Vec::with_capacity(spans.len());
        for (i, &(base, width)) in spans.iter().enumerate() {
            let name = if spans.len() == 1 {
                full_name.clone()
            } else {
                range_suffixed(&full_name, i)
            };
            ranges.push(AddrRange::new(name, base, width)?);
        }
        let mut set = Self {
            full_name,
            ranges,
            contiguous: false,
        };
        set.refresh();
        Ok(set)
    }

    /// Restore the sorted-ascending invariant and recompute contiguity.
    fn refresh(&mut self) {
        self.ranges.sort_by_key(|r| r.base);
        self.contiguous = self
            .ranges
            .windows(2)
            .all(|pair| pair[0].end() == pair[1].base as u128);
        if self.ranges.len() == 1 {
            self.contiguous = true;
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contiguous(&self) -> bool {
        self.contiguous
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddrRange> {
        self.ranges.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AddrRange> {
        self.ranges.iter_mut()
    }

    /// Smallest base address across the set.
    pub fn base_addr(&self) -> u64 {
        // Sorted invariant: the first range holds the minimum.
        self.ranges[0].base
    }

    /// Largest end address across the set.
    pub fn end_addr(&self) -> u128 {
        self.ranges.iter().map(AddrRange::end).max().unwrap_or(0)
    }

    /// True when `range` lies fully inside at least one range of the set.
    pub fn contains(&self, range: &AddrRange) -> bool {
        self.ranges.iter().any(|r| r.contains(range))
    }

    /// True when at least one range of `other` overlaps one of `self`.
    pub fn overlaps(&self, other: &AddrRanges) -> bool {
        other
            .ranges
            .iter()
            .any(|o| self.ranges.iter().any(|r| r.overlaps(o)))
    }

    /// Halve every range, doubling the set's arity. Used when a loopback
    /// activation raises the owning bus's per-child range count to two.
    pub fn split_all(&mut self) -> SocResult<()> {
        let mut siblings = Vec::with_capacity(self.ranges.len());
        for (i, range) in self.ranges.iter_mut().enumerate() {
            let stem = range.name().to_string();
            let kept = range_suffixed(&stem, i);
            let sibling = range_suffixed(&stem, i + 1);
            siblings.push(range.split(kept, sibling)?);
        }
        self.ranges.extend(siblings);
        self.refresh();
        Ok(())
    }

    /// Per-range geometry, or a single merged entry keyed by the full name
    /// when the set is contiguous and `explicit` is false. Generators use
    /// the merged form to emit one memory region per node.
    pub fn get_dimensions(&self, explicit: bool) -> Vec<(String, RangeDimensions)> {
        if self.contiguous && !explicit {
            let length = self.ranges.iter().map(AddrRange::length).sum();
            return vec![(
                self.full_name.clone(),
                RangeDimensions {
                    base: self.base_addr(),
                    end: self.end_addr(),
                    length,
                },
            )];
        }
        self.ranges
            .iter()
            .map(|r| {
                (
                    r.name().to_string(),
                    RangeDimensions {
                        base: r.base(),
                        end: r.end(),
                        length: r.length(),
                    },
                )
            })
            .collect()
    }

    /// Per-range reachability, merged into a single entry when every range
    /// is reachable from the same buses and `explicit` is false.
    pub fn get_reachable_from(&self, explicit: bool) -> Vec<(String, Vec<String>)> {
        let uniform = self
            .ranges
            .windows(2)
            .all(|pair| pair[0].reachable_from == pair[1].reachable_from);
        if uniform && !explicit {
            return vec![(
                self.full_name.clone(),
                self.ranges[0].reachable_from.iter().cloned().collect(),
            )];
        }
        self.ranges
            .iter()
            .map(|r| {
                (
                    r.name().to_string(),
                    r.reachable_from.iter().cloned().collect(),
                )
            })
            .collect()
    }
}
