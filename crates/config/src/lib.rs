// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Flat configuration records for the SocMap compiler.
//!
//! This crate owns everything that happens *before* the bus tree exists: the
//! serde record model, the declarative per-record validation rules, the
//! record provider that locates a bus record by naming convention, and the
//! naming helpers (`BASENAME` / `BASENAME_<id>` / `<domain>_<mhz>`).
//!
//! The records are trusted by the core engine once `validate` has accepted
//! them; the engine layers only the structural (tree-shape, address
//! geometry) checks on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod error;
pub mod naming;
pub mod validate;

pub use error::{SocError, SocResult};

/// SoC profile selected in the system record. The `hpc` profile unlocks the
/// high-performance bus and its peripherals on the root bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Base,
    Hpc,
}

/// Interconnect protocol spoken by a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Axi4,
    Axi4Lite,
}

impl Protocol {
    /// Smallest child address width the protocol can route.
    pub fn min_child_width(self) -> u8 {
        match self {
            Protocol::Axi4 => 12,
            Protocol::Axi4Lite => 1,
        }
    }

    pub fn parse(s: &str) -> SocResult<Self> {
        match s {
            "AXI4" => Ok(Protocol::Axi4),
            "AXI4LITE" => Ok(Protocol::Axi4Lite),
            other => Err(SocError::Legality(format!("unsupported protocol '{other}'"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Axi4 => "AXI4",
            Protocol::Axi4Lite => "AXI4LITE",
        }
    }
}

fn default_id_width() -> u32 {
    4
}

fn default_children_num_ranges() -> usize {
    1
}

fn default_xlen() -> u32 {
    32
}

fn default_boot_memory_block() -> String {
    "BRAM_0".to_string()
}

/// System-wide record: one per configuration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemRecord {
    pub core_selector: String,
    pub main_clock_domain: String,
    #[serde(default = "default_xlen")]
    pub xlen: u32,
    pub phys_addr_width: u8,
    #[serde(default = "default_boot_memory_block")]
    pub boot_memory_block: String,
    #[serde(default)]
    pub profile: Profile,
}

impl SystemRecord {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read system record at {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let record: Self =
            serde_yaml::from_str(yaml).context("Failed to parse system record YAML")?;
        validate::validate_system(&record)?;
        Ok(record)
    }
}

/// Flat per-bus record: one YAML file per bus instance.
///
/// The child lists are parallel: entry `i` of `child_names` owns the chunk
/// `[i * children_num_ranges, (i + 1) * children_num_ranges)` of
/// `child_base_addrs` and `child_addr_widths`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRecord {
    /// Protocol name, or the sentinel `DISABLE` to drop this bus entirely.
    pub protocol: String,
    #[serde(default = "default_id_width")]
    pub id_width: u32,
    pub num_master_if: u32,
    pub num_slave_if: u32,
    pub master_names: Vec<String>,
    #[serde(default = "default_children_num_ranges")]
    pub children_num_ranges: usize,
    pub child_names: Vec<String>,
    pub child_base_addrs: Vec<u64>,
    pub child_addr_widths: Vec<u8>,
    /// Per-child clock domains; only meaningful on non-leaf buses. Leaf
    /// buses forward their own domain to every child.
    #[serde(default)]
    pub child_clock_domains: Vec<String>,
    #[serde(default)]
    pub loopback: bool,
}

impl BusRecord {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read bus record at {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse bus record YAML")
    }

    /// A disabled bus is skipped by the factory without touching the tree.
    pub fn is_disabled(&self) -> bool {
        self.protocol == "DISABLE"
    }
}

/// Hands out the flat record for a bus given its full name.
///
/// Implementations perform all file access before the core sees any data;
/// the engine itself never touches the filesystem.
pub trait RecordProvider {
    fn bus_record(&self, full_name: &str) -> Result<BusRecord>;
}

/// Locates `config_<full_name_lowercase>.yaml` inside a configuration
/// directory, the on-disk naming convention for bus records.
pub struct DirRecordProvider {
    dir: PathBuf,
}

impl DirRecordProvider {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, full_name: &str) -> PathBuf {
        self.dir
            .join(format!("config_{}.yaml", full_name.to_lowercase()))
    }
}

impl RecordProvider for DirRecordProvider {
    fn bus_record(&self, full_name: &str) -> Result<BusRecord> {
        let path = self.record_path(full_name);
        tracing::debug!(bus = full_name, ?path, "loading bus record");
        BusRecord::from_file(&path)
            .with_context(|| format!("while loading the record for bus {full_name}"))
    }
}

/// In-memory provider keyed by full name, used by tests and embedders.
#[derive(Default)]
pub struct StaticRecordProvider {
    records: HashMap<String, BusRecord>,
}

impl StaticRecordProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, full_name: &str, record: BusRecord) {
        self.records.insert(full_name.to_string(), record);
    }

    /// Convenience for tests: parse and register a YAML record in one step.
    pub fn insert_yaml(&mut self, full_name: &str, yaml: &str) -> Result<()> {
        let record = BusRecord::from_yaml(yaml)
            .with_context(|| format!("while parsing the record for bus {full_name}"))?;
        self.insert(full_name, record);
        Ok(())
    }
}

impl RecordProvider for StaticRecordProvider {
    fn bus_record(&self, full_name: &str) -> Result<BusRecord> {
        self.records
            .get(full_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no record registered for bus {full_name}"))
    }
}
