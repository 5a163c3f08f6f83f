// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Naming conventions shared by every record and node.
//!
//! A node's full name is `BASENAME` or `BASENAME_<integer>`, where the base
//! name is the type tag used for legality checks and must be alphanumeric.
//! Clock domain names end with `_<mhz>`, which is the only place the clock
//! frequency of a domain is declared.

use anyhow::{bail, Result};

/// Extract the type tag from a full name (`TIM_1` -> `TIM`).
pub fn base_name(full_name: &str) -> Result<String> {
    let mut parts = full_name.split('_');
    let base = parts.next().unwrap_or_default();
    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("there is something wrong with the {full_name} name format (BASENAME_id enforced)");
    }
    match (parts.next(), parts.next()) {
        // Plain BASENAME
        (None, _) => Ok(base.to_uppercase()),
        // BASENAME_<integer>
        (Some(id), None) if id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty() => {
            Ok(base.to_uppercase())
        }
        _ => bail!(
            "there is something wrong with the {full_name} name format (BASENAME_id enforced)"
        ),
    }
}

/// Extract the instance id from a full name, if one is present.
pub fn instance_id(full_name: &str) -> Result<Option<u32>> {
    base_name(full_name)?;
    match full_name.split_once('_') {
        None => Ok(None),
        Some((_, id)) => Ok(Some(id.parse()?)),
    }
}

/// Extract the frequency in MHz from a clock domain name (`MAIN_CLK_100` -> 100).
pub fn clock_frequency_mhz(clock_domain: &str) -> Result<u32> {
    let Some((_, tail)) = clock_domain.rsplit_once('_') else {
        bail!("there is something wrong with the {clock_domain} clock domain name format");
    };
    tail.parse().map_err(|_| {
        anyhow::anyhow!("there is something wrong with the {clock_domain} clock domain name format")
    })
}

/// A child name containing `BUS` designates a sub-bus rather than a peripheral.
pub fn is_bus_name(full_name: &str) -> bool {
    full_name.contains("BUS")
}
