// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! GNU linker script generation.
//!
//! One `MEMORY` region per memory peripheral (contiguous range sets are
//! merged into a single region), the vector table and sections placed in
//! the configured boot memory, and the initial stack pointer parked at the
//! top of that memory.

use anyhow::Result;
use socmap_core::Soc;
use std::fmt::Write;
use tracing::debug;

/// The stack pointer must start 16-byte aligned per the RISC-V psABI.
const STACK_ALIGN: u128 = 16;

pub fn generate_linker_script(soc: &Soc) -> Result<String> {
    let boot = soc.boot_memory()?;
    let boot_region = boot.full_name().to_string();

    let mut script = String::new();
    script.push_str("/* Generated by socmap. Do not edit. */\n\n");
    script.push_str("MEMORY\n{\n");
    for peripheral in soc.peripherals() {
        if !peripheral.is_memory() {
            continue;
        }
        for (name, dims) in peripheral.addr_ranges().get_dimensions(false) {
            debug!(region = %name, base = dims.base, "emitting memory region");
            writeln!(
                script,
                "  {name} (rwx) : ORIGIN = {:#010x}, LENGTH = {:#x}",
                dims.base, dims.length
            )?;
        }
    }
    script.push_str("}\n\n");

    script.push_str("ENTRY(_start)\n\n");
    script.push_str("SECTIONS\n{\n");
    writeln!(
        script,
        "  .vectors : {{\n    _vector_table_start = .;\n    KEEP(*(.vectors));\n    _vector_table_end = .;\n  }} > {boot_region}\n"
    )?;
    writeln!(script, "  .text : {{ *(.text*) }} > {boot_region}")?;
    writeln!(script, "  .rodata : {{ *(.rodata*) }} > {boot_region}")?;
    writeln!(script, "  .data : {{ *(.data*) }} > {boot_region}")?;
    writeln!(
        script,
        "  .bss : {{\n    _bss_start = .;\n    *(.bss*);\n    _bss_end = .;\n  }} > {boot_region}"
    )?;
    script.push_str("}\n\n");

    let stack_start = boot.node().end_addr() & !(STACK_ALIGN - 1);
    writeln!(script, "_stack_start = {stack_start:#x};")?;
    Ok(script)
}
