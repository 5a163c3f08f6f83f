// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! End-to-end tests of the address-map compilation, from record files to
//! the validated tree.

use socmap_config::{SocError, StaticRecordProvider, SystemRecord};
use socmap_config::{DirRecordProvider, Profile};
use socmap_core::Soc;
use std::path::Path;

fn fixture_dir(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn base_system() -> SystemRecord {
    SystemRecord::from_yaml(
        r#"
core_selector: CORE_IBEX
main_clock_domain: MAIN_CLK_100
phys_addr_width: 32
"#,
    )
    .unwrap()
}

fn hpc_system() -> SystemRecord {
    SystemRecord::from_yaml(
        r#"
core_selector: CORE_IBEX
main_clock_domain: MAIN_CLK_100
phys_addr_width: 32
profile: hpc
"#,
    )
    .unwrap()
}

#[test]
fn uart_end_to_end_from_record_files() {
    let dir = fixture_dir("base");
    let system = SystemRecord::from_file(dir.join("system.yaml")).unwrap();
    let provider = DirRecordProvider::new(&dir);
    let soc = Soc::build(system, &provider).unwrap();

    assert_eq!(soc.system().profile, Profile::Base);
    let peripherals = soc.peripherals();
    let uart = peripherals
        .iter()
        .find(|p| p.full_name() == "UART_0")
        .unwrap();

    let dims = uart.addr_ranges().get_dimensions(false);
    assert_eq!(dims.len(), 1);
    let (name, d) = &dims[0];
    assert_eq!(name, "UART_0");
    assert_eq!((d.base, d.end, d.length), (0x1000, 0x2000, 0x1000));

    let reachable = uart.addr_ranges().get_reachable_from(false);
    assert_eq!(reachable[0].1, vec!["PBUS_0", "SYSBUS"]);

    // Port indices follow base-address order.
    let ordered: Vec<&str> = soc
        .root()
        .get_ordered_children_ranges()
        .iter()
        .map(|r| r.full_name())
        .collect();
    assert_eq!(ordered, vec!["PBUS_0", "BRAM_0"]);

    assert_eq!(soc.boot_memory().unwrap().full_name(), "BRAM_0");
}

fn loopback_provider() -> StaticRecordProvider {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 2
num_slave_if: 1
master_names: [CORE]
child_names: [BRAM_0, HPBUS_0]
child_base_addrs: [0x0, 0x40000000]
child_addr_widths: [16, 30]
child_clock_domains: [MAIN_CLK_100, HP_CLK_300]
"#,
        )
        .unwrap();
    provider
        .insert_yaml(
            "HPBUS_0",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [SYSBUS]
child_names: [DDR4CH_0]
child_base_addrs: [0x40000000]
child_addr_widths: [29]
child_clock_domains: [DDR_300]
loopback: true
"#,
        )
        .unwrap();
    provider
}

#[test]
fn loopback_synthesizes_windows_and_injects_reachability() {
    let soc = Soc::build(hpc_system(), &loopback_provider()).unwrap();

    let hpbus = soc
        .buses()
        .into_iter()
        .find(|b| b.full_name() == "HPBUS_0")
        .unwrap();
    assert!(hpbus.loopback());
    let window = hpbus.loopback_window().unwrap();
    let spans: Vec<(u64, u128)> = window.iter().map(|r| (r.base(), r.end())).collect();
    assert_eq!(spans, vec![(0, 0x4000_0000), (0x8000_0000, 0x1_0000_0000)]);

    // The parent accepted one extra inbound master for the loopback path.
    let root = soc.root().core();
    assert_eq!(root.num_slave_if(), 2);
    assert!(root.master_names().iter().any(|m| m == "HPBUS_0"));

    // The window occupies ports on the loopback bus's own crossbar; the
    // parent's port order carries only its declared children.
    let hpbus_ordered: Vec<&str> = hpbus
        .get_ordered_children_ranges()
        .iter()
        .map(|r| r.full_name())
        .collect();
    assert_eq!(hpbus_ordered, vec!["SYSBUS", "DDR4CH_0"]);
    let root_ordered: Vec<&str> = soc
        .root()
        .get_ordered_children_ranges()
        .iter()
        .map(|r| r.full_name())
        .collect();
    assert_eq!(root_ordered, vec!["BRAM_0", "HPBUS_0"]);

    // BRAM_0 sits inside the before-window and becomes reachable through
    // the loopback bus on top of the ordinary downward propagation.
    let peripherals = soc.peripherals();
    let bram = peripherals
        .iter()
        .find(|p| p.full_name() == "BRAM_0")
        .unwrap();
    let reachable = bram.addr_ranges().get_reachable_from(false);
    assert_eq!(reachable[0].1, vec!["HPBUS_0", "SYSBUS"]);

    // The DDR channel's declared range was split to match the doubled
    // per-child range arity.
    let ddr = peripherals
        .iter()
        .find(|p| p.full_name() == "DDR4CH_0")
        .unwrap();
    assert_eq!(ddr.addr_ranges().len(), 2);
    let reachable = ddr.addr_ranges().get_reachable_from(false);
    assert_eq!(reachable.len(), 1);
    assert_eq!(reachable[0].1, vec!["HPBUS_0", "SYSBUS"]);
}

fn expect_soc_error(provider: &StaticRecordProvider, system: SystemRecord) -> SocError {
    let err = Soc::build(system, provider).unwrap_err();
    match err.downcast::<SocError>() {
        Ok(soc_err) => soc_err,
        Err(other) => panic!("expected a SocError, got: {other:?}"),
    }
}

#[test]
fn overlapping_siblings_fail() {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 2
num_slave_if: 1
master_names: [CORE]
child_names: [BRAM_0, BRAM_1]
child_base_addrs: [0x0, 0x8000]
child_addr_widths: [16, 15]
child_clock_domains: [MAIN_CLK_100, MAIN_CLK_100]
"#,
        )
        .unwrap();
    assert!(matches!(
        expect_soc_error(&provider, base_system()),
        SocError::Overlap { .. }
    ));
}

#[test]
fn misaligned_base_fails() {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [CORE]
child_names: [BRAM_0]
child_base_addrs: [0x1800]
child_addr_widths: [12]
child_clock_domains: [MAIN_CLK_100]
"#,
        )
        .unwrap();
    let err = Soc::build(base_system(), &provider).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SocError>(),
        Some(SocError::Alignment { .. })
    ));
}

#[test]
fn child_escaping_the_parent_window_fails() {
    let mut provider = StaticRecordProvider::new();
    // phys_addr_width 32: anything at or above 2^32 cannot be declared,
    // so shrink the sub-bus window instead and let its child escape it.
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [CORE]
child_names: [PBUS_0]
child_base_addrs: [0x0]
child_addr_widths: [14]
child_clock_domains: [PBUS_CLK_20]
"#,
        )
        .unwrap();
    provider
        .insert_yaml(
            "PBUS_0",
            r#"
protocol: AXI4LITE
num_master_if: 1
num_slave_if: 1
master_names: [SYSBUS]
child_names: [UART_0]
child_base_addrs: [0x8000]
child_addr_widths: [12]
"#,
        )
        .unwrap();
    assert!(matches!(
        expect_soc_error(&provider, base_system()),
        SocError::Containment { .. }
    ));
}

#[test]
fn loopback_on_non_power_of_two_base_fails() {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [CORE]
child_names: [HPBUS_0]
child_base_addrs: [0x60000000]
child_addr_widths: [28]
child_clock_domains: [HP_CLK_300]
"#,
        )
        .unwrap();
    provider
        .insert_yaml(
            "HPBUS_0",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [SYSBUS]
child_names: [DDR4CH_0]
child_base_addrs: [0x60000000]
child_addr_widths: [27]
child_clock_domains: [DDR_300]
loopback: true
"#,
        )
        .unwrap();
    let err = Soc::build(hpc_system(), &provider).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SocError>(),
        Some(SocError::LoopbackPrecondition(_))
    ));
}

#[test]
fn root_mandated_peripheral_on_a_foreign_clock_fails() {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 1
num_slave_if: 1
master_names: [CORE]
child_names: [BRAM_0]
child_base_addrs: [0x0]
child_addr_widths: [16]
child_clock_domains: [SLOW_CLK_10]
"#,
        )
        .unwrap();
    assert!(matches!(
        expect_soc_error(&provider, base_system()),
        SocError::ClockDomain(_)
    ));
}

#[test]
fn duplicate_names_across_buses_fail() {
    let mut provider = StaticRecordProvider::new();
    provider
        .insert_yaml(
            "SYSBUS",
            r#"
protocol: AXI4
num_master_if: 2
num_slave_if: 1
master_names: [CORE]
child_names: [PBUS_0, PBUS_1]
child_base_addrs: [0x0, 0x10000000]
child_addr_widths: [16, 16]
child_clock_domains: [PBUS_CLK_20, PBUS_CLK_20]
"#,
        )
        .unwrap();
    for pbus in ["PBUS_0", "PBUS_1"] {
        let base = if pbus == "PBUS_0" { "0x1000" } else { "0x10001000" };
        provider
            .insert_yaml(
                pbus,
                &format!(
                    r#"
protocol: AXI4LITE
num_master_if: 1
num_slave_if: 1
master_names: [SYSBUS]
child_names: [TIM_1]
child_base_addrs: [{base}]
child_addr_widths: [12]
"#
                ),
            )
            .unwrap();
    }
    assert!(matches!(
        expect_soc_error(&provider, base_system()),
        SocError::DuplicateName(_)
    ));
}

#[test]
fn hpc_peripherals_are_illegal_in_the_base_profile() {
    let soc = Soc::build(base_system(), &loopback_provider());
    let err = soc.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SocError>(),
        Some(SocError::Legality(_))
    ));
}
