// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Terminal tree nodes.
//!
//! Peripheral kinds differ only in legality and clock constraints, never in
//! tree behavior, so they are a closed enum plus per-kind flags resolved at
//! construction.

use crate::addr::AddrRanges;
use crate::node::Node;
use socmap_config::{SocError, SocResult};

/// DDR4 channels are clocked by the memory controller and accept exactly
/// this frequency.
const DDR4_CLOCK_MHZ: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralKind {
    Timer,
    Uart,
    GpioIn,
    GpioOut,
    BlockRam,
    Ddr4Channel { channel: u32 },
    DebugModule,
    InterruptController,
    AcceleratorControl,
    Dma,
}

/// A terminal, addressable device.
#[derive(Debug, Clone)]
pub struct Peripheral {
    node: Node,
    kind: PeripheralKind,
    is_memory: bool,
    supports_driver: bool,
}

impl Peripheral {
    /// Build a peripheral from its type tag. Unknown tags are rejected here
    /// rather than in the legality pass, since no bus could accept them.
    pub fn build(
        base_name: &str,
        instance_id: Option<u32>,
        addr_ranges: AddrRanges,
        clock_domain: &str,
        clock_frequency: u32,
    ) -> SocResult<Self> {
        let full_name = addr_ranges.full_name().to_string();
        let (kind, is_memory, supports_driver) = match base_name {
            "TIM" => (PeripheralKind::Timer, false, true),
            "UART" => (PeripheralKind::Uart, false, true),
            "GPIOIN" => (PeripheralKind::GpioIn, false, true),
            "GPIOOUT" => (PeripheralKind::GpioOut, false, true),
            "BRAM" => (PeripheralKind::BlockRam, true, false),
            "DDR4CH" => {
                if clock_frequency != DDR4_CLOCK_MHZ {
                    return Err(SocError::ClockDomain(format!(
                        "DDR4 channel {full_name} must be clocked at {DDR4_CLOCK_MHZ} MHz \
                         (configured with {clock_domain})"
                    )));
                }
                let channel = instance_id.unwrap_or(0);
                (PeripheralKind::Ddr4Channel { channel }, true, false)
            }
            "DM" => (PeripheralKind::DebugModule, false, false),
            "PLIC" => (PeripheralKind::InterruptController, false, true),
            "HLS" => (PeripheralKind::AcceleratorControl, false, true),
            "CDMA" => (PeripheralKind::Dma, false, true),
            other => {
                return Err(SocError::Legality(format!(
                    "unsupported peripheral type {other} ({full_name})"
                )))
            }
        };
        Ok(Self {
            node: Node::new(base_name, addr_ranges, clock_domain, clock_frequency),
            kind,
            is_memory,
            supports_driver,
        })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn kind(&self) -> PeripheralKind {
        self.kind
    }

    pub fn base_name(&self) -> &str {
        self.node.base_name()
    }

    pub fn full_name(&self) -> &str {
        self.node.full_name()
    }

    pub fn addr_ranges(&self) -> &AddrRanges {
        self.node.addr_ranges()
    }

    /// True for peripherals that back linker-script memory regions.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// True for peripherals with a driver in the hardware abstraction layer.
    pub fn supports_driver(&self) -> bool {
        self.supports_driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(name: &str) -> AddrRanges {
        AddrRanges::new(name, &[(0x1000, 12)]).unwrap()
    }

    #[test]
    fn flags_per_kind() {
        let uart = Peripheral::build("UART", Some(0), ranges("UART_0"), "PBUS_CLK_20", 20).unwrap();
        assert!(uart.supports_driver());
        assert!(!uart.is_memory());

        let bram = Peripheral::build("BRAM", Some(0), ranges("BRAM_0"), "MAIN_CLK_100", 100).unwrap();
        assert!(bram.is_memory());
        assert!(!bram.supports_driver());
    }

    #[test]
    fn ddr4_channel_requires_300_mhz() {
        let err = Peripheral::build("DDR4CH", Some(1), ranges("DDR4CH_1"), "DDR_250", 250);
        assert!(matches!(err, Err(SocError::ClockDomain(_))));

        let ok = Peripheral::build("DDR4CH", Some(1), ranges("DDR4CH_1"), "DDR_300", 300).unwrap();
        assert_eq!(ok.kind(), PeripheralKind::Ddr4Channel { channel: 1 });
        assert!(ok.is_memory());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Peripheral::build("SPI", Some(0), ranges("SPI_0"), "MAIN_CLK_100", 100);
        assert!(matches!(err, Err(SocError::Legality(_))));
    }
}
