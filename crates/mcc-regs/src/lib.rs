#![forbid(unsafe_code)]

//! Register map and wire constants for the PCIe multi-core-communication link.
//!
//! This crate exists so the link core (`mcc-link`) and its tests agree on the
//! offsets and bit patterns that must match the peer implementation bit for
//! bit. Everything here is part of the interop contract: the DBI-mapped iATU
//! viewport block, the embedded-DMA register block, the handshake status-word
//! layout, and the reference board's address plan.

// ---------------------------------------------------------------------------
// Local configuration space (DBI window, offset 0).
// ---------------------------------------------------------------------------

/// Vendor/device identification dword (standard PCI config header, offset 0).
pub const CFG_VENDOR_DEVICE_ID: u64 = 0x00;

/// PCI command/status register.
pub const CFG_COMMAND: u64 = 0x04;

/// Command value enabling memory-mapped access before any window is
/// programmed: I/O space, memory space, bus master, parity, SERR.
pub const CFG_COMMAND_ENABLE: u32 = 0x0010_0147;

// ---------------------------------------------------------------------------
// iATU viewport block.
//
// Classic (viewport-indexed) DesignWare layout: one shared register window at
// DBI + 0x900, with the region selected through `ATU_VIEWPORT` before the
// per-region registers are touched.
// ---------------------------------------------------------------------------

pub const ATU_VIEWPORT: u64 = 0x900;
pub const ATU_REGION_CTRL1: u64 = 0x904;
pub const ATU_REGION_CTRL2: u64 = 0x908;
pub const ATU_LOWER_BASE: u64 = 0x90c;
pub const ATU_UPPER_BASE: u64 = 0x910;
pub const ATU_LIMIT: u64 = 0x914;
pub const ATU_LOWER_TARGET: u64 = 0x918;
pub const ATU_UPPER_TARGET: u64 = 0x91c;

/// Viewport-select bit 31: inbound mapping (peer looks at local memory).
pub const ATU_INBOUND_BIT: u32 = 1 << 31;

/// Region control 2 bit 31: region enable.
pub const ATU_REGION_ENABLE_BIT: u32 = 1 << 31;

/// Region control 2 bit 30: BAR-match mode (inbound access is matched against
/// the BAR named in [`ATU_BAR_NUM_SHIFT`] rather than an address range).
pub const ATU_BAR_MATCH_BIT: u32 = 1 << 30;

/// Region control 2 field binding the region to a BAR number.
pub const ATU_BAR_NUM_SHIFT: u32 = 9;

/// Full-aperture limit written in inbound mode.
pub const ATU_LIMIT_FULL: u32 = 0xffff_ffff;

/// Viewport-select value for inbound region `index`.
pub const fn atu_viewport_inbound(index: u32) -> u32 {
    ATU_INBOUND_BIT | index
}

/// Region control 2 value activating region `index` bound to BAR `index`.
pub const fn atu_region_ctrl2_enable(index: u32) -> u32 {
    ATU_REGION_ENABLE_BIT | ATU_BAR_MATCH_BIT | (index << ATU_BAR_NUM_SHIFT)
}

// ---------------------------------------------------------------------------
// Embedded DMA register block (DBI window).
//
// One write channel and one read channel share a single register set; the
// channel is selected through `DMA_CHANNEL_CONTEXT_INDEX` before the shared
// registers are programmed.
// ---------------------------------------------------------------------------

pub const DMA_WRITE_ENGINE_ENABLE: u64 = 0x97c;
pub const DMA_WRITE_DOORBELL: u64 = 0x980;
pub const DMA_READ_ENGINE_ENABLE: u64 = 0x99c;
pub const DMA_READ_DOORBELL: u64 = 0x9a0;
pub const DMA_WRITE_INTERRUPT_STATUS: u64 = 0x9bc;
pub const DMA_WRITE_INTERRUPT_MASK: u64 = 0x9c4;
pub const DMA_WRITE_INTERRUPT_CLEAR: u64 = 0x9c8;
pub const DMA_READ_INTERRUPT_STATUS: u64 = 0xa10;
pub const DMA_READ_INTERRUPT_MASK: u64 = 0xa18;
pub const DMA_READ_INTERRUPT_CLEAR: u64 = 0xa1c;
pub const DMA_CHANNEL_CONTEXT_INDEX: u64 = 0xa6c;
pub const DMA_CHANNEL_CONTROL: u64 = 0xa70;
pub const DMA_TRANSFER_SIZE: u64 = 0xa78;
pub const DMA_SAR_LOW: u64 = 0xa7c;
pub const DMA_SAR_HIGH: u64 = 0xa80;
pub const DMA_DAR_LOW: u64 = 0xa84;
pub const DMA_DAR_HIGH: u64 = 0xa88;

/// Context-index value selecting the write channel.
pub const DMA_CTX_WRITE_CHANNEL: u32 = 0;

/// Context-index value selecting the read channel (top bit set).
pub const DMA_CTX_READ_CHANNEL: u32 = 1 << 31;

/// Fixed channel-control pattern written to start a transfer.
pub const DMA_CHANNEL_START: u32 = 0x68;

/// Value enabling a DMA engine through its engine-enable register.
pub const DMA_ENGINE_ENABLE: u32 = 0x1;

/// Interrupt status bit 0: transfer done.
pub const DMA_DONE_INTERRUPT_BIT: u32 = 1 << 0;

/// Interrupt status bit 16: transfer aborted.
pub const DMA_ABORT_INTERRUPT_BIT: u32 = 1 << 16;

/// Channel-control pattern (bits 5..=9) hardware requires to arm the
/// channel-done notification.
pub const DMA_CHANNEL_DONE_PATTERN: u32 = 11 << 5;

/// Channel-control bit 3: local interrupt enable.
pub const DMA_LOCAL_INTERRUPT_ENABLE_BIT: u32 = 1 << 3;

/// Registers with no documented role that the write-channel reset must clear.
///
/// Carried from board bring-up: the block powers up with non-zero contents
/// and transfers misbehave unless these are zeroed alongside the named
/// registers. Kept as opaque offsets; no semantics are assumed.
pub const DMA_WRITE_SCRUB_OFFSETS: [u64; 7] =
    [0x9d0, 0x9d4, 0x9d8, 0x9dc, 0x9e0, 0xa8c, 0xa90];

/// Opaque must-clear offsets for the read-channel reset. The trailing pair is
/// shared with the write list and is cleared once per channel context.
pub const DMA_READ_SCRUB_OFFSETS: [u64; 7] =
    [0xa3c, 0xa40, 0xa44, 0xa48, 0xa4c, 0xa8c, 0xa90];

// ---------------------------------------------------------------------------
// Handshake status word.
//
// A single scalar exchanged through a well-known side-band register. The host
// publishes it; the slave claims it and writes it back with the
// acknowledgment bit set, leaving every other bit untouched.
// ---------------------------------------------------------------------------

/// Bits [4:0]: slave slot identifier. 0 is never a valid assignment.
pub const HANDSHAKE_SLOT_MASK: u32 = 0x1f;

/// Bit 5: slave-has-shaken-hands acknowledgment.
pub const HANDSHAKE_ACK_BIT: u32 = 1 << 5;

/// Bits [31:12]: page-aligned shared-memory base chosen by the host.
pub const HANDSHAKE_SHM_BASE_MASK: u32 = 0xffff_f000;

// ---------------------------------------------------------------------------
// Side-band (system-control) register block.
//
// Offsets into the block mapped at `SYSCTL_BASE`. Board-specific: boards with
// a different system-control layout override these through the link
// configuration.
// ---------------------------------------------------------------------------

/// Handshake status word (host-published readiness + addressing).
pub const SIDEBAND_HANDSHAKE_STATUS: u64 = 0x154;

/// Which host-side controller this slave hangs off.
pub const SIDEBAND_PEER_CONTROLLER: u64 = 0x158;

/// Message-interrupt command register (write 0 to acknowledge).
pub const SIDEBAND_SIGNAL_COMMAND: u64 = 0x160;

/// Message-interrupt status register (zero means no interrupt pending).
pub const SIDEBAND_SIGNAL_STATUS: u64 = 0x164;

/// Shared peripheral-control register carrying the INTx assert bit.
pub const SIDEBAND_PERIPH_CTRL: u64 = 0xd8;

/// Bit in [`SIDEBAND_PERIPH_CTRL`] asserting the out-of-band interrupt line
/// toward the peer.
pub const PERIPH_CTRL_INTX_BIT: u32 = 1 << 12;

// ---------------------------------------------------------------------------
// Reference board address plan (Hi3532-class slave SoC).
// ---------------------------------------------------------------------------

/// Local interrupt line wired to DMA completion/abort on controller 0.
pub const PCIE0_DMA_LOCAL_IRQ: u32 = 19;

/// Interrupt line wired to the peer's message doorbell.
pub const MESSAGE_IRQ: u32 = 31;

/// DBI/configuration space of the local controller.
pub const PCIE0_CFG_BASE: u64 = 0x2080_0000;
pub const PCIE0_CFG_SIZE: u64 = 0x1000;

/// PCIe memory aperture the BAR-backed windows are carved from.
pub const PCIE0_MEM_BASE: u64 = 0x3000_0000;
pub const PCIE0_MEM_SIZE: u64 = 0x1000_0000;

/// Window 0: shared-memory aperture (BAR 0).
pub const PCIE0_WIN0_BASE: u64 = 0x3000_0000;
pub const PCIE0_WIN0_SIZE: u64 = 0x80_0000;

/// Window 1: side-band register aperture (BAR 1).
pub const PCIE0_WIN1_BASE: u64 = 0x3080_0000;
pub const PCIE0_WIN1_SIZE: u64 = 0x1000;

/// Window 2: auxiliary data aperture (BAR 2).
pub const PCIE0_WIN2_BASE: u64 = 0x3100_0000;
pub const PCIE0_WIN2_SIZE: u64 = 0x80_0000;

/// System-control block holding the side-band registers.
pub const SYSCTL_BASE: u64 = 0x2005_0000;
pub const SYSCTL_SIZE: u64 = 0x1000;

/// Local DDR range DMA targets must fall within (half-open).
pub const RAM_BASE: u32 = 0x8000_0000;
pub const RAM_END: u32 = 0xffff_ffff;

/// Default shared-memory window size (matches the window 0 aperture).
pub const SHM_SIZE: u32 = 0x80_0000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atu_viewport_block_is_contiguous() {
        assert_eq!(ATU_VIEWPORT, 0x900);
        assert_eq!(ATU_REGION_CTRL1, ATU_VIEWPORT + 0x4);
        assert_eq!(ATU_REGION_CTRL2, ATU_VIEWPORT + 0x8);
        assert_eq!(ATU_LOWER_BASE, ATU_VIEWPORT + 0xc);
        assert_eq!(ATU_UPPER_BASE, ATU_VIEWPORT + 0x10);
        assert_eq!(ATU_LIMIT, ATU_VIEWPORT + 0x14);
        assert_eq!(ATU_LOWER_TARGET, ATU_VIEWPORT + 0x18);
        assert_eq!(ATU_UPPER_TARGET, ATU_VIEWPORT + 0x1c);
    }

    #[test]
    fn atu_patterns_match_the_wire_contract() {
        assert_eq!(atu_viewport_inbound(0), 0x8000_0000);
        assert_eq!(atu_viewport_inbound(1), 0x8000_0001);
        assert_eq!(atu_region_ctrl2_enable(0), 0xc000_0000);
        assert_eq!(atu_region_ctrl2_enable(1), 0xc000_0200);
        assert_eq!(atu_region_ctrl2_enable(2), 0xc000_0400);
    }

    #[test]
    fn handshake_fields_do_not_overlap() {
        assert_eq!(HANDSHAKE_SLOT_MASK & HANDSHAKE_ACK_BIT, 0);
        assert_eq!(HANDSHAKE_ACK_BIT & HANDSHAKE_SHM_BASE_MASK, 0);
        assert_eq!(HANDSHAKE_SLOT_MASK & HANDSHAKE_SHM_BASE_MASK, 0);

        // Host-published word: slot 7, not yet acknowledged, base 0x12345000.
        let word: u32 = 0x1234_5007;
        assert_eq!(word & HANDSHAKE_SLOT_MASK, 0x07);
        assert_eq!(word & HANDSHAKE_ACK_BIT, 0);
        assert_eq!(word & HANDSHAKE_SHM_BASE_MASK, 0x1234_5000);
    }

    #[test]
    fn dma_irq_bits_do_not_collide() {
        assert_eq!(DMA_CHANNEL_DONE_PATTERN, 0x160);
        assert_eq!(DMA_CHANNEL_DONE_PATTERN & DMA_LOCAL_INTERRUPT_ENABLE_BIT, 0);
        assert_eq!(DMA_DONE_INTERRUPT_BIT & DMA_ABORT_INTERRUPT_BIT, 0);
    }

    #[test]
    fn board_windows_fit_inside_the_pcie_aperture() {
        for (base, size) in [
            (PCIE0_WIN0_BASE, PCIE0_WIN0_SIZE),
            (PCIE0_WIN1_BASE, PCIE0_WIN1_SIZE),
            (PCIE0_WIN2_BASE, PCIE0_WIN2_SIZE),
        ] {
            assert!(base >= PCIE0_MEM_BASE);
            assert!(base + size <= PCIE0_MEM_BASE + PCIE0_MEM_SIZE);
        }
        assert_eq!(SHM_SIZE as u64, PCIE0_WIN0_SIZE);
    }
}
