//! Link configuration.
//!
//! Board and role selection are runtime data here: register bases, the
//! window plan, interrupt lines, and the side-band register layout are plain
//! fields with reference-board defaults, so one binary can drive any
//! supported board in either role.

use std::time::Duration;

use mcc_regs as regs;

/// Which end of the link this instance drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Host,
    Slave,
}

/// One mappable physical register/memory range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWindow {
    pub base: u64,
    pub size: u64,
}

/// Local RAM range DMA targets must fall within. Half-open: `base` is a
/// valid address, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamRange {
    pub base: u32,
    pub end: u32,
}

impl RamRange {
    pub const fn contains(self, addr: u32) -> bool {
        addr >= self.base && addr < self.end
    }
}

/// Resource plan for the local PCIe controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub id: u32,
    /// DBI/configuration space: command register, iATU block, DMA block.
    pub config_space: MemoryWindow,
    /// BAR-backed memory windows; viewport index equals array index.
    pub windows: [MemoryWindow; 3],
    /// Local interrupt line wired to DMA completion/abort.
    pub dma_irq: u32,
}

/// Side-band register block: where the handshake and message-signal
/// registers live inside the system-control space, and which BAR exposes
/// the block to the peer.
#[derive(Debug, Clone, Copy)]
pub struct SideBandConfig {
    pub window: MemoryWindow,
    pub handshake_status: u64,
    pub peer_controller: u64,
    pub signal_command: u64,
    pub signal_status: u64,
    pub periph_ctrl: u64,
    /// Bit in the peripheral-control register asserting INTx to the peer.
    pub intx_bit: u32,
    /// Viewport/BAR through which the peer reaches this block.
    pub viewport: u32,
    /// Interrupt line wired to the peer's message doorbell.
    pub message_irq: u32,
}

/// Handshake poll budget. The slave cannot assume the host has initialized,
/// so "not yet ready" is the expected transient state up to this budget.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeConfig {
    pub attempts: u32,
    pub poll_interval: Duration,
}

/// Shared-memory window the handshake negotiates.
#[derive(Debug, Clone, Copy)]
pub struct SharedMemoryConfig {
    pub size: u32,
    /// Viewport/BAR the inbound mapping binds to.
    pub viewport: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkConfig {
    pub role: LinkRole,
    pub controller: ControllerConfig,
    pub side_band: SideBandConfig,
    pub handshake: HandshakeConfig,
    pub shared_memory: SharedMemoryConfig,
    pub ram: RamRange,
}

/// Reference board (Hi3532-class slave SoC), slave role.
impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: LinkRole::Slave,
            controller: ControllerConfig {
                id: 0,
                config_space: MemoryWindow {
                    base: regs::PCIE0_CFG_BASE,
                    size: regs::PCIE0_CFG_SIZE,
                },
                windows: [
                    MemoryWindow {
                        base: regs::PCIE0_WIN0_BASE,
                        size: regs::PCIE0_WIN0_SIZE,
                    },
                    MemoryWindow {
                        base: regs::PCIE0_WIN1_BASE,
                        size: regs::PCIE0_WIN1_SIZE,
                    },
                    MemoryWindow {
                        base: regs::PCIE0_WIN2_BASE,
                        size: regs::PCIE0_WIN2_SIZE,
                    },
                ],
                dma_irq: regs::PCIE0_DMA_LOCAL_IRQ,
            },
            side_band: SideBandConfig {
                window: MemoryWindow {
                    base: regs::SYSCTL_BASE,
                    size: regs::SYSCTL_SIZE,
                },
                handshake_status: regs::SIDEBAND_HANDSHAKE_STATUS,
                peer_controller: regs::SIDEBAND_PEER_CONTROLLER,
                signal_command: regs::SIDEBAND_SIGNAL_COMMAND,
                signal_status: regs::SIDEBAND_SIGNAL_STATUS,
                periph_ctrl: regs::SIDEBAND_PERIPH_CTRL,
                intx_bit: regs::PERIPH_CTRL_INTX_BIT,
                viewport: 1,
                message_irq: regs::MESSAGE_IRQ,
            },
            handshake: HandshakeConfig {
                attempts: 1000,
                poll_interval: Duration::from_millis(100),
            },
            shared_memory: SharedMemoryConfig {
                size: regs::SHM_SIZE,
                viewport: 0,
            },
            ram: RamRange {
                base: regs::RAM_BASE,
                end: regs::RAM_END,
            },
        }
    }
}
