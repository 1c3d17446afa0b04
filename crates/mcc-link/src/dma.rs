//! DMA transfer engine: submission, completion/abort decode, and the reset
//! sequence that brings the register block to a known idle state.
//!
//! One write channel and one read channel share a single register set,
//! selected through the context-index register. At most one task is
//! outstanding per direction; completion is observed only through the
//! interrupt-status path, never by polling inside `submit`.

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::bus::{LinkBus, WindowHandle};
use crate::error::{LinkError, Result};
use mcc_regs as regs;

/// Transfer direction, slave-relative: `Write` pushes local memory toward
/// the peer, `Read` pulls from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    Write,
    Read,
}

impl DmaDirection {
    /// Decodes the wire encoding (0 = write, 1 = read). Any other value is a
    /// protocol violation, reported rather than silently dropped.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Write),
            1 => Ok(Self::Read),
            other => Err(LinkError::InvalidDirection(other)),
        }
    }
}

/// One transfer descriptor, consumed synchronously by [`DmaEngine::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaTask {
    pub src: u32,
    pub dest: u32,
    pub len: u32,
    pub direction: DmaDirection,
}

impl DmaTask {
    /// Builds a task from raw wire words, rejecting undefined direction
    /// encodings before any hardware is touched.
    pub fn from_raw(src: u32, dest: u32, len: u32, direction: u32) -> Result<Self> {
        Ok(Self {
            src,
            dest,
            len,
            direction: DmaDirection::from_raw(direction)?,
        })
    }
}

/// Outcome of a completion-status clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaCompletion {
    /// Status was all-zero: the interrupt was not ours. Not an error.
    NoInterrupt,
    Done,
    /// Hardware reported an abort. Status is cleared so the channel stays
    /// usable; the failure is surfaced, not swallowed.
    Aborted,
}

bitflags! {
    /// Interrupt-status bits shared by the read and write channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DmaIrqStatus: u32 {
        const DONE = regs::DMA_DONE_INTERRUPT_BIT;
        const ABORT = regs::DMA_ABORT_INTERRUPT_BIT;
    }
}

/// Per-channel register addresses; everything else is shared.
struct ChannelRegs {
    name: &'static str,
    context: u32,
    interrupt_mask: u64,
    interrupt_status: u64,
    interrupt_clear: u64,
    doorbell: u64,
}

const WRITE_CHANNEL: ChannelRegs = ChannelRegs {
    name: "write",
    context: regs::DMA_CTX_WRITE_CHANNEL,
    interrupt_mask: regs::DMA_WRITE_INTERRUPT_MASK,
    interrupt_status: regs::DMA_WRITE_INTERRUPT_STATUS,
    interrupt_clear: regs::DMA_WRITE_INTERRUPT_CLEAR,
    doorbell: regs::DMA_WRITE_DOORBELL,
};

const READ_CHANNEL: ChannelRegs = ChannelRegs {
    name: "read",
    context: regs::DMA_CTX_READ_CHANNEL,
    interrupt_mask: regs::DMA_READ_INTERRUPT_MASK,
    interrupt_status: regs::DMA_READ_INTERRUPT_STATUS,
    interrupt_clear: regs::DMA_READ_INTERRUPT_CLEAR,
    doorbell: regs::DMA_READ_DOORBELL,
};

/// The embedded DMA engine of one controller.
///
/// Borrows the acquired controller's configuration window; it never maps or
/// unmaps anything itself. [`DmaEngine::reset_registers`] must have run (it
/// runs during controller acquisition) before the first submission.
#[derive(Debug, Clone, Copy)]
pub struct DmaEngine {
    config: WindowHandle,
}

impl DmaEngine {
    pub fn new(config: WindowHandle) -> Self {
        Self { config }
    }

    /// The configuration-space window the engine programs.
    pub fn window(&self) -> WindowHandle {
        self.config
    }

    /// Zeroes every DMA control/status/address register for both channels,
    /// including the opaque must-clear offsets, then enables the write and
    /// read engines.
    pub fn reset_registers(&self, bus: &mut dyn LinkBus) {
        let write_scrub = &regs::DMA_WRITE_SCRUB_OFFSETS;
        let read_scrub = &regs::DMA_READ_SCRUB_OFFSETS;
        self.clear_channel_context(bus, regs::DMA_CTX_WRITE_CHANNEL, write_scrub);
        self.clear_channel_context(bus, regs::DMA_CTX_READ_CHANNEL, read_scrub);

        bus.write32(self.config, regs::DMA_CHANNEL_CONTROL, 0);
        bus.write32(self.config, regs::DMA_WRITE_ENGINE_ENABLE, regs::DMA_ENGINE_ENABLE);
        bus.write32(self.config, regs::DMA_READ_ENGINE_ENABLE, regs::DMA_ENGINE_ENABLE);
    }

    fn clear_channel_context(&self, bus: &mut dyn LinkBus, context: u32, scrub: &[u64]) {
        bus.write32(self.config, regs::DMA_CHANNEL_CONTEXT_INDEX, context);
        bus.write32(self.config, regs::DMA_SAR_HIGH, 0);
        bus.write32(self.config, regs::DMA_SAR_LOW, 0);
        bus.write32(self.config, regs::DMA_TRANSFER_SIZE, 0);
        bus.write32(self.config, regs::DMA_DAR_LOW, 0);
        bus.write32(self.config, regs::DMA_DAR_HIGH, 0);
        for &offset in scrub {
            bus.write32(self.config, offset, 0);
        }
    }

    /// Programs one transfer and rings its doorbell: interrupt mask clear,
    /// context select, fixed start pattern, length, source, destination,
    /// doorbell. The transfer is asynchronous from here on.
    pub fn submit(&self, bus: &mut dyn LinkBus, task: &DmaTask) {
        let ch = match task.direction {
            DmaDirection::Write => &WRITE_CHANNEL,
            DmaDirection::Read => &READ_CHANNEL,
        };

        bus.write32(self.config, ch.interrupt_mask, 0);
        bus.write32(self.config, regs::DMA_CHANNEL_CONTEXT_INDEX, ch.context);
        bus.write32(self.config, regs::DMA_CHANNEL_CONTROL, regs::DMA_CHANNEL_START);
        bus.write32(self.config, regs::DMA_TRANSFER_SIZE, task.len);
        bus.write32(self.config, regs::DMA_SAR_LOW, task.src);
        bus.write32(self.config, regs::DMA_DAR_LOW, task.dest);
        bus.write32(self.config, ch.doorbell, 0);

        debug!(
            channel = ch.name,
            src = task.src,
            dest = task.dest,
            len = task.len,
            "dma task started"
        );
    }

    /// Decodes and clears the write-channel completion status.
    pub fn clear_write_completion(&self, bus: &mut dyn LinkBus) -> DmaCompletion {
        self.clear_completion(bus, &WRITE_CHANNEL)
    }

    /// Decodes and clears the read-channel completion status.
    pub fn clear_read_completion(&self, bus: &mut dyn LinkBus) -> DmaCompletion {
        self.clear_completion(bus, &READ_CHANNEL)
    }

    fn clear_completion(&self, bus: &mut dyn LinkBus, ch: &ChannelRegs) -> DmaCompletion {
        let raw = bus.read32(self.config, ch.interrupt_status);
        if raw == 0 {
            return DmaCompletion::NoInterrupt;
        }

        // Clear-on-write covers both bits at once; the pair is always
        // written back, whatever subset was set.
        let clear = DmaIrqStatus::DONE | DmaIrqStatus::ABORT;
        bus.write32(self.config, ch.interrupt_clear, clear.bits());

        if DmaIrqStatus::from_bits_truncate(raw).contains(DmaIrqStatus::ABORT) {
            warn!(channel = ch.name, status = raw, "dma transfer aborted");
            DmaCompletion::Aborted
        } else {
            DmaCompletion::Done
        }
    }

    /// Arms the local completion interrupt: read-modify-write of channel
    /// control, asserting the channel-done pattern plus the enable bit.
    pub fn enable_local_irq(&self, bus: &mut dyn LinkBus) {
        let mut control = bus.read32(self.config, regs::DMA_CHANNEL_CONTROL);
        control |= regs::DMA_CHANNEL_DONE_PATTERN;
        control |= regs::DMA_LOCAL_INTERRUPT_ENABLE_BIT;
        bus.write32(self.config, regs::DMA_CHANNEL_CONTROL, control);
    }

    /// Clears only the enable bit, leaving the rest of channel control
    /// untouched.
    pub fn disable_local_irq(&self, bus: &mut dyn LinkBus) {
        let mut control = bus.read32(self.config, regs::DMA_CHANNEL_CONTROL);
        control &= !regs::DMA_LOCAL_INTERRUPT_ENABLE_BIT;
        bus.write32(self.config, regs::DMA_CHANNEL_CONTROL, control);
    }

    /// Register half of interrupt-line setup: drops any stale completion
    /// status from both channels, then enables the local interrupt. The
    /// embedder registers the actual line (see the facade's `dma_irq`).
    pub fn arm_local_irq(&self, bus: &mut dyn LinkBus) {
        self.clear_read_completion(bus);
        self.clear_write_completion(bus);
        self.enable_local_irq(bus);
    }
}
