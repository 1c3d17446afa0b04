//! Host/slave handshake: the one-time exchange establishing shared-memory
//! location and slave identity.
//!
//! The two sides are independent hardware resets with no shared clock, so
//! the slave treats "host not yet ready" as the expected transient state and
//! only a true deadline as fatal: a bounded poll, then an atomic
//! claim-and-acknowledge.

use tracing::{debug, info};

use crate::atu;
use crate::bus::{Delay, LinkBus, WindowHandle};
use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use mcc_regs as regs;

/// Decoded handshake status word.
///
/// Layout: bits [4:0] slot id (0 invalid), bit 5 acknowledgment, bits
/// [31:12] page-aligned shared-memory base published by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWord(u32);

impl StatusWord {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// An all-zero register means the host has not published yet.
    pub const fn is_ready(self) -> bool {
        self.0 != 0
    }

    pub const fn slot(self) -> u32 {
        self.0 & regs::HANDSHAKE_SLOT_MASK
    }

    pub const fn acked(self) -> bool {
        self.0 & regs::HANDSHAKE_ACK_BIT != 0
    }

    pub const fn shm_base(self) -> u32 {
        self.0 & regs::HANDSHAKE_SHM_BASE_MASK
    }

    /// The same word with the acknowledgment bit set; every other bit kept.
    pub const fn with_ack(self) -> Self {
        Self(self.0 | regs::HANDSHAKE_ACK_BIT)
    }
}

/// What the slave learned from a successful step 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaveIdentity {
    pub slot: u32,
    pub shm_base: u32,
}

/// First slave phase: poll for the host's published word, claim the slot,
/// bind the shared-memory window inbound, then acknowledge.
///
/// Polls the side-band status register up to the configured budget, sleeping
/// `poll_interval` through `delay` after each miss. The acknowledgment write
/// happens only after the inbound window is bound; the peer may touch shared
/// memory as soon as it sees the acknowledgment bit.
pub fn slave_step0(
    bus: &mut dyn LinkBus,
    delay: &mut dyn Delay,
    cfg: &LinkConfig,
    side_band: WindowHandle,
    config_window: WindowHandle,
) -> Result<SlaveIdentity> {
    let status_offset = cfg.side_band.handshake_status;

    let mut published = None;
    for attempt in 0..cfg.handshake.attempts {
        let word = StatusWord::new(bus.read32(side_band, status_offset));
        if word.is_ready() {
            published = Some(word);
            break;
        }
        debug!(attempt, "host not ready yet");
        delay.sleep(cfg.handshake.poll_interval);
    }
    let Some(word) = published else {
        return Err(LinkError::HandshakeTimeout {
            attempts: cfg.handshake.attempts,
        });
    };

    if word.acked() {
        return Err(LinkError::AlreadyShaken { word: word.raw() });
    }

    let slot = word.slot();
    if slot == 0 {
        return Err(LinkError::InvalidSlot { word: word.raw() });
    }
    let shm_base = word.shm_base();

    atu::bind_inbound_window(
        bus,
        config_window,
        shm_base,
        cfg.shared_memory.size,
        cfg.shared_memory.viewport,
        cfg.controller.windows.len() as u32,
    )?;

    bus.write32(side_band, status_offset, word.with_ack().raw());

    info!(slot, shm_base, "handshake step 0 complete");
    Ok(SlaveIdentity { slot, shm_base })
}

/// Reserved second slave phase; protocol revision 1 completes in step 0.
pub fn slave_step1() -> Result<()> {
    Ok(())
}

/// Host-side steps. The host publishes the status word before the slave
/// polls and otherwise has nothing to do; these exist as extension points.
pub fn host_step0() -> Result<()> {
    Ok(())
}

pub fn host_step1() -> Result<()> {
    Ok(())
}

pub fn host_step2() -> Result<()> {
    Ok(())
}
