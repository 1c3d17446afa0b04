//! Role facades: owned link contexts for the slave and host ends.
//!
//! A context object replaces any process-wide handle: `bring_up` maps and
//! acquires everything the role needs, operations borrow the context
//! exclusively, and `release` consumes it and tears the mappings down in
//! reverse order. Operations a role cannot perform are absent from its
//! facade rather than silent no-ops; the one recognized-but-unimplemented
//! operation (outbound windows) fails explicitly.

use tracing::info;

use crate::atu;
use crate::bus::{Delay, LinkBus, WindowHandle};
use crate::config::{LinkConfig, LinkRole};
use crate::controller::Controller;
use crate::dma::{DmaCompletion, DmaEngine, DmaTask};
use crate::error::{LinkError, Result};
use crate::handshake::{self, SlaveIdentity, StatusWord};
use crate::signal;
use mcc_regs as regs;

/// Shared-memory window negotiated by the handshake. Recorded only once
/// step 0 succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedWindow {
    pub base: u32,
    pub size: u32,
}

/// Maps the side-band registers and acquires the controller, rolling the
/// side-band mapping back if acquisition fails. Nothing stays mapped on
/// error.
fn bring_up_common(
    cfg: &LinkConfig,
    bus: &mut dyn LinkBus,
) -> Result<(WindowHandle, Controller, WindowHandle)> {
    let sb = cfg.side_band.window;
    let Some(side_band) = bus.map(sb.base, sb.size) else {
        return Err(LinkError::ResourceExhausted {
            what: "side-band registers",
            base: sb.base,
            size: sb.size,
        });
    };

    let mut controller = Controller::new(cfg.controller);
    match controller.acquire(bus) {
        Ok(config_window) => Ok((side_band, controller, config_window)),
        Err(err) => {
            bus.unmap(side_band);
            Err(err)
        }
    }
}

/// Slave-side link context.
///
/// Owns the side-band mapping, the controller, and the DMA engine for its
/// lifetime. Dropping it without [`SlaveLink::release`] leaks the mappings;
/// embedders call `release` on shutdown.
#[derive(Debug)]
pub struct SlaveLink {
    cfg: LinkConfig,
    side_band: WindowHandle,
    controller: Controller,
    engine: DmaEngine,
    shared_window: Option<SharedWindow>,
    identity: Option<SlaveIdentity>,
}

impl SlaveLink {
    pub fn bring_up(cfg: LinkConfig, bus: &mut dyn LinkBus) -> Result<Self> {
        let (side_band, controller, config_window) = bring_up_common(&cfg, bus)?;
        info!(role = "slave", "mcc link up");
        Ok(Self {
            cfg,
            side_band,
            controller,
            engine: DmaEngine::new(config_window),
            shared_window: None,
            identity: None,
        })
    }

    /// First handshake phase: waits for the host's published word, claims
    /// the slot, binds the shared-memory window inbound, acknowledges. On
    /// success the negotiated window and identity are recorded; on any
    /// failure both stay untouched.
    pub fn handshake_step0(
        &mut self,
        bus: &mut dyn LinkBus,
        delay: &mut dyn Delay,
    ) -> Result<SlaveIdentity> {
        let identity =
            handshake::slave_step0(bus, delay, &self.cfg, self.side_band, self.engine.window())?;
        self.shared_window = Some(SharedWindow {
            base: identity.shm_base,
            size: self.cfg.shared_memory.size,
        });
        self.identity = Some(identity);
        Ok(identity)
    }

    /// Reserved second phase.
    pub fn handshake_step1(&mut self) -> Result<()> {
        handshake::slave_step1()
    }

    /// Starts one DMA transfer. Completion arrives through the
    /// completion-clear calls, driven from the embedder's interrupt handler.
    pub fn submit_dma(&mut self, bus: &mut dyn LinkBus, task: &DmaTask) {
        self.engine.submit(bus, task);
    }

    pub fn clear_write_completion(&mut self, bus: &mut dyn LinkBus) -> DmaCompletion {
        self.engine.clear_write_completion(bus)
    }

    pub fn clear_read_completion(&mut self, bus: &mut dyn LinkBus) -> DmaCompletion {
        self.engine.clear_read_completion(bus)
    }

    pub fn enable_dma_local_irq(&mut self, bus: &mut dyn LinkBus) {
        self.engine.enable_local_irq(bus);
    }

    pub fn disable_dma_local_irq(&mut self, bus: &mut dyn LinkBus) {
        self.engine.disable_local_irq(bus);
    }

    /// Register half of DMA interrupt setup: drops stale completion status
    /// from both channels, then enables the local interrupt. The embedder
    /// registers the line returned by [`SlaveLink::dma_irq`].
    pub fn arm_dma_local_irq(&mut self, bus: &mut dyn LinkBus) {
        self.engine.arm_local_irq(bus);
    }

    /// Binds inbound viewport `index` so peer accesses through BAR `index`
    /// land at `target`.
    pub fn bind_inbound_window(
        &mut self,
        bus: &mut dyn LinkBus,
        target: u32,
        size: u32,
        index: u32,
    ) -> Result<()> {
        atu::bind_inbound_window(
            bus,
            self.engine.window(),
            target,
            size,
            index,
            self.controller.window_count(),
        )
    }

    /// Recognized extension point; always [`LinkError::Unsupported`].
    pub fn bind_outbound_window(
        &mut self,
        bus: &mut dyn LinkBus,
        target: u32,
        size: u32,
        index: u32,
    ) -> Result<()> {
        atu::bind_outbound_window(bus, self.engine.window(), target, size, index)
    }

    /// Exposes the side-band register block through its BAR so the peer can
    /// reach the handshake and signal registers directly.
    pub fn expose_sideband_window(&mut self, bus: &mut dyn LinkBus) -> Result<()> {
        let sb = self.cfg.side_band.window;
        atu::bind_inbound_window(
            bus,
            self.engine.window(),
            sb.base as u32,
            sb.size as u32,
            self.cfg.side_band.viewport,
            self.controller.window_count(),
        )
    }

    /// Raises the out-of-band message interrupt toward the peer.
    pub fn raise_peer_interrupt(&mut self, bus: &mut dyn LinkBus) {
        let id = self.controller.id();
        signal::raise_peer_interrupt(bus, self.side_band, &self.cfg.side_band, id);
    }

    /// Acknowledges an incoming message interrupt.
    pub fn clear_message_irq(&mut self, bus: &mut dyn LinkBus) -> Result<()> {
        signal::clear_message_irq(bus, self.side_band, &self.cfg.side_band)
    }

    /// Vendor/device identification dword of the local controller.
    pub fn vendor_device_id(&self, bus: &dyn LinkBus) -> u32 {
        bus.read32(self.engine.window(), regs::CFG_VENDOR_DEVICE_ID)
    }

    /// Slot id as currently published in the side-band word. 0 means the
    /// host has not assigned one (or the word is stale).
    pub fn slot_id(&self, bus: &dyn LinkBus) -> Result<u32> {
        let word = StatusWord::new(bus.read32(self.side_band, self.cfg.side_band.handshake_status));
        if word.slot() == 0 {
            return Err(LinkError::InvalidSlot { word: word.raw() });
        }
        Ok(word.slot())
    }

    /// Which host-side controller this slave hangs off, as published by the
    /// host in the side-band block.
    pub fn host_controller_index(&self, bus: &dyn LinkBus) -> u32 {
        bus.read32(self.side_band, self.cfg.side_band.peer_controller)
    }

    /// Only the slave initiates transfers in this topology.
    pub const fn dma_supported(&self) -> bool {
        true
    }

    pub fn is_local_ram_address(&self, addr: u32) -> bool {
        self.cfg.ram.contains(addr)
    }

    pub fn shared_window(&self) -> Option<SharedWindow> {
        self.shared_window
    }

    pub fn identity(&self) -> Option<SlaveIdentity> {
        self.identity
    }

    pub fn dma_irq(&self) -> u32 {
        self.controller.dma_irq()
    }

    pub fn message_irq(&self) -> u32 {
        self.cfg.side_band.message_irq
    }

    pub fn side_band_window(&self) -> WindowHandle {
        self.side_band
    }

    pub fn config_window(&self) -> WindowHandle {
        self.engine.window()
    }

    pub fn memory_window(&self, index: u32) -> Option<WindowHandle> {
        self.controller.memory_window(index)
    }

    /// Tears the link down: controller first, then the side-band mapping,
    /// reverse of `bring_up`.
    pub fn release(mut self, bus: &mut dyn LinkBus) {
        self.controller.release(bus);
        bus.unmap(self.side_band);
        info!(role = "slave", "mcc link down");
    }
}

/// Host-side link context.
///
/// The host is a pure DMA target: it publishes the handshake word, raises
/// and acknowledges message interrupts, and answers queries. It exposes no
/// DMA submission at all.
#[derive(Debug)]
pub struct HostLink {
    cfg: LinkConfig,
    side_band: WindowHandle,
    controller: Controller,
    config_window: WindowHandle,
}

impl HostLink {
    pub fn bring_up(cfg: LinkConfig, bus: &mut dyn LinkBus) -> Result<Self> {
        let (side_band, controller, config_window) = bring_up_common(&cfg, bus)?;
        info!(role = "host", "mcc link up");
        Ok(Self {
            cfg,
            side_band,
            controller,
            config_window,
        })
    }

    /// Handshake extension points; the host publishes its word out of band
    /// and has nothing further to do.
    pub fn handshake_step0(&mut self) -> Result<()> {
        handshake::host_step0()
    }

    pub fn handshake_step1(&mut self) -> Result<()> {
        handshake::host_step1()
    }

    pub fn handshake_step2(&mut self) -> Result<()> {
        handshake::host_step2()
    }

    pub fn raise_peer_interrupt(&mut self, bus: &mut dyn LinkBus) {
        let id = self.controller.id();
        signal::raise_peer_interrupt(bus, self.side_band, &self.cfg.side_band, id);
    }

    pub fn clear_message_irq(&mut self, bus: &mut dyn LinkBus) -> Result<()> {
        signal::clear_message_irq(bus, self.side_band, &self.cfg.side_band)
    }

    pub fn vendor_device_id(&self, bus: &dyn LinkBus) -> u32 {
        bus.read32(self.config_window, regs::CFG_VENDOR_DEVICE_ID)
    }

    /// On the host the local controller is the answer; no register read.
    pub fn host_controller_index(&self) -> u32 {
        self.controller.id()
    }

    /// The host never initiates DMA in this topology.
    pub const fn dma_supported(&self) -> bool {
        false
    }

    pub fn is_local_ram_address(&self, addr: u32) -> bool {
        self.cfg.ram.contains(addr)
    }

    pub fn message_irq(&self) -> u32 {
        self.cfg.side_band.message_irq
    }

    pub fn side_band_window(&self) -> WindowHandle {
        self.side_band
    }

    pub fn config_window(&self) -> WindowHandle {
        self.config_window
    }

    pub fn release(mut self, bus: &mut dyn LinkBus) {
        self.controller.release(bus);
        bus.unmap(self.side_band);
        info!(role = "host", "mcc link down");
    }
}

/// Role-dispatched link context: one binary can drive either end.
#[derive(Debug)]
pub enum Link {
    Host(HostLink),
    Slave(SlaveLink),
}

impl Link {
    /// Brings the link up in the role `cfg` names.
    pub fn bring_up(cfg: LinkConfig, bus: &mut dyn LinkBus) -> Result<Self> {
        match cfg.role {
            LinkRole::Host => Ok(Self::Host(HostLink::bring_up(cfg, bus)?)),
            LinkRole::Slave => Ok(Self::Slave(SlaveLink::bring_up(cfg, bus)?)),
        }
    }

    pub fn role(&self) -> LinkRole {
        match self {
            Self::Host(_) => LinkRole::Host,
            Self::Slave(_) => LinkRole::Slave,
        }
    }

    pub fn dma_supported(&self) -> bool {
        match self {
            Self::Host(host) => host.dma_supported(),
            Self::Slave(slave) => slave.dma_supported(),
        }
    }

    pub fn release(self, bus: &mut dyn LinkBus) {
        match self {
            Self::Host(host) => host.release(bus),
            Self::Slave(slave) => slave.release(bus),
        }
    }
}
