//! Controller resource manager.
//!
//! Owns one local PCIe controller's mapped register windows for the lifetime
//! of the link. The DMA engine and the ATU code borrow handles from here and
//! are unreachable before acquisition completes or after release begins.

use tracing::info;

use crate::bus::{LinkBus, WindowHandle};
use crate::config::{ControllerConfig, MemoryWindow};
use crate::dma::DmaEngine;
use crate::error::{LinkError, Result};

const WINDOW_NAMES: [&str; 3] = ["memory window 0", "memory window 1", "memory window 2"];

/// Everything `acquire` mapped. Present iff the controller is in use.
#[derive(Debug, Clone, Copy)]
struct MappedController {
    config: WindowHandle,
    windows: [WindowHandle; 3],
}

/// One local PCIe controller and its acquire/release lifecycle.
#[derive(Debug)]
pub struct Controller {
    cfg: ControllerConfig,
    mapped: Option<MappedController>,
}

impl Controller {
    /// Builds the descriptor. Nothing is mapped until [`Controller::acquire`].
    pub fn new(cfg: ControllerConfig) -> Self {
        Self { cfg, mapped: None }
    }

    pub fn id(&self) -> u32 {
        self.cfg.id
    }

    pub fn dma_irq(&self) -> u32 {
        self.cfg.dma_irq
    }

    pub fn is_acquired(&self) -> bool {
        self.mapped.is_some()
    }

    /// Configuration-space handle, `None` until acquired.
    pub fn config_window(&self) -> Option<WindowHandle> {
        self.mapped.map(|m| m.config)
    }

    /// BAR-backed memory window handle, `None` until acquired.
    pub fn memory_window(&self, index: u32) -> Option<WindowHandle> {
        self.mapped
            .and_then(|m| m.windows.get(index as usize).copied())
    }

    /// Number of BAR-backed windows; valid viewport indexes are below this.
    pub fn window_count(&self) -> u32 {
        self.cfg.windows.len() as u32
    }

    /// Maps configuration space and the three memory windows, resets the DMA
    /// block to its idle state, and marks the controller in use.
    ///
    /// All-or-nothing: a failure at any step unmaps everything mapped so far
    /// in reverse order before returning, so no mappings leak. Acquiring an
    /// already-acquired controller is a no-op success.
    ///
    /// Returns the configuration-space handle the ATU and DMA blocks live
    /// behind.
    pub fn acquire(&mut self, bus: &mut dyn LinkBus) -> Result<WindowHandle> {
        if let Some(m) = self.mapped {
            return Ok(m.config);
        }

        let w = self.cfg.windows;

        let Some(config) = bus.map(self.cfg.config_space.base, self.cfg.config_space.size) else {
            return Err(exhausted("controller config space", self.cfg.config_space));
        };
        let Some(win0) = bus.map(w[0].base, w[0].size) else {
            bus.unmap(config);
            return Err(exhausted(WINDOW_NAMES[0], w[0]));
        };
        let Some(win1) = bus.map(w[1].base, w[1].size) else {
            bus.unmap(win0);
            bus.unmap(config);
            return Err(exhausted(WINDOW_NAMES[1], w[1]));
        };
        let Some(win2) = bus.map(w[2].base, w[2].size) else {
            bus.unmap(win1);
            bus.unmap(win0);
            bus.unmap(config);
            return Err(exhausted(WINDOW_NAMES[2], w[2]));
        };

        // The DMA block powers up with non-zero register contents; put it
        // into a known idle state before anything can submit.
        DmaEngine::new(config).reset_registers(bus);

        self.mapped = Some(MappedController {
            config,
            windows: [win0, win1, win2],
        });
        info!(controller = self.cfg.id, "pcie controller acquired");
        Ok(config)
    }

    /// Unmaps everything `acquire` mapped, in reverse order. Idempotent, and
    /// a no-op if the controller was never acquired.
    pub fn release(&mut self, bus: &mut dyn LinkBus) {
        let Some(m) = self.mapped.take() else {
            return;
        };
        for handle in m.windows.into_iter().rev() {
            bus.unmap(handle);
        }
        bus.unmap(m.config);
        info!(controller = self.cfg.id, "pcie controller released");
    }
}

fn exhausted(what: &'static str, window: MemoryWindow) -> LinkError {
    LinkError::ResourceExhausted {
        what,
        base: window.base,
        size: window.size,
    }
}
