//! Message-interrupt signaling: the out-of-band doorbell used for
//! control-plane events, distinct from DMA completion.

use tracing::{debug, warn};

use crate::bus::{LinkBus, WindowHandle};
use crate::config::SideBandConfig;
use crate::error::{LinkError, Result};

/// Asserts the INTx line toward the peer by setting the interrupt bit in the
/// shared peripheral-control register.
///
/// Only controller 0 has this route in the single-controller scope; any
/// other id is left alone (a documented limitation, logged at debug).
pub fn raise_peer_interrupt(
    bus: &mut dyn LinkBus,
    side_band: WindowHandle,
    cfg: &SideBandConfig,
    controller_id: u32,
) {
    if controller_id != 0 {
        debug!(controller_id, "no intx route for this controller");
        return;
    }
    let val = bus.read32(side_band, cfg.periph_ctrl);
    bus.write32(side_band, cfg.periph_ctrl, val | cfg.intx_bit);
}

/// Acknowledges an incoming message interrupt: clears the command register,
/// then checks and clears the status register.
///
/// A zero status means the line mis-triggered; that is reported as
/// [`LinkError::SpuriousInterrupt`] and the status register is not written.
pub fn clear_message_irq(
    bus: &mut dyn LinkBus,
    side_band: WindowHandle,
    cfg: &SideBandConfig,
) -> Result<()> {
    bus.write32(side_band, cfg.signal_command, 0);

    let status = bus.read32(side_band, cfg.signal_status);
    if status == 0 {
        warn!("message interrupt mis-triggered");
        return Err(LinkError::SpuriousInterrupt);
    }

    bus.write32(side_band, cfg.signal_status, 0);
    Ok(())
}
