//! Inbound address-translation window programming.

use tracing::debug;

use crate::bus::{LinkBus, WindowHandle};
use crate::error::{LinkError, Result};
use mcc_regs as regs;

/// Programs inbound viewport `index` so peer accesses through BAR `index`
/// land at `target` in local memory.
///
/// The sequence fully reprograms every sub-register of the viewport, leaving
/// no stale partial state: command enable, viewport select, base clear
/// (unused inbound), full-aperture limit, target, then the region-control
/// commit that activates the region and binds it to its BAR. `size` is
/// recorded by callers only; inbound mode maps the full aperture.
pub fn bind_inbound_window(
    bus: &mut dyn LinkBus,
    config: WindowHandle,
    target: u32,
    size: u32,
    index: u32,
    window_count: u32,
) -> Result<()> {
    if index >= window_count {
        return Err(LinkError::InvalidViewport { index });
    }

    bus.write32(config, regs::CFG_COMMAND, regs::CFG_COMMAND_ENABLE);
    bus.write32(config, regs::ATU_VIEWPORT, regs::atu_viewport_inbound(index));
    bus.write32(config, regs::ATU_LOWER_BASE, 0);
    bus.write32(config, regs::ATU_UPPER_BASE, 0);
    bus.write32(config, regs::ATU_LIMIT, regs::ATU_LIMIT_FULL);
    bus.write32(config, regs::ATU_LOWER_TARGET, target);
    bus.write32(config, regs::ATU_UPPER_TARGET, 0);
    bus.write32(config, regs::ATU_REGION_CTRL1, 0);
    bus.write32(config, regs::ATU_REGION_CTRL2, regs::atu_region_ctrl2_enable(index));

    debug!(index, target, size, "inbound window bound");
    Ok(())
}

/// Outbound counterpart: a recognized extension point with no implementation
/// on this hardware generation. Always fails with
/// [`LinkError::Unsupported`], never a silent no-op.
pub fn bind_outbound_window(
    _bus: &mut dyn LinkBus,
    _config: WindowHandle,
    _target: u32,
    _size: u32,
    _index: u32,
) -> Result<()> {
    Err(LinkError::Unsupported("outbound atu window"))
}
