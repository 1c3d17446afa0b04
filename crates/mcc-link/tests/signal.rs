//! Message-interrupt raise and acknowledge paths.

use mcc_link::{FakeLinkBus, LinkConfig, LinkError, SlaveLink};
use mcc_regs as regs;

#[test]
fn raising_sets_only_the_intx_bit() {
    let mut bus = FakeLinkBus::new();
    let mut link = SlaveLink::bring_up(LinkConfig::default(), &mut bus).unwrap();
    let side_band = link.side_band_window();

    // Unrelated peripheral-control bits must survive the read-modify-write.
    bus.seed32(side_band, regs::SIDEBAND_PERIPH_CTRL, 0x0000_0801);
    bus.clear_writes();

    link.raise_peer_interrupt(&mut bus);

    assert_eq!(
        bus.reg32(side_band, regs::SIDEBAND_PERIPH_CTRL),
        0x0000_0801 | regs::PERIPH_CTRL_INTX_BIT
    );
    assert_eq!(bus.writes_to(side_band).len(), 1);
}

#[test]
fn raising_is_a_documented_noop_off_controller_zero() {
    let mut bus = FakeLinkBus::new();
    let mut cfg = LinkConfig::default();
    cfg.controller.id = 1;
    let mut link = SlaveLink::bring_up(cfg, &mut bus).unwrap();
    bus.clear_writes();

    link.raise_peer_interrupt(&mut bus);
    assert!(bus.writes().is_empty());
}

#[test]
fn acknowledging_clears_command_then_status() {
    let mut bus = FakeLinkBus::new();
    let mut link = SlaveLink::bring_up(LinkConfig::default(), &mut bus).unwrap();
    let side_band = link.side_band_window();

    bus.seed32(side_band, regs::SIDEBAND_SIGNAL_STATUS, 0x1);
    bus.clear_writes();

    link.clear_message_irq(&mut bus).unwrap();

    assert_eq!(
        bus.writes_to(side_band),
        vec![
            (regs::SIDEBAND_SIGNAL_COMMAND, 0),
            (regs::SIDEBAND_SIGNAL_STATUS, 0),
        ]
    );
}

#[test]
fn a_clear_status_is_reported_as_spurious() {
    let mut bus = FakeLinkBus::new();
    let mut link = SlaveLink::bring_up(LinkConfig::default(), &mut bus).unwrap();
    let side_band = link.side_band_window();
    bus.clear_writes();

    let err = link.clear_message_irq(&mut bus).unwrap_err();
    assert!(matches!(err, LinkError::SpuriousInterrupt));

    // Only the command clear was written; status was left alone.
    assert_eq!(
        bus.writes_to(side_band),
        vec![(regs::SIDEBAND_SIGNAL_COMMAND, 0)]
    );
}
