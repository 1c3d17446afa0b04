//! Inbound ATU window programming.

use mcc_link::{atu, FakeLinkBus, LinkBus, LinkConfig, LinkError, SlaveLink};
use mcc_regs as regs;

#[test]
fn bind_writes_the_exact_programming_sequence() {
    let mut bus = FakeLinkBus::new();
    let win = bus.map(regs::PCIE0_CFG_BASE, regs::PCIE0_CFG_SIZE).unwrap();

    atu::bind_inbound_window(&mut bus, win, 0x8200_0000, 0x80_0000, 0, 3).unwrap();

    assert_eq!(
        bus.writes_to(win),
        vec![
            (regs::CFG_COMMAND, 0x0010_0147),
            (regs::ATU_VIEWPORT, 0x8000_0000),
            (regs::ATU_LOWER_BASE, 0),
            (regs::ATU_UPPER_BASE, 0),
            (regs::ATU_LIMIT, 0xffff_ffff),
            (regs::ATU_LOWER_TARGET, 0x8200_0000),
            (regs::ATU_UPPER_TARGET, 0),
            (regs::ATU_REGION_CTRL1, 0),
            (regs::ATU_REGION_CTRL2, 0xc000_0000),
        ]
    );
}

#[test]
fn bind_encodes_the_viewport_index() {
    let mut bus = FakeLinkBus::new();
    let win = bus.map(regs::PCIE0_CFG_BASE, regs::PCIE0_CFG_SIZE).unwrap();

    atu::bind_inbound_window(&mut bus, win, 0x8300_0000, 0x1000, 2, 3).unwrap();

    assert_eq!(bus.reg32(win, regs::ATU_VIEWPORT), 0x8000_0002);
    assert_eq!(bus.reg32(win, regs::ATU_REGION_CTRL2), 0xc000_0400);
}

#[test]
fn bind_rejects_a_viewport_without_a_window() {
    let mut bus = FakeLinkBus::new();
    let win = bus.map(regs::PCIE0_CFG_BASE, regs::PCIE0_CFG_SIZE).unwrap();

    let err = atu::bind_inbound_window(&mut bus, win, 0x8200_0000, 0x1000, 3, 3).unwrap_err();
    match err {
        LinkError::InvalidViewport { index } => assert_eq!(index, 3),
        other => panic!("unexpected error: {other}"),
    }
    assert!(bus.writes().is_empty());
}

#[test]
fn outbound_binding_is_explicitly_unsupported() {
    let mut bus = FakeLinkBus::new();
    let win = bus.map(regs::PCIE0_CFG_BASE, regs::PCIE0_CFG_SIZE).unwrap();

    let err = atu::bind_outbound_window(&mut bus, win, 0x8200_0000, 0x1000, 0).unwrap_err();
    assert!(matches!(err, LinkError::Unsupported(_)));
    assert!(bus.writes().is_empty());
}

#[test]
fn facade_exposes_the_side_band_block_through_its_bar() {
    let mut bus = FakeLinkBus::new();
    let mut link = SlaveLink::bring_up(LinkConfig::default(), &mut bus).unwrap();
    let config = link.config_window();
    bus.clear_writes();

    link.expose_sideband_window(&mut bus).unwrap();

    assert_eq!(bus.reg32(config, regs::ATU_VIEWPORT), 0x8000_0001);
    assert_eq!(bus.reg32(config, regs::ATU_LOWER_TARGET), regs::SYSCTL_BASE as u32);
    assert_eq!(bus.reg32(config, regs::ATU_REGION_CTRL2), 0xc000_0200);
}

#[test]
fn facade_rejects_out_of_range_viewports() {
    let mut bus = FakeLinkBus::new();
    let mut link = SlaveLink::bring_up(LinkConfig::default(), &mut bus).unwrap();
    bus.clear_writes();

    assert!(matches!(
        link.bind_inbound_window(&mut bus, 0x8200_0000, 0x1000, 5),
        Err(LinkError::InvalidViewport { index: 5 })
    ));
    assert!(bus.writes().is_empty());
}
