//! Controller acquisition and teardown against the recording fake bus.

use mcc_link::{Controller, FakeLinkBus, LinkConfig, LinkError};
use mcc_regs as regs;

fn controller() -> Controller {
    Controller::new(LinkConfig::default().controller)
}

#[test]
fn acquire_maps_config_space_and_all_windows() {
    let mut bus = FakeLinkBus::new();
    let mut ctrl = controller();

    let config = ctrl.acquire(&mut bus).unwrap();
    assert!(ctrl.is_acquired());
    assert_eq!(bus.mapped_count(), 4);
    assert_eq!(ctrl.config_window(), Some(config));
    for index in 0..3 {
        assert!(ctrl.memory_window(index).is_some());
    }

    // Acquisition leaves the DMA block reset and both engines enabled.
    assert_eq!(bus.reg32(config, regs::DMA_WRITE_ENGINE_ENABLE), 1);
    assert_eq!(bus.reg32(config, regs::DMA_READ_ENGINE_ENABLE), 1);
    assert_eq!(bus.reg32(config, regs::DMA_CHANNEL_CONTROL), 0);
}

#[test]
fn acquire_twice_is_a_noop() {
    let mut bus = FakeLinkBus::new();
    let mut ctrl = controller();

    let first = ctrl.acquire(&mut bus).unwrap();
    let writes_after_first = bus.writes().len();
    let second = ctrl.acquire(&mut bus).unwrap();

    assert_eq!(first, second);
    assert_eq!(bus.mapped_count(), 4);
    assert_eq!(bus.writes().len(), writes_after_first);
}

#[test]
fn acquire_rolls_back_on_any_mapping_failure() {
    let cfg = LinkConfig::default().controller;
    let failure_points = [
        cfg.config_space.base,
        cfg.windows[0].base,
        cfg.windows[1].base,
        cfg.windows[2].base,
    ];

    for base in failure_points {
        let mut bus = FakeLinkBus::new();
        bus.deny_map(base);
        let mut ctrl = Controller::new(cfg);

        let err = ctrl.acquire(&mut bus).unwrap_err();
        match err {
            LinkError::ResourceExhausted { base: failed, .. } => assert_eq!(failed, base),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(bus.mapped_count(), 0, "leaked mapping when {base:#x} failed");
        assert!(!ctrl.is_acquired());
    }
}

#[test]
fn release_unmaps_in_reverse_order_and_is_idempotent() {
    let mut bus = FakeLinkBus::new();
    let cfg = LinkConfig::default().controller;
    let mut ctrl = Controller::new(cfg);

    ctrl.acquire(&mut bus).unwrap();
    ctrl.release(&mut bus);

    assert_eq!(bus.mapped_count(), 0);
    assert_eq!(
        bus.unmap_order(),
        &[
            cfg.windows[2].base,
            cfg.windows[1].base,
            cfg.windows[0].base,
            cfg.config_space.base,
        ]
    );
    assert!(!ctrl.is_acquired());

    ctrl.release(&mut bus);
    assert_eq!(bus.unmap_order().len(), 4);
}

#[test]
fn release_before_acquire_is_a_noop() {
    let mut bus = FakeLinkBus::new();
    let mut ctrl = controller();

    ctrl.release(&mut bus);
    assert_eq!(bus.mapped_count(), 0);
    assert!(bus.unmap_order().is_empty());
}
