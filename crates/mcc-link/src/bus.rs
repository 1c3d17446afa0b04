//! Hardware seams: mapped register windows and the handshake poll delay.
//!
//! The core never touches raw addresses. Embedders supply a [`LinkBus`]
//! backed by their mapping primitive (`ioremap` or equivalent on a real
//! board); tests use the in-memory [`FakeLinkBus`] exported here.

use std::collections::HashMap;
use std::time::Duration;

/// Token for one mapped register range, minted by [`LinkBus::map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

impl WindowHandle {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Raw access to 32-bit device registers through mapped windows.
///
/// `map` returns `None` when the range cannot be mapped; the core treats
/// that as resource exhaustion and rolls back. Reads and writes against a
/// handle are only issued between its `map` and `unmap`.
pub trait LinkBus {
    fn map(&mut self, base: u64, size: u64) -> Option<WindowHandle>;
    fn unmap(&mut self, window: WindowHandle);
    fn read32(&self, window: WindowHandle, offset: u64) -> u32;
    fn write32(&mut self, window: WindowHandle, offset: u64, value: u32);
}

/// Sleep source for the bounded handshake poll.
pub trait Delay {
    fn sleep(&mut self, interval: Duration);
}

/// [`Delay`] backed by the OS scheduler.
#[derive(Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn sleep(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// One recorded register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub window: WindowHandle,
    pub offset: u64,
    pub value: u32,
}

/// In-memory [`LinkBus`] for deterministic tests.
///
/// Registers read back whatever was last written (0 when untouched), every
/// write is logged in order, and mapping failures can be injected per base
/// address. Unmaps are recorded so teardown order is checkable.
#[derive(Debug, Default)]
pub struct FakeLinkBus {
    regs: HashMap<(usize, u64), u32>,
    writes: Vec<RegWrite>,
    mapped: Vec<Option<u64>>,
    denied: Vec<u64>,
    unmapped: Vec<u64>,
}

impl FakeLinkBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future `map` of `base` fail.
    pub fn deny_map(&mut self, base: u64) {
        self.denied.push(base);
    }

    /// Number of currently mapped windows.
    pub fn mapped_count(&self) -> usize {
        self.mapped.iter().filter(|w| w.is_some()).count()
    }

    /// Window base addresses in the order they were unmapped.
    pub fn unmap_order(&self) -> &[u64] {
        &self.unmapped
    }

    /// Seeds a register value without logging a write, for hardware-set
    /// state such as interrupt status.
    pub fn seed32(&mut self, window: WindowHandle, offset: u64, value: u32) {
        self.regs.insert((window.index(), offset), value);
    }

    /// Current register value, 0 if never written.
    pub fn reg32(&self, window: WindowHandle, offset: u64) -> u32 {
        self.regs
            .get(&(window.index(), offset))
            .copied()
            .unwrap_or(0)
    }

    /// Every write performed so far, oldest first.
    pub fn writes(&self) -> &[RegWrite] {
        &self.writes
    }

    /// Writes that landed in `window`, as (offset, value) pairs.
    pub fn writes_to(&self, window: WindowHandle) -> Vec<(u64, u32)> {
        self.writes
            .iter()
            .filter(|w| w.window == window)
            .map(|w| (w.offset, w.value))
            .collect()
    }

    /// Forgets the write log; register contents are kept.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl LinkBus for FakeLinkBus {
    fn map(&mut self, base: u64, _size: u64) -> Option<WindowHandle> {
        if self.denied.contains(&base) {
            return None;
        }
        let handle = WindowHandle::new(self.mapped.len());
        self.mapped.push(Some(base));
        Some(handle)
    }

    fn unmap(&mut self, window: WindowHandle) {
        if let Some(slot) = self.mapped.get_mut(window.index()) {
            if let Some(base) = slot.take() {
                self.unmapped.push(base);
            }
        }
    }

    fn read32(&self, window: WindowHandle, offset: u64) -> u32 {
        self.reg32(window, offset)
    }

    fn write32(&mut self, window: WindowHandle, offset: u64, value: u32) {
        self.regs.insert((window.index(), offset), value);
        self.writes.push(RegWrite {
            window,
            offset,
            value,
        });
    }
}

/// [`Delay`] that never blocks, counting sleep requests instead.
#[derive(Debug, Default)]
pub struct FakeDelay {
    slept: u32,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps requested so far.
    pub fn sleeps(&self) -> u32 {
        self.slept
    }
}

impl Delay for FakeDelay {
    fn sleep(&mut self, _interval: Duration) {
        self.slept += 1;
    }
}
