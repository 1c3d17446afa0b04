#![forbid(unsafe_code)]

//! Slave-side control core for a PCIe multi-core-communication (MCC) link.
//!
//! Hi3532-class slave SoCs share one PCIe fabric with a host processor.
//! This crate drives the slave's half of the link: the handshake that agrees
//! on a shared-memory window and slot identity, inbound iATU window
//! programming, the embedded DMA engine (submission, completion/abort
//! decode, reset sequencing), and the out-of-band message interrupt. A host
//! facade covers the host's much smaller half; both roles come from one
//! binary, selected through [`LinkConfig`].
//!
//! Hardware access goes through two seams the embedder provides: [`LinkBus`]
//! (map/unmap plus raw 32-bit register access) and [`Delay`] (the handshake
//! poll interval). [`FakeLinkBus`] and [`FakeDelay`] implement both for
//! deterministic tests.
//!
//! Intentionally not covered: outbound ATU windows (explicitly unsupported),
//! multi-controller or multi-channel scheduling, and the kernel-side glue
//! (interrupt-line registration, module lifecycle), which stays in the
//! embedder.

pub mod atu;
pub mod bus;
pub mod config;
pub mod controller;
pub mod dma;
pub mod error;
pub mod handshake;
pub mod link;
pub mod signal;

pub use bus::{Delay, FakeDelay, FakeLinkBus, LinkBus, RegWrite, StdDelay, WindowHandle};
pub use config::{
    ControllerConfig, HandshakeConfig, LinkConfig, LinkRole, MemoryWindow, RamRange,
    SharedMemoryConfig, SideBandConfig,
};
pub use controller::Controller;
pub use dma::{DmaCompletion, DmaDirection, DmaEngine, DmaIrqStatus, DmaTask};
pub use error::{LinkError, Result};
pub use handshake::{SlaveIdentity, StatusWord};
pub use link::{HostLink, Link, SharedWindow, SlaveLink};
