use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for the MCC link core.
///
/// Every variant carries the detail needed to diagnose a hardware or
/// protocol mismatch from the error alone: which mapping step failed, or the
/// offending register word. Protocol violations (`InvalidDirection`,
/// `InvalidSlot`, `AlreadyShaken`) abort the operation without touching
/// further hardware state.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("mapping {what} at {base:#x} ({size:#x} bytes) failed")]
    ResourceExhausted {
        what: &'static str,
        base: u64,
        size: u64,
    },

    #[error("undefined dma direction encoding {0:#x}")]
    InvalidDirection(u32),

    #[error("handshake word {word:#010x} carries the invalid slot id 0")]
    InvalidSlot { word: u32 },

    #[error("handshake word {word:#010x} is already acknowledged")]
    AlreadyShaken { word: u32 },

    #[error("host not ready after {attempts} handshake polls")]
    HandshakeTimeout { attempts: u32 },

    #[error("viewport {index} does not name an existing window")]
    InvalidViewport { index: u32 },

    #[error("{0} is not supported on this link")]
    Unsupported(&'static str),

    #[error("message interrupt status is clear (mis-trigger)")]
    SpuriousInterrupt,
}
