//! Error taxonomy of the window manager core.
//!
//! None of these are fatal to the process: every variant has a recovery
//! path in the dispatcher (skip, ignore, or proceed best-effort).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window 0x{0:x} is already managed")]
    AlreadyManaged(u32),

    #[error("geometry of window 0x{0:x} is unavailable")]
    GeometryUnavailable(u32),

    #[error("window 0x{0:x} is not managed")]
    UnknownWindow(u32),

    #[error("{count} windows exceed the tiling capacity of {capacity}")]
    TilingOverflow { count: usize, capacity: usize },

    #[error("out of memory while registering window 0x{0:x}")]
    AllocationFailure(u32),
}
