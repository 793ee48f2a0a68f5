//! Platform abstraction layer
//!
//! Handles native/test differences for:
//! - Wall-clock time
//! - Input events (accepted trigger keys, pointer debouncing)

pub mod input;
pub mod time;

pub use input::{Key, PointerLatch};
pub use time::{ManualTime, SystemTime, TimeSource};
