//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (fixed-timestep accumulator, FPS)
//! - Input events (DOM key names, pointer clicks)
//! - Storage (LocalStorage on web, in-memory natively)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{FrameInput, InputCollector, Key, PointerButton, PointerClick};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::FrameClock;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStore;
