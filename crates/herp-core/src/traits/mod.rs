//! Trait seams shared across crates.

pub mod cache;
pub mod clock;

pub use cache::{CacheProvider, WindowCount};
pub use clock::{Clock, ManualClock, SystemClock};
