//! Preview: which source frame is showing at the playhead, and fetching it.

pub mod frame_cache;
pub mod resolver;
pub mod worker;

pub use frame_cache::FrameCache;
pub use resolver::{resolve, PreviewRequest, PreviewThrottle};
pub use worker::{PreviewResult, PreviewWorker};
