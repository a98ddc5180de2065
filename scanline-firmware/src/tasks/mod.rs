//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod stats;
pub mod stream;

pub use stats::stats_task;
pub use stream::stream_task;
