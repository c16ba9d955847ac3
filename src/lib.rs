//! txflow - adaptive playback of a live transaction feed
//!
//! Polled batches go through [`pipeline::PlaybackPipeline`], which dedupes
//! them, queues them, and releases them one at a time into a bounded display
//! buffer with a delay that adapts to backlog, network latency and TPS.

pub mod config;
pub mod pipeline;
pub mod poller;
pub mod source;
pub mod state;
pub mod ui;
