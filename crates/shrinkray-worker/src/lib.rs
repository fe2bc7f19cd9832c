//! Shrinkray Worker Library
//!
//! The queue-triggered resize handler and what drives it:
//! - `handler`: per-record orchestration (fetch, halve, store, link, notify, delete)
//! - `report`: per-record outcomes, batch summary and the fixed acknowledgment
//! - `queue`: in-process queue emulating the queue-to-function trigger
//! - `context`: the seam between a queue and whatever consumes its batches

pub mod context;
pub mod error;
pub mod handler;
pub mod queue;
pub mod report;

pub use context::MessageHandler;
pub use error::ProcessError;
pub use handler::{HandlerSettings, ResizeHandler};
pub use queue::{
    single_record_event, DeliveryOutcome, DeliveryReport, LocalQueue, LocalQueueConfig, QueueError,
};
pub use report::{BatchReport, HandlerResponse, RecordOutcome, RecordReport, SkipReason};
