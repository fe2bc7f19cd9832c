//! Data models for the pipeline
//!
//! - `event`: the storage service's object-created notification as it arrives
//!   in a queue message body, and the decoded upload record the handler uses.
//! - `notification`: the two-rendering message fanned out to subscribers.
//! - `gateway`: request and response bodies of the gateway routes.

pub mod event;
pub mod gateway;
pub mod notification;

pub use event::{
    processed_key, EventParseError, ParsedMessageBody, StorageEventNotification,
    StorageEventRecord, UploadNotification,
};
pub use gateway::{GatewayMessage, SubscribeRequest};
pub use notification::NotificationMessage;
