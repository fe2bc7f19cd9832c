//! Shrinkray Notification Library
//!
//! Publishing the completion message to the notification topic and binding
//! email subscribers to it. `SnsNotifier` talks to SNS; `LogNotifier` writes
//! to the log for local runs.

pub mod error;
pub mod factory;
pub mod log_notifier;
#[cfg(feature = "notify-sns")]
pub mod sns;
pub mod traits;

pub use error::{classify_sdk_error, NotifyError};
pub use factory::create_notifier;
pub use log_notifier::LogNotifier;
pub use shrinkray_core::NotificationBackend;
#[cfg(feature = "notify-sns")]
pub use sns::{SnsConfig, SnsNotifier};
pub use traits::{Notifier, NotifyResult, PublishReceipt, SubscribeReceipt};
