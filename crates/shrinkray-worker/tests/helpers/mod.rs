#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use bytes::Bytes;
use shrinkray_core::{NotificationBackend, NotificationMessage, StorageBackend};
use shrinkray_notify::{Notifier, NotifyError, NotifyResult, PublishReceipt, SubscribeReceipt};
use shrinkray_storage::{Storage, StorageError, StorageResult};
use shrinkray_worker::{HandlerSettings, ResizeHandler};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const RAW_BUCKET: &str = "raw-images";
pub const PROCESSED_BUCKET: &str = "processed-images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Get { bucket: String, key: String },
    Put { bucket: String, key: String, content_type: String },
    Delete { bucket: String, key: String },
    Exists { bucket: String, key: String },
    Presign { bucket: String, key: String, expires_in: Duration },
}

/// In-memory storage that records every call.
#[derive(Clone, Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<(String, String), Bytes>>>,
    calls: Arc<Mutex<Vec<StorageCall>>>,
    failing_gets: Arc<Mutex<HashSet<String>>>,
    fail_puts: Arc<Mutex<bool>>,
    fail_presign: Arc<Mutex<bool>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StorageCall::Put { .. }))
            .collect()
    }

    pub fn deletes(&self) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StorageCall::Delete { .. }))
            .collect()
    }

    pub fn gets(&self) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StorageCall::Get { .. }))
            .collect()
    }

    /// Make `get` fail with a transport error for this key.
    pub fn fail_get(&self, key: &str) {
        self.failing_gets.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_puts(&self) {
        *self.fail_puts.lock().unwrap() = true;
    }

    pub fn fail_presign(&self) {
        *self.fail_presign.lock().unwrap() = true;
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.record(StorageCall::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });

        if self.failing_gets.lock().unwrap().contains(key) {
            return Err(StorageError::DownloadFailed("connection reset".to_string()));
        }

        self.object(bucket, key)
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        self.record(StorageCall::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
        });

        if *self.fail_puts.lock().unwrap() {
            return Err(StorageError::UploadFailed("access denied".to_string()));
        }

        self.insert(bucket, key, data);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.record(StorageCall::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        self.record(StorageCall::Exists {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(self.object(bucket, key).is_some())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.record(StorageCall::Presign {
            bucket: bucket.to_string(),
            key: key.to_string(),
            expires_in,
        });

        if *self.fail_presign.lock().unwrap() {
            return Err(StorageError::PresignFailed("credentials expired".to_string()));
        }

        Ok(format!(
            "https://{}.example.test/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Notifier that records published messages.
#[derive(Clone, Default)]
pub struct MockNotifier {
    published: Arc<Mutex<Vec<NotificationMessage>>>,
    subscribed: Arc<Mutex<Vec<String>>>,
    fail_publish: Arc<Mutex<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<NotificationMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn fail_publish(&self) {
        *self.fail_publish.lock().unwrap() = true;
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn publish(&self, message: &NotificationMessage) -> NotifyResult<PublishReceipt> {
        if *self.fail_publish.lock().unwrap() {
            return Err(NotifyError::Throttled);
        }

        let mut published = self.published.lock().unwrap();
        published.push(message.clone());
        Ok(PublishReceipt {
            message_id: format!("msg-{}", published.len()),
            topic_arn: "arn:aws:sns:us-east-1:123456789012:ImageResizeTopic".to_string(),
        })
    }

    async fn subscribe_email(&self, endpoint: &str) -> NotifyResult<SubscribeReceipt> {
        self.subscribed.lock().unwrap().push(endpoint.to_string());
        Ok(SubscribeReceipt {
            subscription_arn: "pending confirmation".to_string(),
            topic_arn: "arn:aws:sns:us-east-1:123456789012:ImageResizeTopic".to_string(),
            protocol: "email".to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    fn backend_type(&self) -> NotificationBackend {
        NotificationBackend::Log
    }
}

pub struct TestHandler {
    pub handler: ResizeHandler,
    pub storage: MockStorage,
    pub notifier: MockNotifier,
}

pub fn settings() -> HandlerSettings {
    HandlerSettings {
        processed_bucket: PROCESSED_BUCKET.to_string(),
        processed_key_prefix: "processed-".to_string(),
        presigned_url_expiry: Duration::from_secs(3600),
        max_file_size: 10 * 1024 * 1024,
    }
}

pub fn setup_handler() -> TestHandler {
    setup_handler_with(settings())
}

pub fn setup_handler_with(settings: HandlerSettings) -> TestHandler {
    let storage = MockStorage::new();
    let notifier = MockNotifier::new();
    let handler = ResizeHandler::new(
        Arc::new(storage.clone()),
        Arc::new(notifier.clone()),
        settings,
    );

    TestHandler {
        handler,
        storage,
        notifier,
    }
}
