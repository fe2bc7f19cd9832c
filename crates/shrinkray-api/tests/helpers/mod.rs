#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use shrinkray_api::{setup_routes, AppState};
use shrinkray_core::{Config, NotificationBackend, NotificationMessage, PipelineConfig};
use shrinkray_notify::{Notifier, NotifyResult, PublishReceipt, SubscribeReceipt};
use shrinkray_storage::{LocalStorage, Storage};
use shrinkray_worker::{HandlerSettings, LocalQueue, LocalQueueConfig, ResizeHandler};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const RAW_BUCKET: &str = "raw-images";
pub const PROCESSED_BUCKET: &str = "processed-images";
pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:ImageResizeTopic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeCall {
    pub protocol: String,
    pub topic_arn: String,
    pub endpoint: String,
}

/// Notifier that records subscribe and publish calls.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    subscribes: Arc<Mutex<Vec<SubscribeCall>>>,
    published: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl RecordingNotifier {
    pub fn subscribes(&self) -> Vec<SubscribeCall> {
        self.subscribes.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<NotificationMessage> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, message: &NotificationMessage) -> NotifyResult<PublishReceipt> {
        self.published.lock().unwrap().push(message.clone());
        Ok(PublishReceipt {
            message_id: "msg-1".to_string(),
            topic_arn: TOPIC_ARN.to_string(),
        })
    }

    async fn subscribe_email(&self, endpoint: &str) -> NotifyResult<SubscribeReceipt> {
        let call = SubscribeCall {
            protocol: "email".to_string(),
            topic_arn: TOPIC_ARN.to_string(),
            endpoint: endpoint.to_string(),
        };
        self.subscribes.lock().unwrap().push(call);
        Ok(SubscribeReceipt {
            subscription_arn: "pending confirmation".to_string(),
            topic_arn: TOPIC_ARN.to_string(),
            protocol: "email".to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    fn backend_type(&self) -> NotificationBackend {
        NotificationBackend::Log
    }
}

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<LocalStorage>,
    pub notifier: RecordingNotifier,
    pub _temp_dir: TempDir,
}

pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::with_buckets(RAW_BUCKET, PROCESSED_BUCKET);
    config.max_file_size_bytes = 64 * 1024;
    config
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: PipelineConfig) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = Arc::new(
        LocalStorage::new(
            temp_dir.path().to_path_buf(),
            "http://localhost:3000/files".to_string(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let notifier = RecordingNotifier::default();
    let config = Config::from(config);

    let pipeline = if config.local_pipeline_enabled() {
        let handler = ResizeHandler::new(
            storage.clone(),
            Arc::new(notifier.clone()),
            HandlerSettings::from_config(&config),
        );
        Some(LocalQueue::start(
            Arc::new(handler),
            LocalQueueConfig::from_config(&config),
        ))
    } else {
        None
    };

    let state = Arc::new(AppState::new(
        &config,
        storage.clone() as Arc<dyn Storage>,
        Arc::new(notifier.clone()),
        pipeline,
    ));
    let server = TestServer::new(setup_routes(state.clone())).expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
        notifier,
        _temp_dir: temp_dir,
    }
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 60, 30]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .expect("encode test image");
    buffer
}
