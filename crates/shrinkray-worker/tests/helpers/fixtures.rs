use aws_lambda_events::event::sqs::SqsEvent;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;

/// Create a PNG image with an alpha channel
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 90, 180]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// Create a JPEG image
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 160, 220]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode test image");
    buffer
}

/// Object-created notification body as the storage service sends it.
pub fn storage_notification(bucket: &str, encoded_key: &str) -> String {
    json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "2024-05-01T12:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {
                    "name": bucket,
                    "arn": format!("arn:aws:s3:::{}", bucket)
                },
                "object": {
                    "key": encoded_key,
                    "size": 1024,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e"
                }
            }
        }]
    })
    .to_string()
}

pub fn test_event_notification(bucket: &str) -> String {
    json!({
        "Service": "Amazon S3",
        "Event": "s3:TestEvent",
        "Time": "2024-05-01T12:00:00.000Z",
        "Bucket": bucket
    })
    .to_string()
}

fn sqs_record(message_id: &str, body: Option<&str>) -> Value {
    let mut record = json!({
        "messageId": message_id,
        "receiptHandle": format!("handle-{}", message_id),
        "attributes": {
            "ApproximateReceiveCount": "1",
            "SentTimestamp": "1714564800000"
        },
        "messageAttributes": {},
        "md5OfBody": "e4e68fb7bd0e697a0ae8f1bb342846b3",
        "eventSource": "aws:sqs",
        "eventSourceARN": "arn:aws:sqs:us-east-1:123456789012:ImageResizeQueue",
        "awsRegion": "us-east-1"
    });
    if let Some(body) = body {
        record["body"] = Value::String(body.to_string());
    }
    record
}

/// Queue event with one record per body.
pub fn sqs_event(bodies: &[String]) -> SqsEvent {
    let records: Vec<Value> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| sqs_record(&format!("message-{}", i), Some(body)))
        .collect();
    serde_json::from_value(json!({ "Records": records })).expect("valid queue event")
}

pub fn sqs_event_without_body() -> SqsEvent {
    serde_json::from_value(json!({ "Records": [sqs_record("message-0", None)] }))
        .expect("valid queue event")
}
