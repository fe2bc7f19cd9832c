use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters left unescaped when rendering an object key the way storage
/// notifications do. Spaces are kept here and rendered as `+` afterwards.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("message body is not a storage notification: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("storage notification contains no records")]
    NoRecords,

    #[error("storage notification record has no bucket name")]
    MissingBucket,

    #[error("storage notification record has no object key")]
    MissingKey,

    #[error("object key {0:?} is not valid UTF-8 once decoded")]
    InvalidKeyEncoding(String),
}

/// Object-created notification emitted by the storage service.
///
/// Only the fields the pipeline reads are modelled; everything else in the
/// document is ignored on deserialisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageEventNotification {
    #[serde(rename = "Records", default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<StorageEventRecord>,

    /// Set on the `s3:TestEvent` document sent when a notification target is
    /// first configured. Such documents have no records.
    #[serde(rename = "Event", default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    /// URL-encoded key (`+` for space, `%XX` otherwise).
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Outcome of parsing one queue message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessageBody {
    Upload(UploadNotification),
    /// Storage service test document; nothing to process.
    TestEvent,
}

/// A decoded upload: the object the handler has to resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNotification {
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
    pub size: Option<u64>,
    pub event_name: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
}

impl UploadNotification {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size: None,
            event_name: None,
            event_time: None,
        }
    }

    /// Parse a queue message body carrying a storage notification.
    ///
    /// Only the first record is used; the storage service emits one record per
    /// notification.
    pub fn from_message_body(body: &str) -> Result<ParsedMessageBody, EventParseError> {
        let notification: StorageEventNotification = serde_json::from_str(body)?;

        let Some(record) = notification.records.into_iter().next() else {
            return match notification.event.as_deref() {
                Some("s3:TestEvent") => Ok(ParsedMessageBody::TestEvent),
                _ => Err(EventParseError::NoRecords),
            };
        };

        let bucket = record
            .s3
            .bucket
            .name
            .filter(|name| !name.is_empty())
            .ok_or(EventParseError::MissingBucket)?;
        let raw_key = record
            .s3
            .object
            .key
            .filter(|key| !key.is_empty())
            .ok_or(EventParseError::MissingKey)?;

        Ok(ParsedMessageBody::Upload(UploadNotification {
            bucket,
            key: decode_object_key(&raw_key)?,
            size: record.s3.object.size,
            event_name: record.event_name,
            event_time: record.event_time,
        }))
    }

    /// Render this upload as an object-created notification body, the way the
    /// storage service would deliver it to the queue.
    pub fn to_message_body(&self) -> Result<String, serde_json::Error> {
        let notification = StorageEventNotification {
            records: vec![StorageEventRecord {
                event_source: Some("aws:s3".to_string()),
                event_name: Some(
                    self.event_name
                        .clone()
                        .unwrap_or_else(|| "ObjectCreated:Put".to_string()),
                ),
                event_time: Some(self.event_time.unwrap_or_else(Utc::now)),
                s3: StorageEntity {
                    bucket: BucketRef {
                        name: Some(self.bucket.clone()),
                    },
                    object: ObjectRef {
                        key: Some(encode_object_key(&self.key)),
                        size: self.size,
                    },
                },
            }],
            event: None,
        };
        serde_json::to_string(&notification)
    }
}

/// Key of the processed object derived from the source key.
pub fn processed_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

fn decode_object_key(raw: &str) -> Result<String, EventParseError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|_| EventParseError::InvalidKeyEncoding(raw.to_string()))
}

fn encode_object_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}
