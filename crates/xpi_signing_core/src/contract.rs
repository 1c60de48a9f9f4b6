use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const XPI_SUFFIX: &str = ".xpi";
pub const OBJECT_CREATED_PREFIX: &str = "ObjectCreated";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
}

/// Location of an uploaded object, echoed back verbatim in `uploaded` entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: BucketInfo,
    pub object: ObjectInfo,
}

impl ObjectRef {
    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    pub fn object_key(&self) -> &str {
        &self.object.key
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub event_time: String,
    pub event_name: String,
    pub aws_region: String,
    pub s3: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationBatch {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEntry {
    Error(String),
    Uploaded(ObjectRef),
}

/// Why a record was passed over without fetching its object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotXpi(String),
    NotObjectCreated(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotXpi(key) => write!(f, "file not XPI: {key}"),
            Self::NotObjectCreated(event_name) => {
                write!(f, "event not ObjectCreated: {event_name}")
            }
        }
    }
}

impl From<SkipReason> for ResponseEntry {
    fn from(reason: SkipReason) -> Self {
        Self::Error(reason.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Parses a raw invocation payload into a batch.
///
/// Every field of the notification shape is required and type-checked; a
/// single mismatch rejects the whole batch. Fields outside the shape are
/// ignored.
pub fn parse_batch(event: Value) -> Result<NotificationBatch, ValidationError> {
    check_object_shape(&event)?;

    serde_json::from_value(event)
        .map_err(|error| ValidationError::new(format!("invalid notification batch: {error}")))
}

/// Serde also fills structs from positional arrays, so every nested struct
/// is required to be a JSON object before deserializing.
fn check_object_shape(event: &Value) -> Result<(), ValidationError> {
    let root = require_object(event, "payload")?;
    let Some(records) = root.get("Records").and_then(Value::as_array) else {
        return Ok(());
    };

    for (index, record) in records.iter().enumerate() {
        let record = require_object(record, &format!("Records[{index}]"))?;
        let Some(s3) = record.get("s3") else {
            continue;
        };
        let s3 = require_object(s3, &format!("Records[{index}].s3"))?;
        for field in ["bucket", "object"] {
            if let Some(value) = s3.get(field) {
                require_object(value, &format!("Records[{index}].s3.{field}"))?;
            }
        }
    }

    Ok(())
}

fn require_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        ValidationError::new(format!(
            "invalid notification batch: {path} must be a JSON object"
        ))
    })
}

/// Suffix check first, then event name, so a non-XPI key is reported even
/// when the event is also not a creation.
pub fn check_record(record: &NotificationRecord) -> Result<(), SkipReason> {
    let key = record.s3.object_key();
    if !key.ends_with(XPI_SUFFIX) {
        return Err(SkipReason::NotXpi(key.to_string()));
    }

    if !record.event_name.starts_with(OBJECT_CREATED_PREFIX) {
        return Err(SkipReason::NotObjectCreated(record.event_name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_record(event_name: &str, key: &str) -> Value {
        json!({
            "eventVersion": "2.0",
            "eventSource": "aws:s3",
            "eventTime": "2017-03-01T12:00:00.000Z",
            "eventName": event_name,
            "awsRegion": "us-west-2",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": { "name": "addons-incoming", "arn": "arn:aws:s3:::addons-incoming" },
                "object": { "key": key }
            }
        })
    }

    #[test]
    fn parses_notification_and_ignores_extra_fields() {
        let batch = parse_batch(json!({
            "Records": [sample_record("ObjectCreated:Put", "addon.xpi")]
        }))
        .expect("batch should parse");

        assert_eq!(batch.records.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.event_name, "ObjectCreated:Put");
        assert_eq!(record.aws_region, "us-west-2");
        assert_eq!(record.s3.bucket_name(), "addons-incoming");
        assert_eq!(record.s3.object_key(), "addon.xpi");
    }

    #[test]
    fn empty_records_parse_to_empty_batch() {
        let batch = parse_batch(json!({ "Records": [] })).expect("batch should parse");
        assert!(batch.records.is_empty());
    }

    #[test]
    fn rejects_missing_records() {
        let error = parse_batch(json!({})).expect_err("missing Records should fail");
        assert!(error.message().starts_with("invalid notification batch"));
        assert!(error.message().contains("Records"));
    }

    #[test]
    fn rejects_missing_event_name() {
        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record
            .as_object_mut()
            .expect("record is an object")
            .remove("eventName");

        let error = parse_batch(json!({ "Records": [record] }))
            .expect_err("missing eventName should fail");
        assert!(error.message().contains("eventName"));
    }

    #[test]
    fn rejects_wrongly_typed_key() {
        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"]["object"]["key"] = json!(42);

        parse_batch(json!({ "Records": [record] })).expect_err("numeric key should fail");
    }

    #[test]
    fn rejects_missing_bucket_arn() {
        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"]["bucket"]
            .as_object_mut()
            .expect("bucket is an object")
            .remove("arn");

        let error =
            parse_batch(json!({ "Records": [record] })).expect_err("missing arn should fail");
        assert!(error.message().contains("arn"));
    }

    #[test]
    fn rejects_non_object_payload() {
        let error = parse_batch(json!([1, 2, 3])).expect_err("array payload should fail");
        assert_eq!(
            error.message(),
            "invalid notification batch: payload must be a JSON object"
        );
    }

    #[test]
    fn rejects_positional_array_record() {
        let error = parse_batch(json!({
            "Records": [[
                "2017-03-01T12:00:00.000Z",
                "ObjectCreated:Put",
                "us-west-2",
                [["addons-incoming", "arn:aws:s3:::addons-incoming"], ["addon.xpi"]]
            ]]
        }))
        .expect_err("array-shaped record should fail");
        assert_eq!(
            error.message(),
            "invalid notification batch: Records[0] must be a JSON object"
        );
    }

    #[test]
    fn rejects_positional_arrays_nested_in_s3() {
        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"]["bucket"] = json!(["addons-incoming", "arn:aws:s3:::addons-incoming"]);
        let error = parse_batch(json!({ "Records": [record] }))
            .expect_err("array-shaped bucket should fail");
        assert!(error.message().contains("Records[0].s3.bucket"));

        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"]["object"] = json!(["addon.xpi"]);
        let error = parse_batch(json!({
            "Records": [sample_record("ObjectCreated:Put", "a.xpi"), record]
        }))
        .expect_err("array-shaped object should fail");
        assert!(error.message().contains("Records[1].s3.object"));

        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"] = json!([{ "name": "b", "arn": "a" }, { "key": "addon.xpi" }]);
        let error =
            parse_batch(json!({ "Records": [record] })).expect_err("array-shaped s3 should fail");
        assert!(error.message().contains("Records[0].s3 must be"));
    }

    #[test]
    fn object_size_is_ignored_and_not_echoed() {
        let mut record = sample_record("ObjectCreated:Put", "addon.xpi");
        record["s3"]["object"]["size"] = json!("1024");

        let batch = parse_batch(json!({ "Records": [record] }))
            .expect("string size should be ignored");
        let echoed = serde_json::to_value(ResponseEntry::Uploaded(batch.records[0].s3.clone()))
            .expect("entry should serialize");
        assert_eq!(echoed["uploaded"]["object"], json!({ "key": "addon.xpi" }));
    }

    #[test]
    fn suffix_check_runs_before_event_check() {
        let batch = parse_batch(json!({
            "Records": [sample_record("ObjectRemoved:Delete", "notes.txt")]
        }))
        .expect("batch should parse");

        let reason = check_record(&batch.records[0]).expect_err("record should be skipped");
        assert_eq!(reason, SkipReason::NotXpi("notes.txt".to_string()));
        assert_eq!(
            ResponseEntry::from(reason),
            ResponseEntry::Error("file not XPI: notes.txt".to_string())
        );
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let batch = parse_batch(json!({
            "Records": [sample_record("ObjectCreated:Put", "ADDON.XPI")]
        }))
        .expect("batch should parse");

        assert_eq!(
            check_record(&batch.records[0]),
            Err(SkipReason::NotXpi("ADDON.XPI".to_string()))
        );
    }

    #[test]
    fn non_creation_events_are_skipped() {
        let batch = parse_batch(json!({
            "Records": [sample_record("ObjectRemoved:Delete", "addon.xpi")]
        }))
        .expect("batch should parse");

        let reason = check_record(&batch.records[0]).expect_err("record should be skipped");
        assert_eq!(
            reason.to_string(),
            "event not ObjectCreated: ObjectRemoved:Delete"
        );
    }

    #[test]
    fn response_entries_use_single_key_objects() {
        let batch = parse_batch(json!({
            "Records": [sample_record("ObjectCreated:Put", "addon.xpi")]
        }))
        .expect("batch should parse");
        assert!(check_record(&batch.records[0]).is_ok());

        let uploaded = serde_json::to_value(ResponseEntry::Uploaded(batch.records[0].s3.clone()))
            .expect("entry should serialize");
        assert_eq!(
            uploaded,
            json!({
                "uploaded": {
                    "bucket": { "name": "addons-incoming", "arn": "arn:aws:s3:::addons-incoming" },
                    "object": { "key": "addon.xpi" }
                }
            })
        );

        let error = serde_json::to_value(ResponseEntry::Error("boom".to_string()))
            .expect("entry should serialize");
        assert_eq!(error, json!({ "error": "boom" }));
    }
}
