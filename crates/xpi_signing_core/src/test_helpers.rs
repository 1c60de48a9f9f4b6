//! Test helpers for building notification payloads and archives in memory.

use std::io::{Cursor, Write};

use serde_json::{json, Value};
use zip::write::FileOptions;
use zip::ZipWriter;

pub const TEST_BUCKET: &str = "addons-incoming";

/// Builds a zip archive holding `entries` in the given order.
///
/// # Panics
///
/// Panics if the in-memory writer fails (should never happen).
pub fn zip_fixture(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        zip.start_file(*name, FileOptions::default())
            .expect("failed to start fixture entry");
        zip.write_all(contents)
            .expect("failed to write fixture entry");
    }
    zip.finish()
        .expect("failed to finish fixture archive")
        .into_inner()
}

/// A minimal WebExtension package.
pub fn webextension_fixture() -> Vec<u8> {
    zip_fixture(&[
        ("background.js", b"console.log('hi');"),
        (
            "manifest.json",
            br#"{"manifest_version": 2, "name": "demo", "version": "1.0"}"#,
        ),
    ])
}

/// A notification record in the shape S3 delivers it, extra fields included.
pub fn notification_record(event_name: &str, key: &str) -> Value {
    json!({
        "eventVersion": "2.0",
        "eventSource": "aws:s3",
        "eventTime": "2017-03-01T12:00:00.000Z",
        "eventName": event_name,
        "awsRegion": "us-west-2",
        "s3": {
            "s3SchemaVersion": "1.0",
            "bucket": {
                "name": TEST_BUCKET,
                "arn": format!("arn:aws:s3:::{TEST_BUCKET}")
            },
            "object": { "key": key }
        }
    })
}

pub fn notification_batch(records: Vec<Value>) -> Value {
    json!({ "Records": records })
}
