use lambda_runtime::tracing;
use serde_json::Value;
use xpi_signing_core::contract::{
    check_record, parse_batch, ObjectRef, ResponseEntry, ValidationError,
};
use xpi_signing_core::digest::DigestingWriter;
use xpi_signing_core::manifest::{ArchiveError, Manifest, XpiArchive};

use crate::adapters::object_store::ObjectStore;
use crate::config::HandlerConfig;
use crate::scratch::ScratchBuffer;

/// Failures that abort the whole invocation.
#[derive(Debug)]
pub enum SignXpiError {
    InvalidEvent(ValidationError),
    Fetch {
        bucket: String,
        key: String,
        message: String,
    },
    Scratch(std::io::Error),
    Archive {
        key: String,
        source: ArchiveError,
    },
}

impl std::fmt::Display for SignXpiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEvent(error) => write!(f, "{error}"),
            Self::Fetch {
                bucket,
                key,
                message,
            } => write!(f, "failed to fetch s3://{bucket}/{key}: {message}"),
            Self::Scratch(error) => write!(f, "failed to prepare scratch buffer: {error}"),
            Self::Archive { key, source } => write!(f, "failed to inspect {key}: {source}"),
        }
    }
}

impl std::error::Error for SignXpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEvent(error) => Some(error),
            Self::Fetch { .. } => None,
            Self::Scratch(error) => Some(error),
            Self::Archive { source, .. } => Some(source),
        }
    }
}

struct InspectedUpload {
    bytes: u64,
    sha256: String,
    manifest: Option<Manifest>,
}

/// Processes one batch of upload notifications, producing one entry per record.
///
/// Records are handled in order. A package without a manifest ends the batch:
/// its error entry is the last one returned and later records are not visited.
pub fn handle_batch(
    event: Value,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
) -> Result<Vec<ResponseEntry>, SignXpiError> {
    let batch = parse_batch(event).map_err(SignXpiError::InvalidEvent)?;
    tracing::info!(
        record_count = batch.records.len(),
        "processing upload notifications"
    );

    let mut responses: Vec<ResponseEntry> = Vec::with_capacity(batch.records.len());
    for record in batch.records {
        if let Err(reason) = check_record(&record) {
            tracing::info!(key = record.s3.object_key(), %reason, "skipping record");
            responses.push(reason.into());
            continue;
        }

        let upload = inspect_upload(&record.s3, config, store)?;
        let key = record.s3.object_key();
        let Some(manifest) = upload.manifest else {
            tracing::warn!(key, bytes = upload.bytes, "no manifest found");
            responses.push(ResponseEntry::Error(format!("No manifest found in {key}")));
            break;
        };

        tracing::info!(
            bucket = record.s3.bucket_name(),
            key,
            manifest = manifest.name,
            bytes = upload.bytes,
            sha256 = %upload.sha256,
            "manifest for {key}: {}",
            manifest.name
        );
        tracing::info!(key, contents = %manifest.contents_lossy(), "manifest contents");

        // Signing and re-upload are not wired up yet; the source object is echoed.
        responses.push(ResponseEntry::Uploaded(record.s3));
    }

    Ok(responses)
}

fn inspect_upload(
    object: &ObjectRef,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
) -> Result<InspectedUpload, SignXpiError> {
    let bucket = object.bucket_name();
    let key = object.object_key();

    let mut scratch =
        ScratchBuffer::create(config.scratch_dir.as_deref()).map_err(SignXpiError::Scratch)?;
    let mut sink = DigestingWriter::new(scratch.writer());
    let bytes = store
        .download_object(bucket, key, &mut sink)
        .map_err(|message| SignXpiError::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        })?;
    let (_, sha256) = sink.finish();

    let reader = scratch.into_reader().map_err(SignXpiError::Scratch)?;
    let archive_error = |source| SignXpiError::Archive {
        key: key.to_string(),
        source,
    };
    let mut archive = XpiArchive::open(reader).map_err(archive_error)?;
    let manifest = archive.find_manifest().map_err(archive_error)?;

    Ok(InspectedUpload {
        bytes,
        sha256,
        manifest,
    })
}
