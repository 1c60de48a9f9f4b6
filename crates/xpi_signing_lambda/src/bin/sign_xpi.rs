use std::io::Write;

use lambda_runtime::{service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;
use xpi_signing_core::contract::ResponseEntry;
use xpi_signing_lambda::adapters::object_store::ObjectStore;
use xpi_signing_lambda::config::HandlerConfig;
use xpi_signing_lambda::handlers::sign_xpi::handle_batch;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn download_object(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .response_content_type("application/octet-stream")
                    .send()
                    .await
                    .map_err(|error| format!("failed to get object from s3: {error}"))?;

                let mut body = output.body;
                let mut written = 0u64;
                while let Some(chunk) = body
                    .try_next()
                    .await
                    .map_err(|error| format!("failed to read object body: {error}"))?
                {
                    sink.write_all(&chunk)
                        .map_err(|error| format!("failed to buffer object body: {error}"))?;
                    written += chunk.len() as u64;
                }
                Ok::<u64, String>(written)
            })
        })
    }
}

fn handle_request(
    event: LambdaEvent<Value>,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
) -> Result<Vec<ResponseEntry>, Error> {
    let span = tracing::info_span!("sign_xpi", request_id = %event.context.request_id);
    span.in_scope(|| {
        handle_batch(event.payload, config, store).map_err(|error| {
            tracing::error!(%error, "invocation failed");
            Error::from(error)
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = HandlerConfig::from_env()?;

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = config.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    let aws_config = loader.load().await;

    let store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    tracing::info!(region = ?aws_config.region(), "initialized s3 client");

    let shared_config = &config;
    let shared_store = &store;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, shared_config, shared_store)
    }))
    .await
}
