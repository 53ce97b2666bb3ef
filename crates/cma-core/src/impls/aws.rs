//! AWS 実装 - S3ObjectStore / SfnExecutionHistory（feature `aws`）
//!
//! SDK のエラーはそのまま文字列化して `StoreError` / `HistoryError` に載せます。
//! リトライは SDK の既定設定に任せ、アダプター側では行いません。

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime as S3DateTime};
use chrono::{DateTime, Utc};

use crate::domain::history::{ScheduledEventDetails, StateEnteredEventDetails};
use crate::domain::{HistoryEvent, HistoryEventType, RemotePointer};
use crate::ports::{ExecutionHistory, HistoryError, ObjectStore, StoreError};

/// 既定の credential chain / region から SDK 設定を読む
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_s3::Client::new(config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, location: &RemotePointer) -> Result<Vec<u8>, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::NotFound(location.clone())
                } else {
                    StoreError::Backend(format!("get {location}: {}", DisplayErrorContext(&e)))
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("read {location}: {e}")))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn put(
        &self,
        location: &RemotePointer,
        body: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type("application/json")
            .expires(S3DateTime::from_secs(expires_at.timestamp()))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("put {location}: {}", DisplayErrorContext(&e))))?;
        Ok(())
    }
}

pub struct SfnExecutionHistory {
    client: aws_sdk_sfn::Client,
}

impl SfnExecutionHistory {
    pub fn new(client: aws_sdk_sfn::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_sfn::Client::new(config))
    }
}

#[async_trait]
impl ExecutionHistory for SfnExecutionHistory {
    async fn recent_events(
        &self,
        execution_arn: &str,
        max_results: u32,
    ) -> Result<Vec<HistoryEvent>, HistoryError> {
        let output = self
            .client
            .get_execution_history()
            .execution_arn(execution_arn)
            .max_results(max_results.min(i32::MAX as u32) as i32)
            .reverse_order(true)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_execution_does_not_exist()) {
                    HistoryError::ExecutionNotFound(execution_arn.to_string())
                } else {
                    HistoryError::Backend(format!(
                        "get_execution_history {execution_arn}: {}",
                        aws_sdk_sfn::error::DisplayErrorContext(&e)
                    ))
                }
            })?;

        Ok(output.events().iter().map(convert_event).collect())
    }
}

fn convert_event(event: &aws_sdk_sfn::types::HistoryEvent) -> HistoryEvent {
    let scheduled = |resource: &str| ScheduledEventDetails {
        resource: resource.to_string(),
    };

    HistoryEvent {
        id: event.id(),
        event_type: HistoryEventType::parse(event.r#type().as_str()),
        previous_event_id: Some(event.previous_event_id()),
        lambda_function_scheduled_event_details: event
            .lambda_function_scheduled_event_details()
            .map(|d| scheduled(d.resource())),
        activity_scheduled_event_details: event
            .activity_scheduled_event_details()
            .map(|d| scheduled(d.resource())),
        state_entered_event_details: event.state_entered_event_details().map(|d| {
            StateEnteredEventDetails {
                name: d.name().to_string(),
            }
        }),
    }
}
