//! MessageAdapter - 外部に公開する 3 つの操作
//!
//! - `load_remote_event`: `replace` の解決のみ
//! - `load_nested_event`: config 探索 → envelope 組み立て
//! - `create_next_event`: 出力の組み込み → 仕上げ → 必要ならオフロード
//!
//! どの操作も状態を持たず、失敗したら途中結果は返しません。

use serde_json::Value;

use super::config_locator::ConfigLocator;
use super::envelope_builder::build_envelope;
use super::output_assembler::assemble;
use super::remote_payload::RemotePayloadManager;
use crate::domain::message::{EXCEPTION, REPLACE};
use crate::domain::{AdapterError, MessageConfig, TaskEnvelope};

pub struct MessageAdapter {
    locator: ConfigLocator,
    remote: RemotePayloadManager,
}

impl MessageAdapter {
    pub(crate) fn new(locator: ConfigLocator, remote: RemotePayloadManager) -> Self {
        Self { locator, remote }
    }

    #[tracing::instrument(name = "load_remote_event", skip_all)]
    pub async fn load_remote_event(&self, event: Value) -> Result<Value, AdapterError> {
        self.remote.dereference(event).await
    }

    #[tracing::instrument(name = "load_nested_event", skip_all)]
    pub async fn load_nested_event(
        &self,
        event: &Value,
        context: Option<&Value>,
    ) -> Result<TaskEnvelope, AdapterError> {
        let config = self.locator.locate(event, context).await?.ok_or_else(|| {
            AdapterError::TaskUnidentified(
                context
                    .and_then(|c| c.get("invokedFunctionArn").or_else(|| c.get("activityArn")))
                    .and_then(Value::as_str)
                    .unwrap_or("the current execution")
                    .to_string(),
            )
        })?;
        build_envelope(event, &config)
    }

    #[tracing::instrument(name = "create_next_event", skip_all)]
    pub async fn create_next_event(
        &self,
        task_result: &Value,
        event: &Value,
        message_config: Option<&Value>,
    ) -> Result<Value, AdapterError> {
        let message_config = match message_config {
            Some(raw) => MessageConfig::from_value(raw)?,
            None => MessageConfig::default(),
        };

        let mut next = assemble(task_result, event, &message_config)?;
        if let Some(obj) = next.as_object_mut() {
            obj.insert(EXCEPTION.to_string(), Value::String("None".into()));
            obj.shift_remove(REPLACE);
        }
        self.remote.offload_if_large(next).await
    }
}
