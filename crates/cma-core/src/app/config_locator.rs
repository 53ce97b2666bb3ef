//! ConfigLocator - 現在のタスク名とその config を探す
//!
//! `cumulus_meta.message_source` で分岐する唯一の場所です。
//! - local: `cumulus_meta.task`
//! - sfn: execution history から動的に探す

use serde_json::{Map, Value};

use super::history_matcher::ExecutionHistoryMatcher;
use crate::domain::message::{WORKFLOW_CONFIG, cumulus_meta, meta_str};
use crate::domain::{AdapterError, ExecutionIdentity, MessageSource};

pub struct ConfigLocator {
    matcher: ExecutionHistoryMatcher,
}

impl ConfigLocator {
    pub fn new(matcher: ExecutionHistoryMatcher) -> Self {
        Self { matcher }
    }

    /// タスクの config を返す
    ///
    /// - タスク名が分かり、config がない: `Some({})`
    /// - 実行履歴からタスクを特定できない: `None`
    pub async fn locate(
        &self,
        message: &Value,
        context: Option<&Value>,
    ) -> Result<Option<Value>, AdapterError> {
        let task_name = match MessageSource::of(message)? {
            MessageSource::Local => Some(meta_str(cumulus_meta(message)?, "task")?.to_string()),
            MessageSource::Sfn => {
                let identity = execution_identity(message, context)?;
                self.matcher.find_current_task(&identity).await?
            }
        };

        tracing::debug!(task = ?task_name, "located task");
        Ok(task_name.map(|name| task_config(message, &name)))
    }
}

/// `workflow_config[task]`。なければ空の config
pub fn task_config(message: &Value, task_name: &str) -> Value {
    message
        .get(WORKFLOW_CONFIG)
        .and_then(|wc| wc.get(task_name))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// `cumulus_meta` と invocation context から ExecutionIdentity を組み立てる
///
/// context の `invokedFunctionArn` を優先し、なければ `activityArn` を使う。
/// どちらもなければ ARN なしで探索する。context 自体がなければエラー。
pub fn execution_identity(
    message: &Value,
    context: Option<&Value>,
) -> Result<ExecutionIdentity, AdapterError> {
    let meta = cumulus_meta(message)?;
    let context = context
        .filter(|c| !c.is_null())
        .ok_or(AdapterError::MissingContext)?;

    let invocation_arn = ["invokedFunctionArn", "activityArn"]
        .iter()
        .find_map(|key| context.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    Ok(ExecutionIdentity::new(
        meta_str(meta, "state_machine")?,
        meta_str(meta, "execution_name")?,
        invocation_arn,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HistoryEvent;
    use crate::impls::StaticExecutionHistory;
    use serde_json::json;
    use std::sync::Arc;

    const STATE_MACHINE: &str = "arn:aws:states:us-east-1:1:stateMachine:Ingest";
    const EXECUTION: &str = "arn:aws:states:us-east-1:1:execution:Ingest:run-1";

    fn locator(events: Vec<HistoryEvent>) -> ConfigLocator {
        let history = Arc::new(StaticExecutionHistory::new(EXECUTION, events));
        ConfigLocator::new(ExecutionHistoryMatcher::new(history, 40))
    }

    fn sfn_message() -> Value {
        json!({
            "cumulus_meta": {
                "message_source": "sfn",
                "state_machine": STATE_MACHINE,
                "execution_name": "run-1"
            },
            "workflow_config": {
                "Validate": { "bucket": "{{$.meta.bucket}}" }
            }
        })
    }

    #[tokio::test]
    async fn local_source_uses_meta_task() {
        let msg = json!({
            "cumulus_meta": { "message_source": "local", "task": "discover" },
            "workflow_config": { "discover": { "limit": 5 } }
        });
        let config = locator(vec![]).locate(&msg, None).await.unwrap();
        assert_eq!(config, Some(json!({ "limit": 5 })));
    }

    #[tokio::test]
    async fn missing_entry_is_an_empty_config() {
        let msg = json!({ "cumulus_meta": { "message_source": "local", "task": "discover" } });
        let config = locator(vec![]).locate(&msg, None).await.unwrap();
        assert_eq!(config, Some(json!({})));
    }

    #[tokio::test]
    async fn sfn_source_discovers_task_from_history() {
        let events = vec![
            HistoryEvent::activity_scheduled(10, 9, "arn:activity:X"),
            HistoryEvent::task_state_entered(9, "Validate"),
        ];
        let context = json!({ "activityArn": "arn:activity:X" });

        let config = locator(events)
            .locate(&sfn_message(), Some(&context))
            .await
            .unwrap();

        assert_eq!(config, Some(json!({ "bucket": "{{$.meta.bucket}}" })));
    }

    #[tokio::test]
    async fn undiscoverable_task_yields_no_config() {
        let events = vec![HistoryEvent::activity_scheduled(10, 9, "arn:activity:X")];
        let context = json!({ "activityArn": "arn:activity:X" });

        let config = locator(events)
            .locate(&sfn_message(), Some(&context))
            .await
            .unwrap();

        assert_eq!(config, None);
    }

    #[tokio::test]
    async fn unknown_source_fails_with_its_name() {
        let msg = json!({ "cumulus_meta": { "message_source": "cloudwatch" } });
        let err = locator(vec![]).locate(&msg, None).await.unwrap_err();
        assert!(err.to_string().contains("cloudwatch"));
        assert!(matches!(err, AdapterError::UnknownSource(_)));
    }

    #[tokio::test]
    async fn sfn_source_requires_context() {
        let err = locator(vec![])
            .locate(&sfn_message(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::MissingContext));
    }

    #[test]
    fn invoked_function_arn_is_preferred() {
        let context = json!({
            "invokedFunctionArn": "arn:lambda:fn",
            "activityArn": "arn:activity:X"
        });
        let identity = execution_identity(&sfn_message(), Some(&context)).unwrap();
        assert_eq!(identity.invocation_arn.as_deref(), Some("arn:lambda:fn"));
        assert_eq!(identity.execution_arn(), EXECUTION);
    }

    #[test]
    fn context_without_arn_searches_without_one() {
        let identity = execution_identity(&sfn_message(), Some(&json!({}))).unwrap();
        assert_eq!(identity.invocation_arn, None);
    }
}
