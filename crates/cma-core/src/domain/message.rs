//! Message - オーケストレーターとタスクの間でやり取りされる JSON メッセージ
//!
//! メッセージ本体は `serde_json::Value` のまま扱います。
//! ここでは予約キーと、`cumulus_meta` から取り出す型付きの値を定義します。

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::AdapterError;

pub const CUMULUS_META: &str = "cumulus_meta";
pub const WORKFLOW_CONFIG: &str = "workflow_config";
pub const MESSAGE_CONFIG: &str = "cumulus_message";
pub const PAYLOAD: &str = "payload";
pub const REPLACE: &str = "replace";
pub const EXCEPTION: &str = "exception";
pub const INGEST_META: &str = "ingest_meta";

/// `cumulus_meta.message_source` の値
///
/// "local" と "sfn" 以外は受け付けません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// ローカル実行: タスク名は `cumulus_meta.task`
    Local,
    /// Step Functions 実行: タスク名は execution history から探す
    Sfn,
}

impl MessageSource {
    /// メッセージの `cumulus_meta.message_source` を読む
    pub fn of(message: &Value) -> Result<Self, AdapterError> {
        match cumulus_meta(message)?.get("message_source") {
            None | Some(Value::Null) => Err(AdapterError::MissingSource),
            Some(Value::String(s)) => s.parse(),
            Some(other) => Err(AdapterError::UnknownSource(other.to_string())),
        }
    }
}

impl FromStr for MessageSource {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(MessageSource::Local),
            "sfn" => Ok(MessageSource::Sfn),
            other => Err(AdapterError::UnknownSource(other.to_string())),
        }
    }
}

/// `cumulus_meta` を mapping として取り出す
pub fn cumulus_meta(message: &Value) -> Result<&Map<String, Value>, AdapterError> {
    message
        .get(CUMULUS_META)
        .and_then(Value::as_object)
        .ok_or_else(|| AdapterError::InvalidMessage("message requires a cumulus_meta object".into()))
}

/// `cumulus_meta` の文字列フィールドを取り出す
pub fn meta_str<'a>(meta: &'a Map<String, Value>, field: &str) -> Result<&'a str, AdapterError> {
    meta.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::InvalidMessage(format!("cumulus_meta.{field} must be a string")))
}

/// 実行中の workflow execution を一意に特定する情報
///
/// 並列ブランチがある場合、`invocation_arn` がないと正しいタスクを選べません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionIdentity {
    pub state_machine: String,
    pub execution_name: String,
    pub invocation_arn: Option<String>,
}

impl ExecutionIdentity {
    pub fn new(
        state_machine: impl Into<String>,
        execution_name: impl Into<String>,
        invocation_arn: Option<String>,
    ) -> Self {
        Self {
            state_machine: state_machine.into(),
            execution_name: execution_name.into(),
            invocation_arn,
        }
    }

    /// state machine ARN と execution 名から execution ARN を組み立てる
    ///
    /// `arn:aws:states:r:a:stateMachine:Flow` + `run-1`
    /// → `arn:aws:states:r:a:execution:Flow:run-1`
    pub fn execution_arn(&self) -> String {
        let base = self.state_machine.replace(":stateMachine:", ":execution:");
        format!("{base}:{}", self.execution_name)
    }
}

/// object storage 上のメッセージ本体への参照（`replace` フィールド）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePointer {
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Key")]
    pub key: String,
}

impl RemotePointer {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// `replace` があれば取り出す。なければ `None`
    pub fn of(message: &Value) -> Result<Option<Self>, AdapterError> {
        match message.get(REPLACE) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
        }
    }
}

impl std::fmt::Display for RemotePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("local"), MessageSource::Local)]
    #[case(json!("sfn"), MessageSource::Sfn)]
    fn known_sources_parse(#[case] source: Value, #[case] expected: MessageSource) {
        let msg = json!({ "cumulus_meta": { "message_source": source } });
        assert_eq!(MessageSource::of(&msg).unwrap(), expected);
    }

    #[test]
    fn unknown_source_is_rejected_by_name() {
        let msg = json!({ "cumulus_meta": { "message_source": "cloudwatch" } });
        let err = MessageSource::of(&msg).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownSource(ref s) if s == "cloudwatch"));
    }

    #[test]
    fn absent_source_is_a_resolution_error() {
        let msg = json!({ "cumulus_meta": {} });
        assert!(matches!(
            MessageSource::of(&msg),
            Err(AdapterError::MissingSource)
        ));
    }

    #[test]
    fn execution_arn_is_derived_from_state_machine() {
        let id = ExecutionIdentity::new(
            "arn:aws:states:us-east-1:123:stateMachine:Ingest",
            "run-42",
            None,
        );
        assert_eq!(
            id.execution_arn(),
            "arn:aws:states:us-east-1:123:execution:Ingest:run-42"
        );
    }

    #[test]
    fn remote_pointer_uses_capitalized_keys() {
        let p = RemotePointer::new("bucket", "events/abc");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, json!({ "Bucket": "bucket", "Key": "events/abc" }));

        let msg = json!({ "replace": { "Bucket": "bucket", "Key": "events/abc" } });
        assert_eq!(RemotePointer::of(&msg).unwrap(), Some(p));
        assert_eq!(RemotePointer::of(&json!({})).unwrap(), None);
    }
}
