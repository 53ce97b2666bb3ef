//! TaskEnvelope - タスクに渡す固定形式の呼び出しデータ
//!
//! `{input, config, messageConfig}` の 3 つだけをタスクに見せます。

use serde::Serialize;
use serde_json::Value;

/// TaskEnvelope はタスクの実行に必要な全情報
///
/// - input: テンプレートで選ばれた値、またはメッセージの payload そのもの
/// - config: `cumulus_message` を取り除き、テンプレートを解決した設定
/// - message_config: 取り除く前の `cumulus_message`（なければ `{}`）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEnvelope {
    input: Value,
    config: Value,
    message_config: Value,
}

impl TaskEnvelope {
    pub fn new(input: Value, config: Value, message_config: Value) -> Self {
        Self {
            input,
            config,
            message_config,
        }
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn message_config(&self) -> &Value {
        &self.message_config
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({
            "input": self.input,
            "config": self.config,
            "messageConfig": self.message_config,
        })
    }
}
