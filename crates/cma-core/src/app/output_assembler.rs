//! OutputAssembler - タスクの戻り値を次のメッセージに組み込む
//!
//! # ルール
//! - `outputs` あり: payload を `{}` に戻し、各 `{source, destination}` を順に適用
//!   （同じパスに書く場合は後のルールが勝つ）
//! - `outputs` なし: 戻り値で payload を丸ごと置き換える
//! - `cumulus_meta` は、ルールが明示的に書かない限りそのまま

use serde_json::{Map, Value};

use crate::domain::message::PAYLOAD;
use crate::domain::{AdapterError, MessageConfig};
use crate::template::{JsonPath, Template, resolve};

pub fn assemble(
    task_result: &Value,
    original: &Value,
    message_config: &MessageConfig,
) -> Result<Value, AdapterError> {
    let mut output = original.clone();

    let Some(outputs) = &message_config.outputs else {
        set_payload(&mut output, task_result.clone())?;
        return Ok(output);
    };

    set_payload(&mut output, Value::Object(Map::new()))?;
    for rule in outputs {
        let value = resolve(task_result, &rule.source)?;
        let destination = write_target(&rule.destination)?;
        tracing::debug!(source = %rule.source, destination = %destination, "applying output rule");
        destination.assign(&mut output, value)?;
    }
    Ok(output)
}

/// `{{path}}` の中身を書き込み先パスとして読む（評価はしない）
fn write_target(destination: &str) -> Result<JsonPath, AdapterError> {
    match Template::parse(destination) {
        Some(Template::Value(path)) => JsonPath::parse(path),
        _ => Err(AdapterError::invalid_path(
            destination,
            "output destination must be a {{path}} template",
        )),
    }
}

fn set_payload(message: &mut Value, payload: Value) -> Result<(), AdapterError> {
    message
        .as_object_mut()
        .ok_or_else(|| AdapterError::InvalidMessage("message must be a JSON object".into()))?
        .insert(PAYLOAD.to_string(), payload);
    Ok(())
}
