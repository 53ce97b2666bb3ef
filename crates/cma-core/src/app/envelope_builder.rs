//! MessageEnvelopeBuilder: turns a message and its task config into the
//! `{input, config, messageConfig}` envelope a task is called with.

use serde_json::{Map, Value};

use crate::domain::message::{MESSAGE_CONFIG, PAYLOAD};
use crate::domain::{AdapterError, MessageConfig, TaskEnvelope};
use crate::template::{resolve, resolve_config_object};

/// Build the task envelope.
///
/// - `messageConfig` is the config's `cumulus_message` section, verbatim
///   (`{}` when absent or `null`).
/// - `config` is the config without `cumulus_message`, with every text leaf
///   resolved against the whole message.
/// - `input` is `messageConfig.input` resolved against the message, or the raw
///   `payload` when no input template is configured.
pub fn build_envelope(message: &Value, config: &Value) -> Result<TaskEnvelope, AdapterError> {
    let mut task_config = config.clone();
    let raw_message_config = task_config
        .as_object_mut()
        .and_then(|m| m.shift_remove(MESSAGE_CONFIG))
        .filter(|mc| !mc.is_null())
        .unwrap_or_else(|| Value::Object(Map::new()));

    let message_config = MessageConfig::from_value(&raw_message_config)?;

    let input = match message_config.input.as_deref() {
        Some(template) => resolve(message, template)?,
        None => message.get(PAYLOAD).cloned().unwrap_or(Value::Null),
    };
    let task_config = resolve_config_object(message, task_config)?;

    Ok(TaskEnvelope::new(input, task_config, raw_message_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message() -> Value {
        json!({
            "cumulus_meta": { "message_source": "local", "task": "discover" },
            "meta": { "provider": { "host": "example.com" } },
            "payload": { "granules": [1, 2, 3] }
        })
    }

    #[test]
    fn input_template_selects_from_message() {
        let config = json!({ "cumulus_message": { "input": "{{$.payload.granules}}" } });
        let env = build_envelope(&message(), &config).unwrap();

        assert_eq!(env.input(), &json!([1, 2, 3]));
        assert_eq!(env.config(), &json!({}));
        assert_eq!(
            env.message_config(),
            &json!({ "input": "{{$.payload.granules}}" })
        );
    }

    #[test]
    fn without_input_template_payload_passes_through_unresolved() {
        let msg = json!({
            "cumulus_meta": {},
            "payload": { "path": "{{$.not.a.real.path}}" }
        });
        let env = build_envelope(&msg, &json!({})).unwrap();
        assert_eq!(env.input(), &msg["payload"]);
        assert_eq!(env.message_config(), &json!({}));
    }

    #[test]
    fn null_message_config_section_is_empty() {
        let config = json!({ "limit": 5, "cumulus_message": null });
        let env = build_envelope(&message(), &config).unwrap();

        assert_eq!(env.message_config(), &json!({}));
        assert_eq!(env.config(), &json!({ "limit": 5 }));
        assert_eq!(env.input(), &message()["payload"]);
    }

    #[test]
    fn config_resolves_against_whole_message() {
        let config = json!({
            "host": "{{$.meta.provider.host}}",
            "url": "https://{$.meta.provider.host}/data",
            "count": 3,
            "cumulus_message": {
                "outputs": [{ "source": "{{$}}", "destination": "{{$.payload}}" }]
            }
        });
        let env = build_envelope(&message(), &config).unwrap();

        assert_eq!(
            env.config(),
            &json!({ "host": "example.com", "url": "https://example.com/data", "count": 3 })
        );
        assert_eq!(env.message_config(), &config["cumulus_message"]);
    }

    #[test]
    fn unresolvable_config_fails_the_build() {
        let config = json!({ "host": "{{$.meta.missing}}" });
        assert!(matches!(
            build_envelope(&message(), &config),
            Err(AdapterError::UnresolvedPath(_))
        ));
    }
}
