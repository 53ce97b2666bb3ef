//! MessageConfig: the reserved `cumulus_message` section of a task config.
//!
//! It tells the adapter where the task's input comes from and how the task's
//! return value is folded back into the outgoing message. Unknown keys are
//! ignored here but survive in the raw `messageConfig` handed to the task.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::AdapterError;

/// One `{source, destination}` output rule.
///
/// `source` is a template resolved against the task result;
/// `destination` is a `{{path}}` write target in the outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMapping {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Applied in list order; later rules win on colliding paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OutputMapping>>,
}

impl MessageConfig {
    /// Typed view over a raw `cumulus_message` value. `null` means "no rules".
    pub fn from_value(raw: &Value) -> Result<Self, AdapterError> {
        if raw.is_null() {
            return Ok(Self::default());
        }
        Ok(MessageConfig::deserialize(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_input_and_ordered_outputs() {
        let raw = json!({
            "input": "{{$.payload}}",
            "outputs": [
                { "source": "{{$.a}}", "destination": "{{$.payload.a}}" },
                { "source": "{{$.b}}", "destination": "{{$.payload.b}}" }
            ]
        });
        let mc = MessageConfig::from_value(&raw).unwrap();
        assert_eq!(mc.input.as_deref(), Some("{{$.payload}}"));
        let outputs = mc.outputs.unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[1].destination, "{{$.payload.b}}");
    }

    #[test]
    fn null_and_empty_mean_no_rules() {
        assert_eq!(MessageConfig::from_value(&Value::Null).unwrap(), MessageConfig::default());
        assert_eq!(MessageConfig::from_value(&json!({})).unwrap(), MessageConfig::default());
    }

    #[test]
    fn malformed_outputs_are_rejected() {
        let raw = json!({ "outputs": [{ "source": "{{$.a}}" }] });
        assert!(matches!(
            MessageConfig::from_value(&raw),
            Err(AdapterError::Json(_))
        ));
    }
}
