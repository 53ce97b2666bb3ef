//! Execution history events, in the shape Step Functions reports them.
//!
//! Only the fields the task matcher reads are modelled; everything else in an
//! event is dropped on deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEventType {
    TaskStateEntered,
    LambdaFunctionScheduled,
    ActivityScheduled,
    #[serde(other)]
    Other,
}

impl HistoryEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "TaskStateEntered" => HistoryEventType::TaskStateEntered,
            "LambdaFunctionScheduled" => HistoryEventType::LambdaFunctionScheduled,
            "ActivityScheduled" => HistoryEventType::ActivityScheduled,
            _ => HistoryEventType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEventDetails {
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEnteredEventDetails {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub id: i64,

    #[serde(rename = "type")]
    pub event_type: HistoryEventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_event_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_function_scheduled_event_details: Option<ScheduledEventDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_scheduled_event_details: Option<ScheduledEventDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_entered_event_details: Option<StateEnteredEventDetails>,
}

/// テスト用のイベント生成
#[cfg(test)]
impl HistoryEvent {
    pub fn task_state_entered(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            event_type: HistoryEventType::TaskStateEntered,
            previous_event_id: Some(id - 1),
            lambda_function_scheduled_event_details: None,
            activity_scheduled_event_details: None,
            state_entered_event_details: Some(StateEnteredEventDetails { name: name.into() }),
        }
    }

    pub fn activity_scheduled(id: i64, previous_event_id: i64, resource: impl Into<String>) -> Self {
        Self {
            id,
            event_type: HistoryEventType::ActivityScheduled,
            previous_event_id: Some(previous_event_id),
            lambda_function_scheduled_event_details: None,
            activity_scheduled_event_details: Some(ScheduledEventDetails {
                resource: resource.into(),
            }),
            state_entered_event_details: None,
        }
    }

    pub fn lambda_scheduled(id: i64, previous_event_id: i64, resource: impl Into<String>) -> Self {
        Self {
            id,
            event_type: HistoryEventType::LambdaFunctionScheduled,
            previous_event_id: Some(previous_event_id),
            lambda_function_scheduled_event_details: Some(ScheduledEventDetails {
                resource: resource.into(),
            }),
            activity_scheduled_event_details: None,
            state_entered_event_details: None,
        }
    }
}

impl HistoryEvent {
    /// Resource ARN of a Lambda- or activity-scheduled event.
    pub fn scheduled_resource(&self) -> Option<&str> {
        let details = match self.event_type {
            HistoryEventType::LambdaFunctionScheduled => {
                self.lambda_function_scheduled_event_details.as_ref()
            }
            HistoryEventType::ActivityScheduled => self.activity_scheduled_event_details.as_ref(),
            _ => None,
        };
        details.map(|d| d.resource.as_str())
    }

    /// State name of a task-state-entered event.
    pub fn entered_task_name(&self) -> Option<&str> {
        match self.event_type {
            HistoryEventType::TaskStateEntered => self
                .state_entered_event_details
                .as_ref()
                .map(|d| d.name.as_str()),
            _ => None,
        }
    }
}
