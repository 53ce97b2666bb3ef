//! ExecutionHistoryMatcher - 実行履歴から現在のタスク名を探す
//!
//! # アルゴリズム
//! 1. execution history を 1 回だけ取得（新しい順、最大 window 件）
//! 2. id → event の表を作る（呼び出し側のリストは変更しない）
//! 3. 先頭から 1 回だけ走査する
//!    - ARN あり: resource が ARN に一致する scheduled イベントを探し、
//!      `previousEventId` の TaskStateEntered の名前を返す
//!    - ARN なし: 最初に出てきた TaskStateEntered の名前を返す
//!
//! # 注意
//! ARN なしの探索は並列ブランチがないことが前提です。
//! 並列ブランチがある workflow では必ず ARN を渡してください。

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{AdapterError, ExecutionIdentity, HistoryEvent};
use crate::ports::ExecutionHistory;

pub struct ExecutionHistoryMatcher {
    history: Arc<dyn ExecutionHistory>,
    window: u32,
}

impl ExecutionHistoryMatcher {
    pub fn new(history: Arc<dyn ExecutionHistory>, window: u32) -> Self {
        Self { history, window }
    }

    /// 現在実行中のタスク名を返す
    ///
    /// - `Ok(Some(name))`: タスクを特定できた
    /// - `Ok(None)`: ARN は見つかったが、参照先が名前付きの TaskStateEntered ではない
    /// - `Err(TaskNotFound)`: window 内に一致するイベントがない
    pub async fn find_current_task(
        &self,
        identity: &ExecutionIdentity,
    ) -> Result<Option<String>, AdapterError> {
        let execution_arn = identity.execution_arn();
        let events = self
            .history
            .recent_events(&execution_arn, self.window)
            .await?;
        tracing::debug!(
            execution_arn = %execution_arn,
            events = events.len(),
            "fetched execution history"
        );
        match_task(&events, identity.invocation_arn.as_deref())
    }
}

/// 新しい順のイベント列から現在のタスク名を探す（並べ替えはしない）
pub fn match_task(
    events: &[HistoryEvent],
    invocation_arn: Option<&str>,
) -> Result<Option<String>, AdapterError> {
    let by_id: HashMap<i64, &HistoryEvent> = events.iter().map(|e| (e.id, e)).collect();

    for event in events {
        match invocation_arn {
            Some(arn) => {
                if event.scheduled_resource() != Some(arn) {
                    continue;
                }
                let entered = event
                    .previous_event_id
                    .and_then(|id| by_id.get(&id))
                    .and_then(|prev| prev.entered_task_name());
                if entered.is_none() {
                    tracing::warn!(
                        event_id = event.id,
                        previous_event_id = ?event.previous_event_id,
                        "scheduled event does not follow a task state entry"
                    );
                }
                return Ok(entered.map(str::to_string));
            }
            None => {
                if let Some(name) = event.entered_task_name() {
                    return Ok(Some(name.to_string()));
                }
            }
        }
    }

    Err(AdapterError::TaskNotFound(
        invocation_arn.unwrap_or("the most recent task").to_string(),
    ))
}
