//! StaticExecutionHistory - 固定のイベント列を返す ExecutionHistory（テスト用）

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::HistoryEvent;
use crate::ports::{ExecutionHistory, HistoryError};

/// 登録した execution ARN に対して、新しい順のイベント列を返す
///
/// 呼び出し回数と最後に要求された件数を記録するので、
/// 「1 回の呼び出しで upstream に 1 回だけ問い合わせる」ことを検証できます。
pub struct StaticExecutionHistory {
    execution_arn: String,
    events: Vec<HistoryEvent>,
    calls: AtomicUsize,
    last_max_results: AtomicUsize,
}

impl StaticExecutionHistory {
    /// `events` は新しい順で渡す
    pub fn new(execution_arn: impl Into<String>, events: Vec<HistoryEvent>) -> Self {
        Self {
            execution_arn: execution_arn.into(),
            events,
            calls: AtomicUsize::new(0),
            last_max_results: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_max_results(&self) -> usize {
        self.last_max_results.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExecutionHistory for StaticExecutionHistory {
    async fn recent_events(
        &self,
        execution_arn: &str,
        max_results: u32,
    ) -> Result<Vec<HistoryEvent>, HistoryError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.last_max_results
            .store(max_results as usize, Ordering::Relaxed);

        if execution_arn != self.execution_arn {
            return Err(HistoryError::ExecutionNotFound(execution_arn.to_string()));
        }
        Ok(self
            .events
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_is_bounded() {
        let events = (1..=5)
            .rev()
            .map(|id| HistoryEvent::task_state_entered(id, format!("s{id}")))
            .collect();
        let history = StaticExecutionHistory::new("arn:exec", events);

        let got = history.recent_events("arn:exec", 2).await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].id, 5);
        assert_eq!(history.calls(), 1);
        assert_eq!(history.last_max_results(), 2);
    }

    #[tokio::test]
    async fn unknown_execution_fails() {
        let history = StaticExecutionHistory::new("arn:exec", vec![]);
        let err = history.recent_events("arn:other", 40).await.unwrap_err();
        assert!(matches!(err, HistoryError::ExecutionNotFound(_)));
    }
}
