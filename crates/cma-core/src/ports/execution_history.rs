//! ExecutionHistory port - オーケストレーターの実行履歴（読み取り専用）
//!
//! # 実装
//! - **StaticExecutionHistory**: テスト用（固定のイベント列を返す）
//! - **SfnExecutionHistory**: Step Functions の GetExecutionHistory（feature `aws`）

use async_trait::async_trait;

use crate::domain::HistoryEvent;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("execution history error: {0}")]
    Backend(String),
}

/// ExecutionHistory は 1 execution の直近イベントを返す
///
/// # 契約
/// - 新しい順（reverse chronological）で最大 `max_results` 件
/// - ページングはしない。呼び出し側は 1 回だけ呼ぶ
#[async_trait]
pub trait ExecutionHistory: Send + Sync {
    async fn recent_events(
        &self,
        execution_arn: &str,
        max_results: u32,
    ) -> Result<Vec<HistoryEvent>, HistoryError>;
}
