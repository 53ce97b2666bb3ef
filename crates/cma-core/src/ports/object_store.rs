//! ObjectStore port - Blob ストレージ（S3 / in-memory）
//!
//! サイズの大きいメッセージ本体を保存・取得します。
//!
//! # 実装
//! - **InMemoryObjectStore**: テスト・ローカル実行用
//! - **S3ObjectStore**: 本番用（feature `aws`）

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::RemotePointer;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(RemotePointer),

    #[error("object store error: {0}")]
    Backend(String),
}

/// ObjectStore はメッセージ本体を Blob として保存
///
/// # 設計原則
/// - 1 回の呼び出しで 1 回だけ get / put する（リトライしない）
/// - put は全体を一度に保存（部分保存・ストリーミングはしない）
/// - 有効期限（expires_at）を付けて保存する
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, location: &RemotePointer) -> Result<Vec<u8>, StoreError>;

    async fn put(
        &self,
        location: &RemotePointer,
        body: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
