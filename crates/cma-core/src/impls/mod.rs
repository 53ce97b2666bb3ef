//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryObjectStore**: 開発・テスト用の Blob ストレージ
//! - **StaticExecutionHistory**: テスト用の実行履歴
//! - **S3ObjectStore / SfnExecutionHistory**: 本番用（feature `aws`）

pub mod memory_store;
pub mod static_history;

#[cfg(feature = "aws")]
pub mod aws;

pub use self::memory_store::InMemoryObjectStore;
pub use self::static_history::StaticExecutionHistory;

#[cfg(feature = "aws")]
pub use self::aws::{S3ObjectStore, SfnExecutionHistory};
