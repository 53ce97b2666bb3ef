//! cma-core
//!
//! Core building blocks for the Cumulus message adapter.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（message, message_config, envelope, history, ids, errors）
//! - **template**: JSONPath テンプレート言語（path, resolver）
//! - **ports**: 抽象化レイヤー（ObjectStore, ExecutionHistory, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryObjectStore, StaticExecutionHistory, AWS 実装）
//! - **app**: アプリケーションロジック（config 探索, envelope, 出力組み込み, オフロード）
//! - **settings**: 環境変数から読む運用設定

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod settings;
pub mod template;

pub use app::{AdapterBuilder, MessageAdapter};
pub use domain::{AdapterError, ErrorKind, TaskEnvelope};
pub use settings::AdapterSettings;
