//! App - アプリケーションロジック
//!
//! # モジュール構成
//! - **config_locator** / **history_matcher**: タスク名と config の特定
//! - **envelope_builder**: タスクに渡す `{input, config, messageConfig}` の組み立て
//! - **output_assembler**: タスクの戻り値を次のメッセージに組み込む
//! - **remote_payload**: 大きなメッセージの保存と復元
//! - **adapter** / **builder**: 3 つの公開操作とそのワイヤリング

pub mod adapter;
pub mod builder;
pub mod config_locator;
pub mod envelope_builder;
pub mod history_matcher;
pub mod output_assembler;
pub mod remote_payload;

pub use self::adapter::MessageAdapter;
pub use self::builder::{AdapterBuilder, BuildError};
pub use self::config_locator::ConfigLocator;
pub use self::envelope_builder::build_envelope;
pub use self::history_matcher::{ExecutionHistoryMatcher, match_task};
pub use self::output_assembler::assemble;
pub use self::remote_payload::RemotePayloadManager;
