//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（S3, Step Functions）へのインターフェースを提供し、
//! 実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - アダプターは状態を持たない。外部 I/O はこの 2 つだけ
//!   - ObjectStore: 巨大メッセージの保存先
//!   - ExecutionHistory: 現在のタスク名を探すための実行履歴
//! - 時刻と ID 生成もテストで差し替えられるように trait にする

pub mod clock;
pub mod execution_history;
pub mod id_generator;
pub mod object_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::execution_history::{ExecutionHistory, HistoryError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::object_store::{ObjectStore, StoreError};
