//! AdapterBuilder - MessageAdapter の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 外部 I/O の差し替え（本番: AWS / テスト: in-memory）

use std::sync::Arc;

use super::adapter::MessageAdapter;
use super::config_locator::ConfigLocator;
use super::history_matcher::ExecutionHistoryMatcher;
use super::remote_payload::RemotePayloadManager;
use crate::ports::{Clock, ExecutionHistory, IdGenerator, ObjectStore, SystemClock, UlidGenerator};
use crate::settings::AdapterSettings;

/// AdapterBuilder は MessageAdapter を構築
///
/// # 使用例
/// ```ignore
/// let adapter = AdapterBuilder::new()
///     .object_store(Arc::new(S3ObjectStore::from_config(&sdk)))
///     .execution_history(Arc::new(SfnExecutionHistory::from_config(&sdk)))
///     .settings(AdapterSettings::from_env()?)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - object store と execution history は必須
/// - 不足があれば BuildError を返す
/// - clock / id generator は省略時に SystemClock / UlidGenerator
pub struct AdapterBuilder {
    store: Option<Arc<dyn ObjectStore>>,
    history: Option<Arc<dyn ExecutionHistory>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    settings: AdapterSettings,
}

/// BuildError は MessageAdapter 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be provided before build().")]
    MissingCollaborators(Vec<&'static str>),
}

impl AdapterBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            history: None,
            clock: None,
            ids: None,
            settings: AdapterSettings::default(),
        }
    }

    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn execution_history(mut self, history: Arc<dyn ExecutionHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn settings(mut self, settings: AdapterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// # 検証
    /// - object store と execution history が設定されているかチェック
    /// - 不足があれば BuildError::MissingCollaborators を返す
    pub fn build(self) -> Result<MessageAdapter, BuildError> {
        let (store, history) = match (self.store, self.history) {
            (Some(store), Some(history)) => (store, history),
            (store, history) => {
                let mut missing = Vec::new();
                if store.is_none() {
                    missing.push("object_store");
                }
                if history.is_none() {
                    missing.push("execution_history");
                }
                return Err(BuildError::MissingCollaborators(missing));
            }
        };

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(clock.clone())),
        };

        let matcher = ExecutionHistoryMatcher::new(history, self.settings.history_window);
        let remote = RemotePayloadManager::new(store, clock, ids, &self.settings);
        Ok(MessageAdapter::new(ConfigLocator::new(matcher), remote))
    }
}

impl Default for AdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
