//! InMemoryObjectStore - 開発・テスト用の ObjectStore

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::RemotePointer;
use crate::ports::{ObjectStore, StoreError};

/// 保存済みオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<RemotePointer, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 期限なしでオブジェクトを置く（テストの前提データ用）
    pub async fn insert(&self, location: RemotePointer, body: Vec<u8>) {
        self.objects.lock().await.insert(
            location,
            StoredObject {
                body,
                expires_at: None,
            },
        );
    }

    pub async fn object(&self, location: &RemotePointer) -> Option<StoredObject> {
        self.objects.lock().await.get(location).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, location: &RemotePointer) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .await
            .get(location)
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::NotFound(location.clone()))
    }

    async fn put(
        &self,
        location: &RemotePointer,
        body: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.objects.lock().await.insert(
            location.clone(),
            StoredObject {
                body,
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }
}
