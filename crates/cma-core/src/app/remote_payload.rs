//! RemotePayloadManager - 大きなメッセージを object storage に逃がす / 戻す
//!
//! # dereference
//! `replace` があれば、その Blob を取得してパースしたものを有効なメッセージとする。
//!
//! # offload_if_large
//! 直列化したサイズが閾値未満ならそのまま。閾値以上なら全体を保存し、
//! `cumulus_meta` と `replace` だけの最小メッセージを返す。

use std::sync::Arc;

use serde_json::{Value, json};

use crate::domain::message::{CUMULUS_META, INGEST_META, REPLACE, cumulus_meta};
use crate::domain::{AdapterError, RemotePointer};
use crate::ports::{Clock, IdGenerator, ObjectStore};
use crate::settings::AdapterSettings;

pub struct RemotePayloadManager {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    threshold_bytes: usize,
    ttl: chrono::Duration,
}

impl RemotePayloadManager {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        settings: &AdapterSettings,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            threshold_bytes: settings.offload_threshold_bytes,
            ttl: settings.remote_ttl,
        }
    }

    pub async fn dereference(&self, message: Value) -> Result<Value, AdapterError> {
        let Some(location) = RemotePointer::of(&message)? else {
            return Ok(message);
        };

        tracing::debug!(location = %location, "loading remote message");
        let body = self.store.get(&location).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn offload_if_large(&self, message: Value) -> Result<Value, AdapterError> {
        let body = serde_json::to_vec(&message)?;
        if body.len() < self.threshold_bytes {
            return Ok(message);
        }

        let meta = cumulus_meta(&message)?.clone();
        let bucket = message
            .get(INGEST_META)
            .and_then(|m| m.get("message_bucket"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AdapterError::InvalidMessage(
                    "ingest_meta.message_bucket is required to store a large message".into(),
                )
            })?;

        let location = RemotePointer::new(bucket, self.ids.generate_payload_id().object_key());
        let expires_at = self.clock.now() + self.ttl;

        tracing::info!(
            location = %location,
            bytes = body.len(),
            expires_at = %expires_at,
            "message exceeds inline limit; storing remotely"
        );
        self.store.put(&location, body, expires_at).await?;

        Ok(json!({
            CUMULUS_META: meta,
            REPLACE: location,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryObjectStore;
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn manager(store: Arc<InMemoryObjectStore>) -> RemotePayloadManager {
        let clock = fixed_clock();
        RemotePayloadManager::new(
            store,
            clock.clone(),
            Arc::new(UlidGenerator::new(clock)),
            &AdapterSettings::default(),
        )
    }

    /// 直列化すると丁度 `size` バイトになるメッセージ
    fn message_of_size(size: usize) -> Value {
        let mut msg = json!({
            "cumulus_meta": { "execution_name": "run-1" },
            "ingest_meta": { "message_bucket": "msgs" },
            "payload": ""
        });
        let base = serde_json::to_vec(&msg).unwrap().len();
        msg["payload"] = Value::String("x".repeat(size - base));
        assert_eq!(serde_json::to_vec(&msg).unwrap().len(), size);
        msg
    }

    #[tokio::test]
    async fn message_without_replace_is_unchanged() {
        let m = manager(Arc::new(InMemoryObjectStore::new()));
        let msg = json!({ "cumulus_meta": {}, "payload": [1] });
        assert_eq!(m.dereference(msg.clone()).await.unwrap(), msg);
    }

    #[tokio::test]
    async fn replace_loads_stored_message() {
        let store = Arc::new(InMemoryObjectStore::new());
        let stored = json!({ "cumulus_meta": { "task": "t" }, "payload": { "big": true } });
        let location = RemotePointer::new("msgs", "events/abc");
        store
            .insert(location.clone(), serde_json::to_vec(&stored).unwrap())
            .await;
        let m = manager(store);

        let msg = json!({ "cumulus_meta": {}, "replace": location });
        let loaded = m.dereference(msg).await.unwrap();

        assert_eq!(loaded, stored);
        // replace のないメッセージになったら、もう一度やっても同じ
        assert_eq!(m.dereference(loaded.clone()).await.unwrap(), loaded);
    }

    #[tokio::test]
    async fn missing_remote_object_propagates_store_error() {
        let m = manager(Arc::new(InMemoryObjectStore::new()));
        let msg = json!({ "replace": { "Bucket": "msgs", "Key": "events/none" } });
        assert!(matches!(
            m.dereference(msg).await,
            Err(AdapterError::Store(_))
        ));
    }

    #[tokio::test]
    async fn message_at_threshold_minus_one_stays_inline() {
        let store = Arc::new(InMemoryObjectStore::new());
        let m = manager(store.clone());
        let msg = message_of_size(9_999);

        assert_eq!(m.offload_if_large(msg.clone()).await.unwrap(), msg);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn message_at_threshold_is_offloaded() {
        let store = Arc::new(InMemoryObjectStore::new());
        let m = manager(store.clone());
        let msg = message_of_size(10_000);

        let out = m.offload_if_large(msg.clone()).await.unwrap();

        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["cumulus_meta", "replace"]);
        assert_eq!(out["cumulus_meta"], msg["cumulus_meta"]);

        let location = RemotePointer::of(&out).unwrap().unwrap();
        assert_eq!(location.bucket, "msgs");
        assert!(location.key.starts_with("events/"));

        let stored = store.object(&location).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&stored.body).unwrap(), msg);
        assert_eq!(
            stored.expires_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn large_message_without_bucket_fails() {
        let m = manager(Arc::new(InMemoryObjectStore::new()));
        let msg = json!({ "cumulus_meta": {}, "payload": "x".repeat(10_000) });
        assert!(matches!(
            m.offload_if_large(msg).await,
            Err(AdapterError::InvalidMessage(_))
        ));
    }
}
