//! Domain identifiers.
//!
//! # ULID ベースの ID
//! オフロードしたメッセージのキーには ULID を使います。
//! - **時刻でソート可能**: バケット内で生成順に並ぶ
//! - **分散生成可能**: 調整なしで複数の呼び出しから生成できる

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Key prefix for offloaded messages inside the message bucket.
pub const REMOTE_EVENT_PREFIX: &str = "events";

/// Identifier of one offloaded message body.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayloadId(Ulid);

impl PayloadId {
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Object key under which the message body is stored: `events/<ulid>`.
    pub fn object_key(&self) -> String {
        format!("{REMOTE_EVENT_PREFIX}/{}", self.0)
    }
}

impl From<Ulid> for PayloadId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_is_prefixed() {
        let ulid = Ulid::new();
        let id = PayloadId::from(ulid);
        assert_eq!(id.object_key(), format!("events/{ulid}"));
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn payload_id_is_ulid_sized() {
        use std::mem::size_of;
        assert_eq!(size_of::<PayloadId>(), size_of::<Ulid>());
    }
}
