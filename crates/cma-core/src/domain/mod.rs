//! Domain model (messages, message config, envelopes, history events, ids, errors).

pub mod envelope;
pub mod errors;
pub mod history;
pub mod ids;
pub mod message;
pub mod message_config;

pub use self::envelope::TaskEnvelope;
pub use self::errors::{AdapterError, ErrorKind};
pub use self::history::{HistoryEvent, HistoryEventType};
pub use self::ids::PayloadId;
pub use self::message::{ExecutionIdentity, MessageSource, RemotePointer};
pub use self::message_config::{MessageConfig, OutputMapping};
