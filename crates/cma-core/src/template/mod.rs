//! Template - JSONPath テンプレート言語
//!
//! - **path**: パス式のパース・読み取り・書き込み
//! - **resolver**: 3 種類のテンプレート構文の解決と config の再帰解決

pub mod path;
pub mod resolver;

pub use self::path::JsonPath;
pub use self::resolver::{Template, resolve, resolve_config_object};
