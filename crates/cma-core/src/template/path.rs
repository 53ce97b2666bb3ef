//! JsonPath - テンプレートで使うパス式
//!
//! 読み取り（query）と書き込み（assign）の両方に使います。
//!
//! # サポートする構文
//! - `$` ルート（省略可: `payload.granules` は `$.payload.granules` と同じ）
//! - `.name` / `['name']` / `["name"]` 子要素
//! - `[n]` 添字（負数は末尾から）
//! - `.*` / `[*]` ワイルドカード
//! - `[start:end]` スライス
//! - `..name` / `..*` 再帰下降
//!
//! # 書き込み
//! - フィールドと添字だけのパス（definite path）に限る
//! - 途中の mapping がなければ作る。配列は伸ばさない

use serde_json::{Map, Value};

use crate::domain::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(i64),
    Wildcard,
    Slice { start: Option<i64>, end: Option<i64> },
    Descendant(Box<Segment>),
}

impl Segment {
    fn is_definite(&self) -> bool {
        matches!(self, Segment::Field(_) | Segment::Index(_))
    }
}

/// パース済みのパス式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    expr: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expr: &str) -> Result<Self, AdapterError> {
        let segments = Parser::new(expr).parse()?;
        Ok(Self {
            expr: expr.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// フィールドと添字だけで構成されているか（書き込み先として使えるか）
    pub fn is_definite(&self) -> bool {
        self.segments.iter().all(Segment::is_definite)
    }

    /// 一致したノードを文書順で返す
    pub fn query<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                select(segment, node, &mut next);
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// `root` のパス位置に `value` を書き込む
    pub fn assign(&self, root: &mut Value, value: Value) -> Result<(), AdapterError> {
        if !self.is_definite() {
            return Err(AdapterError::invalid_path(
                &self.expr,
                "write target must use only fields and indices",
            ));
        }

        let Some((last, parents)) = self.segments.split_last() else {
            *root = value;
            return Ok(());
        };

        let mut node = root;
        for segment in parents {
            node = match segment {
                Segment::Field(name) => object_mut(node, &self.expr)?
                    .entry(name.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                Segment::Index(i) => element_mut(node, *i, &self.expr)?,
                _ => return Err(AdapterError::invalid_path(&self.expr, "indefinite segment")),
            };
        }

        match last {
            Segment::Field(name) => {
                object_mut(node, &self.expr)?.insert(name.clone(), value);
            }
            Segment::Index(i) => {
                *element_mut(node, *i, &self.expr)? = value;
            }
            _ => return Err(AdapterError::invalid_path(&self.expr, "indefinite segment")),
        }
        Ok(())
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expr)
    }
}

fn select<'a>(segment: &Segment, node: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Field(name) => {
            if let Some(v) = node.as_object().and_then(|m| m.get(name)) {
                out.push(v);
            }
        }
        Segment::Index(i) => {
            if let Some(arr) = node.as_array()
                && let Some(pos) = normalize_index(*i, arr.len())
            {
                out.push(&arr[pos]);
            }
        }
        Segment::Wildcard => match node {
            Value::Object(m) => out.extend(m.values()),
            Value::Array(a) => out.extend(a.iter()),
            _ => {}
        },
        Segment::Slice { start, end } => {
            if let Some(arr) = node.as_array() {
                let len = arr.len() as i64;
                let lo = clamp_bound(start.unwrap_or(0), len);
                let hi = clamp_bound(end.unwrap_or(len), len);
                if lo < hi {
                    out.extend(arr[lo as usize..hi as usize].iter());
                }
            }
        }
        Segment::Descendant(inner) => {
            // 自分自身と全子孫に inner を適用（pre-order）
            select(inner, node, out);
            match node {
                Value::Object(m) => {
                    for child in m.values() {
                        select(segment, child, out);
                    }
                }
                Value::Array(a) => {
                    for child in a {
                        select(segment, child, out);
                    }
                }
                _ => {}
            }
        }
    }
}

fn normalize_index(i: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let pos = if i < 0 { len + i } else { i };
    (0..len).contains(&pos).then_some(pos as usize)
}

fn clamp_bound(bound: i64, len: i64) -> i64 {
    if bound < 0 {
        (len + bound).max(0)
    } else {
        bound.min(len)
    }
}

fn object_mut<'a>(node: &'a mut Value, expr: &str) -> Result<&'a mut Map<String, Value>, AdapterError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut()
        .ok_or_else(|| AdapterError::invalid_path(expr, "cannot write a field into a non-mapping value"))
}

fn element_mut<'a>(node: &'a mut Value, i: i64, expr: &str) -> Result<&'a mut Value, AdapterError> {
    let arr = node
        .as_array_mut()
        .ok_or_else(|| AdapterError::invalid_path(expr, "cannot index into a non-sequence value"))?;
    let pos = normalize_index(i, arr.len())
        .ok_or_else(|| AdapterError::invalid_path(expr, format!("index {i} is out of range")))?;
    Ok(&mut arr[pos])
}

// ========================================
// Parser
// ========================================

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            chars: expr.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> AdapterError {
        AdapterError::invalid_path(self.expr, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, AdapterError> {
        if self.chars.is_empty() {
            return Err(self.error("empty path"));
        }

        let mut segments = Vec::new();
        if !self.eat('$') {
            // ルート省略形: 先頭は裸のフィールド名
            if self.peek() != Some('[') {
                segments.push(Segment::Field(self.identifier()?));
            }
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    if self.eat('.') {
                        let inner = self.after_descent()?;
                        segments.push(Segment::Descendant(Box::new(inner)));
                    } else if self.eat('*') {
                        segments.push(Segment::Wildcard);
                    } else {
                        segments.push(Segment::Field(self.identifier()?));
                    }
                }
                '[' => segments.push(self.bracket()?),
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            }
        }
        Ok(segments)
    }

    fn after_descent(&mut self) -> Result<Segment, AdapterError> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(Segment::Wildcard)
            }
            Some('[') => self.bracket(),
            _ => Ok(Segment::Field(self.identifier()?)),
        }
    }

    fn identifier(&mut self) -> Result<String, AdapterError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' || c == ']' || c.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a field name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn bracket(&mut self) -> Result<Segment, AdapterError> {
        self.pos += 1; // '['
        self.skip_ws();
        let segment = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                Segment::Field(self.quoted(q)?)
            }
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ']') {
                    self.pos += 1;
                }
                let body: String = self.chars[start..self.pos].iter().collect();
                self.index_or_slice(body.trim())?
            }
        };
        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("unterminated '['"));
        }
        Ok(segment)
    }

    fn quoted(&mut self, quote: char) -> Result<String, AdapterError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated quoted field")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => out.push(c),
                        None => return Err(self.error("dangling escape")),
                    }
                    self.pos += 1;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn index_or_slice(&self, body: &str) -> Result<Segment, AdapterError> {
        if let Some((lo, hi)) = body.split_once(':') {
            return Ok(Segment::Slice {
                start: self.bound(lo)?,
                end: self.bound(hi)?,
            });
        }
        body.parse::<i64>()
            .map(Segment::Index)
            .map_err(|_| self.error(format!("invalid index '{body}'")))
    }

    fn bound(&self, s: &str) -> Result<Option<i64>, AdapterError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<i64>()
            .map(Some)
            .map_err(|_| self.error(format!("invalid slice bound '{s}'")))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "payload": {
                "granules": [
                    { "id": "g1", "files": [{ "name": "a" }, { "name": "b" }] },
                    { "id": "g2", "files": [{ "name": "c" }] }
                ],
                "with.dot": 1
            },
            "meta": { "name": "top" }
        })
    }

    #[rstest]
    #[case("$.payload.granules[0].id", vec![json!("g1")])]
    #[case("payload.granules[1].id", vec![json!("g2")])]
    #[case("$.payload.granules[-1].id", vec![json!("g2")])]
    #[case("$.payload.granules[*].id", vec![json!("g1"), json!("g2")])]
    #[case("$.payload.granules[0:1].id", vec![json!("g1")])]
    #[case("$['payload']['with.dot']", vec![json!(1)])]
    #[case("$..name", vec![json!("a"), json!("b"), json!("c"), json!("top")])]
    #[case("$.payload.granules[*].files[*].name", vec![json!("a"), json!("b"), json!("c")])]
    #[case("$.meta.*", vec![json!("top")])]
    #[case("$.missing.field", vec![])]
    #[case("$.payload.granules[5]", vec![])]
    fn query_returns_matches_in_document_order(#[case] expr: &str, #[case] expected: Vec<Value>) {
        let d = doc();
        let path = JsonPath::parse(expr).unwrap();
        let got: Vec<Value> = path.query(&d).into_iter().cloned().collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn root_query_returns_whole_document() {
        let d = doc();
        let path = JsonPath::parse("$").unwrap();
        assert_eq!(path.query(&d), vec![&d]);
    }

    #[rstest]
    #[case("")]
    #[case("$.")]
    #[case("$[")]
    #[case("$[abc]")]
    #[case("$['open")]
    #[case("$.a b")]
    fn malformed_paths_are_rejected(#[case] expr: &str) {
        assert!(matches!(
            JsonPath::parse(expr),
            Err(AdapterError::InvalidPath { .. })
        ));
    }

    #[test]
    fn assign_creates_missing_mappings() {
        let mut d = json!({ "payload": {} });
        JsonPath::parse("$.payload.result.count")
            .unwrap()
            .assign(&mut d, json!(3))
            .unwrap();
        assert_eq!(d, json!({ "payload": { "result": { "count": 3 } } }));
    }

    #[test]
    fn assign_replaces_existing_element() {
        let mut d = json!({ "list": [1, 2, 3] });
        JsonPath::parse("$.list[-1]").unwrap().assign(&mut d, json!("x")).unwrap();
        assert_eq!(d, json!({ "list": [1, 2, "x"] }));
    }

    #[test]
    fn assign_does_not_grow_arrays() {
        let mut d = json!({ "list": [] });
        let err = JsonPath::parse("$.list[0]")
            .unwrap()
            .assign(&mut d, json!(1))
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn assign_rejects_wildcards() {
        let mut d = json!({ "a": [1] });
        let path = JsonPath::parse("$.a[*]").unwrap();
        assert!(!path.is_definite());
        assert!(path.assign(&mut d, json!(0)).is_err());
    }

    #[test]
    fn assign_to_root_replaces_document() {
        let mut d = json!({ "a": 1 });
        JsonPath::parse("$").unwrap().assign(&mut d, json!([1])).unwrap();
        assert_eq!(d, json!([1]));
    }
}
