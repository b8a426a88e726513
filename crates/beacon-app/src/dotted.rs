// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Map, Value};

/// Display options handed to views when they are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub show_pii: bool,
}

/// Flattens nested objects into `a.b.c` keys in document order. Arrays stay
/// inline as JSON.
pub fn flatten_dotted(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => flatten_into(&mut out, "", map),
        other => out.push((String::new(), scalar_text(other))),
    }
    out
}

fn flatten_into(out: &mut Vec<(String, String)>, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, &path, inner),
            other => out.push((path, scalar_text(other))),
        }
    }
}

pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Drops personal data (`data.pii`, or a top-level `pii`) unless shown.
pub fn redact_pii(value: &Value, options: ViewOptions) -> Value {
    if options.show_pii {
        return value.clone();
    }
    let mut redacted = value.clone();
    if let Some(object) = redacted.as_object_mut() {
        object.remove("pii");
        if let Some(data) = object.get_mut("data").and_then(Value::as_object_mut) {
            data.remove("pii");
        }
    }
    redacted
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummary {
    pub time: Option<String>,
    pub text: String,
}

/// One-line rendering of a list row: the time field pulled out, then the
/// remaining dotted pairs minus filtered keys.
pub fn summarize_row(
    row: &Value,
    time_field: Option<&str>,
    filter_fields: &[String],
    options: ViewOptions,
) -> RowSummary {
    let pairs = flatten_dotted(&redact_pii(row, options));
    let time = time_field.and_then(|field| {
        pairs
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value.clone())
    });

    let text = pairs
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != time_field)
        .filter(|(key, _)| !is_filtered(key, filter_fields))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");

    RowSummary { time, text }
}

fn is_filtered(key: &str, filter_fields: &[String]) -> bool {
    filter_fields.iter().any(|filter| {
        key == filter
            || key
                .strip_prefix(filter.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::{ViewOptions, flatten_dotted, redact_pii, summarize_row};
    use serde_json::json;

    #[test]
    fn flatten_uses_dotted_keys_in_document_order() {
        let pairs = flatten_dotted(&json!({
            "id": "p-1",
            "metadata": {"time": {"insert": "2026-01-02", "visit": {"count": 3}}},
            "segments": ["vip", "new"],
            "empty": {},
            "active": true,
            "none": null
        }));
        assert_eq!(
            pairs,
            vec![
                ("id".to_owned(), "p-1".to_owned()),
                ("metadata.time.insert".to_owned(), "2026-01-02".to_owned()),
                ("metadata.time.visit.count".to_owned(), "3".to_owned()),
                ("segments".to_owned(), "[\"vip\",\"new\"]".to_owned()),
                ("empty".to_owned(), "{}".to_owned()),
                ("active".to_owned(), "true".to_owned()),
                ("none".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn pii_is_hidden_unless_enabled() {
        let profile = json!({"id": "p", "data": {"pii": {"email": "a@b.c"}, "x": 1}, "pii": {"n": 1}});

        let hidden = redact_pii(&profile, ViewOptions::default());
        assert_eq!(hidden, json!({"id": "p", "data": {"x": 1}}));

        let shown = redact_pii(&profile, ViewOptions { show_pii: true });
        assert_eq!(shown, profile);
    }

    #[test]
    fn row_summary_pulls_time_field_and_skips_filtered_keys() {
        let row = json!({
            "id": "e-1",
            "metadata": {"time": {"insert": "2026-03-01T10:00:00"}},
            "type": "page-view",
            "properties": {"url": "/home", "ref": ""},
            "context": {"browser": "x"}
        });
        let summary = summarize_row(
            &row,
            Some("metadata.time.insert"),
            &["context".to_owned(), "id".to_owned()],
            ViewOptions::default(),
        );
        assert_eq!(summary.time.as_deref(), Some("2026-03-01T10:00:00"));
        assert_eq!(summary.text, "type: page-view, properties.url: /home");
    }
}
