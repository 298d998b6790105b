//! Key normalization from the wire's mixed-case keys to underscore keys.
//!
//! `lastModified` becomes `last_modified`; keys already in underscore form
//! pass through untouched, so normalizing twice is the same as once.

use serde_json::{Map, Value};

/// Rename every mapping key in `value`, at every depth, to underscore form.
/// Scalars are returned unchanged.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (to_snake_case(&key), normalize(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        scalar => scalar,
    }
}

/// Insert `_` where an uppercase run follows a lowercase letter or digit, then
/// lowercase the whole key.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_mixed_case_keys() {
        assert_eq!(to_snake_case("lastModified"), "last_modified");
        assert_eq!(to_snake_case("stackId"), "stack_id");
        assert_eq!(to_snake_case("permissionManage"), "permission_manage");
        assert_eq!(to_snake_case("assignedUsers"), "assigned_users");
    }

    #[test]
    fn capital_runs_get_a_single_separator() {
        assert_eq!(to_snake_case("ETag"), "etag");
        assert_eq!(to_snake_case("cardID"), "card_id");
        assert_eq!(to_snake_case("PERMISSION_READ"), "permission_read");
    }

    #[test]
    fn plain_keys_pass_through() {
        assert_eq!(to_snake_case("title"), "title");
        assert_eq!(to_snake_case("deleted_at"), "deleted_at");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn normalizes_nested_mappings_and_sequences() {
        let raw = json!({
            "stackId": 3,
            "labels": [{"boardId": 1, "cardId": null}],
            "assignedUsers": [[{"primaryKey": "admin"}]],
            "meta": {"lastModified": 10}
        });
        let expected = json!({
            "stack_id": 3,
            "labels": [{"board_id": 1, "card_id": null}],
            "assigned_users": [[{"primary_key": "admin"}]],
            "meta": {"last_modified": 10}
        });
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn scalar_values_are_never_altered() {
        let raw = json!({"title": "camelCaseTitle", "tags": ["someTag", 1, true, null]});
        let normalized = normalize(raw);
        assert_eq!(normalized["title"], "camelCaseTitle");
        assert_eq!(normalized["tags"], json!(["someTag", 1, true, null]));
        assert_eq!(normalize(json!("lastModified")), json!("lastModified"));
        assert_eq!(normalize(json!(42)), json!(42));
    }

    #[test]
    fn normalizing_is_idempotent() {
        let raw = json!({
            "deletedAt": 0,
            "cards": [{"createdAt": 1, "labels": [{"boardId": 2}]}],
            "permissions": {"PERMISSION_EDIT": true}
        });
        let once = normalize(raw);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }
}
