//! Dot-path access into nested JSON objects.
//!
//! Field names such as `client.nom` or `budget.montantTotal` address nested
//! members. [`get`] reads an initial value out of a row, [`set`] and
//! [`unflatten`] rebuild the nested body on submission.

use serde_json::{Map, Value};

pub fn get<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    segments.try_fold(root.get(first)?, |current, segment| {
        current.as_object()?.get(segment)
    })
}

/// Insert `value` at `path`, creating intermediate objects. A non-object value
/// sitting on an intermediate segment is replaced by an object.
pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                set(child, rest, value);
            }
        }
    }
}

pub fn unflatten<K, I>(entries: I) -> Map<String, Value>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Value)>,
{
    let mut root = Map::new();
    for (key, value) in entries {
        set(&mut root, key.as_ref(), value);
    }
    root
}

/// Leaf entries of `root` keyed by their dot path. Arrays count as leaves.
pub fn flatten(root: &Map<String, Value>) -> Vec<(String, Value)> {
    fn walk(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                Value::Object(child) if !child.is_empty() => walk(&path, child, out),
                other => out.push((path, other.clone())),
            }
        }
    }
    let mut out = Vec::new();
    walk("", root, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn get_walks_nested_objects() {
        let row = obj(json!({"client": {"nom": "Sow"}, "budget": {"montantTotal": 1000}}));
        assert_eq!(get(&row, "client.nom"), Some(&json!("Sow")));
        assert_eq!(get(&row, "budget.montantTotal"), Some(&json!(1000)));
        assert_eq!(get(&row, "client.email"), None);
        assert_eq!(get(&row, "client.nom.x"), None);
        assert_eq!(get(&row, "missing"), None);
    }

    #[test]
    fn unflatten_builds_nested_body() {
        let body = unflatten([
            ("nom", json!("Villa")),
            ("client.nom", json!("Sow")),
            ("client.prenom", json!("Aminata")),
            ("budget.montantTotal", json!(5000)),
        ]);
        assert_eq!(
            Value::Object(body),
            json!({
                "nom": "Villa",
                "client": {"nom": "Sow", "prenom": "Aminata"},
                "budget": {"montantTotal": 5000}
            })
        );
    }

    #[test]
    fn set_replaces_scalar_intermediates() {
        let mut root = obj(json!({"client": "legacy"}));
        set(&mut root, "client.nom", json!("Ba"));
        assert_eq!(Value::Object(root), json!({"client": {"nom": "Ba"}}));
    }

    #[test]
    fn flatten_is_inverse_of_unflatten_for_leaves() {
        let row = obj(json!({"a": 1, "b": {"c": "x", "d": {"e": true}}, "tags": ["t"], "empty": {}}));
        let mut flat = flatten(&row);
        flat.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            flat,
            vec![
                ("a".to_string(), json!(1)),
                ("b.c".to_string(), json!("x")),
                ("b.d.e".to_string(), json!(true)),
                ("empty".to_string(), json!({})),
                ("tags".to_string(), json!(["t"])),
            ]
        );
        assert_eq!(unflatten(flat), row);
    }
}
