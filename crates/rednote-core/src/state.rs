//! Access to the site's client-side state (`window.__INITIAL_STATE__`).
//!
//! The page serializes one subtree of the state to JSON; everything after
//! that is plain [`serde_json::Value`] traversal through [`StateAccessor`].

use rednote_protocols::Page;
use serde_json::Value;

use crate::error::HarvestError;
use crate::page_ext::js_string;

/// Script serializing `window.__INITIAL_STATE__[root]`.
///
/// Vue refs are unwrapped, reactivity internals and cyclic references are
/// dropped. Evaluates to `''` when the subtree is missing.
pub fn snapshot_script(root: &str) -> String {
    format!(
        r#"(() => {{
  const state = window.__INITIAL_STATE__ || {{}};
  const unref = (v) => (v && typeof v === 'object' && v.__v_isRef) ? v.value : v;
  const subtree = unref(state[{root}]);
  if (subtree === undefined || subtree === null) return '';
  const ancestors = [];
  const replacer = function (key, value) {{
    if (key === 'dep' || key.startsWith('__v_')) return undefined;
    value = unref(value);
    if (typeof value !== 'object' || value === null) return value;
    while (ancestors.length > 0 && ancestors[ancestors.length - 1] !== this) ancestors.pop();
    if (ancestors.includes(value)) return undefined;
    ancestors.push(value);
    return value;
  }};
  try {{ return JSON.stringify(subtree, replacer) || ''; }} catch (e) {{ return ''; }}
}})()"#,
        root = js_string(root)
    )
}

/// Snapshot `window.__INITIAL_STATE__[root]` from `page`.
///
/// `Ok(None)` when the subtree is absent.
pub async fn capture(page: &dyn Page, root: &str) -> Result<Option<StateAccessor>, HarvestError> {
    let raw = match page.evaluate(&snapshot_script(root)).await? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    };
    StateAccessor::from_snapshot(&raw)
        .map_err(|e| HarvestError::MalformedRecords(format!("state snapshot of '{root}': {e}")))
}

/// Unwrap a reactive `{value}` / `{_value}` wrapper, if `v` is one.
pub fn unwrap_reactive(v: &Value) -> &Value {
    match v {
        Value::Object(map) => map.get("value").or_else(|| map.get("_value")).unwrap_or(v),
        _ => v,
    }
}

/// Flatten an array of arrays by one level.
///
/// Paged lists arrive as `[[page1...], [page2...]]`; flat lists pass through.
pub fn flatten_one(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) if items.first().is_some_and(Value::is_array) => items
            .iter()
            .flat_map(|item| match item {
                Value::Array(inner) => inner.clone(),
                other => vec![other.clone()],
            })
            .collect(),
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}

/// Case-insensitive key-name pattern used to find a record list under a
/// non-canonical key. A key matches when it contains any of the needles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    needles: Vec<String>,
}

impl KeyPattern {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: needles.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
        }
    }

    /// Key names the site has used for saved/favorited lists.
    pub fn saved() -> Self {
        Self::new(["collect", "collec", "favor", "favo", "saved", "bookmark"])
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.needles.iter().any(|n| key.contains(n.as_str()))
    }
}

/// Read-only view over one state subtree.
#[derive(Debug, Clone)]
pub struct StateAccessor {
    root: Value,
}

impl StateAccessor {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse the string a [`snapshot_script`] evaluated to.
    ///
    /// A blank payload means the subtree was absent.
    pub fn from_snapshot(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(raw).map(|v| Some(Self::new(v)))
    }

    pub fn root(&self) -> &Value {
        unwrap_reactive(&self.root)
    }

    /// Follow `path` from the root, unwrapping reactive wrappers at every
    /// step. Numeric segments index arrays.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.root();
        for segment in path {
            let next = match current {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
            current = unwrap_reactive(next);
        }
        Some(current)
    }

    /// Top-level keys of the root matching `pattern`, in document order,
    /// skipping `exclude`.
    pub fn find_keys<'a>(
        &'a self,
        pattern: &'a KeyPattern,
        exclude: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.root()
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter())
            .filter(move |(k, _)| k.as_str() != exclude && pattern.matches(k))
            .map(|(k, v)| (k.as_str(), unwrap_reactive(v)))
    }
}

/// Read a nested string from the live state, defaulting to `''`.
pub(crate) fn string_probe(root: &str, path: &[&str]) -> String {
    let mut expr = format!("(window.__INITIAL_STATE__ || {{}})[{}]", js_string(root));
    for segment in path {
        expr = format!("unref(unref({expr})?.[{}])", js_string(segment));
    }
    format!(
        "(() => {{ const unref = (v) => (v && typeof v === 'object') ? (('value' in v) ? v.value : (('_value' in v) ? v._value : v)) : v; const out = {expr}; return out === undefined || out === null ? '' : String(out); }})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_unwraps_wrappers() {
        let state = StateAccessor::new(json!({
            "notes": {"_value": [[{"id": "a"}], [{"id": "b"}]]},
            "userPageData": {"value": {"basicInfo": {"nickname": "n"}}}
        }));
        assert_eq!(
            state.get_path(&["userPageData", "basicInfo", "nickname"]),
            Some(&json!("n"))
        );
        let notes = state.get_path(&["notes"]).unwrap();
        assert_eq!(flatten_one(notes).len(), 2);
        assert!(state.get_path(&["missing"]).is_none());
        assert_eq!(state.get_path(&["notes", "0", "0", "id"]), Some(&json!("a")));
    }

    #[test]
    fn test_flatten_one_level_only() {
        assert_eq!(flatten_one(&json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(flatten_one(&json!([[1], [2, [3]]])), vec![json!(1), json!(2), json!([3])]);
        assert!(flatten_one(&json!({"a": 1})).is_empty());
        assert!(flatten_one(&json!([])).is_empty());
    }

    #[test]
    fn test_saved_key_pattern() {
        let pattern = KeyPattern::saved();
        for key in ["collectedNotes", "Favorites", "savedList", "BOOKMARKS", "favoNotes"] {
            assert!(pattern.matches(key), "{key}");
        }
        for key in ["notes", "userInfo", "activeTab"] {
            assert!(!pattern.matches(key), "{key}");
        }
    }

    #[test]
    fn test_find_keys_in_order_with_exclusion() {
        let state = StateAccessor::new(json!({
            "notes": [],
            "collectNotes": {"value": [1]},
            "favorites": [2]
        }));
        let pattern = KeyPattern::saved();
        let keys: Vec<_> = state.find_keys(&pattern, "collectNotes").map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["favorites"]);
        let first = state.find_keys(&pattern, "notes").next().unwrap();
        assert_eq!(first, ("collectNotes", &json!([1])));
    }

    #[test]
    fn test_from_snapshot_blank_is_absent() {
        assert!(StateAccessor::from_snapshot("  ").unwrap().is_none());
        assert!(StateAccessor::from_snapshot("{bad").is_err());
        assert!(StateAccessor::from_snapshot("{}").unwrap().is_some());
    }

    #[test]
    fn test_snapshot_script_quotes_root() {
        let script = snapshot_script("user");
        assert!(script.contains("state[\"user\"]"));
        assert!(string_probe("user", &["activeTab"]).contains("\"activeTab\""));
    }
}
