//! Pluggable click targets tried in priority order.

use rednote_protocols::Page;
use tracing::debug;

use crate::page_ext::{js_string, PageExt};

/// Clicks the first element whose trimmed text matches a phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    /// Selectors of the containers searched in order; empty means the
    /// whole document.
    pub roots: Vec<String>,
    /// Selector of candidate elements inside each root.
    pub candidates: String,
    pub phrases: Vec<String>,
    /// Also accept text that starts with a phrase.
    pub prefix: bool,
    pub case_insensitive: bool,
    /// Skip elements with an empty bounding box.
    pub visible_only: bool,
}

impl TextMatcher {
    pub fn new(candidates: impl Into<String>, phrases: &[&str]) -> Self {
        Self {
            roots: Vec::new(),
            candidates: candidates.into(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            prefix: false,
            case_insensitive: false,
            visible_only: false,
        }
    }

    pub fn within(mut self, roots: &[&str]) -> Self {
        self.roots = roots.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn visible_only(mut self) -> Self {
        self.visible_only = true;
        self
    }

    /// Script that clicks the match and evaluates to whether it did.
    pub fn script(&self) -> String {
        let roots = if self.roots.is_empty() {
            "[document]".to_string()
        } else {
            let list: Vec<String> = self
                .roots
                .iter()
                .map(|r| format!("document.querySelector({})", js_string(r)))
                .collect();
            format!("[{}].filter(Boolean)", list.join(", "))
        };
        let phrases: Vec<String> = self
            .phrases
            .iter()
            .map(|p| {
                if self.case_insensitive {
                    js_string(&p.to_lowercase())
                } else {
                    js_string(p)
                }
            })
            .collect();

        format!(
            r#"(() => {{
  const roots = {roots};
  const phrases = [{phrases}];
  const matches = (text) => {{
    let t = (text || '').trim();
    if ({ci}) t = t.toLowerCase();
    if (!t) return false;
    return phrases.some(p => t === p || ({prefix} && t.startsWith(p)));
  }};
  const visible = (el) => {{
    if (!{visible_only}) return true;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  }};
  for (const root of roots) {{
    const target = Array.from(root.querySelectorAll({candidates})).find(el => matches(el.textContent) && visible(el));
    if (target) {{ target.click(); return true; }}
  }}
  return false;
}})()"#,
            roots = roots,
            phrases = phrases.join(", "),
            ci = self.case_insensitive,
            prefix = self.prefix,
            visible_only = self.visible_only,
            candidates = js_string(&self.candidates),
        )
    }
}

/// One way of locating something to click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Selector(String),
    Text(TextMatcher),
}

impl Matcher {
    pub fn selector(selector: impl Into<String>) -> Self {
        Matcher::Selector(selector.into())
    }

    /// Try to click; page errors count as no match.
    pub async fn try_click(&self, page: &dyn Page) -> bool {
        match self {
            Matcher::Selector(selector) => match page.click_selector(selector).await {
                Ok(clicked) => clicked,
                Err(e) => {
                    debug!("Selector '{}' not clickable: {}", selector, e);
                    false
                }
            },
            Matcher::Text(text) => page.eval_bool(&text.script()).await,
        }
    }
}

/// Matchers tried in order until one clicks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherChain(Vec<Matcher>);

impl MatcherChain {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self(matchers)
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.0
    }

    /// Index of the matcher that clicked, if any.
    pub async fn click_first(&self, page: &dyn Page) -> Option<usize> {
        for (i, matcher) in self.0.iter().enumerate() {
            if matcher.try_click(page).await {
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakePage;
    use serde_json::json;

    #[test]
    fn test_text_script_lowercases_phrases() {
        let script = TextMatcher::new("button,div,span,a", &["收藏", "Saved"])
            .within(&["#userPostedFeeds", ".user-page", "body"])
            .prefix()
            .case_insensitive()
            .visible_only()
            .script();
        assert!(script.contains(r#"const phrases = ["收藏", "saved"];"#));
        assert!(script.contains(r##"document.querySelector("#userPostedFeeds")"##));
        assert!(script.contains("if (true) t = t.toLowerCase()"));
    }

    #[test]
    fn test_text_script_defaults_to_document() {
        let script = TextMatcher::new("a", &["我"]).script();
        assert!(script.contains("const roots = [document];"));
        assert!(script.contains("(false && t.startsWith(p))"));
    }

    #[tokio::test]
    async fn test_chain_tries_in_order() {
        let page = FakePage::new();
        page.add_element("a.second");
        page.respond("const phrases", json!(true));

        let chain = MatcherChain::new(vec![
            Matcher::selector("a.first"),
            Matcher::selector("a.second"),
            Matcher::Text(TextMatcher::new("a", &["我"])),
        ]);
        assert_eq!(chain.click_first(&page).await, Some(1));
        assert_eq!(page.clicks(), vec!["a.second".to_string()]);
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_text() {
        let page = FakePage::new();
        page.respond("const phrases", json!(true));
        let chain = MatcherChain::new(vec![
            Matcher::selector("a.first"),
            Matcher::Text(TextMatcher::new("a", &["我"])),
        ]);
        assert_eq!(chain.click_first(&page).await, Some(1));

        let empty = FakePage::new();
        assert_eq!(chain.click_first(&empty).await, None);
    }
}
