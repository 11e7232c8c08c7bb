//! Scripted in-memory page for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rednote_protocols::{Cookie, Element, Page, PageError, PageOwner};
use serde_json::Value;

struct Rule {
    needle: String,
    url_filter: Option<String>,
    /// Responses consumed in order; the last one repeats.
    responses: Vec<Result<Value, String>>,
    served: usize,
}

#[derive(Default)]
struct Inner {
    rules: Vec<Rule>,
    url: String,
    redirects: HashMap<String, String>,
    navigations: Vec<String>,
    navigate_failures: HashSet<String>,
    cookies: Vec<Cookie>,
    elements: HashMap<String, i64>,
    clicks: Vec<String>,
    evaluated: Vec<String>,
    typed: Vec<String>,
    keys: Vec<String>,
    files: Vec<PathBuf>,
    closed: bool,
}

/// A [`Page`] whose script results are scripted by substring.
///
/// `evaluate` answers with the first rule whose needle occurs in the script
/// (and whose URL filter, if any, occurs in the current URL). Unmatched
/// scripts evaluate to `null`.
#[derive(Clone, Default)]
pub struct FakePage {
    inner: Arc<Mutex<Inner>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(self, url: &str) -> Self {
        self.inner.lock().url = url.to_string();
        self
    }

    pub fn respond(&self, needle: &str, value: Value) {
        self.respond_seq(needle, vec![value]);
    }

    pub fn respond_seq(&self, needle: &str, values: Vec<Value>) {
        self.inner.lock().rules.push(Rule {
            needle: needle.to_string(),
            url_filter: None,
            responses: values.into_iter().map(Ok).collect(),
            served: 0,
        });
    }

    /// Respond only while the current URL contains `url_filter`.
    pub fn respond_at(&self, url_filter: &str, needle: &str, value: Value) {
        self.inner.lock().rules.insert(
            0,
            Rule {
                needle: needle.to_string(),
                url_filter: Some(url_filter.to_string()),
                responses: vec![Ok(value)],
                served: 0,
            },
        );
    }

    pub fn fail(&self, needle: &str) {
        self.inner.lock().rules.push(Rule {
            needle: needle.to_string(),
            url_filter: None,
            responses: vec![Err(format!("scripted failure for {needle}"))],
            served: 0,
        });
    }

    /// After navigating to a URL containing `from`, report `to` as current.
    pub fn redirect(&self, from: &str, to: &str) {
        self.inner.lock().redirects.insert(from.to_string(), to.to_string());
    }

    pub fn fail_navigation(&self, url_part: &str) {
        self.inner.lock().navigate_failures.insert(url_part.to_string());
    }

    pub fn add_element(&self, selector: &str) {
        let mut inner = self.inner.lock();
        let id = inner.elements.len() as i64 + 1;
        inner.elements.insert(selector.to_string(), id);
    }

    pub fn set_cookies_raw(&self, cookies: Vec<Cookie>) {
        self.inner.lock().cookies = cookies;
    }

    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    pub fn navigations(&self) -> Vec<String> {
        self.inner.lock().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.inner.lock().clicks.clone()
    }

    pub fn typed(&self) -> Vec<String> {
        self.inner.lock().typed.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys.clone()
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.inner.lock().files.clone()
    }

    /// Number of evaluated scripts containing `needle`.
    pub fn eval_count(&self, needle: &str) -> usize {
        self.inner
            .lock()
            .evaluated
            .iter()
            .filter(|s| s.contains(needle))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    fn check_open(&self) -> Result<(), PageError> {
        if self.inner.lock().closed {
            Err(PageError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Page for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.check_open()?;
        let mut inner = self.inner.lock();
        inner.navigations.push(url.to_string());
        if inner.navigate_failures.iter().any(|p| url.contains(p.as_str())) {
            return Err(PageError::Navigation(format!("scripted failure for {url}")));
        }
        let target = inner
            .redirects
            .iter()
            .find(|(from, _)| url.contains(from.as_str()))
            .map(|(_, to)| to.clone())
            .unwrap_or_else(|| url.to_string());
        inner.url = target;
        Ok(())
    }

    async fn wait_load(&self) -> Result<(), PageError> {
        self.check_open()
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        self.check_open()?;
        let mut inner = self.inner.lock();
        inner.evaluated.push(script.to_string());
        let url = inner.url.clone();
        let rule = inner.rules.iter_mut().find(|r| {
            script.contains(r.needle.as_str())
                && r.url_filter.as_ref().is_none_or(|f| url.contains(f.as_str()))
        });
        let Some(rule) = rule else {
            return Ok(Value::Null);
        };
        let idx = rule.served.min(rule.responses.len() - 1);
        rule.served += 1;
        rule.responses[idx].clone().map_err(PageError::Evaluation)
    }

    async fn wait_stable(&self, _timeout: Duration, _quiescence: Duration) -> Result<(), PageError> {
        self.check_open()
    }

    async fn find(&self, selector: &str) -> Result<Option<Element>, PageError> {
        self.check_open()?;
        Ok(self.inner.lock().elements.get(selector).map(|id| Element {
            node_id: *id,
            selector: selector.to_string(),
        }))
    }

    async fn click(&self, element: &Element) -> Result<(), PageError> {
        self.check_open()?;
        self.inner.lock().clicks.push(element.selector.clone());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        self.check_open()?;
        Ok(self.inner.lock().url.clone())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        Ok(self.inner.lock().cookies.clone())
    }

    async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError> {
        self.inner.lock().cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn insert_text(&self, text: &str) -> Result<(), PageError> {
        self.check_open()?;
        self.inner.lock().typed.push(text.to_string());
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        self.check_open()?;
        self.inner.lock().keys.push(key.to_string());
        Ok(())
    }

    async fn set_file_input(&self, _element: &Element, files: &[PathBuf]) -> Result<(), PageError> {
        self.check_open()?;
        self.inner.lock().files.extend_from_slice(files);
        Ok(())
    }
}

/// Owner wrapper recording whether the page was released.
pub struct FakeOwner {
    pub page: FakePage,
    pub released: Arc<Mutex<bool>>,
}

#[async_trait]
impl PageOwner for FakeOwner {
    fn page(&self) -> &dyn Page {
        &self.page
    }

    async fn release(self: Box<Self>) {
        *self.released.lock() = true;
        self.page.close();
    }
}

/// A feed record as the site state holds it.
pub fn feed_json(id: &str, author: &str) -> Value {
    serde_json::json!({
        "id": id,
        "xsecToken": format!("tok-{id}"),
        "modelType": "note",
        "noteCard": {
            "type": "normal",
            "displayTitle": format!("title {id}"),
            "user": {"userId": author, "nickname": author},
            "interactInfo": {"liked": false, "likedCount": "1"}
        }
    })
}

/// Feed records for `(id, author)` pairs.
pub fn feeds(ids: &[(&str, &str)]) -> Value {
    Value::Array(ids.iter().map(|(id, author)| feed_json(id, author)).collect())
}

/// Wrap a state subtree the way the snapshot script returns it.
pub fn snapshot(root: Value) -> Value {
    Value::String(root.to_string())
}
