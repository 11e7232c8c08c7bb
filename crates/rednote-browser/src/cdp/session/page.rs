//! [`Page`] implementation backed by a CDP session.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use rednote_protocols::{Cookie, Element, Page, PageError};
use serde_json::Value;

use super::core::PageSession;

#[async_trait]
impl Page for PageSession {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        PageSession::navigate(self, url).await?;
        Ok(())
    }

    async fn wait_load(&self) -> Result<(), PageError> {
        Ok(self.wait_for_load().await?)
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        Ok(PageSession::evaluate(self, script).await?)
    }

    async fn wait_stable(&self, timeout: Duration, quiescence: Duration) -> Result<(), PageError> {
        self.wait_dom_stable(timeout, quiescence).await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Option<Element>, PageError> {
        let node = self.query_selector(selector).await?;
        Ok(node.map(|node_id| Element {
            node_id,
            selector: selector.to_string(),
        }))
    }

    async fn click(&self, element: &Element) -> Result<(), PageError> {
        // Node ids die when the document is re-read; fall back to the selector.
        match self.click_node(element.node_id, &element.selector).await {
            Ok(()) => Ok(()),
            Err(_) => Ok(self.click_selector(&element.selector).await?),
        }
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.get_url().await?)
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        Ok(self.get_all_cookies().await?)
    }

    async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError> {
        Ok(PageSession::set_cookies(self, cookies).await?)
    }

    async fn insert_text(&self, text: &str) -> Result<(), PageError> {
        Ok(self.type_text(text).await?)
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        Ok(PageSession::press_key(self, key).await?)
    }

    async fn set_file_input(&self, element: &Element, files: &[PathBuf]) -> Result<(), PageError> {
        let node_id = match self.query_selector(&element.selector).await? {
            Some(node_id) => node_id,
            None => element.node_id,
        };
        Ok(self.set_file_input_files(node_id, files).await?)
    }
}
