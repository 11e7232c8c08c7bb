//! Node lookup, clicks on nodes and file inputs.

use std::path::PathBuf;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{BoxModel, DocumentRoot};

use super::core::PageSession;

/// Code Chrome returns when a node has no layout box.
const NO_LAYOUT: i64 = -32000;

impl PageSession {
    async fn document_node(&self) -> Result<i64, CdpError> {
        let reply = self
            .call("DOM.getDocument", Some(json!({"depth": 0, "pierce": true})))
            .await?;
        let root: DocumentRoot = serde_json::from_value(reply["root"].clone())?;
        Ok(root.node_id)
    }

    /// First node matching `selector`. The document is re-read every time,
    /// so ids from before a navigation are never reused.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let root = self.document_node().await?;
        let reply = self
            .call(
                "DOM.querySelector",
                Some(json!({"nodeId": root, "selector": selector})),
            )
            .await?;
        Ok(reply["nodeId"].as_i64().filter(|id| *id != 0))
    }

    /// Viewport centre of a node, after scrolling it into view. `None` when
    /// the node is not rendered.
    async fn node_center(&self, node_id: i64) -> Result<Option<(f64, f64)>, CdpError> {
        self.call("DOM.scrollIntoViewIfNeeded", Some(json!({"nodeId": node_id})))
            .await?;
        match self.call("DOM.getBoxModel", Some(json!({"nodeId": node_id}))).await {
            Ok(reply) => {
                let model: BoxModel = serde_json::from_value(reply["model"].clone())?;
                Ok(model.center())
            }
            Err(CdpError::Protocol { code: NO_LAYOUT, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Click a node with real mouse events. `label` names it in errors.
    pub async fn click_node(&self, node_id: i64, label: &str) -> Result<(), CdpError> {
        let (x, y) = self
            .node_center(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{label} (not rendered)")))?;
        debug!("Clicking {} at ({:.0}, {:.0})", label, x, y);
        self.click(x, y).await
    }

    pub async fn click_selector(&self, selector: &str) -> Result<(), CdpError> {
        match self.query_selector(selector).await? {
            Some(node_id) => self.click_node(node_id, selector).await,
            None => Err(CdpError::ElementNotFound(selector.to_string())),
        }
    }

    /// Hand local files to an `<input type=file>`; the page sees a normal
    /// change event.
    pub async fn set_file_input_files(&self, node_id: i64, files: &[PathBuf]) -> Result<(), CdpError> {
        let files: Vec<String> = files.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        debug!("Uploading {} file(s) to node {}", files.len(), node_id);
        self.call(
            "DOM.setFileInputFiles",
            Some(json!({"nodeId": node_id, "files": files})),
        )
        .await
        .map(drop)
    }
}
