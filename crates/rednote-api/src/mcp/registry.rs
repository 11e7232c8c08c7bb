//! Tool registry for the MCP server.

use std::sync::Arc;

use dashmap::DashMap;
use rednote_protocols::{Tool, ToolDefinition};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),
}

/// Thread-safe map of tool id to implementation.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; ids are unique.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let id = tool.definition().id.clone();
        if self.tools.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.tools.insert(id, tool);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).map(|entry| entry.value().clone())
    }

    /// All definitions, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .iter()
            .map(|entry| entry.value().definition().clone())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rednote_protocols::{ToolContext, ToolError, ToolResult};

    struct NamedTool {
        definition: ToolDefinition,
    }

    impl NamedTool {
        fn new(id: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                definition: ToolDefinition::new(id, id, "test tool"),
            })
        }
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success("ok"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(NamedTool::new("list_feeds")).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("list_feeds").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = ToolRegistry::new();
        registry.register(NamedTool::new("like_feed")).unwrap();
        let err = registry.register(NamedTool::new("like_feed")).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(id) if id == "like_feed"));
    }

    #[test]
    fn test_list_sorted() {
        let registry = ToolRegistry::new();
        for id in ["search_feeds", "check_login_status", "list_feeds"] {
            registry.register(NamedTool::new(id)).unwrap();
        }
        let ids: Vec<String> = registry.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["check_login_status", "list_feeds", "search_feeds"]);
    }
}
