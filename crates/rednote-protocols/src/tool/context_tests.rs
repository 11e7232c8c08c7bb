use super::*;

#[test]
fn test_new_context_has_call_id() {
    let ctx = ToolContext::new("mcp");
    assert_eq!(ctx.caller, "mcp");
    assert!(!ctx.call_id.is_empty());
}

#[test]
fn test_call_ids_are_unique() {
    let a = ToolContext::new("mcp");
    let b = ToolContext::new("mcp");
    assert_ne!(a.call_id, b.call_id);
}

#[test]
fn test_with_call_id_overrides() {
    let ctx = ToolContext::new("mcp").with_call_id("42");
    assert_eq!(ctx.call_id, "42");
}

