use super::*;
use crate::test_support::{snapshot, FakePage};
use serde_json::json;

fn comment(id: &str) -> serde_json::Value {
    json!({"id": id, "content": format!("c {id}"), "userInfo": {"userId": "u", "nickname": "n"}})
}

fn note_state(feed_id: &str, comments: Vec<serde_json::Value>) -> serde_json::Value {
    snapshot(json!({
        "noteDetailMap": {
            feed_id: {
                "note": {"noteId": feed_id, "title": "t", "desc": "d", "interactInfo": {"liked": true}},
                "comments": {"list": comments, "cursor": "c1", "hasMore": true}
            }
        }
    }))
}

#[test]
fn test_from_request_defaults() {
    let config = CommentLoadConfig::from_request(true, Some(0), Some(-5), Some("turbo"));
    assert!(config.click_more_replies);
    assert_eq!(config.max_replies_threshold, 10);
    assert_eq!(config.max_comment_items, 20);
    assert_eq!(config.scroll_speed, ScrollSpeed::Normal);

    let config = CommentLoadConfig::from_request(false, Some(3), Some(50), Some("Slow"));
    assert_eq!(config.max_replies_threshold, 3);
    assert_eq!(config.max_comment_items, 50);
    assert_eq!(config.scroll_speed, ScrollSpeed::Slow);

    assert_eq!(CommentLoadConfig::from_request(false, None, None, None), CommentLoadConfig::default());
}

#[test]
fn test_speed_multipliers() {
    assert_eq!(ScrollSpeed::Slow.multiplier(), 2.0);
    assert_eq!(ScrollSpeed::Normal.multiplier(), 1.0);
    assert_eq!(ScrollSpeed::Fast.multiplier(), 0.5);
}

#[test]
fn test_plan_reply_expansion() {
    let buttons: Vec<String> = ["展开 3 条回复", "展开 25 条回复", "展开更多回复", "展开 10 条回复"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(plan_reply_expansion(&buttons, 10), vec![0, 2, 3]);
    assert_eq!(plan_reply_expansion(&buttons, 2), vec![2]);
    assert!(plan_reply_expansion(&[], 10).is_empty());
}

#[test]
fn test_detail_url() {
    assert_eq!(
        detail_url("64f0", "abc").unwrap(),
        "https://www.xiaohongshu.com/explore/64f0?xsec_token=abc&xsec_source=pc_feed"
    );
}

#[tokio::test]
async fn test_load_first_screen() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("n1", vec![comment("c1"), comment("c2")]));

    let detail = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", false, &CommentLoadConfig::default())
        .await
        .unwrap();
    assert_eq!(detail.note.note_id, "n1");
    assert!(detail.note.interact_info.liked);
    assert_eq!(detail.comments.list.len(), 2);
    assert!(detail.comments.has_more);
    assert_eq!(page.eval_count(".note-scroller"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_all_scrolls_until_limit() {
    let page = FakePage::new();
    page.respond_seq(
        "state[\"note\"]",
        vec![
            note_state("n1", vec![comment("c1"), comment("c2")]),
            note_state("n1", vec![comment("c1"), comment("c2"), comment("c3"), comment("c4")]),
        ],
    );

    let config = CommentLoadConfig::from_request(false, None, Some(3), Some("fast"));
    let detail = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &config)
        .await
        .unwrap();
    assert_eq!(detail.comments.list.len(), 3);
    assert_eq!(page.eval_count(".note-scroller"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_all_stops_at_end_marker() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("n1", vec![comment("c1")]));
    page.respond(".end-container", json!(true));

    let detail = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &CommentLoadConfig::default())
        .await
        .unwrap();
    assert_eq!(detail.comments.list.len(), 1);
    assert_eq!(page.eval_count(".note-scroller"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reply_expansion_respects_threshold() {
    let page = FakePage::new();
    page.respond_seq(
        "state[\"note\"]",
        vec![
            note_state("n1", vec![comment("c1")]),
            note_state("n1", vec![comment("c1"), comment("c2")]),
        ],
    );
    page.respond_seq(
        "JSON.stringify(\n  Array.from",
        vec![json!(r#"["展开 2 条回复","展开 99 条回复"]"#), json!("[]")],
    );

    let config = CommentLoadConfig::from_request(true, Some(5), Some(2), None);
    CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &config)
        .await
        .unwrap();
    assert_eq!(page.eval_count("show-more')[0]"), 1);
    assert_eq!(page.eval_count("show-more')[1]"), 0);
}

fn one_small_reply_thread(page: &FakePage) {
    page.respond_seq("JSON.stringify(\n  Array.from", vec![json!(r#"["展开 2 条回复"]"#), json!("[]")]);
}

#[tokio::test(start_paused = true)]
async fn test_replies_expanded_when_end_marker_already_visible() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("n1", vec![comment("c1")]));
    page.respond(".end-container", json!(true));
    one_small_reply_thread(&page);

    let config = CommentLoadConfig::from_request(true, Some(5), None, None);
    CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &config)
        .await
        .unwrap();
    assert_eq!(page.eval_count(".note-scroller"), 0);
    assert_eq!(page.eval_count("show-more')[0]"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_replies_expanded_when_first_screen_meets_limit() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("n1", vec![comment("c1"), comment("c2")]));
    one_small_reply_thread(&page);

    let config = CommentLoadConfig::from_request(true, Some(5), Some(2), None);
    let detail = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &config)
        .await
        .unwrap();
    assert_eq!(detail.comments.list.len(), 2);
    assert_eq!(page.eval_count(".note-scroller"), 0);
    assert_eq!(page.eval_count("show-more')[0]"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_replies_left_alone_without_flag() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("n1", vec![comment("c1")]));
    page.respond(".end-container", json!(true));
    one_small_reply_thread(&page);

    CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &CommentLoadConfig::default())
        .await
        .unwrap();
    assert_eq!(page.eval_count("show-more')["), 0);
}

#[tokio::test(start_paused = true)]
async fn test_harvested_batch_kept_when_reread_shrinks() {
    let page = FakePage::new();
    page.respond_seq(
        "state[\"note\"]",
        vec![
            note_state("n1", vec![comment("c1"), comment("c2"), comment("c3")]),
            note_state("n1", vec![comment("c3")]),
        ],
    );

    let config = CommentLoadConfig::from_request(false, None, Some(3), None);
    let detail = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", true, &config)
        .await
        .unwrap();
    let ids: Vec<&str> = detail.comments.list.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(detail.note.note_id, "n1");
}

#[tokio::test]
async fn test_unavailable_note() {
    let page = FakePage::new();
    page.respond("note-not-found", json!("当前笔记暂时无法浏览"));
    let err = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", false, &CommentLoadConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NoteUnavailable(ref r) if r == "当前笔记暂时无法浏览"));
}

#[tokio::test]
async fn test_missing_detail_entry() {
    let page = FakePage::new();
    page.respond("state[\"note\"]", note_state("other", vec![]));
    let err = CommentHarvester::new(&page, PaginatorConfig::default())
        .load("n1", "tok", false, &CommentLoadConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NoteUnavailable(_)));
}

#[tokio::test]
async fn test_requires_ids() {
    let page = FakePage::new();
    let harvester = CommentHarvester::new(&page, PaginatorConfig::default());
    let config = CommentLoadConfig::default();
    assert!(matches!(
        harvester.load("", "tok", false, &config).await,
        Err(HarvestError::InvalidInput(_))
    ));
    assert!(matches!(
        harvester.load("n1", " ", false, &config).await,
        Err(HarvestError::InvalidInput(_))
    ));
}
