use super::*;
use crate::test_support::FakePage;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn test_title_length() {
    assert_eq!(title_length(""), 0);
    assert_eq!(title_length("你好世界"), 4);
    assert_eq!(title_length("abc"), 2);
    assert_eq!(title_length("ab你好"), 3);
    assert_eq!(title_length(&"a".repeat(40)), 20);
    assert_eq!(title_length(&"好".repeat(21)), 21);
}

#[test]
fn test_validate_title() {
    assert!(validate_title("周末去爬山").is_ok());
    assert!(validate_title(&"a".repeat(41)).is_err());
    let err = validate_title(&"好".repeat(21)).unwrap_err();
    assert!(err.to_string().contains("标题长度超过限制"));
    assert!(validate_title("  ").is_err());
}

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap()
}

#[test]
fn test_schedule_absent() {
    assert_eq!(validate_schedule(None, now()).unwrap(), None);
    assert_eq!(validate_schedule(Some("  "), now()).unwrap(), None);
}

#[test]
fn test_schedule_window() {
    let ok = (now() + TimeDelta::hours(2)).to_rfc3339();
    assert!(validate_schedule(Some(&ok), now()).unwrap().is_some());

    let early = (now() + TimeDelta::minutes(30)).to_rfc3339();
    let err = validate_schedule(Some(&early), now()).unwrap_err();
    assert!(err.to_string().contains("至少在1小时后"));

    let late = (now() + TimeDelta::days(15)).to_rfc3339();
    let err = validate_schedule(Some(&late), now()).unwrap_err();
    assert!(err.to_string().contains("不能超过14天"));

    let err = validate_schedule(Some("tomorrow"), now()).unwrap_err();
    assert!(err.to_string().contains("ISO8601"));
}

fn publish_page() -> FakePage {
    let page = FakePage::new();
    page.respond("const phrases", json!(true));
    page.respond(".img-preview-area", json!(true));
    page.respond("published=true", json!(true));
    page.add_element(FILE_INPUT);
    page.add_element(TITLE_INPUT);
    page.add_element(CONTENT_EDITOR);
    page
}

#[tokio::test(start_paused = true)]
async fn test_publish_images_fills_form() {
    let page = publish_page();
    let note = PublishImageContent {
        title: "标题".into(),
        content: "正文".into(),
        tags: vec!["#旅行".into(), " ".into()],
        image_paths: vec![PathBuf::from("/tmp/a.jpg")],
        schedule_at: None,
    };
    PublishAction::new(&page).publish_images(&note).await.unwrap();

    assert_eq!(page.files(), vec![PathBuf::from("/tmp/a.jpg")]);
    assert_eq!(page.typed(), vec!["标题", "正文", " #旅行"]);
    assert_eq!(page.keys(), vec!["Space"]);
    assert_eq!(page.navigations(), vec![PUBLISH_URL.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_publish_video_requires_file() {
    let page = publish_page();
    let note = PublishVideoContent {
        title: "视频".into(),
        content: "正文".into(),
        tags: vec![],
        video_path: PathBuf::from("/definitely/missing.mp4"),
        schedule_at: None,
    };
    let err = PublishAction::new(&page).publish_video(&note).await.unwrap_err();
    assert!(matches!(err, HarvestError::InvalidInput(_)));
    assert!(page.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_publish_video_uploads_file() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"mp4").unwrap();

    let page = publish_page();
    page.respond("upload-video", json!(true));
    let note = PublishVideoContent {
        title: "视频".into(),
        content: "正文".into(),
        tags: vec![],
        video_path: video.clone(),
        schedule_at: None,
    };
    PublishAction::new(&page).publish_video(&note).await.unwrap();
    assert_eq!(page.files(), vec![video]);
}
