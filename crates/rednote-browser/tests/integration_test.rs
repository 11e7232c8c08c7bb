//! Integration tests against a real Chrome.
//!
//! These tests require Chrome to be installed and network access to
//! xiaohongshu.com. Run with:
//! cargo test -p rednote-browser --test integration_test -- --ignored --nocapture

use std::time::Duration;

use rednote_browser::{BrowserManager, BrowserManagerConfig, CookieStore};
use rednote_protocols::{Page, PageOwner};

fn test_config() -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: 9333,
        profile_dir: Some(std::path::PathBuf::from("/tmp/rednote-mcp-test-profile")),
        headless: true,
        ..Default::default()
    }
}

fn empty_cookie_store() -> (tempfile::TempDir, CookieStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CookieStore::new(dir.path().join("cookies.json"));
    (dir, store)
}

#[tokio::test]
#[ignore]
async fn test_chrome_detection() {
    let chrome_path = BrowserManager::find_chrome();
    assert!(chrome_path.is_some(), "Chrome should be installed on the system");
    assert!(chrome_path.unwrap().exists());
}

#[tokio::test]
#[ignore]
async fn test_open_page_navigate_and_evaluate() {
    let manager = BrowserManager::new(test_config());
    let (_dir, cookies) = empty_cookie_store();

    let lease = manager.open_page(&cookies).await.expect("open page");
    let page = lease.page();

    page.navigate("https://www.xiaohongshu.com/explore")
        .await
        .expect("navigate");
    page.wait_stable(Duration::from_secs(5), Duration::from_millis(1200))
        .await
        .expect("stability wait");

    let url = page.current_url().await.expect("url");
    assert!(url.contains("xiaohongshu.com"));

    let has_state = page
        .evaluate("typeof window.__INITIAL_STATE__ === 'object'")
        .await
        .expect("evaluate");
    assert_eq!(has_state, serde_json::Value::Bool(true));

    lease.close().await;
    manager.shutdown_chrome().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_cookie_roundtrip_through_browser() {
    let manager = BrowserManager::new(test_config());
    let (_dir, cookies) = empty_cookie_store();

    let lease = manager.open_page(&cookies).await.expect("open page");
    lease
        .page()
        .navigate("https://www.xiaohongshu.com/explore")
        .await
        .expect("navigate");

    let jar = lease.page().cookies().await.expect("cookies");
    cookies.save(&jar).await.expect("save");
    assert_eq!(cookies.load().await.unwrap().len(), jar.len());

    Box::new(lease).release().await;
    manager.shutdown_chrome().await.unwrap();
}
