use super::*;
use crate::test_support::{feeds, snapshot, FakePage};
use rednote_protocols::Cookie;
use serde_json::json;

const ID_A: &str = "5f1e2d3c4b5a69788796a5b4";
const ID_B: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";

fn cookie(name: &str, value: &str) -> Cookie {
    Cookie {
        name: name.into(),
        value: value.into(),
        domain: ".xiaohongshu.com".into(),
        path: "/".into(),
        expires: None,
        http_only: false,
        secure: false,
        same_site: None,
    }
}

#[test]
fn test_candidate_ids_dedupe_and_cap() {
    let text = format!("a={ID_A}; b={ID_B}; c={ID_A}; d=short123");
    assert_eq!(CookieFallback::candidate_ids(&text, 12), vec![ID_A, ID_B]);
    assert_eq!(CookieFallback::candidate_ids(&text, 1), vec![ID_A]);
    assert!(CookieFallback::candidate_ids("nothing here", 12).is_empty());
    assert_eq!(
        CookieFallback::candidate_ids("X=5F1E2D3C4B5A69788796A5B4", 12),
        vec!["5F1E2D3C4B5A69788796A5B4"]
    );
}

#[test]
fn test_select_best_requires_positive_score() {
    let c = |url: &str, score| NavigationCandidate {
        url: url.into(),
        score,
    };
    assert_eq!(CookieFallback::select_best(&[c("a", 0), c("b", 0)]), None);
    let list = [c("a", 2), c("b", 5), c("c", 5)];
    assert_eq!(CookieFallback::select_best(&list).map(|b| b.url.as_str()), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn test_primary_selector_path() {
    let page = FakePage::new();
    page.add_element("li.user.side-bar-component a");
    page.redirect("/explore", "https://www.xiaohongshu.com/user/profile/me");

    NavigationStrategy::profile().navigate(&page).await.unwrap();
    assert_eq!(page.clicks(), vec!["li.user.side-bar-component a".to_string()]);
    assert_eq!(page.navigations().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fails_without_fallback() {
    let page = FakePage::new();
    let err = NavigationStrategy::profile().navigate(&page).await.unwrap_err();
    assert!(matches!(err, HarvestError::NavigationFailed(_)));
    assert_eq!(page.navigations().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cookie_fallback_picks_most_authors() {
    let page = FakePage::new();
    page.set_cookies_raw(vec![cookie("a1", ID_A), cookie("b1", ID_B)]);
    page.respond_at(
        ID_A,
        "__INITIAL_STATE__",
        snapshot(json!({"notes": feeds(&[("1", "x"), ("2", "x")])})),
    );
    page.respond_at(
        ID_B,
        "__INITIAL_STATE__",
        snapshot(json!({"notes": feeds(&[("1", "x"), ("2", "y"), ("3", "z")])})),
    );

    NavigationStrategy::profile()
        .with_fallback(CookieFallback::default())
        .navigate(&page)
        .await
        .unwrap();

    let navs = page.navigations();
    assert!(navs.last().unwrap().contains(ID_B));
    assert!(navs.last().unwrap().ends_with("?tab=fav&subTab=note"));
}

#[tokio::test(start_paused = true)]
async fn test_cookie_fallback_all_zero_fails() {
    let page = FakePage::new();
    page.set_cookies_raw(vec![cookie("a1", ID_A)]);
    let err = NavigationStrategy::profile()
        .with_fallback(CookieFallback::default())
        .navigate(&page)
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NavigationFailed(_)));
}
