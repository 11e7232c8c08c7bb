//! Posting comments and replies.

use std::time::Duration;

use rednote_protocols::Page;
use tracing::{debug, info};

use crate::error::HarvestError;
use crate::feeds::open_detail;
use crate::harvest::StabilityWaiter;
use crate::page_ext::{js_string, PageExt};

const INPUT_TRIGGER: &str = "div.input-box div.content-edit span";
const INPUT_FIELD: &str = "div.input-box div.content-edit p.content-input";
const SUBMIT_BUTTON: &str = "div.bottom button.submit";
const LOCATE_ROUNDS: usize = 15;

pub struct CommentAction<'a> {
    page: &'a dyn Page,
    waiter: StabilityWaiter,
}

impl<'a> CommentAction<'a> {
    pub fn new(page: &'a dyn Page) -> Self {
        Self {
            page,
            waiter: StabilityWaiter::default(),
        }
    }

    /// Post a top-level comment on a note.
    pub async fn post_comment(&self, feed_id: &str, xsec_token: &str, content: &str) -> Result<(), HarvestError> {
        let content = require_content(content)?;
        let feed_id = open_detail(self.page, feed_id, xsec_token, &self.waiter).await?;

        if !self.page.click_selector(INPUT_TRIGGER).await? {
            return Err(HarvestError::ActionFailed("comment input not found".into()));
        }
        self.submit(content).await?;
        info!("Comment posted on note {}", feed_id);
        Ok(())
    }

    /// Reply to the comment identified by `comment_id`, or else to the
    /// first comment by `user_id`.
    pub async fn reply_to_comment(
        &self,
        feed_id: &str,
        xsec_token: &str,
        comment_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<(), HarvestError> {
        let (comment_id, user_id) = (comment_id.trim(), user_id.trim());
        if comment_id.is_empty() && user_id.is_empty() {
            return Err(HarvestError::InvalidInput("缺少 comment_id 或 user_id".into()));
        }
        let content = require_content(content)?;
        let feed_id = open_detail(self.page, feed_id, xsec_token, &self.waiter).await?;

        let script = reply_button_script(comment_id, user_id);
        let mut found = false;
        for round in 1..=LOCATE_ROUNDS {
            if self.page.eval_bool(&script).await {
                debug!("Target comment found in round {}", round);
                found = true;
                break;
            }
            self.page.eval_bool(SCROLL_SCRIPT).await;
            tokio::time::sleep(Duration::from_millis(800)).await;
            self.waiter.await_stable(self.page).await;
        }
        if !found {
            return Err(HarvestError::ActionFailed(format!(
                "target comment not found (comment_id={comment_id}, user_id={user_id})"
            )));
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        self.submit(content).await?;
        info!("Replied on note {} (comment_id={}, user_id={})", feed_id, comment_id, user_id);
        Ok(())
    }

    async fn submit(&self, content: &str) -> Result<(), HarvestError> {
        if !self.page.click_selector(INPUT_FIELD).await? {
            return Err(HarvestError::ActionFailed("comment editor not found".into()));
        }
        self.page.insert_text(content).await?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        if !self.page.click_selector(SUBMIT_BUTTON).await? {
            return Err(HarvestError::ActionFailed("comment submit button not found".into()));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

fn require_content(content: &str) -> Result<&str, HarvestError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(HarvestError::InvalidInput("content is required".into()));
    }
    Ok(content)
}

const SCROLL_SCRIPT: &str = r#"(() => {
  const scroller = document.querySelector('.note-scroller');
  if (!scroller) return false;
  scroller.scrollBy(0, Math.max(scroller.clientHeight * 0.8, 600));
  return true;
})()"#;

/// Script clicking the reply button of the target comment.
fn reply_button_script(comment_id: &str, user_id: &str) -> String {
    format!(
        r#"(() => {{
  const commentId = {comment_id};
  const userId = {user_id};
  let item = null;
  if (commentId) {{
    item = document.querySelector('#comment-' + CSS.escape(commentId));
  }}
  if (!item && userId) {{
    const link = document.querySelector('.comment-item a[href*="/user/profile/' + userId + '"]');
    item = link ? link.closest('.comment-item') : null;
  }}
  if (!item) return false;
  item.scrollIntoView({{ block: 'center' }});
  const reply = item.querySelector('.reply, .reply-btn, .interactions .reply');
  if (!reply) return false;
  reply.click();
  return true;
}})()"#,
        comment_id = js_string(comment_id),
        user_id = js_string(user_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakePage;
    use serde_json::json;

    fn comment_page() -> FakePage {
        let page = FakePage::new();
        page.add_element(INPUT_TRIGGER);
        page.add_element(INPUT_FIELD);
        page.add_element(SUBMIT_BUTTON);
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_comment() {
        let page = comment_page();
        CommentAction::new(&page)
            .post_comment("n1", "tok", " 好看 ")
            .await
            .unwrap();
        assert_eq!(page.typed(), vec!["好看".to_string()]);
        assert_eq!(page.clicks(), vec![INPUT_TRIGGER, INPUT_FIELD, SUBMIT_BUTTON]);
        assert!(page.navigations()[0].contains("/explore/n1?xsec_token=tok"));
    }

    #[tokio::test]
    async fn test_reply_requires_target() {
        let page = comment_page();
        let err = CommentAction::new(&page)
            .reply_to_comment("n1", "tok", " ", "", "hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("缺少 comment_id 或 user_id"));
        assert!(page.navigations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_scrolls_until_found() {
        let page = comment_page();
        page.respond_seq("const commentId", vec![json!(false), json!(false), json!(true)]);
        CommentAction::new(&page)
            .reply_to_comment("n1", "tok", "c42", "", "thanks")
            .await
            .unwrap();
        assert_eq!(page.eval_count("scroller.scrollBy"), 2);
        assert_eq!(page.typed(), vec!["thanks".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_target_missing() {
        let page = comment_page();
        let err = CommentAction::new(&page)
            .reply_to_comment("n1", "tok", "", "u9", "thanks")
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::ActionFailed(_)));
        assert!(page.typed().is_empty());
    }

    #[test]
    fn test_reply_script_quotes_ids() {
        let script = reply_button_script("c\"1", "");
        assert!(script.contains(r#"const commentId = "c\"1";"#));
    }
}
