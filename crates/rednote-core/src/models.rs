//! Records decoded from the site's client-side state.
//!
//! The state is loosely typed: counts arrive as strings or numbers, and
//! fields come and go between page versions. Every field except a record's
//! id defaults when absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Anything the harvest engine collects.
pub trait HarvestRecord: serde::de::DeserializeOwned + Send {
    /// Stable identifier; records with a blank id are discarded.
    fn id(&self) -> &str;

    /// Author of the record, when it has one.
    fn author_id(&self) -> &str {
        ""
    }
}

/// Accepts a string, a number or null, yielding a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// A note card as it appears in feed listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub xsec_token: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model_type: String,
    #[serde(default)]
    pub note_card: NoteCard,
    #[serde(default)]
    pub index: i64,
}

impl HarvestRecord for Feed {
    fn id(&self) -> &str {
        &self.id
    }

    fn author_id(&self) -> &str {
        &self.note_card.user.user_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCard {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_title: String,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub interact_info: InteractInfo,
    #[serde(default)]
    pub cover: Cover,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nickname: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub nick_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: String,
}

impl User {
    /// Display name under either spelling the site uses.
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.nick_name
        } else {
            &self.nickname
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractInfo {
    #[serde(default)]
    pub liked: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub liked_count: String,
    #[serde(default)]
    pub collected: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub collected_count: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comment_count: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shared_count: String,
    #[serde(default)]
    pub followed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_default: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_pre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub capa: VideoCapability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCapability {
    #[serde(default)]
    pub duration: u64,
}

/// Full note body shown on the detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
    #[serde(default, deserialize_with = "lenient_string")]
    pub note_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub xsec_token: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip_location: String,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub interact_info: InteractInfo,
    #[serde(default)]
    pub image_list: Vec<DetailImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailImage {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_default: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_pre: String,
    #[serde(default)]
    pub live_photo: bool,
}

/// A comment, top-level or nested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub note_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub like_count: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip_location: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub user_info: User,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sub_comment_count: String,
    #[serde(default)]
    pub sub_comments: Vec<Comment>,
}

impl HarvestRecord for Comment {
    fn id(&self) -> &str {
        &self.id
    }

    fn author_id(&self) -> &str {
        &self.user_info.user_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentList {
    #[serde(default)]
    pub list: Vec<Comment>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
}

/// Note body plus its loaded comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDetail {
    pub note: NoteDetail,
    pub comments: CommentList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBasicInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub nickname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub red_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: String,
    #[serde(default)]
    pub gender: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub images: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub imageb: String,
}

/// One follower/fans/likes counter on a profile page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteraction {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_basic_info: UserBasicInfo,
    pub interactions: Vec<UserInteraction>,
    pub feeds: Vec<Feed>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feed_decodes_string_and_numeric_counts() {
        let feed: Feed = serde_json::from_value(json!({
            "id": "64f0c1",
            "xsecToken": "tok",
            "modelType": "note",
            "noteCard": {
                "type": "normal",
                "displayTitle": "hello",
                "user": {"userId": "u1", "nickName": "alice", "avatar": "a.png"},
                "interactInfo": {"liked": true, "likedCount": 12, "collectedCount": "3"}
            },
            "index": 4
        }))
        .unwrap();

        assert_eq!(feed.note_card.kind, "normal");
        assert_eq!(feed.note_card.interact_info.liked_count, "12");
        assert_eq!(feed.note_card.interact_info.collected_count, "3");
        assert_eq!(feed.note_card.user.display_name(), "alice");
        assert_eq!(feed.author_id(), "u1");
    }

    #[test]
    fn test_feed_requires_id() {
        assert!(serde_json::from_value::<Feed>(json!({"noteCard": {}})).is_err());
        let feed: Feed = serde_json::from_value(json!({"id": null})).unwrap();
        assert!(feed.id.is_empty());
    }

    #[test]
    fn test_comment_nested() {
        let comment: Comment = serde_json::from_value(json!({
            "id": "c1",
            "content": "nice",
            "userInfo": {"userId": "u9", "nickname": "bob"},
            "subCommentCount": "2",
            "subComments": [{"id": "c2", "content": "thanks"}]
        }))
        .unwrap();
        assert_eq!(comment.sub_comments.len(), 1);
        assert_eq!(comment.sub_comment_count, "2");
        assert_eq!(comment.author_id(), "u9");
    }
}
