//! User profile pages.

use rednote_protocols::Page;
use tracing::{debug, info};
use url::Url;

use crate::error::HarvestError;
use crate::harvest::{
    FeedSource, NavigationStrategy, PaginatorConfig, RecordExtractor, ScrollPaginator,
    StabilityWaiter,
};
use crate::models::{UserBasicInfo, UserInteraction, UserProfile};
use crate::state::capture;
use crate::SITE_ORIGIN;

/// Profile info and posted notes of a user.
pub struct UserProfileHarvester<'a> {
    page: &'a dyn Page,
    config: PaginatorConfig,
    waiter: StabilityWaiter,
}

impl<'a> UserProfileHarvester<'a> {
    pub fn new(page: &'a dyn Page, config: PaginatorConfig) -> Self {
        Self {
            page,
            config,
            waiter: StabilityWaiter::default(),
        }
    }

    pub fn profile_url(user_id: &str, xsec_token: &str) -> Result<String, HarvestError> {
        let mut url = Url::parse(&format!("{SITE_ORIGIN}/user/profile/"))
            .and_then(|base| base.join(user_id))
            .map_err(|e| HarvestError::InvalidInput(format!("bad user id: {e}")))?;
        url.query_pairs_mut()
            .append_pair("xsec_token", xsec_token)
            .append_pair("xsec_source", "pc_note");
        Ok(url.into())
    }

    pub async fn harvest(&self, user_id: &str, xsec_token: &str) -> Result<UserProfile, HarvestError> {
        let user_id = user_id.trim();
        if user_id.is_empty() || user_id.contains('/') {
            return Err(HarvestError::InvalidInput("user_id is required".into()));
        }
        let url = Self::profile_url(user_id, xsec_token.trim())?;
        super::open(self.page, &url, &self.waiter).await?;
        self.extract().await
    }

    /// Profile of the logged-in account, reached through the sidebar.
    pub async fn my_profile(&self) -> Result<UserProfile, HarvestError> {
        NavigationStrategy::profile().navigate(self.page).await?;
        self.waiter.await_stable(self.page).await;
        self.extract().await
    }

    async fn extract(&self) -> Result<UserProfile, HarvestError> {
        let state = capture(self.page, "user")
            .await?
            .ok_or_else(|| HarvestError::NavigationFailed("profile state missing".into()))?;

        let basic_info: UserBasicInfo = state
            .get_path(&["userPageData", "basicInfo"])
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| HarvestError::MalformedRecords(format!("basic info: {e}")))?
            .ok_or_else(|| HarvestError::NavigationFailed("profile info missing".into()))?;
        let interactions: Vec<UserInteraction> = state
            .get_path(&["userPageData", "interactions"])
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| HarvestError::MalformedRecords(format!("interactions: {e}")))?
            .unwrap_or_default();

        let mut source = FeedSource::new(self.page, RecordExtractor::new("user", &["notes"]))
            .with_waiter(self.waiter);
        let feeds = match ScrollPaginator::new(self.config).run(&mut source).await {
            Ok(outcome) => outcome.records,
            Err(HarvestError::NoFeeds) => {
                debug!("Profile has no notes");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        info!("Profile '{}': {} notes", basic_info.nickname, feeds.len());

        Ok(UserProfile {
            user_basic_info: basic_info,
            interactions,
            feeds,
        })
    }
}
