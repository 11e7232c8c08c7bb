//! The xiaohongshu service layer.
//!
//! Every operation opens one page through a [`PageProvider`], runs a
//! harvester or action on it under the request deadline, and releases the
//! page before returning. The REST handlers and MCP tools are thin adapters
//! over [`XhsService`].

mod types;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use rednote_browser::{BrowserError, BrowserManager, CookieError, CookieStore};
use rednote_config::Config;
use rednote_core::actions::{
    format_timeout, validate_schedule, validate_title, CommentAction, InteractAction, LoginAction,
    LoginCompletion, LoginWatcher, PublishAction, PublishImageContent, PublishVideoContent, QrCode,
    Reaction,
};
use rednote_core::feeds::{
    CommentHarvester, CommentLoadConfig, FeedsHarvester, SavedFeedsHarvester, SearchHarvester,
    UserProfileHarvester,
};
use rednote_core::harvest::PaginatorConfig;
use rednote_core::media::ImageProcessor;
use rednote_core::{FilterOption, HarvestError, UserProfile};
use rednote_protocols::{Page, PageOwner};
use thiserror::Error;
use tracing::{error, info, warn};

pub use types::*;

/// Service-level failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Harvest(#[from] HarvestError),

    #[error("browser unavailable: {0}")]
    Browser(#[from] BrowserError),

    #[error("cookie file error: {0}")]
    Cookies(#[from] CookieError),

    #[error("{op} timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },
}

/// Source of fresh pages, one per operation.
#[async_trait]
pub trait PageProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageOwner>, ServiceError>;
}

/// Pages backed by the shared Chrome instance, primed with the cookie file.
pub struct BrowserPages {
    manager: Arc<BrowserManager>,
    cookies: CookieStore,
}

impl BrowserPages {
    pub fn new(manager: Arc<BrowserManager>, cookies: CookieStore) -> Self {
        Self { manager, cookies }
    }
}

#[async_trait]
impl PageProvider for BrowserPages {
    async fn open(&self) -> Result<Box<dyn PageOwner>, ServiceError> {
        let lease = self.manager.open_page(&self.cookies).await?;
        Ok(Box::new(lease))
    }
}

/// Persists browser cookies once a QR login completes.
struct CookieSaver {
    store: CookieStore,
}

#[async_trait]
impl LoginCompletion for CookieSaver {
    async fn on_login(&self, page: &dyn Page) -> Result<(), String> {
        let cookies = page.cookies().await.map_err(|e| e.to_string())?;
        self.store.save(&cookies).await.map_err(|e| e.to_string())
    }
}

/// Knobs the service reads from [`Config`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub account: String,
    pub request_timeout: Duration,
    pub qrcode_timeout: Duration,
    pub saved_feeds_limit: usize,
    pub paginator: PaginatorConfig,
    pub download_dir: PathBuf,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            account: config.account.username.clone(),
            request_timeout: config.harvest.request_timeout(),
            qrcode_timeout: config.login.qrcode_timeout(),
            saved_feeds_limit: config.harvest.saved_feeds_limit,
            paginator: PaginatorConfig::default()
                .with_rounds(config.harvest.max_scroll_rounds, config.harvest.stable_rounds),
            download_dir: config.media.download_dir(),
        }
    }
}

pub struct XhsService {
    pages: Arc<dyn PageProvider>,
    cookies: CookieStore,
    settings: ServiceSettings,
}

impl XhsService {
    pub fn new(pages: Arc<dyn PageProvider>, cookies: CookieStore, settings: ServiceSettings) -> Self {
        Self {
            pages,
            cookies,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn cookie_path(&self) -> String {
        self.cookies.path().display().to_string()
    }

    /// Run `fut` under the request deadline. Dropping it on timeout cancels
    /// any in-flight page call.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, HarvestError>>,
    {
        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                error!("{} failed: {}", op, e);
                ServiceError::from(e)
            }),
            Err(_) => {
                warn!("{} exceeded the {}s request deadline", op, timeout.as_secs());
                Err(ServiceError::Timeout {
                    op,
                    secs: timeout.as_secs(),
                })
            }
        }
    }

    fn paginator(&self) -> PaginatorConfig {
        self.settings.paginator
    }

    pub async fn check_login_status(&self) -> Result<LoginStatusResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded("check_login_status", LoginAction::new(owner.page()).check_login_status())
            .await;
        owner.release().await;

        Ok(LoginStatusResponse {
            is_logged_in: result?,
            username: self.settings.account.clone(),
        })
    }

    /// Fetch the login QR code. When a scan is pending, the page is handed
    /// to a background watcher that saves cookies on success.
    pub async fn get_login_qrcode(&self) -> Result<LoginQrcodeResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let fetched = self
            .bounded("get_login_qrcode", LoginAction::new(owner.page()).fetch_qrcode())
            .await;

        match fetched {
            Ok(QrCode::Image(img)) => {
                let timeout = self.settings.qrcode_timeout;
                let completion = Arc::new(CookieSaver {
                    store: self.cookies.clone(),
                });
                LoginWatcher::spawn(owner, timeout, completion);
                Ok(LoginQrcodeResponse {
                    timeout: format_timeout(timeout),
                    is_logged_in: false,
                    img,
                })
            }
            Ok(QrCode::AlreadyLoggedIn) => {
                owner.release().await;
                Ok(LoginQrcodeResponse {
                    timeout: format_timeout(Duration::ZERO),
                    is_logged_in: true,
                    img: String::new(),
                })
            }
            Err(e) => {
                owner.release().await;
                Err(e)
            }
        }
    }

    /// Log in interactively in a visible browser, saving cookies on success.
    pub async fn login_interactive(&self) -> Result<bool, ServiceError> {
        let owner = self.pages.open().await?;
        let action = LoginAction::new(owner.page());
        let result = match self.bounded("login", action.check_login_status()).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                info!("Waiting up to {} for login", format_timeout(self.settings.qrcode_timeout));
                if action.wait_for_login(self.settings.qrcode_timeout).await {
                    let saver = CookieSaver {
                        store: self.cookies.clone(),
                    };
                    match saver.on_login(owner.page()).await {
                        Ok(()) => Ok(true),
                        Err(e) => {
                            error!("Failed to save cookies: {}", e);
                            Ok(false)
                        }
                    }
                } else {
                    Ok(false)
                }
            }
            Err(e) => Err(e),
        };
        owner.release().await;
        result
    }

    pub async fn delete_cookies(&self) -> Result<DeleteCookiesResponse, ServiceError> {
        self.cookies.delete().await?;
        Ok(DeleteCookiesResponse {
            cookie_path: self.cookie_path(),
            message: "Cookies 已成功删除，登录状态已重置。下次操作时需要重新登录。".to_string(),
        })
    }

    pub async fn publish_content(&self, req: &PublishRequest) -> Result<PublishResponse, ServiceError> {
        validate_title(&req.title)?;
        let schedule_at = validate_schedule(req.schedule_at.as_deref(), Local::now())?;
        let image_paths = ImageProcessor::new(self.settings.download_dir.clone())?
            .process(&req.images)
            .await?;

        let note = PublishImageContent {
            title: req.title.clone(),
            content: req.content.clone(),
            tags: req.tags.clone(),
            image_paths,
            schedule_at,
        };
        let owner = self.pages.open().await?;
        let result = self
            .bounded("publish_content", PublishAction::new(owner.page()).publish_images(&note))
            .await;
        owner.release().await;
        result?;

        Ok(PublishResponse {
            title: req.title.clone(),
            content: req.content.clone(),
            images: note.image_paths.len(),
            status: "发布完成".to_string(),
        })
    }

    pub async fn publish_video(&self, req: &PublishVideoRequest) -> Result<PublishVideoResponse, ServiceError> {
        validate_title(&req.title)?;
        let video_path = PathBuf::from(req.video.trim());
        if req.video.trim().is_empty() {
            return Err(HarvestError::InvalidInput("必须提供本地视频文件".into()).into());
        }
        if tokio::fs::metadata(&video_path).await.is_err() {
            return Err(HarvestError::InvalidInput(format!("视频文件不存在或不可访问: {}", req.video)).into());
        }
        let schedule_at = validate_schedule(req.schedule_at.as_deref(), Local::now())?;

        let note = PublishVideoContent {
            title: req.title.clone(),
            content: req.content.clone(),
            tags: req.tags.clone(),
            video_path,
            schedule_at,
        };
        let owner = self.pages.open().await?;
        let result = self
            .bounded("publish_video", PublishAction::new(owner.page()).publish_video(&note))
            .await;
        owner.release().await;
        result?;

        Ok(PublishVideoResponse {
            title: req.title.clone(),
            content: req.content.clone(),
            video: req.video.clone(),
            status: "发布完成".to_string(),
        })
    }

    pub async fn list_feeds(&self) -> Result<FeedsListResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded("list_feeds", FeedsHarvester::new(owner.page(), self.paginator()).harvest())
            .await;
        owner.release().await;
        Ok(result?.into())
    }

    pub async fn list_saved_feeds(&self, limit: usize) -> Result<FeedsListResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "list_saved_feeds",
                SavedFeedsHarvester::new(owner.page(), self.paginator()).harvest(limit),
            )
            .await;
        owner.release().await;
        Ok(result?.into())
    }

    pub async fn search_feeds(&self, keyword: &str, filters: &FilterOption) -> Result<FeedsListResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "search_feeds",
                SearchHarvester::new(owner.page(), self.paginator()).harvest(keyword, filters),
            )
            .await;
        owner.release().await;
        Ok(result?.into())
    }

    pub async fn get_feed_detail(
        &self,
        feed_id: &str,
        xsec_token: &str,
        load_all_comments: bool,
        config: &CommentLoadConfig,
    ) -> Result<FeedDetailResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "get_feed_detail",
                CommentHarvester::new(owner.page(), self.paginator()).load(
                    feed_id,
                    xsec_token,
                    load_all_comments,
                    config,
                ),
            )
            .await;
        owner.release().await;

        Ok(FeedDetailResponse {
            feed_id: feed_id.to_string(),
            data: result?,
        })
    }

    pub async fn user_profile(&self, user_id: &str, xsec_token: &str) -> Result<UserProfile, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "user_profile",
                UserProfileHarvester::new(owner.page(), self.paginator()).harvest(user_id, xsec_token),
            )
            .await;
        owner.release().await;
        result
    }

    pub async fn my_profile(&self) -> Result<UserProfile, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "my_profile",
                UserProfileHarvester::new(owner.page(), self.paginator()).my_profile(),
            )
            .await;
        owner.release().await;
        result
    }

    pub async fn post_comment(
        &self,
        feed_id: &str,
        xsec_token: &str,
        content: &str,
    ) -> Result<PostCommentResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "post_comment",
                CommentAction::new(owner.page()).post_comment(feed_id, xsec_token, content),
            )
            .await;
        owner.release().await;
        result?;

        Ok(PostCommentResponse {
            feed_id: feed_id.to_string(),
            success: true,
            message: "评论发表成功".to_string(),
        })
    }

    pub async fn reply_comment(&self, req: &ReplyCommentRequest) -> Result<ReplyCommentResponse, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "reply_comment",
                CommentAction::new(owner.page()).reply_to_comment(
                    &req.feed_id,
                    &req.xsec_token,
                    &req.comment_id,
                    &req.user_id,
                    &req.content,
                ),
            )
            .await;
        owner.release().await;
        result?;

        Ok(ReplyCommentResponse {
            feed_id: req.feed_id.clone(),
            target_comment_id: req.comment_id.clone(),
            target_user_id: req.user_id.clone(),
            success: true,
            message: "评论回复成功".to_string(),
        })
    }

    /// Set a like or favorite to `desired`; already matching is a success.
    pub async fn set_reaction(
        &self,
        reaction: Reaction,
        desired: bool,
        feed_id: &str,
        xsec_token: &str,
    ) -> Result<ActionResult, ServiceError> {
        let owner = self.pages.open().await?;
        let result = self
            .bounded(
                "set_reaction",
                InteractAction::new(owner.page()).set(reaction, desired, feed_id, xsec_token),
            )
            .await;
        owner.release().await;
        result?;

        let message = match (reaction, desired) {
            (Reaction::Like, true) => "点赞成功或已点赞",
            (Reaction::Like, false) => "取消点赞成功或未点赞",
            (Reaction::Favorite, true) => "收藏成功或已收藏",
            (Reaction::Favorite, false) => "取消收藏成功或未收藏",
        };
        Ok(ActionResult {
            feed_id: feed_id.to_string(),
            success: true,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
