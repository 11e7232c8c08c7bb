//! Harvesters for each kind of listing the site offers.

mod comments;
mod home;
mod profile;
mod saved;
mod search;

pub(crate) use comments::open_detail;
pub use comments::{detail_url, plan_reply_expansion, CommentHarvester, CommentLoadConfig, ScrollSpeed};
pub use home::FeedsHarvester;
pub use profile::UserProfileHarvester;
pub use saved::SavedFeedsHarvester;
pub use search::{search_url, SearchHarvester};

use rednote_protocols::Page;

use crate::harvest::StabilityWaiter;

/// Navigate, wait for load and let rendering settle.
pub(crate) async fn open(
    page: &dyn Page,
    url: &str,
    waiter: &StabilityWaiter,
) -> Result<(), crate::HarvestError> {
    page.navigate(url).await?;
    let _ = page.wait_load().await;
    waiter.await_stable(page).await;
    Ok(())
}
