//! The progressive harvesting engine.
//!
//! A harvest navigates somewhere, waits for rendering to settle, extracts
//! records from client-side state and scrolls for more until a limit, a
//! round budget or convergence stops it.

mod extract;
mod matcher;
mod navigation;
mod paginator;
pub mod postprocess;
mod stability;

pub use extract::RecordExtractor;
pub use matcher::{Matcher, MatcherChain, TextMatcher};
pub use navigation::{CookieFallback, NavigationCandidate, NavigationStrategy};
pub use paginator::{
    FeedSource, HarvestOutcome, PaginatorConfig, RecordSource, ScrollPaginator, ScrollSettings,
    StopReason,
};
pub use stability::StabilityWaiter;
