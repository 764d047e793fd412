use std::time::Duration;

use chrono::{Datelike, Utc};
use tracing::instrument;

use crate::cache::Cache;
use crate::error::Result;
use crate::model::{
    DiverInfo, EventEntry, EventResultRow, EventSummary, FinishedLiveResults, LiveResults,
    MeetEventHistory, MeetPageData, PollState, PresentMeets, ProfileData, ProfileMeet, SheetDive,
};
use crate::scraper::{self, entries, event, live, meet_page, meets, profile, Html};
use crate::task::{bounded, Outcome, LOAD_TIMEOUT};

/// The main entry point for scraping DiveMeets.
///
/// `DiveMeetsClient` wraps a [`reqwest::Client`] and exposes one method per
/// page family. Every network-backed call races a fixed deadline and
/// reports one of three outcomes (parsed, failed, or timed out) which
/// callers must keep distinct. Parsed judging/roster sections and meet
/// pages are memoized by external key with no invalidation; clones share
/// the caches.
///
/// # Examples
///
/// ```no_run
/// # async fn example() {
/// use divemeets_scraper::{DiveMeetsClient, Outcome};
///
/// let client = DiveMeetsClient::new();
/// if let Outcome::Parsed(profile) = client.get_profile("51197").await {
///     println!("parsed {} dive statistics", profile.dive_statistics.map_or(0, |s| s.len()));
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct DiveMeetsClient {
    http: reqwest::Client,
    timeout: Duration,
    judging: Cache<String, Vec<ProfileMeet>>,
    coach_divers: Cache<String, Vec<DiverInfo>>,
    meet_pages: Cache<String, MeetPageData>,
    meet_links: Cache<String, String>,
}

impl DiveMeetsClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure proxies, headers, etc.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: client,
            timeout: LOAD_TIMEOUT,
            judging: Cache::new(),
            coach_divers: Cache::new(),
            meet_pages: Cache::new(),
            meet_links: Cache::new(),
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_and<T>(&self, url: &str, parse: impl FnOnce(Html) -> Result<T>) -> Outcome<T> {
        bounded(self.timeout, async {
            let document = scraper::get_document(&self.http, url).await?;
            parse(document)
        })
        .await
    }

    /// Fetch and parse a full profile by DiveMeets number.
    ///
    /// On success the judging and coach-roster sections are cached by diver
    /// ID for [`Self::cached_judging`] / [`Self::cached_coach_divers`].
    #[instrument(skip(self))]
    pub async fn get_profile(&self, diver_id: &str) -> Outcome<ProfileData> {
        let url = scraper::profile_url(diver_id);
        let outcome = self.fetch_and(&url, |doc| profile::parse_profile(&doc)).await;

        // Cache writes only after the unit fully succeeds, so a cancelled or
        // failed parse never leaves partial entries.
        if let Outcome::Parsed(data) = &outcome {
            if let Some(judging) = &data.judging {
                self.judging.put(diver_id.to_string(), judging.clone());
            }
            if let Some(divers) = &data.coach_divers {
                self.coach_divers.put(diver_id.to_string(), divers.clone());
            }
        }
        outcome
    }

    /// Judging history cached by a prior successful profile parse.
    pub fn cached_judging(&self, diver_id: &str) -> Option<Vec<ProfileMeet>> {
        self.judging.get(&diver_id.to_string())
    }

    /// Coach roster cached by a prior successful profile parse.
    pub fn cached_coach_divers(&self, diver_id: &str) -> Option<Vec<DiverInfo>> {
        self.coach_divers.get(&diver_id.to_string())
    }

    /// Walk the index page for upcoming meets (grouped by year and
    /// organization) and the current-meets sidebar. Organization pages that
    /// fail to fetch or parse are skipped, not fatal.
    #[instrument(skip(self))]
    pub async fn get_present_meets(&self) -> Outcome<PresentMeets> {
        bounded(self.timeout, self.fetch_present_meets()).await
    }

    async fn fetch_present_meets(&self) -> Result<PresentMeets> {
        let index = scraper::get_document(&self.http, &meets::index_url()).await?;
        let walk = meets::plan_index_walk(meets::parse_index_tabs(&index)?);

        let mut present = PresentMeets::default();
        let year = Utc::now().year().to_string();

        for tab in &walk.org_tabs {
            // Materialize the year entry up front: an index with an
            // "Upcoming" tab yields an empty mapping even when every org
            // page fails.
            present.upcoming.entry(year.clone()).or_default();

            let link = tab.link.replace(' ', "%20").replace('\t', "");
            let Ok(org_page) = scraper::get_document(&self.http, &link).await else {
                continue;
            };
            if let Some(org_meets) = meets::parse_org_meets(&org_page) {
                present
                    .upcoming
                    .entry(year.clone())
                    .or_default()
                    .insert(tab.label.clone(), org_meets);
            }
        }

        if walk.parse_current {
            if let Some(current) = meets::parse_current_meets(&index) {
                present.current = current;
            }
        }

        Ok(present)
    }

    /// Fetch and parse a meet info/results page, memoized by link.
    #[instrument(skip(self))]
    pub async fn get_meet_page(&self, link: &str) -> Outcome<MeetPageData> {
        if let Some(cached) = self.meet_pages.get(&link.to_string()) {
            return Outcome::Parsed(cached);
        }

        let outcome = self
            .fetch_and(link, |doc| meet_page::parse_meet_page(link, &doc))
            .await;
        if let Outcome::Parsed(data) = &outcome {
            self.meet_pages.put(link.to_string(), data.clone());
        }
        outcome
    }

    /// Drop a meet page cache entry so the next call reparses.
    pub fn evict_meet_page(&self, link: &str) {
        self.meet_pages.remove(&link.to_string());
    }

    /// Fetch and parse a finished event results page.
    #[instrument(skip(self))]
    pub async fn get_event_results(&self, url: &str) -> Outcome<Vec<EventResultRow>> {
        self.fetch_and(url, |doc| event::parse_event_results(&doc)).await
    }

    /// Fetch and parse a diver's event-history page. Derived main-meet
    /// links are memoized per meet name across calls.
    #[instrument(skip(self))]
    pub async fn get_event_history(&self, url: &str) -> Outcome<Vec<MeetEventHistory>> {
        let meet_links = self.meet_links.clone();
        self.fetch_and(url, move |doc| event::parse_event_history(&doc, &meet_links))
            .await
    }

    /// Fetch and parse the header metadata of an event score page.
    #[instrument(skip(self))]
    pub async fn get_event_summary(&self, url: &str) -> Outcome<EventSummary> {
        self.fetch_and(url, |doc| event::parse_event_summary(&doc)).await
    }

    /// Fetch and parse an individual dive sheet.
    #[instrument(skip(self))]
    pub async fn get_dive_sheet(&self, url: &str) -> Outcome<Vec<SheetDive>> {
        self.fetch_and(url, |doc| event::parse_dive_sheet(&doc)).await
    }

    /// Fetch and parse one snapshot of a live-scoring page.
    #[instrument(skip(self))]
    pub async fn get_live_results(&self, url: &str) -> Outcome<LiveResults> {
        self.fetch_and(url, |doc| live::parse_live_results(&doc)).await
    }

    /// Fetch and parse a finished event from its live-results page.
    #[instrument(skip(self))]
    pub async fn get_finished_live_results(&self, url: &str) -> Outcome<FinishedLiveResults> {
        self.fetch_and(url, |doc| live::parse_finished_live_results(&doc))
            .await
    }

    /// Fetch and parse a pre-event entry list.
    #[instrument(skip(self))]
    pub async fn get_entries(&self, url: &str) -> Outcome<Vec<EventEntry>> {
        self.fetch_and(url, |doc| entries::parse_entries(&doc)).await
    }

    /// A polling handle for a live-scoring page.
    pub fn live_poller(&self, url: impl Into<String>) -> LivePoller {
        LivePoller {
            client: self.clone(),
            url: url.into(),
            state: PollState::NotStarted,
        }
    }
}

impl Default for DiveMeetsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls a live-scoring page and tracks the per-tick lifecycle.
pub struct LivePoller {
    client: DiveMeetsClient,
    url: String,
    state: PollState,
}

impl LivePoller {
    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One poll tick: refetch and reparse the page. `ParseFailed` and
    /// `TimedOut` are terminal for the tick, not the loop; the next call
    /// re-enters `Fetching`.
    pub async fn poll_once(&mut self) -> Outcome<LiveResults> {
        self.state = PollState::Fetching;
        let outcome = self.client.get_live_results(&self.url).await;
        self.state = match &outcome {
            Outcome::Parsed(_) => PollState::ParsedOk,
            Outcome::Failed(_) => PollState::ParseFailed,
            Outcome::TimedOut => PollState::TimedOut,
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_deadline_surfaces_timeout() {
        // A fetch that cannot complete within the deadline must report a
        // timeout, distinctly from a parse failure.
        let client = DiveMeetsClient::new().with_timeout(Duration::ZERO);
        let outcome = client.get_profile("12345").await;
        assert!(outcome.is_timed_out());
        assert!(!outcome.is_parsed());
        assert!(!outcome.is_failed());
    }

    #[tokio::test]
    async fn test_poller_state_machine() {
        let client = DiveMeetsClient::new().with_timeout(Duration::ZERO);
        let mut poller = client.live_poller(
            "https://secure.meetcontrol.com/divemeets/system/livestats.php?event=1",
        );
        assert_eq!(poller.state(), PollState::NotStarted);

        let outcome = poller.poll_once().await;
        assert!(outcome.is_timed_out());
        assert_eq!(poller.state(), PollState::TimedOut);
    }

    #[tokio::test]
    async fn test_meet_page_cache_hit_skips_network() {
        // A cached meet page is served even with a deadline no fetch could
        // meet. Stale entries are accepted until explicitly evicted.
        let client = DiveMeetsClient::new().with_timeout(Duration::ZERO);
        let link = "https://secure.meetcontrol.com/divemeets/system/meetinfo.php?meetnum=1";
        client.meet_pages.put(link.to_string(), MeetPageData::default());

        let outcome = client.get_meet_page(link).await;
        assert!(outcome.is_parsed());

        client.evict_meet_page(link);
        assert!(client.get_meet_page(link).await.is_timed_out());
    }
}
