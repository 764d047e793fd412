pub mod entries;
pub mod event;
pub mod live;
pub mod meet_page;
pub mod meets;
pub mod profile;

pub(crate) use ::scraper::Html;
use ::scraper::{ElementRef, Selector};
use tracing::debug;

use crate::error::{DiveMeetsError, Result};

/// Root of every relative link scraped off the results site.
pub const LEADING_LINK: &str = "https://secure.meetcontrol.com/divemeets/system/";

/// Profile page URL for a DiveMeets number.
pub fn profile_url(diver_id: &str) -> String {
    format!("{LEADING_LINK}profile.php?number={diver_id}")
}

/// Fetch a URL and parse the response body as an HTML document.
pub(crate) async fn get_document(client: &reqwest::Client, url: &str) -> Result<Html> {
    debug!(url, "fetching page");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DiveMeetsError::Http {
            url: url.to_owned(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiveMeetsError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| DiveMeetsError::ResponseBody {
            url: url.to_owned(),
            source: e,
        })?;

    Ok(Html::parse_document(&body))
}

/// Extract trimmed text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .and_then(|d| d.text().map(|t| t.trim()).find(|t| !t.is_empty()))
        .unwrap_or_default()
        .trim()
        .replace(['\n', '\t'], "")
        .to_string()
}

/// Space-joined trimmed text runs of an element's subtree, matching how the
/// site's label strings read when rendered.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a scraped href against the fixed site root.
pub(crate) fn resolve_link(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{LEADING_LINK}{href}")
    }
}

/// Resolved href of the first matching anchor inside `element`.
pub(crate) fn first_href(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(resolve_link)
}
