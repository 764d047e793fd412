//! Diver/coach profile page parsing.
//!
//! A profile page is one big table cell whose inner HTML strings together
//! identity text, team affiliations, and several history tables, separated
//! only by runs of `<br>` tags. The cell is split on those runs, each
//! fragment is classified by a literal content marker, and a dedicated
//! parser handles each section. Section parsers fail soft: a malformed
//! section comes back `None` while its siblings parse normally.

use std::collections::{HashMap, HashSet};

use ::scraper::{ElementRef, Html, Selector};
use regex::Regex;
use tracing::warn;

use crate::error::{DiveMeetsError, Result};
use crate::model::{
    DiveStatistic, DiverInfo, ParseReport, ProfileData, ProfileInfo, ProfileMeet,
    ProfileMeetEvent, Team,
};
use crate::scraper::{element_text, first_href, resolve_link};

// The page separates profile sections with runs of line breaks of different
// lengths, and history tables with a table close followed by a double break.
const SECTION_BREAK: &str = "<br><br><br><br>";
const TOP_BREAK: &str = "<br><br><br>";
const TEAM_BREAK: &str = "<br><br>";
const TABLE_BREAK: &str = "</table><br><br>";

// Content markers that route a fragment to its section parser.
const MARKER_IDENTITY: &str = "DiveMeets #";
const MARKER_DIVING: &str = "<strong>Diving:</strong>";
const MARKER_COACHING: &str = "<strong>Coaching:</strong>";
const MARKER_UPCOMING: &str = "Upcoming Meets";
const MARKER_MEET_RESULTS: &str = "<span style=\"color: blue\">DIVE</span>";
const MARKER_DIVE_STATISTICS: &str = "Dive Statistics";
const MARKER_COACH_DIVERS: &str = "<center>";
const MARKER_JUDGING: &str = "Judging History";
const MARKER_IMAGE: &str = "img src=";

// Identity field labels as rendered inside <strong> tags.
pub const LABEL_NAME: &str = "Name:";
pub const LABEL_CITY_STATE: &str = "City/State:";
pub const LABEL_STATE: &str = "State:";
pub const LABEL_COUNTRY: &str = "Country:";
pub const LABEL_GENDER: &str = "Gender:";
pub const LABEL_AGE: &str = "Age:";
pub const LABEL_FINA_AGE: &str = "FINA Age:";
pub const LABEL_HS_GRAD: &str = "High School Graduation:";
pub const LABEL_DIVER_ID: &str = "DiveMeets #:";

const HEADER_DIVING: &str = "Diving:";
const HEADER_COACHING: &str = "Coaching:";
const HEADER_COACH: &str = "Coach:";

/// The closed set of profile page sections a fragment can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Identity,
    Diving,
    Coaching,
    UpcomingMeets,
    MeetResults,
    DiveStatistics,
    CoachDivers,
    JudgingHistory,
    Unknown,
}

/// Classify a profile fragment by its literal content markers, checked in
/// the same order the site lays sections out.
pub fn classify_section(fragment: &str) -> SectionKind {
    if fragment.contains(MARKER_IDENTITY) {
        SectionKind::Identity
    } else if fragment.contains(MARKER_DIVING) {
        SectionKind::Diving
    } else if fragment.contains(MARKER_COACHING) {
        SectionKind::Coaching
    } else if fragment.contains(MARKER_UPCOMING) {
        SectionKind::UpcomingMeets
    } else if fragment.contains(MARKER_MEET_RESULTS) {
        SectionKind::MeetResults
    } else if fragment.contains(MARKER_DIVE_STATISTICS) {
        SectionKind::DiveStatistics
    } else if fragment.contains(MARKER_COACH_DIVERS) {
        SectionKind::CoachDivers
    } else if fragment.contains(MARKER_JUDGING) {
        SectionKind::JudgingHistory
    } else {
        SectionKind::Unknown
    }
}

/// Parse a full profile page into its section aggregate.
///
/// Fails hard only when the page has no body cell at all; every section
/// inside parses independently and fails soft.
pub fn parse_profile(document: &Html) -> Result<ProfileData> {
    let td = Selector::parse("td")?;
    let cell = document
        .select(&td)
        .next()
        .ok_or(DiveMeetsError::ElementNotFound {
            context: "profile body cell",
        })?;

    // Stray spacing between tags sometimes breaks the <br>-run splits.
    let html = cell.inner_html().replace("> <", "><");

    let mut data = ProfileData::default();
    for fragment in split_sections(&html) {
        let kind = classify_section(&fragment);
        match kind {
            SectionKind::Identity => data.info = parse_info(&fragment, &mut data.report),
            SectionKind::Diving => data.diving = parse_diving(&fragment),
            SectionKind::Coaching => data.coaching = parse_coaching(&fragment),
            SectionKind::UpcomingMeets => data.upcoming_meets = parse_upcoming_meets(&fragment),
            SectionKind::MeetResults => data.meet_results = parse_meet_results(&fragment),
            SectionKind::DiveStatistics => {
                data.dive_statistics = parse_dive_statistics(&fragment);
            }
            SectionKind::CoachDivers => data.coach_divers = parse_coach_divers(&fragment),
            SectionKind::JudgingHistory => data.judging = parse_judging_history(&fragment),
            SectionKind::Unknown => continue,
        }
        if !data.has_section(kind) {
            warn!(?kind, "profile section failed to parse");
        }
    }

    Ok(data)
}

impl ProfileData {
    fn has_section(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Identity => self.info.is_some(),
            SectionKind::Diving => self.diving.is_some(),
            SectionKind::Coaching => self.coaching.is_some(),
            SectionKind::UpcomingMeets => self.upcoming_meets.is_some(),
            SectionKind::MeetResults => self.meet_results.is_some(),
            SectionKind::DiveStatistics => self.dive_statistics.is_some(),
            SectionKind::CoachDivers => self.coach_divers.is_some(),
            SectionKind::JudgingHistory => self.judging.is_some(),
            SectionKind::Unknown => true,
        }
    }
}

/// Split the body cell's inner HTML into classifiable fragments: the top
/// block separates identity from team text, the rest split at table
/// boundaries. Fragments holding only images are dropped.
fn split_sections(html: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();

    for (i, block) in html.split(SECTION_BREAK).enumerate() {
        if i == 0 {
            let mut top = block.splitn(2, TOP_BREAK);
            if let Some(identity) = top.next() {
                sections.push(identity.to_string());
            }
            if let Some(teams) = top.next() {
                sections.extend(teams.split(TEAM_BREAK).map(str::to_string));
            }
        } else {
            sections.extend(block.split(TABLE_BREAK).map(str::to_string));
        }
    }

    sections.retain(|s| !s.trim().is_empty() && !s.contains(MARKER_IMAGE));
    sections
}

/// Wrap loose text runs that end at a `<br>` into `<div>` elements, so that
/// label/value pairs walk uniformly regardless of whether the site wrapped
/// the value. Used for identity text.
fn wrap_info_text(text: &str) -> String {
    wrap_loose_text(text, r"[A-Za-z0-9\s&;:,./#'()-]+<br>", 0, |trimmed| {
        format!("<div>{trimmed}</div><br>")
    })
}

/// Wrap loose text runs that start after a `<br>` into `<div>` elements.
/// Used for team affiliation text.
fn wrap_team_text(text: &str) -> String {
    wrap_loose_text(text, r"<br>[A-Za-z0-9\s&;:,./#'()-]+", 4, |trimmed| {
        format!("<br><div>{trimmed}</div>")
    })
}

fn wrap_loose_text(
    text: &str,
    pattern: &str,
    min_len: usize,
    wrap: impl Fn(&str) -> String,
) -> String {
    let Ok(regex) = Regex::new(pattern) else {
        return text.to_string();
    };

    let mut result = text.to_string();
    let mut seen: HashSet<&str> = HashSet::new();
    for m in regex.find_iter(text) {
        let raw = m.as_str();
        if seen.contains(raw) {
            continue;
        }
        let trimmed = raw.trim().replace("&nbsp;", "").replace("<br>", "");
        let trimmed = trimmed.trim();
        if trimmed.len() > min_len {
            result = result.replace(raw, &wrap(trimmed));
            seen.insert(raw);
        }
    }
    result
}

/// Walkable top-level elements of a body-context fragment.
fn fragment_elements(document: &Html) -> Vec<(String, String, ElementRef<'_>)> {
    document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .map(|el| (el.value().name().to_string(), element_text(&el), el))
        .filter(|(_, text, _)| !text.is_empty())
        .collect()
}

/// Parse the identity block into labeled fields.
///
/// The block renders in a couple of layouts depending on which optional
/// labels the profile carries, so values are collected generically as
/// `<strong>label</strong>` / `<div>value</div>` pairs and assigned by label
/// afterwards. The report records every label that was found. Returns `None`
/// when the diver ID label is missing, the one field every parseable
/// profile has.
pub fn parse_info(fragment: &str, report: &mut ParseReport) -> Option<ProfileInfo> {
    // Trailing break so the last loose value wraps too.
    let wrapped = wrap_info_text(&format!("{fragment}<br>"));
    let document = Html::parse_fragment(&wrapped);

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut last_key = String::new();
    for (name, text, _) in fragment_elements(&document) {
        match name.as_str() {
            "strong" => last_key = text,
            "div" => fields.push((last_key.clone(), text)),
            _ => {}
        }
    }

    assign_info_fields(&fields, report)
}

fn assign_info_fields(fields: &[(String, String)], report: &mut ParseReport) -> Option<ProfileInfo> {
    let mut first = String::new();
    let mut last = String::new();
    let mut city_state = None;
    let mut country = None;
    let mut gender = None;
    let mut age = None;
    let mut fina_age = None;
    let mut diver_id = None;
    let mut hs_grad_year = None;

    for (key, value) in fields {
        match key.as_str() {
            LABEL_NAME => {
                report.record(LABEL_NAME);
                let comps: Vec<&str> = value.split_whitespace().collect();
                if let Some((l, rest)) = comps.split_last() {
                    first = rest.join(" ");
                    last = (*l).to_string();
                }
            }
            LABEL_CITY_STATE => {
                report.record(LABEL_CITY_STATE);
                city_state = Some(value.clone());
            }
            LABEL_STATE => {
                report.record(LABEL_STATE);
                city_state = Some(value.clone());
            }
            LABEL_COUNTRY => {
                report.record(LABEL_COUNTRY);
                country = Some(value.clone());
            }
            LABEL_GENDER => {
                report.record(LABEL_GENDER);
                gender = Some(value.clone());
            }
            LABEL_AGE => {
                report.record(LABEL_AGE);
                age = value.parse().ok();
            }
            LABEL_FINA_AGE => {
                report.record(LABEL_FINA_AGE);
                fina_age = value.parse().ok();
            }
            LABEL_HS_GRAD => {
                report.record(LABEL_HS_GRAD);
                hs_grad_year = value.trim().parse().ok();
            }
            LABEL_DIVER_ID => {
                report.record(LABEL_DIVER_ID);
                diver_id = Some(value.clone());
            }
            _ => {}
        }
    }

    Some(ProfileInfo {
        first,
        last,
        city_state,
        country,
        gender,
        age,
        fina_age,
        diver_id: diver_id?,
        hs_grad_year,
    })
}

/// Teams this person dives for, keyed by organization.
pub fn parse_diving(fragment: &str) -> Option<HashMap<String, Team>> {
    parse_teams(fragment, HEADER_DIVING, true)
}

/// Teams this person coaches, keyed by organization. The linked coach is the
/// profiled person, so no coach name is recorded.
pub fn parse_coaching(fragment: &str) -> Option<HashMap<String, Team>> {
    parse_teams(fragment, HEADER_COACHING, false)
}

fn parse_teams(fragment: &str, header: &str, with_coach_name: bool) -> Option<HashMap<String, Team>> {
    let document = Html::parse_fragment(&wrap_team_text(fragment));
    let mut result = HashMap::new();

    let mut key = String::new();
    let mut team_name = String::new();
    for (name, text, el) in fragment_elements(&document) {
        if text == header {
            continue;
        }
        match name.as_str() {
            "strong" => key = text.strip_suffix(':').unwrap_or(&text).to_string(),
            "div" => {
                if !(with_coach_name && text.contains(HEADER_COACH)) {
                    team_name = text;
                }
            }
            "a" => {
                let href = el.value().attr("href").unwrap_or_default();
                let coach_name = if with_coach_name {
                    // Rendered "Last First"; rotate the trailing component to
                    // the front for display order.
                    let comps: Vec<&str> = text.split(' ').collect();
                    let (first, rest) = comps.split_last()?;
                    format!("{} {}", first, rest.join(" "))
                } else {
                    String::new()
                };
                result.insert(
                    key.clone(),
                    Team {
                        name: team_name.clone(),
                        coach_name,
                        coach_link: resolve_link(href),
                    },
                );
            }
            _ => {}
        }
    }

    Some(result)
}

/// Registered upcoming meets with per-event sheet links.
pub fn parse_upcoming_meets(fragment: &str) -> Option<Vec<ProfileMeet>> {
    let anchor = Selector::parse("a").ok()?;
    parse_grouped_meets(fragment, Some(MARKER_UPCOMING), 3, |cells| {
        let name = element_text(&cells[0]);
        let link = first_href(&cells[2], &anchor)?;
        Some(ProfileMeetEvent {
            name,
            link,
            place: None,
            score: None,
        })
    })
}

/// Completed meets with per-event place, score, and result-sheet link.
pub fn parse_meet_results(fragment: &str) -> Option<Vec<ProfileMeet>> {
    let anchor = Selector::parse("a").ok()?;
    parse_grouped_meets(fragment, None, 3, |cells| {
        let name = element_text(&cells[0]);
        let place = element_text(&cells[1]).parse().ok();
        let score = element_text(&cells[2]).parse().ok();
        let link = first_href(&cells[2], &anchor)?;
        Some(ProfileMeetEvent {
            name,
            link,
            place,
            score,
        })
    })
}

/// Meets judged, with per-event sheet links.
pub fn parse_judging_history(fragment: &str) -> Option<Vec<ProfileMeet>> {
    let anchor = Selector::parse("a").ok()?;
    parse_grouped_meets(fragment, Some(MARKER_JUDGING), 2, |cells| {
        let name = element_text(&cells[0]);
        let link = first_href(&cells[1], &anchor)?;
        Some(ProfileMeetEvent {
            name,
            link,
            place: None,
            score: None,
        })
    })
}

/// Shared row-grouping convention of the profile history tables: a
/// single-cell row is a new meet-name header, a multi-cell row is an event
/// under the most recent header. Fails fast: one malformed event row drops
/// the whole section.
fn parse_grouped_meets(
    fragment: &str,
    skip_header: Option<&str>,
    min_cells: usize,
    parse_event: impl Fn(&[ElementRef]) -> Option<ProfileMeetEvent>,
) -> Option<Vec<ProfileMeet>> {
    let document = Html::parse_fragment(&fragment.replace("&nbsp;", ""));
    let tr = Selector::parse("tr").ok()?;
    let td = Selector::parse("td").ok()?;

    let mut result = Vec::new();
    let mut last_name = String::new();
    let mut current: Option<ProfileMeet> = None;

    for row in document.select(&tr) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.is_empty() {
            return None;
        }

        if cells.len() == 1 {
            let text = element_text(&cells[0]);
            if skip_header == Some(text.as_str()) {
                continue;
            }
            if let Some(meet) = current.take() {
                result.push(meet);
            }
            last_name = text;
            continue;
        }

        if cells.len() < min_cells {
            return None;
        }

        let event = parse_event(&cells)?;
        current
            .get_or_insert_with(|| ProfileMeet {
                name: last_name.clone(),
                events: Vec::new(),
            })
            .events
            .push(event);
    }

    if let Some(meet) = current {
        result.push(meet);
    }

    Some(result)
}

/// The dive-statistics table: one row per distinct dive number, recognized
/// by the row background-color attribute. Every row must carry exactly six
/// cells; a malformed row drops the whole section.
pub fn parse_dive_statistics(fragment: &str) -> Option<Vec<DiveStatistic>> {
    let document = Html::parse_fragment(fragment);
    let row_selector = Selector::parse("tr[bgcolor]").ok()?;
    let td = Selector::parse("td").ok()?;
    let anchor = Selector::parse("a").ok()?;

    let mut result = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.len() != 6 {
            return None;
        }

        let number = element_text(&cells[0]);
        let height_text = element_text(&cells[1]);
        // Height renders with a trailing unit letter ("3M").
        let mut height_chars = height_text.chars();
        height_chars.next_back()?;
        let height: f64 = height_chars.as_str().parse().ok()?;
        let name = element_text(&cells[2]);
        let high_score: f64 = element_text(&cells[3]).parse().ok()?;
        let high_score_link = first_href(&cells[3], &anchor)?;
        let avg_score: f64 = element_text(&cells[4]).parse().ok()?;
        let avg_score_link = first_href(&cells[4], &anchor)?;
        let number_of_times: u32 = element_text(&cells[5]).parse().ok()?;

        result.push(DiveStatistic {
            number,
            name,
            height,
            high_score,
            high_score_link,
            avg_score,
            avg_score_link,
            number_of_times,
        });
    }

    Some(result)
}

/// A coach's diver roster: anchor list with "Last, First" names.
pub fn parse_coach_divers(fragment: &str) -> Option<Vec<DiverInfo>> {
    let document = Html::parse_fragment(fragment);
    let anchor = Selector::parse("a").ok()?;

    let mut result = Vec::new();
    for link in document.select(&anchor) {
        let href = link.value().attr("href")?;
        let text = element_text(&link);
        let comps: Vec<&str> = text.splitn(2, ", ").collect();
        let first = comps.last()?.trim().to_string();
        let last = comps.first()?.trim().to_string();
        result.push(DiverInfo {
            first,
            last,
            link: resolve_link(href),
        });
    }

    Some(result)
}
