//! Meet index parsing.
//!
//! The site's index page carries a navigation menu whose tabs are matched by
//! literal label: everything between the "Upcoming" tab and the next
//! recognized tab is an organization sub-page to fetch and parse, while the
//! current-meets sidebar is parsed off the index page itself (the "Current"
//! tab's own page is not reliable).

use ::scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::model::{CurrentMeet, MeetBody, MeetLinkBody};
use crate::scraper::{element_text, resolve_link, LEADING_LINK};

pub(crate) fn index_url() -> String {
    format!("{LEADING_LINK}index.php")
}

pub const TAB_UPCOMING: &str = "Upcoming";
pub const TAB_CURRENT: &str = "Current";
pub const TAB_PAST: &str = "Past Results & Photos";

/// Current meets default their country; the sidebar never renders one.
const CURRENT_MEET_COUNTRY: &str = "US";

/// One link from the index page's navigation menu.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTab {
    pub label: String,
    pub link: String,
}

/// The work an index page implies: which organization pages to fetch for
/// upcoming meets, and whether the sidebar holds current meets.
#[derive(Debug, Default)]
pub struct IndexWalk {
    pub org_tabs: Vec<IndexTab>,
    pub parse_current: bool,
}

/// Menu tabs in document order.
pub fn parse_index_tabs(document: &Html) -> Result<Vec<IndexTab>> {
    let menu = Selector::parse("#dm_menu_centered ul li a[href]")?;
    Ok(document
        .select(&menu)
        .map(|a| IndexTab {
            label: element_text(&a),
            link: a.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect())
}

/// Walk tabs in document order, matching the recognized labels literally.
/// Tabs after "Upcoming" are organization links until "Current" or
/// "Past Results & Photos" ends the walk.
pub fn plan_index_walk(tabs: Vec<IndexTab>) -> IndexWalk {
    let mut walk = IndexWalk::default();
    let mut in_upcoming = false;

    for tab in tabs {
        if tab.label == TAB_PAST {
            break;
        }
        if tab.label == TAB_UPCOMING {
            in_upcoming = true;
            continue;
        }
        if tab.label == TAB_CURRENT {
            walk.parse_current = true;
            break;
        }
        if in_upcoming {
            walk.org_tabs.push(tab);
        }
    }

    walk
}

/// Meet rows from an organization's upcoming-meets page.
pub fn parse_org_meets(document: &Html) -> Option<Vec<MeetBody>> {
    let content_sel = Selector::parse("#dm_content").ok()?;
    let tr = Selector::parse("tr").ok()?;
    let td = Selector::parse("td").ok()?;
    let bg = Selector::parse("[bgcolor]").ok()?;
    let div = Selector::parse("div").ok()?;
    let anchor = Selector::parse("a[href]").ok()?;

    let content = document.select(&content_sel).next()?;

    let mut result = Vec::new();
    for row in content.select(&tr) {
        // Meet rows are the colored ones.
        let marked = row.value().attr("bgcolor").is_some()
            || row.select(&bg).any(|e| !element_text(&e).is_empty());
        if !marked || element_text(&row).is_empty() {
            continue;
        }

        // The logo cell is aligned; data cells are top-anchored.
        let cols: Vec<ElementRef> = row
            .select(&td)
            .filter(|col| {
                col.value().attr("align").is_none() && col.value().attr("valign") == Some("top")
            })
            .collect();
        if cols.len() < 6 {
            continue;
        }

        let meet_data = &cols[0];
        let start_date = element_text(&cols[1]);
        let end_date = element_text(&cols[2]);
        let city = element_text(&cols[3]);
        let state = element_text(&cols[4]);
        let country = element_text(&cols[5]);

        // Past meets put the name in a div and link a "Results" anchor;
        // upcoming meets link the name itself.
        let divs: Vec<ElementRef> = meet_data.select(&div).collect();
        let mut name = divs.first().map(element_text).unwrap_or_default();
        let mut link = None;

        for a in meet_data.select(&anchor) {
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            if href.starts_with("meet") {
                if divs.is_empty() {
                    name = element_text(&a);
                }
                link = Some(resolve_link(href));
                break;
            }
        }

        if let Some(link) = link {
            result.push(MeetBody {
                name,
                link,
                start_date,
                end_date,
                city,
                state,
                country,
            });
        }
    }

    Some(result)
}

/// Current meets from the homepage sidebar: one nested table per meet, with
/// the info link always present and a results link once an event has
/// finished. City/state split on the first comma, dates on the dash, country
/// defaulted.
pub fn parse_current_meets(document: &Html) -> Option<Vec<CurrentMeet>> {
    let content_sel = Selector::parse("#dm_content").ok()?;
    let div = Selector::parse("div").ok()?;
    let table = Selector::parse("table").ok()?;
    let td = Selector::parse("td").ok()?;
    let anchor = Selector::parse("a[href]").ok()?;

    let content = document.select(&content_sel).next()?;
    let sidebar = content.select(&div).nth(3)?;
    let current_table = sidebar.select(&table).next()?;

    let mut result = Vec::new();
    for row in current_table.select(&table) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.len() < 4 {
            return None;
        }

        let name = element_text(&cells[0]);
        let info_link = cells[0]
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(resolve_link)?;
        let results_link = cells[1]
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(resolve_link);

        let location = element_text(&cells[2]);
        let comma = location.find(',')?;
        let city = location.get(..comma)?.to_string();
        let state = location.get(comma + 2..)?.to_string();

        let dates = element_text(&cells[3]);
        let dash = dates.find('-')?;
        let year_comma = dates.find(',')?;
        let start_date = format!(
            "{}{}",
            dates.get(..dash)?.trim(),
            dates.get(year_comma..)?
        );
        let end_date = dates.get(dash + 2..)?.to_string();

        let body = |link: String| MeetLinkBody {
            link,
            start_date: start_date.clone(),
            end_date: end_date.clone(),
            city: city.clone(),
            state: state.clone(),
            country: CURRENT_MEET_COUNTRY.to_string(),
        };

        result.push(CurrentMeet {
            name,
            info: body(info_link),
            results: results_link.map(body),
        });
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(label: &str) -> IndexTab {
        IndexTab {
            label: label.to_string(),
            link: format!("https://example.com/{label}"),
        }
    }

    #[test]
    fn test_plan_index_walk_collects_org_tabs() {
        let walk = plan_index_walk(vec![
            tab("Home"),
            tab(TAB_UPCOMING),
            tab("AAU Diving"),
            tab("USA Diving"),
            tab(TAB_CURRENT),
            tab("ignored"),
        ]);
        assert_eq!(
            walk.org_tabs.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
            vec!["AAU Diving", "USA Diving"]
        );
        assert!(walk.parse_current);
    }

    #[test]
    fn test_plan_index_walk_without_upcoming_tab() {
        // No "Upcoming" tab: no org pages to fetch, which the caller turns
        // into an empty (not missing) upcoming-meets mapping.
        let walk = plan_index_walk(vec![tab("Home"), tab(TAB_PAST), tab("AAU Diving")]);
        assert!(walk.org_tabs.is_empty());
        assert!(!walk.parse_current);
    }

    #[test]
    fn test_parse_index_tabs_in_document_order() {
        let document = Html::parse_document(
            "<html><body><div id=\"dm_menu_centered\"><ul>\
             <li><a href=\"index.php\">Home</a></li>\
             <li><a href=\"#\">Upcoming</a></li>\
             <li><a href=\"https://secure.meetcontrol.com/divemeets/system/org.php?id=2\">AAU Diving</a></li>\
             </ul></div></body></html>",
        );
        let tabs = parse_index_tabs(&document).unwrap();
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].label, "Home");
        assert_eq!(tabs[2].label, "AAU Diving");
        assert!(tabs[2].link.ends_with("org.php?id=2"));
    }

    #[test]
    fn test_parse_org_meets() {
        let document = Html::parse_document(
            "<html><body><div id=\"dm_content\"><table>\
             <tr><td>header noise</td></tr>\
             <tr bgcolor=\"#cccccc\">\
             <td align=\"center\"><img src=\"logo.png\"></td>\
             <td valign=\"top\"><a href=\"meetinfo.php?meetnum=8642\">Spring Invitational</a></td>\
             <td valign=\"top\">May 26, 2023</td>\
             <td valign=\"top\">May 29, 2023</td>\
             <td valign=\"top\">Mason</td>\
             <td valign=\"top\">OH</td>\
             <td valign=\"top\">US</td>\
             </tr>\
             <tr bgcolor=\"#eeeeee\">\
             <td align=\"center\"></td>\
             <td valign=\"top\"><div>Fall Classic</div><a href=\"meetresults.php?meetnum=8001\">Results</a></td>\
             <td valign=\"top\">Oct 1, 2022</td>\
             <td valign=\"top\">Oct 2, 2022</td>\
             <td valign=\"top\">Columbus</td>\
             <td valign=\"top\">OH</td>\
             <td valign=\"top\">US</td>\
             </tr>\
             </table></div></body></html>",
        );
        let meets = parse_org_meets(&document).unwrap();
        assert_eq!(meets.len(), 2);
        assert_eq!(meets[0].name, "Spring Invitational");
        assert!(meets[0].link.ends_with("meetinfo.php?meetnum=8642"));
        assert_eq!(meets[0].start_date, "May 26, 2023");
        assert_eq!(meets[0].state, "OH");
        // Past meets take the name from the div, not the "Results" anchor.
        assert_eq!(meets[1].name, "Fall Classic");
        assert!(meets[1].link.ends_with("meetresults.php?meetnum=8001"));
    }

    #[test]
    fn test_parse_current_meets() {
        let document = Html::parse_document(
            "<html><body><div id=\"dm_content\">\
             <div>a</div><div>b</div><div>c</div>\
             <div><table><tbody>\
             <tr><td>\
             <table><tr>\
             <td><a href=\"meetinfo.php?meetnum=9001\">Summer Regional</a></td>\
             <td><a href=\"meetresults.php?meetnum=9001\">Results</a></td>\
             <td>Moultrie, GA</td>\
             <td>May 26 - May 29, 2023</td>\
             </tr></table>\
             </td></tr>\
             <tr><td>\
             <table><tr>\
             <td><a href=\"meetinfo.php?meetnum=9002\">City Championship</a></td>\
             <td></td>\
             <td>Mason, OH</td>\
             <td>Jun 2 - Jun 3, 2023</td>\
             </tr></table>\
             </td></tr>\
             </tbody></table></div>\
             </div></body></html>",
        );
        let meets = parse_current_meets(&document).unwrap();
        assert_eq!(meets.len(), 2);

        let first = &meets[0];
        assert_eq!(first.name, "Summer Regional");
        assert!(first.info.link.ends_with("meetinfo.php?meetnum=9001"));
        assert_eq!(first.info.city, "Moultrie");
        assert_eq!(first.info.state, "GA");
        assert_eq!(first.info.country, "US");
        assert_eq!(first.info.start_date, "May 26, 2023");
        assert_eq!(first.info.end_date, "May 29, 2023");
        assert!(first
            .results
            .as_ref()
            .is_some_and(|r| r.link.ends_with("meetresults.php?meetnum=9001")));

        // No finished events yet: info link only.
        assert!(meets[1].results.is_none());
    }
}
