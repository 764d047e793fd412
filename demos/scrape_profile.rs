use divemeets_scraper::rating::{DiveTable, SkillRating};
use divemeets_scraper::{DiveMeetsClient, Outcome};

#[tokio::main]
async fn main() {
    let diver_id = std::env::args().nth(1).unwrap_or_else(|| "51197".to_string());

    let client = DiveMeetsClient::new();
    match client.get_profile(&diver_id).await {
        Outcome::Parsed(profile) => {
            if let Some(info) = &profile.info {
                println!("{} (DiveMeets #{})", info.name(), info.diver_id);
            }

            if let Some(stats) = &profile.dive_statistics {
                println!("{} distinct dives on record", stats.len());

                // An empty table rates every dive at zero; load the real
                // dive-difficulty JSON for meaningful numbers.
                let table = DiveTable::default();
                let summary = SkillRating::new(&table).skill_rating(stats);
                println!(
                    "springboard {:.2}  platform {:.2}  total {:.2}",
                    summary.springboard, summary.platform, summary.total
                );
            }

            if let Some(meets) = &profile.meet_results {
                for meet in meets {
                    println!("{} ({} events)", meet.name, meet.events.len());
                }
            }
        }
        Outcome::Failed(err) => eprintln!("failed to parse profile: {err}"),
        Outcome::TimedOut => eprintln!("request timed out"),
    }
}
