use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt, task::spawn_blocking};

use crate::batch::run_batched;
use crate::memo::MemoCache;
use crate::parse::{self, ParsedReview};
use crate::progress::Progress;
use crate::request;
use crate::{log_time, Result, REVIEWS_PER_PAGE};

pub struct ScrapeOptions {
    pub book_id: u64,
    /// How many review pages one concurrent wave fetches.
    pub batch_size: usize,
    /// Stop after this many listing pages. 0 means no limit.
    pub page_limit: usize,
    pub output: PathBuf,
}

/// Drives the whole scrape: collect the book's review ids off the listing,
/// fetch and parse every review in bounded waves, aggregate the timelines and
/// write the report.
pub async fn scrape_book(progress: &Progress, opts: ScrapeOptions) -> Result<()> {
    let start_time = Local::now();
    let client = Client::new();

    log_time!("Collecting review ids for book {}", opts.book_id);
    let review_ids = collect_review_ids(&client, progress, &opts).await?;
    log_time!(start_time, "Collected {} review ids", review_ids.len());

    let fetch_time = Local::now();
    let reviews = fetch_reviews(&client, progress, review_ids, opts.batch_size).await?;
    progress.clear();
    log_time!(fetch_time, "Fetched {} reviews", reviews.len());

    let report = render_report(aggregate_updates(&reviews));
    let mut file = File::create(&opts.output).await?;
    file.write_all(report.as_bytes()).await?;
    log_time!(start_time, "Wrote the report to {}", opts.output.display());

    Ok(())
}

/// Pages through the listing endpoint until it reports the last page (or the
/// configured limit) and returns the deduplicated review ids in the order the
/// listing served them.
async fn collect_review_ids(
    client: &Client,
    progress: &Progress,
    opts: &ScrapeOptions,
) -> Result<Vec<u64>> {
    let bar = progress.add_bar(1, "listing pages", "📖");

    let mut ids = Vec::new();
    let mut page = 1;
    loop {
        let payload = request::fetch_review_list_page(client, opts.book_id, page).await?;
        let parsed = spawn_blocking(move || parse::review_ids(&payload)).await??;

        // The payload knows the total, the bar length only firms up here.
        if let Some(total) = parsed.total_reviews() {
            bar.set_length(total.div_ceil(REVIEWS_PER_PAGE) as u64);
        }
        ids.extend(parsed.review_ids);
        bar.inc(1);

        if parsed.is_last_page || (opts.page_limit > 0 && page >= opts.page_limit) {
            break;
        }
        page += 1;
    }
    bar.finish_and_clear();

    // Pages reshuffle while we walk them, so ids can repeat across pages.
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

/// Fetches and parses every review in waves of `batch_size`, memoizing per
/// review id so a duplicate that slipped through costs nothing.
async fn fetch_reviews(
    client: &Client,
    progress: &Progress,
    review_ids: Vec<u64>,
    batch_size: usize,
) -> Result<Vec<ParsedReview>> {
    let bar = progress.add_bar(review_ids.len() as u64, "reviews", "🔍");
    let cache = MemoCache::new();

    let reviews = run_batched(
        |review_id: u64| {
            let client = client.clone();
            let bar = bar.clone();
            let cache = &cache;
            async move {
                let review = cache
                    .get_or_compute(&review_id.to_string(), || async {
                        let html = request::fetch_review(&client, review_id).await?;
                        spawn_blocking(move || parse::review(&html)).await?
                    })
                    .await?;
                bar.inc(1);
                Ok(review)
            }
        },
        review_ids,
        batch_size,
    )
    .await?;

    bar.finish_and_clear();
    Ok(reviews)
}

/// Folds the per-review timelines into one map per book: date -> event.
/// The first event seen for a date wins.
fn aggregate_updates(reviews: &[ParsedReview]) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut books: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for review in reviews {
        let timeline = books.entry(review.book_url.clone()).or_default();
        for (date, event) in &review.updates {
            timeline
                .entry(date.clone())
                .or_insert_with(|| event.clone());
        }
    }
    books
}

/// Renders one section per book, rows sorted chronologically.
fn render_report(books: BTreeMap<String, BTreeMap<String, String>>) -> String {
    let mut out = String::new();
    for (book_url, timeline) in books {
        out.push_str(&book_url);
        out.push('\n');

        let mut rows: Vec<(String, String)> = timeline.into_iter().collect();
        rows.sort_by_key(|(date, _)| parse_update_date(date));
        for (date, event) in rows {
            out.push_str(&format!("{date:<20} | {event}\n"));
        }
        out.push('\n');
    }
    out
}

/// Dates that don't parse sort last.
fn parse_update_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%B %d, %Y").unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_with(book_url: &str, updates: &[(&str, &str)]) -> ParsedReview {
        ParsedReview {
            book_url: book_url.to_string(),
            updates: updates
                .iter()
                .map(|(date, event)| (date.to_string(), event.to_string()))
                .collect(),
        }
    }

    #[test]
    fn aggregation_groups_by_book_and_keeps_first_event_per_date() {
        let reviews = vec![
            review_with("book/a", &[("March 26, 2019", "Started Reading")]),
            review_with("book/b", &[("May 1, 2020", "Shelved as: to-read")]),
            review_with("book/a", &[("March 26, 2019", "Shelved")]),
        ];

        let books = aggregate_updates(&reviews);
        assert_eq!(books.len(), 2);
        assert_eq!(books["book/a"]["March 26, 2019"], "Started Reading");
        assert_eq!(books["book/b"]["May 1, 2020"], "Shelved as: to-read");
    }

    #[test]
    fn report_rows_are_sorted_chronologically() {
        // "April 2, 2019" sorts before "March 26, 2019" lexicographically,
        // the report has to order them by the parsed date instead.
        let reviews = vec![review_with(
            "book/a",
            &[
                ("April 2, 2019", "Finished Reading"),
                ("March 26, 2019", "Started Reading"),
                ("sometime later", "Shelved"),
            ],
        )];

        let report = render_report(aggregate_updates(&reviews));
        let started = report.find("Started Reading").unwrap();
        let finished = report.find("Finished Reading").unwrap();
        let shelved = report.find("Shelved").unwrap();
        assert!(started < finished);
        assert!(finished < shelved);
    }

    #[test]
    fn report_has_one_section_per_book() {
        let reviews = vec![
            review_with("book/a", &[("March 26, 2019", "Started Reading")]),
            review_with("book/b", &[("May 1, 2020", "Finished Reading")]),
        ];

        let report = render_report(aggregate_updates(&reviews));
        assert!(report.contains("book/a\n"));
        assert!(report.contains("book/b\n"));
    }
}
