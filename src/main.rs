use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use revscrape::process::{scrape_book, ScrapeOptions};
use revscrape::{log_time, Progress};

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// Book id whose reviews are scraped
    book_id: u64,

    /// How many review pages one concurrent wave fetches
    #[arg(short, long, default_value_t = 10)]
    batch_size: usize,

    /// Stop after this many listing pages (0 = no limit)
    #[arg(short, long, default_value_t = 0)]
    page_limit: usize,

    /// Where the aggregated report is written
    #[arg(short, long, default_value = "review_updates.txt")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let progress = Progress::new();
    progress.install_interrupt_handler();

    let start_time = Local::now();
    let opts = ScrapeOptions {
        book_id: args.book_id,
        batch_size: args.batch_size,
        page_limit: args.page_limit,
        output: args.output,
    };

    match scrape_book(&progress, opts).await {
        Ok(()) => log_time!(start_time, "Full program time:"),
        Err(error) => progress.fail(&error),
    }
}
