//! Review reading-timeline scraper.
//!
//! Pages through a book's review listing, pulls the reading timeline out of
//! every review page and aggregates the updates into a per-book report.

mod batch;
mod error;
mod macros;
mod memo;
pub mod parse;
pub mod process;
mod progress;
mod request;

pub use batch::run_batched;
pub use error::{Error, Result};
pub use memo::MemoCache;
pub use progress::Progress;

const BASE_URL: &str = "https://www.goodreads.com";
/// The listing endpoint serves at most this many reviews per page.
const REVIEWS_PER_PAGE: usize = 30;
