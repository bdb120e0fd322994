use reqwest::Client;

use crate::{Result, BASE_URL};

// TODO: back off and retry when the site answers 429.

/// Requests one page of a book's paginated review listing.
/// The endpoint answers with a JS payload, not an HTML document.
pub(crate) async fn fetch_review_list_page(
    client: &Client,
    book_id: u64,
    page: usize,
) -> Result<String> {
    let res = client
        .get(format!("{BASE_URL}/book/reviews/{book_id}?page={page}"))
        .send()
        .await?
        .error_for_status()?;
    let payload = res.text().await?;
    Ok(payload)
}

/// Requests a single review page and returns its HTML.
pub(crate) async fn fetch_review(client: &Client, review_id: u64) -> Result<String> {
    let res = client
        .get(format!("{BASE_URL}/review/show/{review_id}"))
        .send()
        .await?
        .error_for_status()?;
    let html = res.text().await?;
    Ok(html)
}
