use crate::constants::pagination::PAGE_SIZE;
use crate::errors::ToolError;
use serde::Deserialize;
use std::future::Future;

/// One page of a page-numbered listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub pages: u64,
}

/// Fetches pages `1..=pages` one after another and concatenates their rows.
///
/// The page count is taken from each response, so a listing that grows or
/// shrinks while being read is followed as reported. The first failing fetch
/// aborts the drain and nothing gathered so far is returned.
pub async fn drain<T, F, Fut>(mut fetch_page: F, page_size: usize) -> Result<Vec<T>, ToolError>
where
    F: FnMut(u64, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>, ToolError>>,
{
    let page_size = if page_size == 0 { PAGE_SIZE } else { page_size };
    let mut page = 1u64;
    let mut out = Vec::new();
    loop {
        let response = fetch_page(page, page_size).await?;
        let total_pages = response.pages;
        out.extend(response.rows);
        page += 1;
        if page > total_pages {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn page(rows: Vec<u32>, page: u64, pages: u64) -> Page<u32> {
        Page {
            total: 6,
            rows,
            page,
            pages,
        }
    }

    #[tokio::test]
    async fn three_pages_keep_server_order() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = calls.clone();
        let rows = drain(
            move |n, limit| {
                seen.fetch_add(1, Ordering::SeqCst);
                async move {
                    assert_eq!(limit, 2);
                    Ok(match n {
                        1 => page(vec![1, 2], 1, 3),
                        2 => page(vec![3, 4], 2, 3),
                        _ => page(vec![5, 6], 3, 3),
                    })
                }
            },
            2,
        )
        .await
        .expect("drain");
        assert_eq!(rows, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_listing_requests_one_page() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = calls.clone();
        let rows: Vec<u32> = drain(
            move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                async { Ok(page(Vec::new(), 1, 0)) }
            },
            100,
        )
        .await
        .expect("drain");
        assert!(rows.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_page_aborts_without_partial_rows() {
        let err = drain(
            |n, _| async move {
                if n == 2 {
                    Err(ToolError::remote("page 2 exploded"))
                } else {
                    Ok(page(vec![1], n, 3))
                }
            },
            100,
        )
        .await
        .expect_err("must fail");
        assert_eq!(err.message, "page 2 exploded");
    }

    #[test]
    fn page_tolerates_missing_counters() {
        let parsed: Page<u32> = serde_json::from_value(serde_json::json!({"rows": [1]}))
            .expect("deserialize");
        assert_eq!(parsed.rows, vec![1]);
        assert_eq!(parsed.pages, 0);
    }
}
