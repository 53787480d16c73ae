//! Multi-page listing aggregation / 分页聚合
//!
//! Follows continuation tokens until the provider stops returning one.
//! Pages are strictly sequential because each token comes from the
//! previous response.

use crate::error::{ListingError, Result};
use crate::storage::{ObjectStore, RawEntry};

/// Path separator used for server-side grouping / 路径分隔符
pub const DELIMITER: &str = "/";

/// Default page-count safety valve / 默认最大页数
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Drives `list_page` until the listing is complete / 分页器
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    max_pages: Option<usize>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}

impl Paginator {
    /// `max_pages == 0` means no limit / 0 表示不限制
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: (max_pages > 0).then_some(max_pages),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_pages: None }
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    /// Fetch every page of `bucket`/`prefix` / 获取全部分页
    ///
    /// Each page contributes its common prefixes, then its objects. A
    /// failed page discards everything fetched so far.
    pub async fn fetch_all(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::new();
        let mut folders = 0usize;
        let mut files = 0usize;
        let mut pages = 0usize;
        let mut continuation_token: Option<String> = None;

        loop {
            if let Some(max) = self.max_pages {
                if pages >= max {
                    tracing::error!(
                        "Listing {}/{} exceeded {} pages, aborting",
                        bucket,
                        prefix,
                        max
                    );
                    return Err(ListingError::Storage(format!(
                        "pagination exceeded {} pages for {}/{}",
                        max, bucket, prefix
                    )));
                }
            }

            let page = store
                .list_page(bucket, prefix, DELIMITER, continuation_token.as_deref())
                .await?;
            pages += 1;

            folders += page.common_prefixes.len();
            files += page.objects.len();
            entries.extend(page.common_prefixes.into_iter().map(RawEntry::CommonPrefix));
            entries.extend(page.objects.into_iter().map(RawEntry::Object));

            continuation_token = page.next_continuation_token.filter(|t| !t.is_empty());
            match continuation_token {
                Some(_) => tracing::debug!(
                    "Fetched {} folders and {} files so far ({} pages)...",
                    folders,
                    files,
                    pages
                ),
                None => break,
            }
        }

        tracing::info!(
            "Total: {} folders and {} files in {}/{} ({} pages)",
            folders,
            files,
            bucket,
            prefix,
            pages
        );
        Ok(entries)
    }
}
