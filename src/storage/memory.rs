//! In-memory object store for tests / 测试用内存存储
//!
//! Emulates ListObjectsV2 delimiter grouping and continuation tokens, and
//! counts every call so tests can assert on network traffic.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ListPage, ObjectData, ObjectEntry, ObjectStore, StoreError};

#[derive(Debug, Clone)]
struct StoredObject {
    size: u64,
    last_modified: Option<DateTime<Utc>>,
    body: Bytes,
}

pub(crate) struct MemoryStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    page_size: usize,
    failure: Mutex<Option<String>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub(crate) fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            failure: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn put(&self, bucket: &str, key: &str, size: u64) {
        let body = Bytes::from(vec![b'x'; size as usize]);
        self.put_body(bucket, key, body);
    }

    pub(crate) fn put_body(&self, bucket: &str, key: &str, body: Bytes) {
        let object = StoredObject {
            size: body.len() as u64,
            last_modified: DateTime::from_timestamp(1_700_000_000, 0),
            body,
        };
        self.buckets
            .lock()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), object);
    }

    /// Make every following call fail with `message`, or heal with None
    pub(crate) fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock() = message.map(str::to_string);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure.lock().as_ref() {
            Some(message) => Err(StoreError::Request(message.clone())),
            None => Ok(()),
        }
    }
}

enum Item {
    Prefix(String),
    Object(ObjectEntry),
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let buckets = self.buckets.lock();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::Request(format!("NoSuchBucket: {}", bucket)))?;

        // 按键顺序合并目录和文件，与S3分页计数方式一致
        let mut items: Vec<Item> = Vec::new();
        for (key, object) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            match rest.find(delimiter).filter(|_| !delimiter.is_empty()) {
                Some(idx) => {
                    let common = format!("{}{}", prefix, &rest[..idx + delimiter.len()]);
                    let duplicate = matches!(items.last(), Some(Item::Prefix(last)) if *last == common);
                    if !duplicate {
                        items.push(Item::Prefix(common));
                    }
                }
                None => items.push(Item::Object(ObjectEntry {
                    key: key.clone(),
                    size: object.size,
                    last_modified: object.last_modified,
                })),
            }
        }

        let start = match continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::Request(format!("InvalidArgument: token {}", token)))?,
            None => 0,
        };
        let total = items.len();
        let end = (start + self.page_size).min(total);

        let mut page = ListPage::default();
        for item in items.into_iter().skip(start).take(end.saturating_sub(start)) {
            match item {
                Item::Prefix(p) => page.common_prefixes.push(p),
                Item::Object(o) => page.objects.push(o),
            }
        }
        if end < total {
            page.next_continuation_token = Some(end.to_string());
        }
        Ok(page)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let buckets = self.buckets.lock();
        let object = buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .ok_or(StoreError::Status {
                operation: "GetObject",
                status: 404,
            })?;

        Ok(ObjectData {
            content_type: Some("text/plain".to_string()),
            body: object.body.clone(),
        })
    }
}
