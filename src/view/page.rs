use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// One server page of rows plus the total used for page counting
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageResponse<T> {
    Bare(Vec<T>),
    Paged {
        items: Option<Vec<T>>,
        total: Option<u64>,
    },
}

impl<T: DeserializeOwned> Page<T> {
    /// Accepts both `[...]` and `{ items?, total? }`.
    ///
    /// A bare array has no total, so it counts as exactly one page. Older
    /// endpoints still answer that way.
    pub fn from_value(value: Value) -> ClientResult<Self> {
        let response: PageResponse<T> = serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("Unexpected page shape: {}", e)))?;

        Ok(match response {
            PageResponse::Bare(items) => {
                let total = items.len() as u64;
                Page { items, total }
            }
            PageResponse::Paged { items, total } => {
                let items = items.unwrap_or_default();
                let total = total.unwrap_or(items.len() as u64);
                Page { items, total }
            }
        })
    }
}

impl<T> Page<T> {
    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total, page_size)
    }
}

pub fn page_count(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
