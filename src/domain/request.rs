use serde::{Deserialize, Serialize};

/// Paging parameters accepted by the listing endpoints. Absent values mean
/// "everything".
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    #[serde(rename = "responsePerPage")]
    pub response_per_page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(-1)
    }

    pub fn response_per_page(&self) -> i64 {
        self.response_per_page.unwrap_or(-1)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page<T> {
    pub page: i64,
    pub total: i64,
    #[serde(rename = "responsePerPage")]
    pub response_per_page: i64,
    pub records: Vec<T>,
}
