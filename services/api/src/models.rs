//! API models for request payloads and query strings

use serde::Deserialize;

/// `?page=&limit=`. Signed so out-of-range values clamp instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for photo listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Comma-separated tag filter
    pub tags: Option<String>,
    pub search: Option<String>,
    pub user_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub photo_ids: Vec<u64>,
}
