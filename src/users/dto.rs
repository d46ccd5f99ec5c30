use serde::Serialize;

use crate::users::repo_types::User;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

/// Effective paging window for `GET /users`.
///
/// Bad input never fails the request: a `limit` that is not a positive
/// integer keeps the default, one above [`MAX_LIMIT`] is clamped, and a
/// negative or non-numeric `offset` keeps 0. Only the first occurrence of a
/// repeated parameter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn from_query(params: &[(String, String)]) -> Self {
        let first = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.parse::<i64>().ok())
        };

        let mut page = Self::default();
        if let Some(limit) = first("limit").filter(|l| *l >= 1) {
            page.limit = limit.min(MAX_LIMIT);
        }
        if let Some(offset) = first("offset").filter(|o| *o >= 0) {
            page.offset = offset;
        }
        page
    }
}
