//! Page-number pagination for the consultation collection.
//!
//! Pagination is requested by a `page` query parameter; `page_size`
//! optionally overrides the configured default. Absent `page`, the collection
//! endpoint returns the full unpaginated list — "pagination requested" is a
//! branch, not an error. A `page` outside the valid range is an error,
//! reported by the handler as 404.

use crate::dto::ConsultaRes;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Recognised pagination query parameters.
///
/// Both values deserialize as raw strings so that a malformed number reaches
/// the handler instead of being rejected by the extractor; `request` decides
/// what the values mean.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number. Absent means "no pagination".
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
    /// Items per page; defaults to the configured page size.
    #[param(value_type = Option<usize>)]
    pub page_size: Option<String>,
}

/// What the query parameters ask for.
#[derive(Clone, Debug, PartialEq)]
pub enum PageRequest {
    /// No `page` parameter: the full unpaginated list.
    Full,
    /// A well-formed page request.
    Page {
        page: u64,
        page_size: Option<usize>,
    },
    /// `page` is present but not a number; reported as an invalid page, the
    /// same as one past the end.
    Invalid,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        let Some(raw) = self.page.as_deref() else {
            return PageRequest::Full;
        };
        let Ok(page) = raw.trim().parse::<u64>() else {
            return PageRequest::Invalid;
        };

        // An unusable page_size falls back to the configured default.
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok());
        PageRequest::Page { page, page_size }
    }
}

/// Paginated envelope for the consultation collection.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedConsultasRes {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<ConsultaRes>,
}

fn page_link(page: u64, explicit_size: Option<usize>) -> String {
    match explicit_size {
        Some(size) => format!("/consultas/api/?page={page}&page_size={size}"),
        None => format!("/consultas/api/?page={page}"),
    }
}

/// Slices `items` down to the requested page.
///
/// Returns `None` when the page number is out of range (0, or past the last
/// page). An empty collection still has a valid page 1.
pub fn paginate(
    items: Vec<ConsultaRes>,
    page: u64,
    page_size: usize,
    explicit_size: Option<usize>,
) -> Option<PaginatedConsultasRes> {
    let count = items.len();
    let total_pages = (count.div_ceil(page_size)).max(1) as u64;

    if page == 0 || page > total_pages {
        return None;
    }

    let start = ((page - 1) as usize) * page_size;
    let results: Vec<ConsultaRes> = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    Some(PaginatedConsultasRes {
        count,
        next: (page < total_pages).then(|| page_link(page + 1, explicit_size)),
        previous: (page > 1).then(|| page_link(page - 1, explicit_size)),
        results,
    })
}
