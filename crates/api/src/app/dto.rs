//! Request shapes owned by the HTTP layer.

use serde::Deserialize;

use pipecrm_core::page::{DEFAULT_PAGE_LIMIT, Page};
use pipecrm_leads::LeadQuery;

/// Signup/login body (form-encoded).
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// `GET /leads` query string. Flattened by hand because the pagination
/// fields arrive alongside the filters in one flat parameter set.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LeadListParams {
    pub fn into_query(self) -> LeadQuery {
        LeadQuery {
            status: self.status.filter(|s| !s.is_empty()),
            search: self.search.filter(|s| !s.is_empty()),
            page: Page::new(
                self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
                self.offset.unwrap_or(0),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let params = LeadListParams {
            status: Some(String::new()),
            search: Some("acme".into()),
            ..LeadListParams::default()
        };
        let query = params.into_query();
        assert!(query.status.is_none());
        assert_eq!(query.search.as_deref(), Some("acme"));
        assert_eq!(query.page.limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn explicit_window_overrides_the_default() {
        let params = LeadListParams {
            limit: Some(10),
            offset: Some(20),
            ..LeadListParams::default()
        };
        let query = params.into_query();
        assert_eq!(query.page.limit, 10);
        assert_eq!(query.page.offset, 20);
    }
}
