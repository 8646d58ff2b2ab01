//! Lead listing filters.

use pipecrm_core::Page;

use crate::lead::Lead;

/// Filter + pagination for `GET /leads`.
///
/// `status` is an exact match; `search` is a case-insensitive substring
/// test OR-combined across first name, last name, company and email.
/// Built by the HTTP layer from query-string parameters.
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Page,
}

impl LeadQuery {
    /// Filter predicate shared by the in-memory store and tests. Ownership
    /// scoping happens before this is applied.
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = &self.status {
            if lead.status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let mut haystacks = [
                Some(lead.first_name.as_str()),
                Some(lead.last_name.as_str()),
                lead.company.as_deref(),
                lead.email.as_deref(),
            ]
            .into_iter()
            .flatten();

            if !haystacks.any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }

        true
    }
}
