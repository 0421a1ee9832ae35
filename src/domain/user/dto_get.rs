use serde::Deserialize;
use validator::Validate;

use crate::support::pagination::{DEFAULT_PAGE, MAX_PAGE_SIZE};
use crate::support::{PageRequest, PageRequestError};

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[validate(range(min = 1, message = "page must be ≥ 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "page size must be 1–100"))]
    pub page_size: Option<u32>,
    #[validate(length(min = 1, max = 25, message = "username must be 1–25 characters"))]
    pub username: Option<String>,
}

impl ListUsersQuery {
    /// Applies defaults and bounds the page size by `max_page_size`.
    pub fn page_request(
        &self,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<PageRequest, PageRequestError> {
        PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.page_size.unwrap_or(default_page_size),
            max_page_size.min(MAX_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::pagination::DEFAULT_PAGE_SIZE;

    #[test]
    fn test_defaults_applied() {
        let query = ListUsersQuery::default();
        let request = query.page_request(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 20);
    }

    #[test]
    fn test_zero_page_rejected_at_boundary() {
        let query = ListUsersQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
        assert_eq!(
            query.page_request(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            Err(PageRequestError::PageOutOfRange)
        );
    }

    #[test]
    fn test_page_size_capped_by_configured_max() {
        let query = ListUsersQuery {
            page_size: Some(60),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
        assert!(query.page_request(DEFAULT_PAGE_SIZE, 50).is_err());
    }
}
