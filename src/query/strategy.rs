use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::persistence::{OrderSearch, Page};

// ============================================================================
// Query Strategies
// ============================================================================
//
// | version | strategy       | queries for N orders | pagination |
// |---------|----------------|----------------------|------------|
// | v1      | EntityForced   | 1 + 3N               | no         |
// | v2      | EntityToDto    | 1 + 3N               | no         |
// | v3      | FetchJoin      | 1                    | no         |
// | v3.1    | BatchFetch     | 1 + ceil(N / B)      | yes        |
// | v4      | Projection     | 1 + 1                | yes        |
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Entities, every association force-loaded one order at a time
    EntityForced,
    /// Same traversal as `EntityForced`, mapped to DTOs
    EntityToDto,
    /// Whole graph in one fetch-join
    FetchJoin,
    /// To-one fetch-join plus grouped collection loads
    BatchFetch,
    /// Straight into DTOs, one statement for orders and one for items
    Projection,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::EntityForced,
        Strategy::EntityToDto,
        Strategy::FetchJoin,
        Strategy::BatchFetch,
        Strategy::Projection,
    ];

    /// Path segment the strategy is served under
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::EntityForced => "v1",
            Strategy::EntityToDto => "v2",
            Strategy::FetchJoin => "v3",
            Strategy::BatchFetch => "v3.1",
            Strategy::Projection => "v4",
        }
    }

    pub fn supports_pagination(&self) -> bool {
        matches!(self, Strategy::BatchFetch | Strategy::Projection)
    }

    pub fn supports_search(&self) -> bool {
        matches!(self, Strategy::EntityForced | Strategy::EntityToDto)
    }

    /// Turn raw paging parameters into the page this strategy will read.
    ///
    /// `BatchFetch` always pages (defaults 0 / 100). `Projection` pages only
    /// when asked to. Every other strategy rejects paging parameters.
    pub fn resolve_page(&self, offset: Option<i64>, limit: Option<i64>) -> Result<Option<Page>, AppError> {
        let requested = offset.is_some() || limit.is_some();

        match self {
            Strategy::BatchFetch => Ok(Some(Page::new(
                offset.unwrap_or(0),
                limit.unwrap_or(Page::DEFAULT_LIMIT),
            )?)),
            Strategy::Projection if requested => Ok(Some(Page::new(
                offset.unwrap_or(0),
                limit.unwrap_or(Page::DEFAULT_LIMIT),
            )?)),
            Strategy::Projection => Ok(None),
            _ if requested => Err(AppError::BadRequest(format!(
                "{} does not support pagination",
                self.as_str()
            ))),
            _ => Ok(None),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| AppError::UnknownStrategy(s.to_string()))
    }
}

/// Everything a listing call takes besides the strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub search: OrderSearch,
}

impl ListRequest {
    pub fn page(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn search(search: OrderSearch) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[test]
    fn test_parse_versions() {
        assert_eq!("v1".parse::<Strategy>().unwrap(), Strategy::EntityForced);
        assert_eq!("v3.1".parse::<Strategy>().unwrap(), Strategy::BatchFetch);
        assert_eq!("v4".parse::<Strategy>().unwrap(), Strategy::Projection);
        assert!(matches!("v5".parse::<Strategy>(), Err(AppError::UnknownStrategy(v)) if v == "v5"));

        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_batch_fetch_pages_by_default() {
        assert_eq!(
            Strategy::BatchFetch.resolve_page(None, None).unwrap(),
            Some(Page { offset: 0, limit: 100 })
        );
        assert_eq!(
            Strategy::BatchFetch.resolve_page(Some(10), None).unwrap(),
            Some(Page { offset: 10, limit: 100 })
        );
    }

    #[test]
    fn test_projection_pages_only_on_request() {
        assert_eq!(Strategy::Projection.resolve_page(None, None).unwrap(), None);
        assert_eq!(
            Strategy::Projection.resolve_page(None, Some(5)).unwrap(),
            Some(Page { offset: 0, limit: 5 })
        );
    }

    #[test]
    fn test_paging_rejected_where_unsupported() {
        for strategy in [Strategy::EntityForced, Strategy::EntityToDto, Strategy::FetchJoin] {
            assert!(!strategy.supports_pagination());
            assert_eq!(strategy.resolve_page(None, None).unwrap(), None);
            assert!(matches!(strategy.resolve_page(Some(0), None), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_out_of_range_page_is_bad_request() {
        assert!(matches!(Strategy::BatchFetch.resolve_page(Some(-1), None), Err(AppError::BadRequest(_))));
        assert!(matches!(Strategy::Projection.resolve_page(None, Some(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(Strategy::Projection.resolve_page(None, Some(1001)), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_list_request_builders() {
        let search = OrderSearch { member_name: Some("kim".to_string()), order_status: Some(OrderStatus::Ordered) };
        assert_eq!(ListRequest::search(search.clone()).search, search);
        assert_eq!(ListRequest::page(3, 4).limit, Some(4));
        assert!(Strategy::EntityToDto.supports_search());
        assert!(!Strategy::FetchJoin.supports_search());
    }
}
