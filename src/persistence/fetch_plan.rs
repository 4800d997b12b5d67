use std::marker::PhantomData;

// ============================================================================
// Fetch Plans - which associations a fetch-join materializes
// ============================================================================
//
// A plan starts with the to-one joins (member, delivery). From there it can
// either be paginated or take the single collection join (order items), not
// both, and nothing joins a second collection. Those shapes simply have no
// method that would build them.
//
// ============================================================================

pub const MAX_PAGE_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidPage {
    #[error("offset must not be negative, got {0}")]
    NegativeOffset(i64),

    #[error("limit must be between 1 and {max}, got {0}", max = MAX_PAGE_LIMIT)]
    LimitOutOfRange(i64),
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;

    pub fn new(offset: i64, limit: i64) -> Result<Self, InvalidPage> {
        if offset < 0 {
            return Err(InvalidPage::NegativeOffset(offset));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(InvalidPage::LimitOutOfRange(limit));
        }
        Ok(Self { offset, limit })
    }
}

/// Member and delivery joined, no paging
#[derive(Debug)]
pub struct Unpaged;

/// Member and delivery joined, one page of parents
#[derive(Debug)]
pub struct Paged;

/// Member, delivery and the order item collection joined
#[derive(Debug)]
pub struct WithOrderItems;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Unpaged {}
    impl Sealed for super::Paged {}
}

/// Plans whose result rows map one-to-one onto orders
pub trait ToOneShape: sealed::Sealed {}
impl ToOneShape for Unpaged {}
impl ToOneShape for Paged {}

#[derive(Debug)]
pub struct OrderFetchPlan<S> {
    page: Option<Page>,
    _shape: PhantomData<S>,
}

impl<S> OrderFetchPlan<S> {
    pub fn page(&self) -> Option<Page> {
        self.page
    }
}

impl OrderFetchPlan<Unpaged> {
    pub fn to_ones() -> Self {
        Self { page: None, _shape: PhantomData }
    }

    pub fn paginate(self, page: Page) -> OrderFetchPlan<Paged> {
        OrderFetchPlan { page: Some(page), _shape: PhantomData }
    }

    pub fn with_order_items(self) -> OrderFetchPlan<WithOrderItems> {
        OrderFetchPlan { page: None, _shape: PhantomData }
    }
}
