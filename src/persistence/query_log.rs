use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Query Log - counts every statement issued inside one unit of work
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    /// Parent list query (orders, optionally with to-one joins)
    Root,
    /// Per-order member load
    LazyMember,
    /// Per-order delivery load
    LazyDelivery,
    /// Per-order item collection load
    LazyOrderItems,
    /// Grouped IN-clause item collection load
    BatchOrderItems,
    /// Fetch-join across the whole order graph
    FetchJoin,
    /// Direct DTO projection of order scalars
    Projection,
    /// Item rows for projected orders
    ProjectionItems,
    /// Single-entity lookup outside listing strategies
    Lookup,
    Write,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Root => "root",
            QueryKind::LazyMember => "lazy_member",
            QueryKind::LazyDelivery => "lazy_delivery",
            QueryKind::LazyOrderItems => "lazy_order_items",
            QueryKind::BatchOrderItems => "batch_order_items",
            QueryKind::FetchJoin => "fetch_join",
            QueryKind::Projection => "projection",
            QueryKind::ProjectionItems => "projection_items",
            QueryKind::Lookup => "lookup",
            QueryKind::Write => "write",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryLog {
    counts: BTreeMap<QueryKind, u64>,
}

impl QueryLog {
    pub fn record(&mut self, kind: QueryKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: QueryKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QueryKind, u64)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}
