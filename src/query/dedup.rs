use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::domain::order::{Order, OrderItem};
use crate::persistence::Assoc;

/// Drop later duplicates by key, keeping the first occurrence in place.
pub fn distinct_by_key<T, K, F>(rows: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        if seen.insert(key(&row)) {
            out.push(row);
        }
    }
    out
}

/// Bucket children under their parent key, keeping row order inside each bucket.
pub fn group_by_parent<T, F>(children: impl IntoIterator<Item = T>, parent: F) -> HashMap<i64, Vec<T>>
where
    F: Fn(&T) -> i64,
{
    let mut groups: HashMap<i64, Vec<T>> = HashMap::new();
    for child in children {
        groups.entry(parent(&child)).or_default().push(child);
    }
    groups
}

/// Collapse fetch-join fan-out into one order per primary key. Orders keep
/// first-seen position; each one's collection holds the children from every
/// row that repeated it.
pub fn collapse_order_graph(rows: Vec<(Order, Option<OrderItem>)>) -> Vec<Order> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut orders: Vec<Order> = Vec::new();

    for (order, child) in rows {
        let position = *index.entry(order.id).or_insert_with(|| {
            let mut order = order;
            order.order_items = Assoc::Loaded(Vec::new());
            orders.push(order);
            orders.len() - 1
        });

        if let (Some(child), Assoc::Loaded(items)) = (child, &mut orders[position].order_items) {
            if !items.iter().any(|existing| existing.id == child.id) {
                items.push(child);
            }
        }
    }

    orders
}
