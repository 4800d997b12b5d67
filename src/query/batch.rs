use std::num::NonZeroUsize;

use crate::domain::order::Order;
use crate::persistence::{Assoc, OrderRepository, UnitOfWork};
use super::dedup::{distinct_by_key, group_by_parent};

// ============================================================================
// Batch Fetcher - grouped IN-clause loading of order item collections
// ============================================================================
//
// Distinct parent ids are split into chunks of `batch_size` and each chunk
// costs exactly one statement, so N parents take ceil(N / batch_size) loads.
// Parents without items still end up with a loaded, empty collection.
//
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct BatchFetcher {
    batch_size: NonZeroUsize,
}

impl BatchFetcher {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Load the item collection of every order. Returns the number of grouped
    /// statements issued.
    pub async fn resolve_order_items(
        &self,
        repo: &OrderRepository,
        uow: &mut UnitOfWork,
        orders: &mut [Order],
    ) -> Result<usize, sqlx::Error> {
        let parent_ids = distinct_by_key(orders.iter().map(|order| order.id), |id| *id);

        let mut batches = 0;
        let mut children = Vec::new();
        for chunk in parent_ids.chunks(self.batch_size.get()) {
            children.extend(repo.find_order_items_in(uow, chunk).await?);
            batches += 1;
        }

        tracing::debug!(
            parents = parent_ids.len(),
            batch_size = self.batch_size.get(),
            batches = batches,
            "Resolved order items in batches"
        );

        let mut groups = group_by_parent(children, |item| item.order_id);
        for order in orders.iter_mut() {
            let items = groups.remove(&order.id).unwrap_or_default();
            order.order_items = Assoc::Loaded(items);
        }

        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{ItemDetails, ItemKind};
    use crate::domain::member::Address;
    use crate::domain::order::DeliveryStatus;
    use crate::persistence::{Database, ItemRepository, MemberRepository, OrderFetchPlan, QueryKind};

    /// `orders` orders, the last one without any lines
    async fn seed(db: &Database, orders: usize) {
        let mut uow = db.begin().await.unwrap();
        let address = Address::new("Seoul", "1", "1");
        let member = MemberRepository.save(&mut uow, "kim", &address).await.unwrap();
        let kind = ItemKind::Book { author: "a".to_string(), isbn: "i".to_string() };
        let item = ItemRepository.save(&mut uow, &ItemDetails::new("JPA", 1000, 100), &kind).await.unwrap();

        let repo = OrderRepository;
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        for n in 0..orders {
            let delivery = repo.save_delivery(&mut uow, &address, DeliveryStatus::Ready).await.unwrap();
            let order = repo.save(&mut uow, member, delivery, date).await.unwrap();
            if n + 1 < orders {
                repo.save_order_item(&mut uow, order, item, 1000, 1).await.unwrap();
                repo.save_order_item(&mut uow, order, item, 1000, 2).await.unwrap();
            }
        }
        uow.commit().await.unwrap();
    }

    async fn run(db: &Database, batch_size: usize) -> (Vec<Order>, usize, u64) {
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;
        let mut orders = repo.find_with_to_ones(&mut uow, &OrderFetchPlan::to_ones()).await.unwrap();

        let fetcher = BatchFetcher::new(NonZeroUsize::new(batch_size).unwrap());
        let batches = fetcher.resolve_order_items(&repo, &mut uow, &mut orders).await.unwrap();
        let logged = uow.log().count(QueryKind::BatchOrderItems);
        (orders, batches, logged)
    }

    #[tokio::test]
    async fn test_batches_are_ceil_of_parents_over_size() {
        let db = Database::in_memory().await;
        seed(&db, 7).await;

        for (size, expected) in [(1, 7), (3, 3), (7, 1), (100, 1)] {
            let (_, batches, logged) = run(&db, size).await;
            assert_eq!(batches, expected, "batch size {}", size);
            assert_eq!(logged, expected as u64);
        }
    }

    #[tokio::test]
    async fn test_every_parent_gets_its_collection() {
        let db = Database::in_memory().await;
        seed(&db, 4).await;

        let (orders, _, _) = run(&db, 2).await;

        let counts: Vec<_> = orders
            .iter()
            .map(|o| o.order_items.get("orderItems").unwrap().len())
            .collect();
        assert_eq!(counts, vec![2, 2, 2, 0]);
        assert!(orders
            .iter()
            .all(|o| o.order_items.get("orderItems").unwrap().iter().all(|line| line.order_id == o.id)));
        assert!(orders
            .iter()
            .flat_map(|o| o.order_items.get("orderItems").unwrap())
            .all(|line| line.item.is_loaded()));
    }

    #[tokio::test]
    async fn test_no_parents_no_statements() {
        let db = Database::in_memory().await;
        let (orders, batches, logged) = run(&db, 10).await;

        assert!(orders.is_empty());
        assert_eq!(batches, 0);
        assert_eq!(logged, 0);
    }
}
