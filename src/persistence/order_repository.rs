use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite};

use crate::domain::member::Address;
use crate::domain::order::{DeliveryStatus, Order, OrderItem, OrderStatus};
use crate::query::{OrderDto, OrderItemQueryRow, SimpleOrderDto};
use super::association::Assoc;
use super::fetch_plan::{OrderFetchPlan, Page, ToOneShape, WithOrderItems};
use super::member_repository::MemberRepository;
use super::query_log::QueryKind;
use super::rows::{DeliveryRow, OrderGraphRow, OrderItemRow, OrderRow, OrderToOneRow};
use super::UnitOfWork;

// ============================================================================
// Order Repository
// ============================================================================
//
// Owns every statement the listing strategies are built from:
// - root list queries (plain, with to-one joins, full-graph fetch-join)
// - per-order association loads (the N in N+1)
// - grouped IN-clause collection loads
// - direct DTO projections
//
// ============================================================================

/// Upper bound on rows returned by a search
pub const SEARCH_LIMIT: i64 = 1000;

const ORDER_COLUMNS: &str = "o.order_id, o.member_id, o.delivery_id, o.order_date, o.status";

const TO_ONE_COLUMNS: &str = "m.name AS member_name, m.city AS member_city, m.street AS member_street, \
                              m.zipcode AS member_zipcode, d.city AS delivery_city, d.street AS delivery_street, \
                              d.zipcode AS delivery_zipcode, d.status AS delivery_status";

const ORDER_ITEM_COLUMNS: &str = "oi.order_item_id, oi.order_id, oi.order_price, oi.count";

const ITEM_COLUMNS: &str = "i.item_id, i.dtype, i.name AS item_name, i.price AS item_price, i.stock_quantity, \
                            i.author, i.isbn, i.artist, i.etc, i.director, i.actor";

const TO_ONE_JOINS: &str = "JOIN member m ON m.member_id = o.member_id \
                            JOIN delivery d ON d.delivery_id = o.delivery_id";

/// Optional filters for the plain root list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSearch {
    /// Substring match on the member name
    pub member_name: Option<String>,
    pub order_status: Option<OrderStatus>,
}

impl OrderSearch {
    pub fn is_empty(&self) -> bool {
        self.member_name.is_none() && self.order_status.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    pub async fn save_delivery(
        &self,
        uow: &mut UnitOfWork,
        address: &Address,
        status: DeliveryStatus,
    ) -> Result<i64, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("INSERT INTO delivery (city, street, zipcode, status) VALUES (?, ?, ?, ?)")
            .bind(&address.city)
            .bind(&address.street)
            .bind(&address.zipcode)
            .bind(status)
            .execute(uow.conn())
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn save(
        &self,
        uow: &mut UnitOfWork,
        member_id: i64,
        delivery_id: i64,
        order_date: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query(
            "INSERT INTO orders (member_id, delivery_id, order_date, status) VALUES (?, ?, ?, ?)",
        )
        .bind(member_id)
        .bind(delivery_id)
        .bind(order_date)
        .bind(OrderStatus::Ordered)
        .execute(uow.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn save_order_item(
        &self,
        uow: &mut UnitOfWork,
        order_id: i64,
        item_id: i64,
        order_price: i32,
        count: i32,
    ) -> Result<i64, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query(
            "INSERT INTO order_item (order_id, item_id, order_price, count) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item_id)
        .bind(order_price)
        .bind(count)
        .execute(uow.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Flip `ORDERED` to `CANCELLED`. Returns false when the order was not in
    /// `ORDERED` any more, so a cancellation is applied at most once.
    pub async fn mark_cancelled(&self, uow: &mut UnitOfWork, order_id: i64) -> Result<bool, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("UPDATE orders SET status = ? WHERE order_id = ? AND status = ?")
            .bind(OrderStatus::Cancelled)
            .bind(order_id)
            .bind(OrderStatus::Ordered)
            .execute(uow.conn())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn set_delivery_status(
        &self,
        uow: &mut UnitOfWork,
        delivery_id: i64,
        status: DeliveryStatus,
    ) -> Result<bool, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("UPDATE delivery SET status = ? WHERE delivery_id = ?")
            .bind(status)
            .bind(delivery_id)
            .execute(uow.conn())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // ------------------------------------------------------------------------
    // Root queries
    // ------------------------------------------------------------------------

    pub async fn find_one(&self, uow: &mut UnitOfWork, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
        uow.record(QueryKind::Lookup);
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.order_id = ?"
        ))
        .bind(order_id)
        .fetch_optional(uow.conn())
        .await?;

        Ok(row.map(Order::from))
    }

    /// Orders only, every association left unloaded
    pub async fn find_all(&self, uow: &mut UnitOfWork, search: &OrderSearch) -> Result<Vec<Order>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN member m ON m.member_id = o.member_id WHERE 1 = 1"
        ));
        if let Some(status) = search.order_status {
            qb.push(" AND o.status = ").push_bind(status);
        }
        if let Some(name) = &search.member_name {
            qb.push(" AND m.name LIKE ").push_bind(format!("%{}%", name));
        }
        qb.push(" ORDER BY o.order_id LIMIT ").push_bind(SEARCH_LIMIT);

        uow.record(QueryKind::Root);
        let rows = qb.build_query_as::<OrderRow>().fetch_all(uow.conn()).await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Orders with member and delivery fetch-joined; one row per order, so
    /// paging applies to orders directly.
    pub async fn find_with_to_ones<S: ToOneShape>(
        &self,
        uow: &mut UnitOfWork,
        plan: &OrderFetchPlan<S>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ORDER_COLUMNS}, {TO_ONE_COLUMNS} FROM orders o {TO_ONE_JOINS} ORDER BY o.order_id"
        ));
        if let Some(page) = plan.page() {
            qb.push(" LIMIT ").push_bind(page.limit);
            qb.push(" OFFSET ").push_bind(page.offset);
        }

        uow.record(QueryKind::Root);
        let rows = qb.build_query_as::<OrderToOneRow>().fetch_all(uow.conn()).await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Full graph in one statement. Returns one entry per joined row: an order
    /// with N items appears N times. Callers collapse the fan-out.
    pub async fn find_graph_rows(
        &self,
        uow: &mut UnitOfWork,
        _plan: OrderFetchPlan<WithOrderItems>,
    ) -> Result<Vec<(Order, Option<OrderItem>)>, sqlx::Error> {
        uow.record(QueryKind::FetchJoin);
        let rows = sqlx::query_as::<_, OrderGraphRow>(&format!(
            "SELECT {ORDER_COLUMNS}, {TO_ONE_COLUMNS}, oi.order_item_id, oi.order_price, oi.count, {ITEM_COLUMNS} \
             FROM orders o {TO_ONE_JOINS} \
             LEFT JOIN order_item oi ON oi.order_id = o.order_id \
             LEFT JOIN item i ON i.item_id = oi.item_id \
             ORDER BY o.order_id, oi.order_item_id"
        ))
        .fetch_all(uow.conn())
        .await?;

        rows.into_iter().map(OrderGraphRow::into_parts).collect()
    }

    // ------------------------------------------------------------------------
    // Per-order association loads
    // ------------------------------------------------------------------------

    pub async fn load_member(&self, uow: &mut UnitOfWork, order: &mut Order) -> Result<(), sqlx::Error> {
        let member = MemberRepository
            .fetch(uow, order.member_id, QueryKind::LazyMember)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        order.member = Assoc::Loaded(member);
        Ok(())
    }

    pub async fn load_delivery(&self, uow: &mut UnitOfWork, order: &mut Order) -> Result<(), sqlx::Error> {
        uow.record(QueryKind::LazyDelivery);
        let row = sqlx::query_as::<_, DeliveryRow>(
            "SELECT delivery_id, city, street, zipcode, status FROM delivery WHERE delivery_id = ?",
        )
        .bind(order.delivery_id)
        .fetch_one(uow.conn())
        .await?;

        order.delivery = Assoc::Loaded(row.into());
        Ok(())
    }

    pub async fn load_order_items(&self, uow: &mut UnitOfWork, order: &mut Order) -> Result<(), sqlx::Error> {
        uow.record(QueryKind::LazyOrderItems);
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS}, {ITEM_COLUMNS} \
             FROM order_item oi JOIN item i ON i.item_id = oi.item_id \
             WHERE oi.order_id = ? ORDER BY oi.order_item_id"
        ))
        .bind(order.id)
        .fetch_all(uow.conn())
        .await?;

        let items = rows.into_iter().map(OrderItem::try_from).collect::<Result<Vec<_>, _>>()?;
        order.order_items = Assoc::Loaded(items);
        Ok(())
    }

    /// Item collections for a group of parents in one IN-clause statement
    pub async fn find_order_items_in(
        &self,
        uow: &mut UnitOfWork,
        order_ids: &[i64],
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ORDER_ITEM_COLUMNS}, {ITEM_COLUMNS} \
             FROM order_item oi JOIN item i ON i.item_id = oi.item_id \
             WHERE oi.order_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for order_id in order_ids {
            ids.push_bind(*order_id);
        }
        ids.push_unseparated(") ORDER BY oi.order_item_id");

        uow.record(QueryKind::BatchOrderItems);
        let rows = qb.build_query_as::<OrderItemRow>().fetch_all(uow.conn()).await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    // ------------------------------------------------------------------------
    // Direct projections
    // ------------------------------------------------------------------------

    /// Order scalars straight into the response shape, items left empty
    pub async fn find_order_dtos(
        &self,
        uow: &mut UnitOfWork,
        page: Option<Page>,
    ) -> Result<Vec<OrderDto>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT o.order_id, m.name, o.order_date, o.status AS order_status, d.city, d.street, d.zipcode \
             FROM orders o \
             JOIN member m ON m.member_id = o.member_id \
             JOIN delivery d ON d.delivery_id = o.delivery_id \
             ORDER BY o.order_id",
        );
        if let Some(page) = page {
            qb.push(" LIMIT ").push_bind(page.limit);
            qb.push(" OFFSET ").push_bind(page.offset);
        }

        uow.record(QueryKind::Projection);
        qb.build_query_as::<OrderDto>().fetch_all(uow.conn()).await
    }

    pub async fn find_order_item_dtos(
        &self,
        uow: &mut UnitOfWork,
        order_ids: &[i64],
    ) -> Result<Vec<OrderItemQueryRow>, sqlx::Error> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT oi.order_id, i.name AS item_name, oi.order_price, oi.count \
             FROM order_item oi JOIN item i ON i.item_id = oi.item_id \
             WHERE oi.order_id IN (",
        );
        let mut ids = qb.separated(", ");
        for order_id in order_ids {
            ids.push_bind(*order_id);
        }
        ids.push_unseparated(") ORDER BY oi.order_item_id");

        uow.record(QueryKind::ProjectionItems);
        qb.build_query_as::<OrderItemQueryRow>().fetch_all(uow.conn()).await
    }

    pub async fn find_simple_order_dtos(&self, uow: &mut UnitOfWork) -> Result<Vec<SimpleOrderDto>, sqlx::Error> {
        uow.record(QueryKind::Projection);
        sqlx::query_as::<_, SimpleOrderDto>(
            "SELECT o.order_id, m.name, o.order_date, o.status AS order_status, d.city, d.street, d.zipcode \
             FROM orders o \
             JOIN member m ON m.member_id = o.member_id \
             JOIN delivery d ON d.delivery_id = o.delivery_id \
             ORDER BY o.order_id",
        )
        .fetch_all(uow.conn())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{ItemDetails, ItemKind};
    use crate::persistence::{Database, ItemRepository};

    /// Two members, two orders: the first with two lines, the second with one
    async fn seed(db: &Database) -> (i64, i64) {
        let mut uow = db.begin().await.unwrap();
        let kim = MemberRepository.save(&mut uow, "kim", &Address::new("Seoul", "1", "111")).await.unwrap();
        let lee = MemberRepository.save(&mut uow, "lee", &Address::new("Busan", "2", "222")).await.unwrap();

        let kind = ItemKind::Book { author: "a".to_string(), isbn: "i".to_string() };
        let jpa = ItemRepository.save(&mut uow, &ItemDetails::new("JPA", 10000, 10), &kind).await.unwrap();
        let spring = ItemRepository.save(&mut uow, &ItemDetails::new("SPRING", 20000, 10), &kind).await.unwrap();

        let repo = OrderRepository;
        let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();

        let d1 = repo.save_delivery(&mut uow, &Address::new("Seoul", "1", "111"), DeliveryStatus::Ready).await.unwrap();
        let first = repo.save(&mut uow, kim, d1, date).await.unwrap();
        repo.save_order_item(&mut uow, first, jpa, 10000, 1).await.unwrap();
        repo.save_order_item(&mut uow, first, spring, 20000, 2).await.unwrap();

        let d2 = repo.save_delivery(&mut uow, &Address::new("Busan", "2", "222"), DeliveryStatus::Ready).await.unwrap();
        let second = repo.save(&mut uow, lee, d2, date).await.unwrap();
        repo.save_order_item(&mut uow, second, spring, 20000, 3).await.unwrap();

        uow.commit().await.unwrap();
        (first, second)
    }

    #[tokio::test]
    async fn test_find_all_leaves_associations_unloaded() {
        let db = Database::in_memory().await;
        seed(&db).await;
        let mut uow = db.begin().await.unwrap();

        let orders = OrderRepository.find_all(&mut uow, &OrderSearch::default()).await.unwrap();

        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.member.is_unloaded() && o.order_items.is_unloaded()));
        assert_eq!(uow.log().count(QueryKind::Root), 1);
    }

    #[tokio::test]
    async fn test_find_all_applies_search() {
        let db = Database::in_memory().await;
        let (_, second) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;

        let by_name = OrderSearch { member_name: Some("le".to_string()), order_status: None };
        let found = repo.find_all(&mut uow, &by_name).await.unwrap();
        assert_eq!(found.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second]);

        let cancelled = OrderSearch { member_name: None, order_status: Some(OrderStatus::Cancelled) };
        assert!(repo.find_all(&mut uow, &cancelled).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lazy_loads_record_one_query_each() {
        let db = Database::in_memory().await;
        let (first, _) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;

        let mut order = repo.find_one(&mut uow, first).await.unwrap().unwrap();
        repo.load_member(&mut uow, &mut order).await.unwrap();
        repo.load_delivery(&mut uow, &mut order).await.unwrap();
        repo.load_order_items(&mut uow, &mut order).await.unwrap();

        assert_eq!(order.member.get("member").unwrap().name, "kim");
        assert_eq!(order.order_items.get("orderItems").unwrap().len(), 2);
        assert_eq!(order.total_price().unwrap(), 50000);

        let log = uow.log();
        assert_eq!(log.count(QueryKind::LazyMember), 1);
        assert_eq!(log.count(QueryKind::LazyDelivery), 1);
        assert_eq!(log.count(QueryKind::LazyOrderItems), 1);
    }

    #[tokio::test]
    async fn test_fetch_join_fans_out_rows() {
        let db = Database::in_memory().await;
        let (first, second) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();

        let plan = OrderFetchPlan::to_ones().with_order_items();
        let rows = OrderRepository.find_graph_rows(&mut uow, plan).await.unwrap();

        let parents: Vec<_> = rows.iter().map(|(order, _)| order.id).collect();
        assert_eq!(parents, vec![first, first, second]);
        assert!(rows.iter().all(|(_, item)| item.is_some()));
        assert_eq!(uow.log().total(), 1);
    }

    #[tokio::test]
    async fn test_to_one_join_paginates_orders() {
        let db = Database::in_memory().await;
        let (_, second) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();

        let plan = OrderFetchPlan::to_ones().paginate(Page::new(1, 1).unwrap());
        let orders = OrderRepository.find_with_to_ones(&mut uow, &plan).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, second);
        assert_eq!(orders[0].member.get("member").unwrap().name, "lee");
        assert!(orders[0].order_items.is_unloaded());
    }

    #[tokio::test]
    async fn test_find_order_items_in() {
        let db = Database::in_memory().await;
        let (first, second) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;

        let items = repo.find_order_items_in(&mut uow, &[first, second]).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].item.get("item").unwrap().name, "JPA");

        assert!(repo.find_order_items_in(&mut uow, &[]).await.unwrap().is_empty());
        assert_eq!(uow.log().count(QueryKind::BatchOrderItems), 1);
    }

    #[tokio::test]
    async fn test_mark_cancelled_applies_once() {
        let db = Database::in_memory().await;
        let (first, _) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;

        assert!(repo.mark_cancelled(&mut uow, first).await.unwrap());
        assert!(!repo.mark_cancelled(&mut uow, first).await.unwrap());
        assert_eq!(repo.find_one(&mut uow, first).await.unwrap().unwrap().status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_projections() {
        let db = Database::in_memory().await;
        let (first, second) = seed(&db).await;
        let mut uow = db.begin().await.unwrap();
        let repo = OrderRepository;

        let dtos = repo.find_order_dtos(&mut uow, None).await.unwrap();
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].name, "kim");
        assert_eq!(dtos[1].address.city, "Busan");
        assert!(dtos[0].order_items.is_empty());

        let rows = repo.find_order_item_dtos(&mut uow, &[first, second]).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].order_id, second);
        assert_eq!(rows[2].item.count, 3);

        let simple = repo.find_simple_order_dtos(&mut uow).await.unwrap();
        assert_eq!(simple[1].order_status, OrderStatus::Ordered);
    }
}
