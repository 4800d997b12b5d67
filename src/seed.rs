use std::sync::Arc;

use crate::domain::item::{ItemCommand, ItemCommandHandler, ItemDetails, ItemKind};
use crate::domain::member::{Address, MemberCommand, MemberCommandHandler};
use crate::domain::order::{OrderCommand, OrderCommandHandler, OrderLine};
use crate::error::AppError;
use crate::metrics::Metrics;
use crate::persistence::Database;

// ============================================================================
// Demo Data
// ============================================================================
//
// userA (Seoul) orders JPA1 x1 and JPA2 x2
// userB (Busan) orders SPRING1 x3 and SPRING2 x4
//
// Every book starts with 100 units. Goes through the command handlers, so
// the seeded state obeys the same rules as live traffic.
//
// ============================================================================

const STOCK: i32 = 100;

/// Returns false when the database already holds members and nothing was seeded.
pub async fn seed_demo_data(db: &Database, metrics: Arc<Metrics>) -> Result<bool, AppError> {
    let members = MemberCommandHandler::new(db.clone());
    let items = ItemCommandHandler::new(db.clone());
    let orders = OrderCommandHandler::new(db.clone(), metrics);

    if !members.find_members().await?.is_empty() {
        tracing::info!("Database already populated, skipping demo data");
        return Ok(false);
    }

    let user_a = register(&members, "userA", Address::new("Seoul", "1", "1111")).await?;
    let jpa1 = book(&items, "JPA1 BOOK", 10000).await?;
    let jpa2 = book(&items, "JPA2 BOOK", 20000).await?;
    place(&orders, user_a, &[(jpa1, 1), (jpa2, 2)]).await?;

    let user_b = register(&members, "userB", Address::new("Busan", "2", "2222")).await?;
    let spring1 = book(&items, "SPRING1 BOOK", 20000).await?;
    let spring2 = book(&items, "SPRING2 BOOK", 40000).await?;
    place(&orders, user_b, &[(spring1, 3), (spring2, 4)]).await?;

    tracing::info!("🌱 Demo data seeded: 2 members, 4 books, 2 orders");
    Ok(true)
}

async fn register(handler: &MemberCommandHandler, name: &str, address: Address) -> Result<i64, AppError> {
    handler
        .handle(MemberCommand::Register { name: name.to_string(), address })
        .await
}

async fn book(handler: &ItemCommandHandler, name: &str, price: i32) -> Result<i64, AppError> {
    handler
        .handle(ItemCommand::Save {
            details: ItemDetails::new(name, price, STOCK),
            kind: ItemKind::Book { author: String::new(), isbn: String::new() },
        })
        .await
}

async fn place(handler: &OrderCommandHandler, member_id: i64, lines: &[(i64, i32)]) -> Result<i64, AppError> {
    let lines = lines
        .iter()
        .map(|&(item_id, count)| OrderLine { item_id, count })
        .collect();
    handler.handle(OrderCommand::PlaceOrder { member_id, lines }).await
}
