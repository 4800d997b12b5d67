use sqlx::SqlitePool;

// Single-table item inheritance: `dtype` is B (book), A (album) or M (movie).
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS member (
    member_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    city        TEXT NOT NULL,
    street      TEXT NOT NULL,
    zipcode     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS item (
    item_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    dtype           TEXT NOT NULL,
    name            TEXT NOT NULL,
    price           INTEGER NOT NULL,
    stock_quantity  INTEGER NOT NULL CHECK (stock_quantity >= 0),
    author          TEXT,
    isbn            TEXT,
    artist          TEXT,
    etc             TEXT,
    director        TEXT,
    actor           TEXT
);

CREATE TABLE IF NOT EXISTS delivery (
    delivery_id INTEGER PRIMARY KEY AUTOINCREMENT,
    city        TEXT NOT NULL,
    street      TEXT NOT NULL,
    zipcode     TEXT NOT NULL,
    status      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    order_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id   INTEGER NOT NULL REFERENCES member (member_id),
    delivery_id INTEGER NOT NULL UNIQUE REFERENCES delivery (delivery_id),
    order_date  TEXT NOT NULL,
    status      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_item (
    order_item_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id        INTEGER NOT NULL REFERENCES orders (order_id),
    item_id         INTEGER NOT NULL REFERENCES item (item_id),
    order_price     INTEGER NOT NULL,
    count           INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_member ON orders (member_id);
CREATE INDEX IF NOT EXISTS idx_order_item_order ON order_item (order_id);
"#;

pub async fn apply(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("Database schema ready");
    Ok(())
}
