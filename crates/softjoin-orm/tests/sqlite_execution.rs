//! Runs rewritten joins against an in-memory SQLite database.

use std::sync::Arc;

use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

use softjoin_orm::{Builder, JoinKind, Model, SqlValue, TypeRegistry};

#[derive(Model)]
#[model(soft_deletes)]
struct Order;

#[derive(Model)]
struct LineItem;

const SCHEMA: &[&str] = &[
    "CREATE TABLE orders (id INTEGER PRIMARY KEY, status TEXT NOT NULL, deleted_at TEXT)",
    "CREATE TABLE line_items (id INTEGER PRIMARY KEY, order_id INTEGER NOT NULL, qty INTEGER NOT NULL)",
    "INSERT INTO orders (id, status, deleted_at) VALUES \
        (1, 'paid', NULL), (2, 'paid', '2024-03-01 10:00:00'), (3, 'open', NULL)",
    "INSERT INTO line_items (id, order_id, qty) VALUES (10, 1, 1), (20, 2, 2), (30, 3, 3)",
];

async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool
}

fn bind<'q>(
    query: QueryAs<'q, Sqlite, (i64,), SqliteArguments<'q>>,
    value: SqlValue,
) -> QueryAs<'q, Sqlite, (i64,), SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
    }
}

async fn fetch_ids(pool: &SqlitePool, builder: Builder) -> Vec<i64> {
    let (sql, params) = builder.build();
    let mut query = sqlx::query_as::<_, (i64,)>(&sql);
    for value in params {
        query = bind(query, value);
    }
    query
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| panic!("failed to run: {sql}\nError: {e}"))
        .into_iter()
        .map(|(id,)| id)
        .collect()
}

fn line_items() -> Builder {
    let mut registry = TypeRegistry::new();
    registry
        .register::<Order>()
        .unwrap()
        .register::<LineItem>()
        .unwrap();
    Builder::for_model::<LineItem>(Arc::new(registry))
        .columns(&["line_items.id"])
        .order_by("line_items.id")
}

#[tokio::test]
async fn test_inner_join_skips_deleted_orders() {
    let pool = create_test_pool().await;
    let builder = line_items()
        .join("orders", ("orders.id", "=", "line_items.order_id"), JoinKind::Inner, false, false)
        .unwrap();
    assert_eq!(fetch_ids(&pool, builder).await, [10, 30]);
}

#[tokio::test]
async fn test_with_trash_keeps_deleted_orders() {
    let pool = create_test_pool().await;
    let builder = line_items()
        .join("orders", ("orders.id", "=", "line_items.order_id"), JoinKind::Inner, false, true)
        .unwrap();
    assert_eq!(fetch_ids(&pool, builder).await, [10, 20, 30]);
}

#[tokio::test]
async fn test_left_join_keeps_items_of_deleted_orders_unmatched() {
    let pool = create_test_pool().await;
    let builder = line_items()
        .left_join("orders as o", ("o.id", "=", "line_items.order_id"), false)
        .unwrap()
        .where_clause(softjoin_orm::col("o.id").is_null());
    assert_eq!(fetch_ids(&pool, builder).await, [20]);
}

#[tokio::test]
async fn test_filter_join_binds_value() {
    let pool = create_test_pool().await;
    let builder = line_items()
        .join("orders", ("orders.status", "=", "paid"), JoinKind::Inner, true, false)
        .unwrap()
        .where_clause(softjoin_orm::col("orders.id").eq_col(softjoin_orm::col("line_items.order_id")));
    assert_eq!(fetch_ids(&pool, builder).await, [10]);
}
