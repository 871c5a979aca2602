//! Query builder.
//!
//! # Example
//!
//! ```rust
//! use softjoin_core::builder::{JoinKind, JoinOn, Select};
//!
//! let (sql, params) = Select::new("line_items")
//!     .join(
//!         "orders",
//!         JoinOn::clause(|j| {
//!             j.on("orders.id", "=", "line_items.order_id")
//!                 .where_null("orders.deleted_at")
//!         }),
//!         JoinKind::Inner,
//!         false,
//!     )?
//!     .build();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM line_items INNER JOIN orders \
//!      ON orders.id = line_items.order_id AND orders.deleted_at IS NULL"
//! );
//! assert!(params.is_empty());
//! # Ok::<(), softjoin_core::BuildError>(())
//! ```

mod expr;
mod join;
mod select;
pub mod value;

pub use expr::{check_operator, col, Column, ExprBuilder};
pub use join::{split_alias, JoinClause, JoinKind, JoinOn, TableRef};
pub use select::{Join, Select};
pub use value::{SqlValue, ToSqlValue};
