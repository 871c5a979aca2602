//! # softjoin-core
//!
//! The query layer soft-delete aware joins are built on.
//!
//! This crate provides:
//! - A SELECT builder whose `join` is the one canonical way to add a join
//! - `JoinClause`, the closure form of a join predicate, which key triples
//!   and filter joins are normalized into
//! - Dialects that render raw SQL fragments such as raw table expressions
//!
//! ## SQL Injection Prevention
//!
//! Values compared in join predicates are bound as parameters:
//!
//! ```rust
//! use softjoin_core::{JoinKind, Select, SqlValue};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = Select::new("users")
//!     .join("orders", ("orders.note", "=", user_input), JoinKind::Inner, true)?
//!     .build();
//!
//! assert_eq!(sql, "SELECT * FROM users INNER JOIN orders ON orders.note = ?");
//! assert_eq!(params, vec![SqlValue::Text(String::from(user_input))]);
//! # Ok::<(), softjoin_core::BuildError>(())
//! ```

pub mod builder;
pub mod dialect;
mod error;

pub use builder::{col, ExprBuilder, JoinClause, JoinKind, JoinOn, Select, SqlValue, TableRef};
pub use dialect::{Dialect, GenericDialect, MySqlDialect, RawExpr};
pub use error::BuildError;
