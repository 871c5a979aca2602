//! # softjoin-orm
//!
//! Soft-delete aware joins for Rust models.
//!
//! This crate provides:
//! - `Model` trait (and derive) declaring a model's table and whether its
//!   rows are soft-deleted
//! - `TypeRegistry` of the entity types an application knows about
//! - `ModelResolver`, an ordered chain of strategies mapping a table to the
//!   model that owns it
//! - `Builder`, which wraps a `Select` and narrows joins on soft-deletable
//!   tables to rows that are not deleted
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use softjoin_orm::{Builder, JoinOn, Model, TypeRegistry};
//!
//! #[derive(Model)]
//! #[model(soft_deletes)]
//! struct User;
//!
//! #[derive(Model)]
//! struct Post;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<User>()?.register::<Post>()?;
//!
//! let sql = Builder::for_model::<Post>(Arc::new(registry))
//!     .left_join(
//!         "users as authors",
//!         JoinOn::clause(|j| {
//!             j.on("authors.id", "=", "posts.author_id")
//!                 .or_on("authors.id", "=", "posts.editor_id")
//!         }),
//!         false,
//!     )?
//!     .build_sql();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM posts LEFT JOIN users as authors \
//!      ON (authors.id = posts.author_id OR authors.id = posts.editor_id) \
//!      AND authors.deleted_at IS NULL"
//! );
//! # Ok::<(), softjoin_orm::OrmError>(())
//! ```
//!
//! ## Custom Resolution
//!
//! Tables the naming convention cannot map are handed to strategies
//! registered on the builder, in registration order:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use softjoin_orm::{Builder, EntityType, JoinKind, ModelResolver, Select, TypeRegistry};
//!
//! let resolver = ModelResolver::new(Arc::new(TypeRegistry::new()));
//! let mut builder = Builder::new(Select::new("invoices"), resolver);
//! builder.register_resolution_strategy(|table, _owner| {
//!     Ok((table == "tbl_clients")
//!         .then(|| EntityType::new("Client", "tbl_clients").with_soft_deletes()))
//! });
//!
//! let sql = builder
//!     .join("tbl_clients", ("tbl_clients.id", "=", "invoices.client_id"), JoinKind::Inner, false, false)?
//!     .build_sql();
//! assert!(sql.ends_with("AND tbl_clients.deleted_at IS NULL"));
//! # Ok::<(), softjoin_orm::OrmError>(())
//! ```

mod builder;
mod config;
mod error;
pub mod inflector;
mod model;
mod registry;
mod resolver;

pub use builder::Builder;
pub use config::RewriteConfig;
pub use error::{OrmError, Result};
pub use model::{EntityType, Model};
pub use registry::TypeRegistry;
pub use resolver::{
    convention_name, ConventionStrategy, DeclaredTableStrategy, ModelResolver, ResolutionStrategy,
};

pub use softjoin_derive::Model;

// Re-export the query layer the builder wraps
pub use softjoin_core::{
    col, BuildError, Dialect, ExprBuilder, GenericDialect, JoinClause, JoinKind, JoinOn,
    MySqlDialect, RawExpr, Select, SqlValue, TableRef,
};
pub use softjoin_core::builder::split_alias;
