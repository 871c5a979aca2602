//! softjoin CLI
//!
//! Command-line tool showing how joins are rewritten for soft-deletable
//! entities.

mod manifest;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use softjoin_orm::{
    split_alias, Builder, DeclaredTableStrategy, Dialect, GenericDialect, JoinKind, JoinOn,
    ModelResolver, MySqlDialect, Select, SqlValue,
};

use crate::manifest::Manifest;

/// Soft-delete aware joins, explained.
#[derive(Parser)]
#[command(name = "softjoin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entity manifest (JSON).
    #[arg(short, long, env = "SOFTJOIN_MANIFEST", default_value = "entities.json")]
    manifest: PathBuf,

    /// SQL dialect used to render raw fragments.
    #[arg(short, long, value_enum, default_value_t = DialectArg::Generic)]
    dialect: DialectArg,

    /// Also resolve tables through the table each entity declares.
    #[arg(long)]
    declared_tables: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Generic,
    Mysql,
}

impl DialectArg {
    fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Generic => Arc::new(GenericDialect::new()),
            Self::Mysql => Arc::new(MySqlDialect::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SELECT a set of joins produces.
    Explain {
        /// Table selected from.
        #[arg(short, long)]
        from: String,

        /// Primary entity of the query (defaults to the one owning `--from`).
        #[arg(long)]
        model: Option<String>,

        /// Join, as `[kind:]table:first op second`
        /// (e.g. `left:orders as o:o.id = line_items.order_id`).
        #[arg(short, long = "join", required = true)]
        joins: Vec<String>,

        /// Bind the right-hand side of each join as a value.
        #[arg(long)]
        filter: bool,

        /// Include soft-deleted rows.
        #[arg(long)]
        with_trash: bool,
    },

    /// Show the entity a table resolves to.
    Resolve {
        /// Table to resolve.
        table: String,
    },

    /// List the entities of the manifest.
    Entities,
}

/// A parsed `--join` argument.
#[derive(Debug, PartialEq, Eq)]
struct JoinSpec {
    kind: JoinKind,
    table: String,
    first: String,
    operator: String,
    second: String,
}

fn parse_join(spec: &str) -> anyhow::Result<JoinSpec> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    let (kind, table, predicate) = match parts.as_slice() {
        [table, predicate] => (JoinKind::Inner, *table, *predicate),
        [kind, table, predicate] => (kind.parse()?, *table, *predicate),
        _ => bail!("join `{spec}` is not `[kind:]table:first op second`"),
    };

    let tokens: Vec<&str> = predicate.split_whitespace().collect();
    let [first, operator @ .., second] = tokens.as_slice() else {
        bail!("join predicate `{predicate}` is not `first op second`");
    };
    if operator.is_empty() {
        bail!("join predicate `{predicate}` has no operator");
    }

    Ok(JoinSpec {
        kind,
        table: table.trim().to_owned(),
        first: (*first).to_owned(),
        operator: operator.join(" "),
        second: (*second).to_owned(),
    })
}

fn resolver(manifest: &Manifest, declared_tables: bool) -> anyhow::Result<ModelResolver> {
    let registry = Arc::new(manifest.registry()?);
    let mut resolver = ModelResolver::new(Arc::clone(&registry));
    if declared_tables {
        resolver.register(DeclaredTableStrategy::new(registry));
    }
    Ok(resolver)
}

/// Describes what a join on `table` resolves to, the way `Builder::join`
/// sees it.
fn describe(builder: &Builder, table: &str) -> anyhow::Result<String> {
    let line = match builder.resolve_table(table)? {
        Some(entity) if entity.supports_soft_delete() => {
            let (_, qualifier) = split_alias(table);
            format!(
                "{table} -> {} (soft deletes on {})",
                entity.qualified_name(),
                entity.qualified_deleted_at(qualifier)
            )
        }
        Some(entity) => format!("{table} -> {}", entity.qualified_name()),
        None => format!("{table} -> no model"),
    };
    Ok(line)
}

fn render(sql: &str, params: &[SqlValue]) -> String {
    let mut out = String::from(sql);
    if !params.is_empty() {
        let inline: Vec<String> = params.iter().map(SqlValue::to_sql_inline).collect();
        out.push_str("\n-- params: ");
        out.push_str(&inline.join(", "));
    }
    out
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let manifest = Manifest::load(&cli.manifest)?;
    debug!(
        entities = manifest.entities.len(),
        path = %cli.manifest.display(),
        "manifest loaded"
    );
    let resolver = resolver(&manifest, cli.declared_tables)?;

    match cli.command {
        Commands::Explain {
            from,
            model,
            joins,
            filter,
            with_trash,
        } => {
            let owner = match model {
                Some(name) => Some(
                    resolver
                        .registry()
                        .get(&name, None)
                        .cloned()
                        .with_context(|| format!("unknown entity `{name}`"))?,
                ),
                None => resolver.resolve(split_alias(&from).0, None)?,
            };

            let query = Select::new(&from).with_dialect(cli.dialect.dialect());
            let mut builder = Builder::new(query, resolver).with_config(manifest.rewrite);
            if let Some(owner) = owner {
                info!(entity = owner.name(), "primary entity");
                builder = builder.with_model(owner);
            }

            for spec in &joins {
                let join = parse_join(spec)?;
                builder = builder.join(
                    join.table,
                    JoinOn::keys(&join.first, &join.operator, &join.second),
                    join.kind,
                    filter,
                    with_trash,
                )?;
            }

            let (sql, params) = builder.build();
            println!("{}", render(&sql, &params));
        }

        Commands::Resolve { table } => {
            let query = Select::new(&table).with_dialect(cli.dialect.dialect());
            let builder = Builder::new(query, resolver).with_config(manifest.rewrite);
            println!("{}", describe(&builder, &table)?);
        }

        Commands::Entities => {
            for entity in resolver.registry().iter() {
                let soft = if entity.supports_soft_delete() {
                    entity.deleted_at()
                } else {
                    "-"
                };
                println!("{:<24} {:<24} {soft}", entity.qualified_name(), entity.table());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_with_kind() {
        let join = parse_join("left:orders as o:o.id = line_items.order_id").unwrap();
        assert_eq!(
            join,
            JoinSpec {
                kind: JoinKind::Left,
                table: String::from("orders as o"),
                first: String::from("o.id"),
                operator: String::from("="),
                second: String::from("line_items.order_id"),
            }
        );
    }

    #[test]
    fn test_parse_join_defaults_to_inner() {
        let join = parse_join("orders:orders.status NOT LIKE draft%").unwrap();
        assert_eq!(join.kind, JoinKind::Inner);
        assert_eq!(join.operator, "NOT LIKE");
        assert_eq!(join.second, "draft%");
    }

    #[test]
    fn test_parse_join_errors() {
        assert!(parse_join("orders").is_err());
        assert!(parse_join("sideways:orders:a = b").is_err());
        assert!(parse_join("orders:a =").is_err());
    }

    fn describe_with(table: &str) -> String {
        let manifest = Manifest::parse(
            r#"{"entities": [
                {"name": "User", "table": "users", "soft_deletes": true},
                {"name": "Tag", "table": "tags"}
            ]}"#,
        )
        .unwrap();
        let builder = Builder::new(Select::new("posts"), resolver(&manifest, false).unwrap())
            .with_config(manifest.rewrite);
        describe(&builder, table).unwrap()
    }

    #[test]
    fn test_describe_matches_join_resolution() {
        assert_eq!(
            describe_with("zusers"),
            "zusers -> User (soft deletes on zusers.deleted_at)"
        );
        assert_eq!(
            describe_with("users as u"),
            "users as u -> User (soft deletes on u.deleted_at)"
        );
        assert_eq!(describe_with("tags t"), "tags t -> Tag");
        assert_eq!(describe_with("audit_log"), "audit_log -> no model");
    }

    #[test]
    fn test_render_params() {
        assert_eq!(render("SELECT 1", &[]), "SELECT 1");
        assert_eq!(
            render("SELECT ?", &[SqlValue::Text(String::from("paid"))]),
            "SELECT ?\n-- params: 'paid'"
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "softjoin",
            "--dialect",
            "mysql",
            "explain",
            "--from",
            "line_items",
            "-j",
            "orders:orders.id = line_items.order_id",
            "--with-trash",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Explain { with_trash: true, ref joins, .. } if joins.len() == 1
        ));
    }
}
