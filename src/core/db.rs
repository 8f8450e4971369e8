// database connections and write execution
// supports postgres, sqlite, and mysql

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sqlx::{AnyPool, Executor, any::AnyPoolOptions};

use super::outcome::WriteOutcome;
use super::params::PlaceholderSource;
use super::placeholders;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Sqlite,
    Mysql,
}

impl Dialect {
    // figure out dialect from connection string
    pub fn detect(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Dialect::Postgres
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Dialect::Mysql
        } else {
            Dialect::Sqlite
        }
    }
}

pub struct Db {
    name: String,
    pool: AnyPool,
    dialect: Dialect,
    mutable: bool,
}

impl Db {
    pub async fn connect(name: &str, url: &str) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();

        let dialect = Dialect::detect(url);

        // every in-memory sqlite connection is its own database, so keep exactly one alive
        let options = if dialect == Dialect::Sqlite && is_memory(url) {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            AnyPoolOptions::new().max_connections(5)
        };

        let pool = options.connect(url).await?;
        tracing::debug!(name, ?dialect, "connected");

        Ok(Self {
            name: name.to_string(),
            pool,
            dialect,
            mutable: !is_read_only(dialect, url),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    // user tables, sorted by name
    pub async fn tables(&self) -> Result<Vec<String>, Error> {
        let sql = match self.dialect {
            Dialect::Postgres => {
                r#"SELECT table_name::text FROM information_schema.tables
                   WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
                   ORDER BY table_name"#
            }
            Dialect::Sqlite => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
            Dialect::Mysql => {
                r#"SELECT table_name FROM information_schema.tables
                   WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'
                   ORDER BY table_name"#
            }
        };

        let rows: Vec<(String,)> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Run a write statement, binding `values` to its `:name` placeholders.
    ///
    /// Values are bound as text; a placeholder with no value binds NULL.
    pub async fn execute_write(
        &self,
        sql: &str,
        values: &HashMap<String, String>,
    ) -> Result<WriteOutcome, Error> {
        let rewritten = match placeholders::rewrite(sql, self.dialect) {
            Ok(r) => r,
            // let the database word the error
            Err(Error::InvalidStatement(_)) => placeholders::Rewritten {
                sql: sql.to_string(),
                binds: Vec::new(),
            },
            Err(e) => return Err(e),
        };

        let mut query = sqlx::query(&rewritten.sql);
        for name in &rewritten.binds {
            query = query.bind(values.get(name).cloned());
        }

        let result = query.execute(&self.pool).await?;
        tracing::info!(
            database = %self.name,
            rows_affected = result.rows_affected(),
            "write executed"
        );

        Ok(WriteOutcome::new(sql, result.rows_affected()))
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

impl PlaceholderSource for Db {
    // scan the text, then have the database prepare it so bad sql shows up here
    async fn placeholders(&self, sql: &str) -> Result<Vec<String>, Error> {
        if sql.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rewritten = placeholders::rewrite(sql, self.dialect)?;

        (&self.pool)
            .prepare(rewritten.sql.as_str())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) => Error::InvalidStatement(db.message().to_string()),
                other => Error::Database(other),
            })?;

        Ok(rewritten.names())
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn is_read_only(dialect: Dialect, url: &str) -> bool {
    if dialect != Dialect::Sqlite {
        return false;
    }
    let query = url.split_once('?').map_or("", |(_, q)| q);
    query
        .split('&')
        .any(|pair| pair == "mode=ro" || pair == "immutable=1" || pair == "immutable=true")
}

/// One `--db` argument: `name=url`, or a bare url whose name is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSpec {
    pub name: String,
    pub url: String,
}

impl FromStr for DatabaseSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidDatabaseSpec(s.to_string()));
        }

        if let Some((name, url)) = s.split_once('=') {
            if is_name(name) {
                if url.is_empty() {
                    return Err(Error::InvalidDatabaseSpec(s.to_string()));
                }
                return Ok(Self {
                    name: name.to_string(),
                    url: url.to_string(),
                });
            }
        }

        let name = name_from_url(s).ok_or_else(|| Error::InvalidDatabaseSpec(s.to_string()))?;
        Ok(Self {
            name,
            url: s.to_string(),
        })
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// sqlite:data/test.db?mode=rwc -> test, postgres://host/app -> app
fn name_from_url(url: &str) -> Option<String> {
    let path = url.split_once('?').map_or(url, |(p, _)| p);
    if is_memory(path) {
        return Some("memory".to_string());
    }
    let path = path.strip_prefix("sqlite:").unwrap_or(path);
    let last = path.rsplit('/').find(|seg| !seg.is_empty())?;
    let stem = last.split_once('.').map_or(last, |(stem, _)| stem);
    is_name(stem).then(|| stem.to_string())
}

/// The mutable databases writes can go to, in the order they were given.
pub struct Databases {
    dbs: Vec<Db>,
}

impl Databases {
    pub async fn connect(specs: &[DatabaseSpec]) -> Result<Self, Error> {
        let mut dbs: Vec<Db> = Vec::with_capacity(specs.len());

        for spec in specs {
            if dbs.iter().any(|d| d.name() == spec.name) {
                return Err(Error::InvalidDatabaseSpec(format!(
                    "duplicate database name {}",
                    spec.name
                )));
            }

            let db = Db::connect(&spec.name, &spec.url).await?;
            if !db.is_mutable() {
                tracing::warn!(name = %spec.name, "skipping read-only database");
                continue;
            }
            dbs.push(db);
        }

        Ok(Self::from_dbs(dbs))
    }

    pub fn from_dbs(dbs: Vec<Db>) -> Self {
        Self {
            dbs: dbs.into_iter().filter(Db::is_mutable).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Db, Error> {
        self.dbs
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    /// Named database, or the first one when no name is given.
    pub fn get_or_first(&self, name: Option<&str>) -> Result<&Db, Error> {
        match name {
            Some(name) => self.get(name),
            None => self
                .dbs
                .first()
                .ok_or_else(|| Error::DatabaseNotFound("(none configured)".to_string())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.dbs.iter().map(Db::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dbs.is_empty()
    }
}
