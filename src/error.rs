use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    #[diagnostic(code(sqlwrite::database))]
    Database(#[from] sqlx::Error),

    #[error("Invalid statement: {0}")]
    #[diagnostic(code(sqlwrite::invalid_statement))]
    InvalidStatement(String),

    #[error("Database not found: {0}")]
    #[diagnostic(code(sqlwrite::database_not_found), help("check the names passed with --db"))]
    DatabaseNotFound(String),

    #[error("Invalid database spec: {0}")]
    #[diagnostic(
        code(sqlwrite::database_spec),
        help("use name=url, or a url such as sqlite:data.db or postgres://host/db")
    )]
    InvalidDatabaseSpec(String),

    #[error("Server error: {0}")]
    Server(String),
}
