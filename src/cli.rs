// command line interface

use std::collections::HashMap;

use clap::{Parser, Subcommand};
use miette::Result;

use crate::output::Output;
use crate::{DatabaseSpec, Databases, Message, Server, classify, derive_parameters_or_empty};

#[derive(Parser)]
#[command(name = "sqlwrite", about = "Run write sql against a database")]
struct Cli {
    /// database to write to, as name=url or just a url (repeatable)
    #[arg(long, env = "DATABASE_URL", value_delimiter = ',', global = true)]
    db: Vec<DatabaseSpec>,

    /// print json instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// say whether sql creates, alters or drops a table or view
    Classify { sql: String },

    /// list the named parameters sql needs
    Params {
        sql: String,

        /// database name, defaults to the first one
        #[arg(long, short)]
        database: Option<String>,
    },

    /// run a write statement
    Exec {
        sql: String,

        /// database name, defaults to the first one
        #[arg(long, short)]
        database: Option<String>,

        /// parameter value as name=value (repeatable)
        #[arg(long = "param", short = 'P', value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// list tables of a database
    Tables {
        #[arg(long, short)]
        database: Option<String>,
    },

    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got {s}"))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let out = Output { json: cli.json };

    match cli.command {
        // the only command that needs no database
        Commands::Classify { sql } => {
            out.classification(&sql, classify(&sql).as_ref());
            Ok(())
        }

        Commands::Params { sql, database } => {
            let databases = connect(&cli.db).await?;
            let db = databases.get_or_first(database.as_deref())?;
            let params = derive_parameters_or_empty(db, &sql).await?;
            out.parameters(&params);
            Ok(())
        }

        Commands::Exec {
            sql,
            database,
            params,
        } => {
            let databases = connect(&cli.db).await?;
            let db = databases.get_or_first(database.as_deref())?;
            let values: HashMap<String, String> = params.into_iter().collect();
            let result = db.execute_write(&sql, &values).await;
            let failed = result.is_err();

            out.message(db.name(), &Message::from_result(&result));
            if failed {
                return Err(miette::miette!("write failed"));
            }
            Ok(())
        }

        Commands::Tables { database } => {
            let databases = connect(&cli.db).await?;
            let db = databases.get_or_first(database.as_deref())?;
            let tables = db.tables().await?;
            out.tables(db.name(), &tables);
            Ok(())
        }

        Commands::Serve { port, host } => {
            let databases = connect(&cli.db).await?;
            Ok(Server::run(databases, &host, port).await?)
        }
    }
}

async fn connect(specs: &[DatabaseSpec]) -> Result<Databases> {
    if specs.is_empty() {
        return Err(miette::miette!("database url required (--db or DATABASE_URL)"));
    }

    let databases = Databases::connect(specs).await?;
    if databases.is_empty() {
        return Err(miette::miette!("no mutable databases, all of them are read-only"));
    }

    tracing::info!("databases: {}", databases.names().join(", "));
    Ok(databases)
}
