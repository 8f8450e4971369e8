// sqlwrite library - run write sql against a chosen database

pub mod cli;
mod core;
mod error;
mod output;
mod server;

pub use core::{
    Classification, DatabaseSpec, Databases, Db, Dialect, Level, Message, ObjectType,
    ParameterDescriptor, ParameterKind, PlaceholderSource, TextScan, Verb, WriteOutcome, classify,
    derive_parameters, derive_parameters_or_empty, placeholders, statement,
};
pub use error::Error;
pub use server::Server;
