// core logic - statement classification, parameters, and database writes

mod db;
mod outcome;
mod params;
pub mod placeholders;
pub mod statement;

pub use db::{DatabaseSpec, Databases, Db, Dialect};
pub use outcome::{Level, Message, WriteOutcome};
pub use params::{
    ParameterDescriptor, ParameterKind, PlaceholderSource, TextScan, derive_parameters,
    derive_parameters_or_empty,
};
pub use statement::{Classification, ObjectType, Verb, classify};
