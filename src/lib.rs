//! gqlorm - Prisma-style query calls compiled to GraphQL
//!
//! A query such as `db.user.findMany({ where, select, orderBy, take })` is
//! compiled in three steps:
//!
//! 1. [`parser`] turns the call into a [`ast::Query`] tree
//! 2. [`emitter`] walks the tree into GraphQL text, pulling every `where`
//!    literal out into a numbered variable
//! 3. [`builder`] ties both together, either from explicit arguments or by
//!    recording the call a closure makes on a [`capture::Db`]
//!
//! ```rust,ignore
//! use gqlorm::{BuildOptions, build_query_from_function};
//! use serde_json::json;
//!
//! let compiled = build_query_from_function(
//!     |db| db.model("user").find_many(json!({
//!         "where": { "email": { "endsWith": "@example.com" } },
//!         "select": { "id": true, "email": true },
//!     })),
//!     BuildOptions::live(true),
//! )?;
//!
//! // query findManyUser($var0: String) @live {
//! //   users(where: { email: { endsWith: $var0 } }) {
//! //     id
//! //     email
//! //   }
//! // }
//! ```
//!
//! Compilation is pure: no I/O, no shared state besides the builder's
//! `force_live_queries` flag, so builders can be shared freely across threads.

pub mod ast;
pub mod builder;
pub mod capture;
pub mod config;
pub mod emitter;
pub mod error;
pub mod inflector;
pub mod live;
pub mod parser;
pub mod value;

pub use ast::{Query, QueryOperation};
pub use builder::{
    BuildOptions, BuilderOptions, QueryBuilder, build_query, build_query_from_function,
};
pub use capture::{Captured, CapturedCall, Db, ModelDelegate};
pub use config::Config;
pub use emitter::{CompiledQuery, Variables, emit};
pub use error::{CaptureError, Error, LiveQueryError, QueryParseError, Result};
pub use live::LiveQuery;
pub use parser::parse_query;
pub use value::date_time;
