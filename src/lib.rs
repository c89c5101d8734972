//! Client-side data and state layer for a task board.
//!
//! Remote reads are cached with single-flight de-duplication and
//! stale-while-revalidate refresh, writes go remote-first and then invalidate
//! by key prefix, and the filter/sort/stats pipeline is pure and can run on a
//! dedicated worker thread with an inline fallback. Client preferences live
//! in an explicit store with JSON persistence.
//!
//! [`TaskBoard::new`] wires the whole stack together.

pub mod api;
pub mod board;
pub mod cache;
pub mod client_store;
pub mod config;
pub mod error;
pub mod mutation;
pub mod pipeline;
pub mod services;
pub mod types;
pub mod worker;

pub use board::TaskBoard;
pub use config::Config;
pub use error::{Error, Result};
