//! DP1GAME METRIX — retention and ad-exposure metrics for level-based
//! mobile games.
//!
//! Two analytics exports go in (a per-level retention table and an
//! ad-impression event table); a fixed summary, a level progression
//! table, and charts come out. See `pipeline` for the execution order.

pub mod ad_event;
pub mod ad_exposure;
pub mod baseline;
pub mod chart;
pub mod columns;
pub mod command;
pub mod config;
pub mod dates;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod level;
pub mod pipeline;
pub mod retention;
pub mod session;
pub mod summary;
pub mod table;
pub mod types;
