//! Pollutant classification and station ranking.
//!
//! Readings are mapped onto EPA health categories through per-pollutant
//! breakpoint tables, then painted with the shared six-step palette. Ranking
//! builds cleanest / most-polluted leaderboards over the same readings.

pub mod breakpoints;
pub mod category;
pub mod rank;

pub use breakpoints::{BreakpointTable, BreakpointTables, Classifier, classify, classify_named};
pub use category::{Category, Classification, NO_DATA_COLOR, NO_DATA_LABEL, contrast_text_color};
pub use rank::{COMPACT_LEADERBOARD, FULL_LEADERBOARD, Leaderboards, RankDirection, rank_stations};
