pub mod classify;
pub mod fetch;
pub mod forms;
pub mod infra;
pub mod model;
pub mod output;
pub mod services;
pub mod trends;
pub mod view;

pub use classify::{Category, Classification, Classifier, classify, classify_named, rank_stations};
pub use model::{HistoricalDataPoint, HistoryWindow, PollutantKind, Station};
