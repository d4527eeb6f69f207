//! View model for dashboard panels.
//!
//! Selection state is an explicit value handed to whatever renders it.
//! Station rows carry a distinct no-data state, so a silent sensor is never
//! painted as Good.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{Category, Classifier, NO_DATA_COLOR, NO_DATA_LABEL};
use crate::model::{PollutantKind, Station};

/// What the user has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub pollutant: PollutantKind,
    /// Station id.
    pub selected_station: Option<String>,
    pub search: String,
}

impl ViewState {
    pub fn with_pollutant(mut self, pollutant: PollutantKind) -> Self {
        self.pollutant = pollutant;
        self
    }

    pub fn select(mut self, station_id: impl Into<String>) -> Self {
        self.selected_station = Some(station_id.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// The selected station, if it is still present in `stations`.
    pub fn selected<'a>(&self, stations: &'a [Station]) -> Option<&'a Station> {
        let id = self.selected_station.as_deref()?;
        stations.iter().find(|s| s.id == id)
    }
}

/// Stations whose name contains `term`, ignoring case. Surrounding
/// whitespace in `term` is trimmed first, so an empty or blank term matches
/// everything.
pub fn filter_by_name<'a>(stations: &'a [Station], term: &str) -> Vec<&'a Station> {
    let term = term.trim().to_lowercase();
    stations
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&term))
        .collect()
}

/// Most recent parseable observation time across `stations`.
pub fn latest_update(stations: &[Station]) -> Option<DateTime<Utc>> {
    stations.iter().filter_map(Station::observed_at).max()
}

/// One station as displayed for the selected pollutant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow<'a> {
    pub station: &'a Station,
    pub value: Option<f64>,
    pub category: Option<Category>,
    pub color: &'static str,
    pub label: &'static str,
}

impl<'a> StationRow<'a> {
    pub fn new(station: &'a Station, kind: PollutantKind, classifier: &Classifier) -> Self {
        match station.reading(kind).filter(|v| v.is_finite()) {
            Some(value) => {
                let c = classifier.classify(value, kind);
                Self {
                    station,
                    value: Some(value),
                    category: Some(c.category),
                    color: c.color,
                    label: c.label,
                }
            }
            None => Self {
                station,
                value: None,
                category: None,
                color: NO_DATA_COLOR,
                label: NO_DATA_LABEL,
            },
        }
    }

    pub fn has_data(&self) -> bool {
        self.value.is_some()
    }

    /// Value with its unit, or the no-data label.
    pub fn display_value(&self, kind: PollutantKind) -> String {
        match (self.value, kind.unit()) {
            (Some(v), "") => format!("{v}"),
            (Some(v), unit) => format!("{v} {unit}"),
            (None, _) => NO_DATA_LABEL.to_string(),
        }
    }
}

/// Classifies every station for the view's pollutant, after the name filter.
pub fn station_rows<'a>(
    stations: &'a [Station],
    view: &ViewState,
    classifier: &Classifier,
) -> Vec<StationRow<'a>> {
    filter_by_name(stations, &view.search)
        .into_iter()
        .map(|s| StationRow::new(s, view.pollutant, classifier))
        .collect()
}

/// Keeps the last successful value across failed refreshes.
#[derive(Debug, Clone)]
pub struct LastKnownGood<T> {
    value: Option<T>,
    refreshed_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
}

impl<T> Default for LastKnownGood<T> {
    fn default() -> Self {
        Self {
            value: None,
            refreshed_at: None,
            consecutive_failures: 0,
        }
    }
}

impl<T> LastKnownGood<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a refresh result. Errors are logged and the previous value
    /// is kept. Returns the value now held, if any.
    pub fn update(&mut self, result: Result<T>) -> Option<&T> {
        match result {
            Ok(value) => {
                if self.consecutive_failures > 0 {
                    info!(
                        failures = self.consecutive_failures,
                        "Refresh recovered"
                    );
                }
                self.value = Some(value);
                self.refreshed_at = Some(Utc::now());
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    error = %e,
                    failures = self.consecutive_failures,
                    has_fallback = self.value.is_some(),
                    "Refresh failed, keeping last known good"
                );
            }
        }
        self.value.as_ref()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// True once a refresh has failed since the last success.
    pub fn is_stale(&self) -> bool {
        self.consecutive_failures > 0
    }
}
