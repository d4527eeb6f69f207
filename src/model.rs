//! Wire and domain types shared by the classifier, ranking and REST client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// The pollutant fields a station reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantKind {
    #[default]
    Aqi,
    Pm25,
    Pm10,
}

impl PollutantKind {
    pub const ALL: [PollutantKind; 3] = [PollutantKind::Aqi, PollutantKind::Pm25, PollutantKind::Pm10];

    /// Name used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PollutantKind::Aqi => "aqi",
            PollutantKind::Pm25 => "pm25",
            PollutantKind::Pm10 => "pm10",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PollutantKind::Aqi => "AQI",
            PollutantKind::Pm25 => "PM2.5",
            PollutantKind::Pm10 => "PM10",
        }
    }

    /// Unit suffix for display. AQI is unitless.
    pub fn unit(&self) -> &'static str {
        match self {
            PollutantKind::Aqi => "",
            PollutantKind::Pm25 | PollutantKind::Pm10 => "μg/m³",
        }
    }
}

impl fmt::Display for PollutantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollutantKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aqi" => Ok(PollutantKind::Aqi),
            "pm25" | "pm2.5" => Ok(PollutantKind::Pm25),
            "pm10" => Ok(PollutantKind::Pm10),
            other => Err(anyhow::anyhow!("unknown pollutant kind '{other}'")),
        }
    }
}

/// A monitoring station with its latest readings.
///
/// Readings are `None` when the sensor did not report that pollutant. A
/// missing reading is never the same thing as a reading of zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    /// Used for time-series queries; may differ from `id`.
    #[serde(default)]
    pub sensor_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub sensor_type: Option<String>,
    #[serde(default, rename = "timeStamp", alias = "time")]
    pub timestamp: Option<String>,
}

impl Station {
    /// Latest reading for `kind`, if the station reported one.
    pub fn reading(&self, kind: PollutantKind) -> Option<f64> {
        match kind {
            PollutantKind::Aqi => self.aqi,
            PollutantKind::Pm25 => self.pm25,
            PollutantKind::Pm10 => self.pm10,
        }
    }

    /// Parsed observation time. Unparseable timestamps are treated as absent.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// Rounds particulate readings to two decimals, matching the portal's display.
    pub fn normalized(mut self) -> Self {
        self.pm25 = self.pm25.map(round2);
        self.pm10 = self.pm10.map(round2);
        self
    }
}

/// Decodes station records one at a time. Records that do not fit the
/// `Station` shape are logged and skipped so the rest of the list survives.
pub fn stations_from_records(records: Vec<serde_json::Value>) -> Vec<Station> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed station record");
                None
            }
        })
        .collect()
}

/// One entry of a station's historical series.
///
/// Depending on the query the backend returns raw readings, rolling
/// averages, or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub avg_aqi: Option<f64>,
    #[serde(default)]
    pub avg_pm25: Option<f64>,
    #[serde(default)]
    pub avg_pm10: Option<f64>,
    #[serde(default, rename = "timeStamp")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl HistoricalDataPoint {
    /// Averaged value for `kind`, falling back to the raw reading.
    pub fn value(&self, kind: PollutantKind) -> Option<f64> {
        let (avg, raw) = match kind {
            PollutantKind::Aqi => (self.avg_aqi, self.aqi),
            PollutantKind::Pm25 => (self.avg_pm25, self.pm25),
            PollutantKind::Pm10 => (self.avg_pm10, self.pm10),
        };
        avg.or(raw)
    }

    /// `date` when present, otherwise the raw timestamp.
    pub fn label(&self) -> Option<&str> {
        self.date.as_deref().or(self.timestamp.as_deref())
    }
}

/// Size of a history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    Days(u32),
    Hours(u32),
}

impl HistoryWindow {
    /// Window covering the last `days` trend points, one per day.
    pub fn trailing_days(days: usize) -> anyhow::Result<Self> {
        let days = u32::try_from(days)
            .map_err(|_| anyhow::anyhow!("trend duration of {days} days is out of range"))?;
        Ok(HistoryWindow::Days(days))
    }

    /// The backend's `range` parameter is expressed in hours.
    pub fn range_hours(&self) -> u32 {
        match *self {
            HistoryWindow::Days(d) => d.saturating_mul(24),
            HistoryWindow::Hours(h) => h,
        }
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Hours(24)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Accepts RFC 3339 and the naive `YYYY-MM-DDTHH:MM:SS` form (read as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
