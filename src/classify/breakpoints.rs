//! Breakpoint tables and the banded lookup.
//!
//! Every pollutant has its own calibrated table. The tables are held in one
//! [`BreakpointTables`] value so recalibration touches a single place, and a
//! deployment can swap them from a JSON file without a rebuild.

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::category::{Category, Classification};
use crate::model::PollutantKind;

/// Five inclusive upper bounds, one per category below Hazardous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakpointTable(Vec<f64>);

impl BreakpointTable {
    /// Number of explicit breakpoints; the sixth band is the catch-all.
    pub const LEN: usize = Category::ORDERED.len() - 1;

    pub fn new(bounds: Vec<f64>) -> Result<Self> {
        ensure!(
            bounds.len() == Self::LEN,
            "expected {} breakpoints, got {}",
            Self::LEN,
            bounds.len()
        );
        ensure!(
            bounds.iter().all(|b| b.is_finite()),
            "breakpoints must be finite"
        );
        ensure!(
            bounds.windows(2).all(|w| w[0] < w[1]),
            "breakpoints must be strictly ascending"
        );
        Ok(Self(bounds))
    }

    pub fn bounds(&self) -> &[f64] {
        &self.0
    }

    /// First band whose upper bound is `>= value`; anything past the last
    /// bound is Hazardous.
    pub fn category(&self, value: f64) -> Category {
        self.0
            .iter()
            .position(|&bound| value <= bound)
            .map(|i| Category::ORDERED[i])
            .unwrap_or(Category::Hazardous)
    }
}

/// The full set of per-pollutant tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTables {
    pub aqi: BreakpointTable,
    pub pm25: BreakpointTable,
    pub pm10: BreakpointTable,
}

impl BreakpointTables {
    /// US EPA tables.
    ///
    /// | kind | Good | Moderate | USG   | Unhealthy | Very Unhealthy |
    /// |------|------|----------|-------|-----------|----------------|
    /// | aqi  | 50   | 100      | 150   | 200       | 300            |
    /// | pm25 | 12   | 35.4     | 55.4  | 150.4     | 250.4          |
    /// | pm10 | 54   | 154      | 254   | 354       | 424            |
    pub fn epa() -> Self {
        Self {
            aqi: BreakpointTable(vec![50.0, 100.0, 150.0, 200.0, 300.0]),
            pm25: BreakpointTable(vec![12.0, 35.4, 55.4, 150.4, 250.4]),
            pm10: BreakpointTable(vec![54.0, 154.0, 254.0, 354.0, 424.0]),
        }
    }

    /// Loads tables from a JSON file shaped like
    /// `{"aqi": [...], "pm25": [...], "pm10": [...]}`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read breakpoint file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid breakpoint file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BreakpointTables = serde_json::from_str(content)?;
        // Deserialization bypasses `BreakpointTable::new`, so validate here.
        Ok(Self {
            aqi: BreakpointTable::new(raw.aqi.0).context("aqi")?,
            pm25: BreakpointTable::new(raw.pm25.0).context("pm25")?,
            pm10: BreakpointTable::new(raw.pm10.0).context("pm10")?,
        })
    }

    pub fn table(&self, kind: PollutantKind) -> &BreakpointTable {
        match kind {
            PollutantKind::Aqi => &self.aqi,
            PollutantKind::Pm25 => &self.pm25,
            PollutantKind::Pm10 => &self.pm10,
        }
    }
}

impl Default for BreakpointTables {
    fn default() -> Self {
        Self::epa()
    }
}

/// Classifies readings against a set of breakpoint tables.
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: BreakpointTables,
}

impl Classifier {
    pub fn new(tables: BreakpointTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &BreakpointTables {
        &self.tables
    }

    /// Callers must filter out missing readings first. NaN compares false
    /// against every bound and lands in Hazardous.
    pub fn classify(&self, value: f64, kind: PollutantKind) -> Classification {
        self.tables.table(kind).category(value).into()
    }

    /// Like [`Classifier::classify`], but takes the pollutant by name. An
    /// unrecognized name yields the Good classification.
    pub fn classify_named(&self, value: f64, kind: &str) -> Classification {
        match kind.parse::<PollutantKind>() {
            Ok(kind) => self.classify(value, kind),
            Err(_) => Category::Good.into(),
        }
    }
}

static EPA: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Classifies `value` with the EPA tables.
pub fn classify(value: f64, kind: PollutantKind) -> Classification {
    EPA.classify(value, kind)
}

/// Classifies `value` with the EPA tables, taking the pollutant by name.
pub fn classify_named(value: f64, kind: &str) -> Classification {
    EPA.classify_named(value, kind)
}
