//! Station leaderboards.

use serde::Serialize;

use crate::model::{PollutantKind, Station};

/// Leaderboard length for compact panels.
pub const COMPACT_LEADERBOARD: usize = 3;

/// Leaderboard length for the full dashboard.
pub const FULL_LEADERBOARD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankDirection {
    /// Ascending: cleanest first.
    Cleanest,
    /// Descending: most polluted first.
    MostPolluted,
}

/// Ranks stations by their reading for `kind` and keeps the top `limit`.
///
/// Sorts a vector of references, so `stations` is never reordered. The sort
/// is stable in both directions: tied stations keep their input order.
/// Stations without a finite reading for `kind` are left out entirely rather
/// than ranked as zero.
pub fn rank_stations<'a>(
    stations: &'a [Station],
    kind: PollutantKind,
    direction: RankDirection,
    limit: usize,
) -> Vec<&'a Station> {
    let mut ranked: Vec<(f64, &Station)> = stations
        .iter()
        .filter_map(|s| match s.reading(kind) {
            Some(v) if v.is_finite() => Some((v, s)),
            _ => None,
        })
        .collect();

    match direction {
        RankDirection::Cleanest => ranked.sort_by(|a, b| a.0.total_cmp(&b.0)),
        RankDirection::MostPolluted => ranked.sort_by(|a, b| b.0.total_cmp(&a.0)),
    }

    ranked.into_iter().take(limit).map(|(_, s)| s).collect()
}

/// Both leaderboards for one pollutant, built from the same station list.
#[derive(Debug, Serialize)]
pub struct Leaderboards<'a> {
    pub kind: PollutantKind,
    pub cleanest: Vec<&'a Station>,
    pub most_polluted: Vec<&'a Station>,
}

impl<'a> Leaderboards<'a> {
    pub fn build(stations: &'a [Station], kind: PollutantKind, limit: usize) -> Self {
        Self {
            kind,
            cleanest: rank_stations(stations, kind, RankDirection::Cleanest, limit),
            most_polluted: rank_stations(stations, kind, RankDirection::MostPolluted, limit),
        }
    }
}
