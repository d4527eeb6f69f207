//! CLI entry point for the air-quality station ranker.
//!
//! Provides subcommands for listing classified stations, printing the
//! cleanest / most-polluted leaderboards, charting history summaries,
//! submitting the portal's forms, and polling stations into a CSV.

use anyhow::{Result, bail};
use aq_ranker::classify::{Classifier, FULL_LEADERBOARD, Leaderboards, contrast_text_color};
use aq_ranker::forms::{AlertSubscription, FeedbackSubmission, rating_text};
use aq_ranker::infra::config::PortalConfig;
use aq_ranker::infra::portal::PortalClient;
use aq_ranker::model::{HistoryWindow, PollutantKind, Station};
use aq_ranker::output::{StationSnapshot, append_records, print_json, print_pretty};
use aq_ranker::services::{FormsApi, StationRepository};
use aq_ranker::trends::{DEFAULT_TREND_DURATION, TREND_DURATIONS, summarize, trend_color, trend_series};
use aq_ranker::view::{LastKnownGood, ViewState, latest_update, station_rows};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aq_ranker")]
#[command(about = "Classify and rank air-quality monitoring stations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stations with their classification for one pollutant
    Stations {
        /// Pollutant to classify by (aqi, pm25, pm10)
        #[arg(short, long, default_value = "aqi")]
        pollutant: PollutantKind,

        /// Case-insensitive station name filter
        #[arg(short, long, default_value = "")]
        search: String,

        /// Print rows as JSON instead of log lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the cleanest and most polluted stations
    Rank {
        #[arg(short, long, default_value = "aqi")]
        pollutant: PollutantKind,

        /// Number of stations per leaderboard
        #[arg(short, long, default_value_t = FULL_LEADERBOARD)]
        limit: usize,
    },
    /// Classify a single reading
    Classify {
        value: f64,

        /// Pollutant name; unknown names fall back to the Good category
        #[arg(default_value = "aqi")]
        pollutant: String,
    },
    /// Summarize a sensor's history
    History {
        /// Sensor id (not the station id)
        #[arg(value_name = "SENSOR_ID")]
        sensor: String,

        #[arg(short, long, default_value = "aqi")]
        pollutant: PollutantKind,

        /// Query window in days
        #[arg(long, conflicts_with = "hours")]
        days: Option<u32>,

        /// Query window in hours
        #[arg(long)]
        hours: Option<u32>,

        /// Number of trailing points to chart (7, 14 or 30)
        #[arg(short = 'n', long, default_value_t = DEFAULT_TREND_DURATION)]
        duration: usize,
    },
    /// Subscribe to air-quality alerts for one or more sensors
    Subscribe {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Sensor ids (repeatable)
        #[arg(short, long = "sensor", required = true)]
        sensors: Vec<String>,
    },
    /// Unsubscribe using the id from an alert email
    Unsubscribe { id: String },
    /// Send feedback about the portal
    Feedback {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,

        /// Star rating from 1 to 5
        #[arg(long)]
        rating: u8,
    },
    /// Poll stations and append classified snapshots to a CSV file
    Watch {
        /// CSV file to append snapshots to
        #[arg(short, long, default_value = "snapshots.csv")]
        output: String,

        #[arg(short, long, default_value = "aqi")]
        pollutant: PollutantKind,

        /// Poll interval in seconds
        #[arg(short = 'r', long, default_value_t = 300)]
        sample_rate: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aq_ranker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aq_ranker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::from_env()?;
    let classifier = Classifier::new(config.breakpoint_tables()?);

    match cli.command {
        Commands::Classify { value, pollutant } => {
            if !value.is_finite() || value < 0.0 {
                bail!("reading must be a non-negative number, got {value}");
            }
            let c = classifier.classify_named(value, &pollutant);
            if pollutant.parse::<PollutantKind>().is_err() {
                warn!(pollutant = %pollutant, "Unknown pollutant, using default category");
            }
            info!(
                value,
                pollutant = %pollutant,
                category = c.label,
                color = c.color,
                rank = c.category.rank(),
                "Classification"
            );
        }
        Commands::Stations {
            pollutant,
            search,
            json,
        } => {
            let client = PortalClient::from_config(&config)?;
            let stations = fetch_or_empty(&client).await;
            let view = ViewState::default()
                .with_pollutant(pollutant)
                .with_search(search);
            let rows = station_rows(&stations, &view, &classifier);

            if json {
                print_json(&rows)?;
            } else {
                for row in &rows {
                    info!(
                        station_id = %row.station.id,
                        station = %row.station.name,
                        value = %row.display_value(pollutant),
                        category = row.label,
                        color = row.color,
                        "Station"
                    );
                }
            }

            let no_data = rows.iter().filter(|r| !r.has_data()).count();
            info!(
                total = rows.len(),
                no_data,
                last_update = ?latest_update(&stations),
                "Station list summary"
            );
        }
        Commands::Rank { pollutant, limit } => {
            let client = PortalClient::from_config(&config)?;
            let stations = fetch_or_empty(&client).await;
            let boards = Leaderboards::build(&stations, pollutant, limit);

            log_leaderboard("Cleanest", &boards.cleanest, pollutant, &classifier);
            log_leaderboard("Most polluted", &boards.most_polluted, pollutant, &classifier);
            print_pretty(&boards);
        }
        Commands::History {
            sensor,
            pollutant,
            days,
            hours,
            duration,
        } => {
            if !TREND_DURATIONS.contains(&duration) {
                warn!(duration, "Non-standard trend duration");
            }
            let window = match (days, hours) {
                (Some(d), _) => HistoryWindow::Days(d),
                (None, Some(h)) => HistoryWindow::Hours(h),
                (None, None) => HistoryWindow::trailing_days(duration)?,
            };

            let client = PortalClient::from_config(&config)?;
            let points = match client.fetch_history(&sensor, window).await {
                Ok(points) => points,
                Err(e) => {
                    warn!(error = %e, sensor = %sensor, "History unavailable");
                    Vec::new()
                }
            };

            let series = trend_series(&points, pollutant, duration);
            for point in &series {
                let c = classifier.classify(point.value, pollutant);
                info!(
                    date = point.date.as_deref().unwrap_or("-"),
                    value = point.value,
                    category = c.label,
                    "Trend point"
                );
            }

            match summarize(&series) {
                Some(summary) => info!(
                    sensor = %sensor,
                    pollutant = %pollutant,
                    line_color = trend_color(pollutant),
                    count = summary.count,
                    mean = summary.mean,
                    stddev = summary.stddev,
                    min = summary.min,
                    max = summary.max,
                    mean_category = classifier.classify(summary.mean, pollutant).label,
                    "Trend summary"
                ),
                None => info!(sensor = %sensor, pollutant = %pollutant, "No history to chart"),
            }
        }
        Commands::Subscribe {
            name,
            email,
            sensors,
        } => {
            let subscription = AlertSubscription {
                name,
                email,
                sensors,
            };
            subscription.validate()?;

            let client = PortalClient::from_config(&config)?;
            let response = client.subscribe(&subscription).await?;
            info!(response = %response, "Subscribed to alerts");
        }
        Commands::Unsubscribe { id } => {
            let client = PortalClient::from_config(&config)?;
            client.unsubscribe(&id).await?;
            info!(id = %id, "Unsubscribed from air quality alerts");
        }
        Commands::Feedback {
            name,
            email,
            message,
            rating,
        } => {
            let feedback = FeedbackSubmission {
                name,
                email,
                message,
                rating,
            };
            feedback.validate()?;

            let client = PortalClient::from_config(&config)?;
            client.submit_feedback(&feedback).await?;
            info!(rating, rating_text = rating_text(rating), "Feedback submitted");
        }
        Commands::Watch {
            output,
            pollutant,
            sample_rate,
            num_samples,
        } => {
            let client = PortalClient::from_config(&config)?;
            watch(&client, &classifier, &output, pollutant, sample_rate, num_samples).await?;
        }
    }

    Ok(())
}

/// Fetches stations; a failed fetch is logged and treated as no data.
async fn fetch_or_empty<R: StationRepository>(repo: &R) -> Vec<Station> {
    match repo.fetch_stations().await {
        Ok(stations) => stations,
        Err(e) => {
            warn!(error = %e, "Station fetch failed, nothing to classify");
            Vec::new()
        }
    }
}

fn log_leaderboard(title: &str, stations: &[&Station], kind: PollutantKind, classifier: &Classifier) {
    if stations.is_empty() {
        info!(board = title, pollutant = %kind, "No stations with data");
        return;
    }
    for (i, station) in stations.iter().enumerate() {
        // Leaderboard entries always have a reading.
        let Some(value) = station.reading(kind) else {
            continue;
        };
        let c = classifier.classify(value, kind);
        info!(
            board = title,
            position = i + 1,
            station = %station.name,
            value,
            unit = kind.unit(),
            category = c.label,
            badge = c.color,
            text = contrast_text_color(value, kind),
            "Leaderboard"
        );
    }
}

/// Polls stations at a fixed rate, appending one snapshot row per station.
/// Failed polls fall back to the last successful station list.
#[tracing::instrument(skip(repo, classifier))]
async fn watch<R: StationRepository>(
    repo: &R,
    classifier: &Classifier,
    output: &str,
    pollutant: PollutantKind,
    sample_rate: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    let view = ViewState::default().with_pollutant(pollutant);
    let mut cache: LastKnownGood<Vec<Station>> = LastKnownGood::new();
    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }
        sample_count += 1;

        match cache.update(repo.fetch_stations().await) {
            Some(stations) => {
                let now = Utc::now();
                let snapshots: Vec<StationSnapshot> = station_rows(stations, &view, classifier)
                    .iter()
                    .map(|row| StationSnapshot::from_row(row, pollutant, now))
                    .collect();
                append_records(output, &snapshots)?;
                info!(
                    sample = sample_count,
                    rows = snapshots.len(),
                    stale = cache.is_stale(),
                    "Snapshot written"
                );
            }
            None => warn!(sample = sample_count, "No station data yet, skipping snapshot"),
        }

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    info!(output, "Finished sampling");
    Ok(())
}
