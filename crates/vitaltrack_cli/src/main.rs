//! Command-line front end for the tracker core.
//!
//! # Responsibility
//! - Map commands onto event store, analysis and transfer operations.
//! - Provide a terminal-backed `Prompt` for confirm/notify flows.

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use vitaltrack_core::db::open_db;
use vitaltrack_core::{
    dashboard_stats, init_from_config, parse_symptom_kind, recent_activity, symptom_frequency,
    ActivityItem, AnalysisResult, AppConfig, CorrelationAnalyzer, CorrelationCandidate,
    EventStore, ImportOutcome, NewMeal, Prompt, SqliteBlobRepository, SymptomKind,
    SystemClock, TransferManager, MAX_TREND_DAYS,
};

#[derive(Parser)]
#[command(name = "vitaltrack")]
#[command(about = "Log meals and symptoms and find likely dietary triggers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a meal
    Meal {
        /// What you ate
        name: String,
        /// Comma-separated ingredients
        #[arg(long, short)]
        ingredients: Option<String>,
        /// When you ate it (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Log a symptom
    Symptom {
        /// Symptom type, see `vitaltrack types`
        kind: String,
        /// Severity from 1 to 10
        severity: i64,
        /// Onset time (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// List the symptom catalog
    Types,
    /// Show dashboard counters
    Dashboard,
    /// Show recent meals and symptoms
    Recent {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Show daily symptom counts
    Trends {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TREND_DAYS))
        )]
        days: u32,
    },
    /// Find meals and ingredients preceding a symptom
    Analyze {
        /// Symptom type to analyze
        kind: String,
        /// Override the lookback window in hours
        #[arg(long)]
        lookback_hours: Option<i64>,
        /// Override the minimum match count
        #[arg(long)]
        min_occurrences: Option<u32>,
    },
    /// Export all data as JSON
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Merge a previously exported JSON file
    Import {
        file: PathBuf,
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
    /// Delete all data
    Clear {
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
}

/// Terminal prompt reading answers from stdin.
struct TerminalPrompt {
    assume_yes: bool,
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    if let Err(err) = init_from_config(&config) {
        eprintln!("Logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)?;
    let mut store = EventStore::open(SqliteBlobRepository::new(&conn), SystemClock)?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Commands::Meal {
            name,
            ingredients,
            at,
        } => {
            let mut request = NewMeal::new(name);
            if let Some(text) = ingredients {
                request = request.with_ingredients_text(&text);
            }
            request.timestamp = at;
            let meal = store.add_meal(request)?;
            println!("Logged meal {} at {}", meal.id, meal.timestamp.to_rfc3339());
        }
        Commands::Symptom { kind, severity, at } => {
            let symptom = store.add_symptom_named(&kind, severity, at)?;
            println!(
                "Logged {} (severity {}) at {}",
                symptom.kind.label(),
                symptom.severity,
                symptom.timestamp.to_rfc3339()
            );
        }
        Commands::Types => {
            for kind in SymptomKind::ALL {
                println!("{:<18} {}", kind.as_str(), kind.label());
            }
        }
        Commands::Dashboard => {
            let stats = dashboard_stats(store.data(), store.now());
            println!("Meals logged:    {} ({} today)", stats.meals_logged, stats.meals_today);
            println!(
                "Symptoms logged: {} ({} today)",
                stats.symptoms_logged, stats.symptoms_today
            );
            match stats.latest_symptom {
                Some((kind, severity)) => {
                    println!("Latest symptom:  {} ({severity}/10)", kind.label())
                }
                None => println!("Latest symptom:  none"),
            }
        }
        Commands::Recent { limit } => {
            let items = recent_activity(store.data(), limit);
            if items.is_empty() {
                println!("No activity yet.");
            }
            for item in items {
                match item {
                    ActivityItem::Meal(meal) => {
                        let ingredients = if meal.ingredients.is_empty() {
                            "No ingredients listed".to_string()
                        } else {
                            meal.ingredients.join(", ")
                        };
                        println!(
                            "{}  meal     {} ({ingredients})",
                            meal.timestamp.format("%Y-%m-%d %H:%M"),
                            meal.name
                        );
                    }
                    ActivityItem::Symptom(symptom) => println!(
                        "{}  symptom  {} ({}/10)",
                        symptom.timestamp.format("%Y-%m-%d %H:%M"),
                        symptom.kind.label(),
                        symptom.severity
                    ),
                }
            }
        }
        Commands::Trends { days } => {
            let trends = symptom_frequency(store.data(), store.now(), days);
            let header: Vec<String> = trends
                .days
                .iter()
                .map(|day| day.format("%b %d").to_string())
                .collect();
            println!("{:<20} {}", "", header.join(" "));
            for row in trends.series {
                let counts: Vec<String> =
                    row.counts.iter().map(|count| format!("{count:>6}")).collect();
                println!("{:<20} {}", row.symptom.label(), counts.join(" "));
            }
        }
        Commands::Analyze {
            kind,
            lookback_hours,
            min_occurrences,
        } => {
            let kind = parse_symptom_kind(&kind)?;
            let mut analyzer_config = config.analyzer;
            if let Some(hours) = lookback_hours {
                analyzer_config.lookback_window = Duration::try_hours(hours)
                    .ok_or_else(|| format!("lookback of {hours} hours is out of range"))?;
            }
            if let Some(min) = min_occurrences {
                analyzer_config.min_occurrences = min;
            }
            let analyzer = CorrelationAnalyzer::new(analyzer_config)?;
            let result = analyzer.analyze(store.data(), kind);
            println!("{}", result.message());
            if let AnalysisResult::Correlated(report) = result {
                print_candidates("Meals", &report.meals, report.occurrences);
                print_candidates("Ingredients", &report.ingredients, report.occurrences);
            }
        }
        Commands::Export { dir } => {
            TransferManager::new(TerminalPrompt { assume_yes: true }).export_to_dir(&store, &dir)?;
        }
        Commands::Import { file, yes } => {
            let text = std::fs::read_to_string(&file)?;
            let outcome = TransferManager::new(TerminalPrompt { assume_yes: yes })
                .import_text(&mut store, &text)?;
            if outcome == ImportOutcome::Declined {
                println!("Import cancelled.");
            }
        }
        Commands::Clear { yes } => {
            let cleared = TransferManager::new(TerminalPrompt { assume_yes: yes })
                .clear_with_confirmation(&mut store)?;
            if !cleared {
                println!("Nothing was deleted.");
            }
        }
    }

    Ok(())
}

fn print_candidates(title: &str, candidates: &[CorrelationCandidate], occurrences: usize) {
    if candidates.is_empty() {
        return;
    }
    println!("{title}:");
    for candidate in candidates {
        println!(
            "  {:<24} {:>3}% correlation, appeared in {} out of {} instances",
            candidate.name, candidate.percentage, candidate.occurrences_matched, occurrences
        );
    }
}
