use std::io::Write;
use crate::config::Config;
use crate::customer::{CustomerId, FarePolicy};
use crate::filter::FilterKind;
use crate::filter::engine::FilterEngine;
use crate::flight::{FlightSegment, SegmentRef};
use crate::ledger::ledger::Ledger;
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tabled::settings::Style;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod airport;
mod config;
mod customer;
mod error;
mod filter;
mod flight;
mod ledger;
mod time;
mod trip;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json", env = "FLYER_SCENARIO")]
    scenario: PathBuf,

    /// Contiguous partitions a filter splits the view into (default: available cores)
    #[arg(short, long, env = "FLYER_PARTITIONS")]
    partitions: Option<usize>,

    /// Worker threads evaluating partitions (default: available cores)
    #[arg(short, long, env = "FLYER_WORKERS")]
    workers: Option<usize>,

    /// Fare per km for segments without their own rate
    #[arg(long, env = "FLYER_BASE_RATE", default_value_t = FlightSegment::DEFAULT_BASE_RATE)]
    base_rate: f64,

    /// Flat fee kept per cancelled segment
    #[arg(long, env = "FLYER_CANCELLATION_FEE", default_value_t = 0.0)]
    cancellation_fee: f64,

    /// Log filter directive, e.g. "info" or "flyer_ledger=debug"
    #[arg(long, env = "FLYER_LOG", default_value = "info")]
    log: String,
}

impl Args {
    fn config(&self) -> Config {
        let defaults = FilterEngine::default();
        Config {
            scenario: self.scenario.clone(),
            base_rate: self.base_rate,
            fare_policy: FarePolicy {
                cancellation_fee: self.cancellation_fee,
            },
            engine: FilterEngine::new(
                self.partitions.unwrap_or(defaults.partitions()),
                self.workers.unwrap_or(defaults.workers()),
            ),
        }
    }
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let mut pager = match pager {
        Ok(pager) => pager,
        Err(_) => {
            println!("{}", content);
            return;
        }
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_segments(segments: &[SegmentRef]) {
    if segments.is_empty() {
        println!("No matching flight segments found.");
        return;
    }
    let rows = segments.iter().map(|s| s.row()).collect::<Vec<_>>();
    let mut table = tabled::Table::new(&rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log)?)
        .with_writer(std::io::stderr)
        .init();

    let config = args.config();
    println!("Frequent flyer desk online. Loading scenario from {}", config.scenario.display());

    let mut ledger = Ledger::load_from_file(&config.scenario, &config)?;
    let mut view = ledger.working_set();
    println!("{}", tabled::Table::new([ledger.stats()]).with(Style::rounded()));

    let rl_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "filter".to_string(),
            "filters".to_string(),
            "reset".to_string(),
            "summary".to_string(),
            "customer".to_string(),
            "schedule".to_string(),
            "cancel".to_string(),
            "airports".to_string(),
            "stats".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(rl_config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => print_segments(&view),
                    "filter" | "f" => {
                        let Some(kind) = parts.get(1) else {
                            println!("Usage: filter <kind> [spec]");
                            continue;
                        };
                        match kind.parse::<FilterKind>() {
                            Ok(kind) => {
                                let spec = parts[2..].join(" ");
                                let before = view.len();
                                let started = Instant::now();
                                view = config.engine.run(kind, ledger.customers(), &view, &spec);
                                debug!(filter = kind.name(), elapsed = ?started.elapsed(), "filter applied");
                                println!(
                                    "{} filter applied: {} -> {} flight segments.",
                                    kind.name().green(),
                                    before,
                                    view.len()
                                );
                            }
                            Err(e) => println!("{}", e.to_string().red()),
                        }
                    },
                    "filters" => {
                        for kind in FilterKind::ALL {
                            println!("  {:<9} {}", kind.name().bold(), kind.describe());
                        }
                    },
                    "reset" | "r" => {
                        view = config.engine.run(FilterKind::Reset, ledger.customers(), &view, "");
                        println!("View reset: {} flight segments.", view.len());
                    },
                    "summary" | "s" => {
                        if let Some(rid) = parts.get(1) {
                            match ledger.trip_summary(rid) {
                                Some(summary) => println!("{}", summary),
                                None => println!("{}", format!("Trip not found: {}", rid).yellow()),
                            }
                        } else {
                            println!("Usage: summary <reservation_id>");
                        }
                    },
                    "customer" => {
                        match parts.get(1).and_then(|id| id.parse::<CustomerId>().ok()).and_then(|id| ledger.customer(id)) {
                            Some(c) => {
                                println!("{} ({}, {}), {}", c.name.bold(), c.age, c.nationality, c.id);
                                println!("  Status:          {}", c.status());
                                println!("  Qualifying miles: {}", c.qualifying_miles());
                                println!("  Lifetime cost:   ${:.2}", c.lifetime_cost());
                                for booked in c.booked_trips() {
                                    println!("  {} ${:.2}", booked.trip.reservation_id.bold(), booked.cost);
                                    for segment in booked.trip.segments() {
                                        let seat = if segment.check_manifest(c.id) { "held".green() } else { "released".dimmed() };
                                        println!("    {} {} {}", segment, segment.departure_time.format("%Y-%m-%d %H:%M"), seat);
                                    }
                                }
                            }
                            None => println!("Usage: customer <known customer id>"),
                        }
                    },
                    "schedule" => {
                        match parts.get(1).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
                            Some(date) => print_segments(&ledger.segments_on(date).cloned().collect::<Vec<_>>()),
                            None => println!("Usage: schedule <YYYY-MM-DD>"),
                        }
                    },
                    "cancel" => {
                        if let Some(rid) = parts.get(1) {
                            match ledger.cancel(rid) {
                                Ok(reversed) => println!("Trip cancelled, ${:.2} reversed.", reversed),
                                Err(e) => println!("{}", e.to_string().red()),
                            }
                        } else {
                            println!("Usage: cancel <reservation_id>");
                        }
                    },
                    "airports" => {
                        let rows = ledger.airports().sorted().into_iter().map(|a| a.row()).collect::<Vec<_>>();
                        println!("{}", tabled::Table::new(&rows).with(Style::rounded()));
                    },
                    "stats" => {
                        println!("{}", tabled::Table::new([ledger.stats()]).with(Style::rounded()));
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls                    - List the flight segments currently in view");
                        println!("  filter <kind> [spec]  - Narrow the view; kinds: reset, customer, duration, location, date, trip");
                        println!("  filters               - Describe every filter and its spec format");
                        println!("  reset                 - Restore the view to every booked segment");
                        println!("  summary <rid>         - Print the summary of a trip");
                        println!("  customer <id>         - Show a customer's miles, status and trips");
                        println!("  schedule <date>       - List all segments departing on YYYY-MM-DD");
                        println!("  cancel <rid>          - Cancel every leg of a trip");
                        println!("  airports              - List airports with their names and coordinates");
                        println!("  stats                 - Dataset statistics");
                        println!("  help / ?              - Show this help menu");
                        println!("  exit / quit           - Exit\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
