use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use chrono::{Datelike, Local, NaiveDate, Utc};

use techcal::{
    backend::service::BackendService,
    calendar::bucket::events_on_date,
    calendar::event::enrich,
    calendar::stats::{attendance_streak, monthly_series, yearly_stats},
    calendar::status::classify_event,
    calendar::EnrichedEvent,
    storage::config::{BackendConfig, Config},
};

#[derive(Clone, Copy)]
pub enum CliMode {
    Default { sample: bool },
    AgendaDate(NaiveDate),
    Stats,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    let mut sample = false;
    let mut agenda_date = None;
    let mut stats = false;
    let mut args = env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => {
                sample = true;
            }
            "--stats" => {
                stats = true;
            }
            "--agenda" => {
                let target_date = if let Some(next) = args.peek() {
                    if !next.starts_with("--") {
                        let date_str = args.next().expect("peeked value must exist");
                        NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                            .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?
                    } else {
                        Local::now().date_naive()
                    }
                } else {
                    Local::now().date_naive()
                };
                agenda_date = Some(target_date);
            }
            "--help" => {
                println!("Usage: techcal [--agenda [YYYY/MM/DD]] [--stats] [--sample]");
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    if stats {
        Ok(CliMode::Stats)
    } else if let Some(date) = agenda_date {
        Ok(CliMode::AgendaDate(date))
    } else {
        Ok(CliMode::Default { sample })
    }
}

fn service() -> Result<BackendService, io::Error> {
    let config = Config::load_or_create().map_err(|e| io::Error::other(e.to_string()))?;
    let backend = BackendConfig::from_env().map_err(|e| io::Error::other(e.to_string()))?;
    Ok(BackendService::new(backend, config.storage.session_cache))
}

/// Prints one day's events to the pager, badges included.
pub async fn run_agenda_mode(date: NaiveDate) -> Result<(), io::Error> {
    let mut service = service()?;

    let enriched = match service.load_catalog().await {
        Ok((events, categories)) => enrich(&events, &categories),
        Err(e) => {
            eprintln!("Failed to fetch events: {}", e);
            Vec::new()
        }
    };

    let mut day_events = events_on_date(&enriched, date);
    day_events.sort_by_key(|e| e.event.start_time);
    let agenda = format_agenda_text(date, &day_events);
    display_with_pager(&agenda)
}

fn format_agenda_text(date: NaiveDate, events: &[&EnrichedEvent]) -> String {
    let now = Utc::now();
    let mut lines = Vec::new();
    lines.push(format!("Agenda \u{2013} {}", date.format("%A, %B %d, %Y")));
    lines.push(String::new());

    if events.is_empty() {
        lines.push("No events scheduled.".to_string());
    } else {
        for enriched in events {
            lines.push(format!("- {}", build_agenda_line(enriched, now)));
        }
    }

    lines.join("\n")
}

fn build_agenda_line(enriched: &EnrichedEvent, now: chrono::DateTime<Utc>) -> String {
    let event = &enriched.event;
    let time_label = match event.end_time {
        Some(end) => format!(
            "{}-{}",
            event.start_time.format("%H:%M"),
            end.format("%H:%M")
        ),
        None => event.start_time.format("%H:%M").to_string(),
    };

    let mut line = format!("{:<13} {}", time_label, event.title);
    if !event.location.is_empty() {
        line.push_str(&format!(" @ {}", event.location));
    }

    let badge = classify_event(enriched, now);
    if !badge.is_none() {
        line.push_str(&format!(" [{}]", badge.label()));
    }
    line
}

/// Prints the attendance dashboard to the pager. Needs a signed-in
/// session, since the stats are per user.
pub async fn run_stats_mode() -> Result<(), io::Error> {
    let mut service = service()?;

    let attended = service
        .load_dashboard()
        .await
        .map_err(|e| io::Error::other(format!("Failed to load stats: {}", e)))?;

    let now = Utc::now();
    let stats = yearly_stats(&attended, now);
    let streak = attendance_streak(&attended, Local::now().date_naive());

    let mut lines = Vec::new();
    lines.push(format!("Your {} in tech events", now.year()));
    lines.push(String::new());
    lines.push(format!("Events attended this year: {}", stats.total));
    lines.push(format!(
        "Top category: {}",
        stats.top_category.unwrap_or_else(|| "None yet".to_string())
    ));
    lines.push(format!(
        "Attendance streak: {} month{}",
        streak,
        if streak == 1 { "" } else { "s" }
    ));
    lines.push(String::new());

    for bucket in monthly_series(&attended) {
        let total: usize = bucket.counts.values().sum();
        lines.push(format!("{:<9} {}", bucket.label, "#".repeat(total.min(60))));
    }

    display_with_pager(&lines.join("\n"))
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}
