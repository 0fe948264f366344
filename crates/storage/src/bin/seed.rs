use std::fmt;

use chrono::{DateTime, Utc};
use mehfil_core::model::{ContentItemDraft, DayContent, DayNumber, EventSettingsDraft, ScoreRecord, UserIdentity};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    days: u32,
    results: u32,
    enable_quiz: bool,
    enable_leaderboard: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDays { raw: String },
    InvalidResults { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidResults { raw } => write!(f, "invalid --results value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("MEHFIL_DB_URL").unwrap_or_else(|_| "sqlite:mehfil.sqlite3".into());
        let mut days = std::env::var("MEHFIL_SEED_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut results = std::env::var("MEHFIL_SEED_RESULTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(0);
        let mut enable_quiz = false;
        let mut enable_leaderboard = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--results" => {
                    let value = require_value(&mut args, "--results")?;
                    results = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidResults { raw: value.clone() })?;
                }
                "--enable-quiz" => enable_quiz = true,
                "--enable-leaderboard" => enable_leaderboard = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            days,
            results,
            enable_quiz,
            enable_leaderboard,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>      SQLite URL (default: sqlite:mehfil.sqlite3)");
    eprintln!("  --days <n>             Number of sample days to upsert (default: 3)");
    eprintln!("  --results <n>          Number of sample quiz results to append (default: 0)");
    eprintln!("  --enable-quiz          Turn the main quiz on");
    eprintln!("  --enable-leaderboard   Turn the leaderboard on");
    eprintln!("  --now <rfc3339>        Fixed current time for deterministic seeding");
    eprintln!("  -h, --help             Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  MEHFIL_DB_URL, MEHFIL_SEED_DAYS, MEHFIL_SEED_RESULTS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let samples = [
        ("Aug 21", "https://youtu.be/dQw4w9WgXcQ"),
        ("Aug 22", "https://youtu.be/9bZkp7q19f0"),
        ("Aug 23", "https://youtu.be/kXYiU_JCYtU"),
    ];
    for i in 0..args.days {
        let idx = (i as usize) % samples.len();
        let (label, url) = samples[idx];
        let item = ContentItemDraft::VideoLink {
            url: url.to_owned(),
        }
        .validate()?;
        let content = DayContent::new(DayNumber::new(i + 1), Some(label.to_owned()), vec![item]);
        storage.contents.upsert_day(&content).await?;
    }

    let names = ["Ayesha", "Bilal", "Fatima", "Hassan", "Zainab"];
    for i in 0..args.results {
        let idx = (i as usize) % names.len();
        let identity = UserIdentity::new(names[idx], format!("pw-{i}"))?;
        let record = ScoreRecord::new(identity, (i * 3) % 10, now);
        let _ = storage.results.append_result(&record).await?;
    }

    let settings = EventSettingsDraft {
        main_quiz_visible: args.enable_quiz,
        leaderboard_visible: args.enable_leaderboard,
        external_form_url: None,
        external_form_visible: false,
    }
    .validate()?;
    storage.settings.save_settings(&settings).await?;

    println!(
        "Seeded {} days and {} results into {} (quiz {}, leaderboard {})",
        args.days,
        args.results,
        args.db_url,
        if args.enable_quiz { "on" } else { "off" },
        if args.enable_leaderboard { "on" } else { "off" },
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
