use std::fmt;

use mehfil_core::model::DayNumber;
use services::{AppServices, AppSession, Clock, Page};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDay { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDay { raw } => write!(f, "invalid --day value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- days        [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- content     --day <n> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- leaderboard [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- session     [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:mehfil.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MEHFIL_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Days,
    Content,
    Leaderboard,
    Session,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "days" => Some(Self::Days),
            "content" => Some(Self::Content),
            "leaderboard" => Some(Self::Leaderboard),
            "session" => Some(Self::Session),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    day: Option<DayNumber>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("MEHFIL_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://mehfil.sqlite3".into(), normalize_sqlite_url);
        let mut day = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--day" => {
                    let value = require_value(args, "--day")?;
                    let parsed: DayNumber = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDay { raw: value.clone() })?;
                    day = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, day })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Days,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Days,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Days => {
            let days = services.content().list_days().await?;
            if days.is_empty() {
                println!("No day content yet.");
            }
            for summary in days {
                match summary.date_label {
                    Some(label) => println!("Day {} - {label}", summary.day),
                    None => println!("Day {}", summary.day),
                }
            }
            Ok(())
        }
        Command::Content => {
            let day = args.day.ok_or_else(|| {
                eprintln!("content requires --day <n>");
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing --day")
            })?;
            match services.admin().day_content(day).await? {
                None => println!("Day {day} has no content yet."),
                Some(content) => {
                    match content.date_label() {
                        Some(label) => println!("Day {day} ({label})"),
                        None => println!("Day {day}"),
                    }
                    for item in content.items() {
                        match item.embed_url() {
                            Some(embed) => {
                                println!("  [{}] {} -> {embed}", item.kind().as_str(), item.label());
                            }
                            None => println!("  [{}] {}", item.kind().as_str(), item.label()),
                        }
                    }
                }
            }
            Ok(())
        }
        Command::Leaderboard => {
            let rows = services.dashboard().standings().await?;
            if rows.is_empty() {
                println!("No results have been submitted yet.");
            }
            for row in rows {
                println!("{:>3}. {:<24} {}", row.rank, row.name, row.score);
            }
            Ok(())
        }
        Command::Session => {
            let session = AppSession::restore(services.storage().sessions.as_ref()).await?;
            match session.page() {
                Page::AdminDashboard => println!(
                    "Restored admin session: {}",
                    session.admin().map_or("<unknown>", |a| a.email())
                ),
                Page::Dashboard => println!(
                    "Restored user session: {}",
                    session.user().map_or("<unknown>", |u| u.name())
                ),
                _ => println!("No stored session; starting at the splash screen."),
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "services=info,storage=info,app=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
