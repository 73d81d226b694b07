use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use marklite::Database;
use marklite::cli::{self as prog_cli, OutputMode};
use marklite::config::{self, AppConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Human,
    Plain,
    Json,
}

impl From<Format> for OutputMode {
    fn from(f: Format) -> Self {
        match f {
            Format::Human => Self::Human,
            Format::Plain => Self::Plain,
            Format::Json => Self::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "marklite", version, about = "Student marks store CLI", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, $MARKLITE_CONFIG or ./marklite.toml is used when present.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Override the NDJSON data file. Takes precedence over config/env.")]
    data: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Human, help = "Output format")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(name = "add-student", about = "Create a student with no marks")]
    AddStudent { id: i64, name: String, phone: String },
    #[command(name = "update-phone", about = "Replace a student's phone number")]
    UpdatePhone { id: i64, phone: String },
    #[command(name = "add-mark", about = "Append a mark to a student's history")]
    AddMark {
        id: i64,
        subject: String,
        #[arg(help = "Date as YYYY-MM-DD")]
        date: NaiveDate,
        score: i32,
    },
    #[command(name = "remove-student", about = "Delete a student and print the removed record")]
    RemoveStudent { id: i64 },
    #[command(about = "List a student's marks")]
    Marks { id: i64 },
    #[command(name = "by-phone", about = "Find the first student with an exact phone number")]
    ByPhone { phone: String },
    #[command(name = "by-phone-prefix", about = "Students whose phone starts with a literal prefix")]
    ByPhonePrefix { prefix: String },
    #[command(name = "good-marks", about = "Students whose every mark is above a threshold")]
    GoodMarks { threshold: i32 },
    #[command(name = "few-marks", about = "Students with fewer marks than a threshold (read-only)")]
    FewMarks { threshold: i32 },
    #[command(name = "purge-few-marks", about = "Delete students with fewer marks than a threshold")]
    PurgeFewMarks { threshold: i32 },
    #[command(name = "good-marks-subject", about = "Students with a mark in a subject at or above a threshold")]
    GoodMarksSubject { subject: String, threshold: i32 },
    #[command(name = "marks-between", about = "Students whose mark count is within [min, max]")]
    MarksBetween { min: i32, max: i32 },
    #[command(name = "subject-marks", about = "A student's marks in one subject")]
    SubjectMarks { id: i64, subject: String },
    #[command(name = "avg-score", about = "Names with mean score above a threshold, highest first")]
    AvgScore { threshold: i32 },
    #[command(name = "marks-at-dates", about = "A student's marks dated within [from, to]")]
    MarksAtDates { id: i64, from: NaiveDate, to: NaiveDate },
    #[command(about = "Top students by mean score")]
    Best { n: usize },
    #[command(about = "Students with the lowest score sums")]
    Worst { n: usize },
}

impl From<Commands> for prog_cli::Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::AddStudent { id, name, phone } => Self::AddStudent { id, name, phone },
            Commands::UpdatePhone { id, phone } => Self::UpdatePhone { id, phone },
            Commands::AddMark { id, subject, date, score } => Self::AddMark { id, subject, date, score },
            Commands::RemoveStudent { id } => Self::RemoveStudent { id },
            Commands::Marks { id } => Self::Marks { id },
            Commands::ByPhone { phone } => Self::ByPhone { phone },
            Commands::ByPhonePrefix { prefix } => Self::ByPhonePrefix { prefix },
            Commands::GoodMarks { threshold } => Self::GoodMarks { threshold },
            Commands::FewMarks { threshold } => Self::FewMarks { threshold },
            Commands::PurgeFewMarks { threshold } => Self::PurgeFewMarks { threshold },
            Commands::GoodMarksSubject { subject, threshold } => Self::GoodMarksSubject { subject, threshold },
            Commands::MarksBetween { min, max } => Self::MarksBetween { min, max },
            Commands::SubjectMarks { id, subject } => Self::SubjectMarks { id, subject },
            Commands::AvgScore { threshold } => Self::AvgScore { threshold },
            Commands::MarksAtDates { id, from, to } => Self::MarksAtDates { id, from, to },
            Commands::Best { n } => Self::Best { n },
            Commands::Worst { n } => Self::Worst { n },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = AppConfig { data_file: cli.data.clone(), ..AppConfig::default() };
    let settings = match config::load(cli.config.as_deref(), overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = marklite::init(&settings) {
        eprintln!("warning: logging not configured: {e}");
    }
    let db = match Database::open(&settings) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let cmd: prog_cli::Command = cli.command.into();
    let mutation = cmd.is_mutation();
    let mut out = std::io::stdout().lock();
    if let Err(e) = prog_cli::run_with_format(db.service(), cmd, cli.format.into(), &mut out) {
        eprintln!("error: {e}");
        return ExitCode::from(if e.is_domain() { 1 } else { 2 });
    }
    if mutation && let Err(e) = db.save(&settings) {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
