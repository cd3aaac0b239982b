//! `concierge` — appointment arithmetic and chatbot text helpers from the shell.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use concierge::appointment::{
    create_appointment, create_appointment_from_now, get_appointment_details_in,
    get_appointment_timestamp, instant_from_millis, is_valid_in, parse_timestamp_in,
    parse_timezone, time_between_in, update_appointment_in, AppointmentDetails, AppointmentUpdate,
};
use concierge::chatbot::{check_phone_number, get_url, is_valid_command, nice_to_meet_you, remove_emoji};

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    version,
    about = "Appointment arithmetic and chatbot text helpers",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// IANA timezone for calendar components (default: the host's local zone)
    #[arg(long, global = true, env = "CONCIERGE_TZ")]
    timezone: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an appointment a number of days from now
    Create {
        /// Whole days to offset (may be negative)
        #[arg(long, allow_negative_numbers = true)]
        days: i64,
        /// Anchor instant as milliseconds since the Unix epoch
        #[arg(long, allow_negative_numbers = true, conflicts_with = "now")]
        now_ms: Option<i64>,
        /// Anchor instant as a timestamp
        #[arg(long)]
        now: Option<String>,
    },
    /// Format milliseconds since the Unix epoch as an appointment timestamp
    Timestamp {
        #[arg(allow_negative_numbers = true)]
        millis: i64,
    },
    /// Show the calendar components of a timestamp
    Details { timestamp: String },
    /// Overwrite calendar components of a timestamp
    Update(UpdateArgs),
    /// Seconds between two timestamps
    Between { a: String, b: String },
    /// Whether an appointment is after the current instant
    Valid { appointment: String, current: String },
    /// Whether a message is a chatbot command
    Command { text: String },
    /// Remove emoji placeholders from a message
    StripEmoji { message: String },
    /// Check a phone number's format
    Phone { number: String },
    /// Extract bare domains from a message
    Urls { text: String },
    /// Greet a "Surname, Given" name
    Greet { name: String },
}

#[derive(Args, Debug)]
struct UpdateArgs {
    timestamp: String,

    /// Options as a JSON object, e.g. '{"month": 0, "hour": 9}'
    #[arg(long)]
    options: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    year: Option<i32>,
    /// Zero-based month (0 = January)
    #[arg(long, allow_negative_numbers = true)]
    month: Option<i64>,
    /// Day of the month
    #[arg(long, allow_negative_numbers = true)]
    date: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    hour: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    minute: Option<i64>,
}

impl UpdateArgs {
    /// JSON options first, then individual flags on top.
    fn to_update(&self) -> Result<AppointmentUpdate> {
        let mut update = match &self.options {
            Some(raw) => serde_json::from_str::<AppointmentUpdate>(raw)
                .with_context(|| format!("Invalid update options: {raw}"))?,
            None => AppointmentUpdate::default(),
        };
        update.year = self.year.or(update.year);
        update.month = self.month.or(update.month);
        update.date = self.date.or(update.date);
        update.hour = self.hour.or(update.hour);
        update.minute = self.minute.or(update.minute);
        Ok(update)
    }
}

/// What a subcommand produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Text(String),
    Flag(bool),
    Seconds(u64),
    Details(AppointmentDetails),
    Urls(Option<Vec<String>>),
}

impl Reply {
    fn render(&self, json: bool) -> Result<String> {
        if json {
            return serde_json::to_string(self).context("Failed to serialize result");
        }
        Ok(match self {
            Reply::Text(text) => text.clone(),
            Reply::Flag(flag) => flag.to_string(),
            Reply::Seconds(seconds) => seconds.to_string(),
            Reply::Details(d) => format!(
                "year={} month={} date={} hour={} minute={}",
                d.year(),
                d.month(),
                d.date(),
                d.hour(),
                d.minute()
            ),
            Reply::Urls(urls) => urls.as_deref().unwrap_or_default().join("\n"),
        })
    }
}

fn run<Z: TimeZone>(command: &Command, zone: &Z) -> Result<Reply> {
    let reply = match command {
        Command::Create { days, now_ms, now } => {
            let appointment = match (now_ms, now) {
                (Some(ms), _) => create_appointment(*days, instant_from_millis(*ms)?)?,
                (None, Some(ts)) => create_appointment(*days, parse_timestamp_in(ts, zone)?)?,
                (None, None) => create_appointment_from_now(*days)?,
            };
            Reply::Text(get_appointment_timestamp(&appointment))
        }
        Command::Timestamp { millis } => {
            Reply::Text(get_appointment_timestamp(&instant_from_millis(*millis)?))
        }
        Command::Details { timestamp } => {
            Reply::Details(get_appointment_details_in(timestamp, zone)?)
        }
        Command::Update(args) => {
            let update = args.to_update()?;
            tracing::info!(?update, "applying update");
            Reply::Details(update_appointment_in(&args.timestamp, &update, zone)?)
        }
        Command::Between { a, b } => Reply::Seconds(time_between_in(a, b, zone)?),
        Command::Valid { appointment, current } => {
            Reply::Flag(is_valid_in(appointment, current, zone)?)
        }
        Command::Command { text } => Reply::Flag(is_valid_command(text)),
        Command::StripEmoji { message } => Reply::Text(remove_emoji(message)),
        Command::Phone { number } => Reply::Text(check_phone_number(number)),
        Command::Urls { text } => Reply::Urls(
            get_url(text).map(|urls| urls.into_iter().map(str::to_string).collect()),
        ),
        Command::Greet { name } => Reply::Text(nice_to_meet_you(name)),
    };
    Ok(reply)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!(?cli, "parsed arguments");

    let reply = match cli.timezone.as_deref() {
        Some(name) => {
            let zone = parse_timezone(name)?;
            run(&cli.command, &zone)
        }
        None => run(&cli.command, &Local),
    }
    .with_context(|| format!("{} failed", command_name(&cli.command)))?;

    let rendered = reply.render(cli.json)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Create { .. } => "create",
        Command::Timestamp { .. } => "timestamp",
        Command::Details { .. } => "details",
        Command::Update(_) => "update",
        Command::Between { .. } => "between",
        Command::Valid { .. } => "valid",
        Command::Command { .. } => "command",
        Command::StripEmoji { .. } => "strip-emoji",
        Command::Phone { .. } => "phone",
        Command::Urls { .. } => "urls",
        Command::Greet { .. } => "greet",
    }
}
