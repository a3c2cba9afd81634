use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use cli_table::{WithTitle, print_stdout};
use plannr::{
    config::SchedulerConfig,
    data::{Calendar, DATE_DESC, DATETIME_DESC, Event},
    env_var,
    filter::EventFilter,
    schedule::{DropTarget, HourRange, SlotRequest},
    snapshot::Snapshot,
    store::{EventStore, SequentialIds},
};
use time::{Date, PrimitiveDateTime};
use tracing_subscriber::EnvFilter;

const EVENTS_FILE_VAR: &str = "PLANNR_EVENTS_FILE";

#[derive(Debug, clap::Parser)]
struct Args {
    /// JSON file with `events` and `calendars` (defaults to `$PLANNR_EVENTS_FILE`)
    #[clap(short, long, global = true)]
    file: Option<Utf8PathBuf>,
    #[clap(subcommand)]
    cmd: Cmd,
}

/// Which events a listing shows. Events of hidden calendars are always left out.
#[derive(Debug, clap::Args)]
struct FilterArgs {
    /// Only events whose title or description contains this text
    #[clap(short, long)]
    search: Option<String>,
    /// Only events with any of these tags, comma separated
    #[clap(long = "tag", value_delimiter = ',')]
    tags: Vec<String>,
}

impl FilterArgs {
    fn into_filter(self, calendars: &[Calendar]) -> EventFilter {
        EventFilter {
            query: self.search,
            tags: self.tags,
            hidden_kinds: vec![],
        }
        .hiding_invisible_calendars(calendars)
    }
}

#[derive(Debug, clap::Parser)]
enum Cmd {
    /// List the occurrences of all events between two dates
    Occurrences {
        /// First day, `YYYY-MM-DD`
        #[clap(long)]
        from: String,
        /// Day after the last, `YYYY-MM-DD`
        #[clap(long)]
        to: String,
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// Like `occurrences` but grouped by day
    Agenda {
        #[clap(long)]
        from: String,
        #[clap(long)]
        to: String,
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// Suggest the best times for a new meeting
    Suggest {
        /// Meeting length in minutes
        #[clap(short, long, default_value_t = 60)]
        duration: i64,
        /// Preferred hours, `START-END`
        #[clap(long, default_value = "9-17")]
        hours: HourRange,
        /// Search from this day, `YYYY-MM-DD HH:MM`
        #[clap(long)]
        now: String,
        /// Attendees who must attend, comma separated
        #[clap(long, value_delimiter = ',')]
        required: Vec<String>,
        /// Attendees who may attend, comma separated
        #[clap(long, value_delimiter = ',')]
        optional: Vec<String>,
    },
    /// Move an occurrence (and its series) and print the updated document
    Reschedule {
        /// Occurrence id, e.g. `standup-2024-01-08`
        #[clap(long)]
        occurrence: String,
        /// `YYYY-MM-DD` keeps the time of day, `YYYY-MM-DD HH:MM` sets it
        #[clap(long)]
        to: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    // a missing .env is fine, everything can be passed on the command line
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    if let Err(e) = run(args) {
        tracing::error!("{e:?}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => env_var(EVENTS_FILE_VAR)?.into(),
    };
    let snapshot = Snapshot::from_file(&path)?;
    tracing::debug!(
        "loaded {} events and {} calendars from `{path}`",
        snapshot.events.len(),
        snapshot.calendars.len()
    );
    match args.cmd {
        Cmd::Occurrences { from, to, filter } => list_occurrences(snapshot, filter, &from, &to),
        Cmd::Agenda { from, to, filter } => show_agenda(snapshot, filter, &from, &to),
        Cmd::Suggest {
            duration,
            hours,
            now,
            required,
            optional,
        } => suggest(
            snapshot,
            SlotRequest {
                required_attendees: required,
                optional_attendees: optional,
                duration_minutes: duration,
                preferred_hours: hours,
            },
            &now,
        ),
        Cmd::Reschedule { occurrence, to } => reschedule(snapshot, &occurrence, &to),
    }
}

fn open_store(events: Vec<Event>) -> Result<EventStore> {
    Ok(EventStore::from_events(events, SequentialIds::default())?)
}

fn parse_window(from: &str, to: &str) -> Result<(Date, Date)> {
    let from = Date::parse(from, DATE_DESC).with_context(|| format!("invalid date `{from}`"))?;
    let to = Date::parse(to, DATE_DESC).with_context(|| format!("invalid date `{to}`"))?;
    if to <= from {
        bail!("`--to` ({to}) must be after `--from` ({from})");
    }
    Ok((from, to))
}

fn list_occurrences(snapshot: Snapshot, filter: FilterArgs, from: &str, to: &str) -> Result<()> {
    let (from, to) = parse_window(from, to)?;
    let filter = filter.into_filter(&snapshot.calendars);
    let store = open_store(snapshot.events)?;
    print_stdout(store.occurrences_between(&filter, from, to).with_title())?;
    Ok(())
}

fn show_agenda(snapshot: Snapshot, filter: FilterArgs, from: &str, to: &str) -> Result<()> {
    let (from, to) = parse_window(from, to)?;
    let filter = filter.into_filter(&snapshot.calendars);
    let store = open_store(snapshot.events)?;
    let agenda = store.agenda(&filter, from, to);
    if agenda.is_empty() {
        println!("Nothing scheduled between {from} and {to}");
        return Ok(());
    }
    for (day, occurrences) in agenda {
        println!("{day} ({})", day.weekday());
        print_stdout(occurrences.with_title())?;
    }
    Ok(())
}

fn suggest(snapshot: Snapshot, request: SlotRequest, now: &str) -> Result<()> {
    let now = PrimitiveDateTime::parse(now, DATETIME_DESC)
        .with_context(|| format!("invalid `--now` `{now}`, expected `YYYY-MM-DD HH:MM`"))?;
    let config = SchedulerConfig::from_env()?;
    let store = open_store(snapshot.events)?;
    let slots = store.suggest_slots(&snapshot.calendars, &request, now, &config)?;
    print_stdout(slots.with_title())?;
    Ok(())
}

fn reschedule(snapshot: Snapshot, occurrence: &str, to: &str) -> Result<()> {
    // try datetime first, a bare date keeps the time of day
    let target = if let Ok(at) = PrimitiveDateTime::parse(to, DATETIME_DESC) {
        DropTarget::At(at)
    } else {
        let day = Date::parse(to, DATE_DESC)
            .with_context(|| format!("invalid `--to` `{to}`, expected `YYYY-MM-DD[ HH:MM]`"))?;
        DropTarget::Day(day)
    };
    let mut store = open_store(snapshot.events)?;
    if !store.reschedule(occurrence, target)? {
        tracing::warn!("no event behind `{occurrence}`, document unchanged");
    }
    let updated = Snapshot {
        events: store.into_events(),
        calendars: snapshot.calendars,
    };
    println!("{}", updated.to_json()?);
    Ok(())
}
