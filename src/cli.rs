use std::env;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use crossterm::style::{Color as TermColor, Stylize};
use uuid::Uuid;

use termin_planner::{
    Appointment, AppointmentDraft, AppointmentFilter, Category, Config, Planner, Recurrence,
    ReminderOffset, SqliteStore,
    schedule::{ReminderScheduler, TokioNotifier, views::week_start},
};

const USAGE: &str = "Usage: termin-planner [agenda | day YYYY-MM-DD | week YYYY-MM-DD | add TITLE YYYY-MM-DDTHH:MM \
[--repeat none|daily|weekly|monthly] [--remind SECONDS]... [--category NAME] | done ID | remove ID | \
presets | watch]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Agenda,
    Day(NaiveDate),
    Week(NaiveDate),
    Add(AppointmentDraft),
    Done(Uuid),
    Remove(Uuid),
    Presets,
    Watch,
    Help,
}

pub fn parse_cli_command() -> Result<CliCommand, String> {
    parse_args(env::args().skip(1))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliCommand, String> {
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(CliCommand::Agenda);
    };

    match command.as_str() {
        "agenda" => Ok(CliCommand::Agenda),
        "day" => parse_date(args.next()).map(CliCommand::Day),
        "week" => parse_date(args.next()).map(CliCommand::Week),
        "add" => parse_add(args),
        "done" => parse_id(args.next()).map(CliCommand::Done),
        "remove" => parse_id(args.next()).map(CliCommand::Remove),
        "presets" => Ok(CliCommand::Presets),
        "watch" => Ok(CliCommand::Watch),
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        _ => Err(format!("Unknown argument: {}", command)),
    }
}

fn parse_add(mut args: impl Iterator<Item = String>) -> Result<CliCommand, String> {
    let title = args.next().ok_or("Missing title")?;
    let date_str = args.next().ok_or("Missing date. Use YYYY-MM-DDTHH:MM.")?;
    let naive = NaiveDateTime::parse_from_str(&date_str, "%Y-%m-%dT%H:%M")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DDTHH:MM.", date_str))?;
    let date = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{}' does not exist in the local timezone", date_str))?
        .with_timezone(&Utc);

    let mut draft = AppointmentDraft::new(title, date);
    while let Some(flag) = args.next() {
        let value = args.next().ok_or_else(|| format!("Missing value for {}", flag))?;
        draft = match flag.as_str() {
            "--repeat" => draft.recurrence(value.parse::<Recurrence>()?),
            "--category" => draft.category(value.parse::<Category>()?),
            "--remind" => {
                let seconds = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid reminder offset '{}'", value))?;
                draft.reminders([ReminderOffset::from_secs(seconds)])
            }
            _ => return Err(format!("Unknown argument: {}", flag)),
        };
    }

    draft.validate().map_err(|e| e.to_string())?;
    Ok(CliCommand::Add(draft))
}

fn parse_date(value: Option<String>) -> Result<NaiveDate, String> {
    let date_str = value.ok_or("Missing date. Use YYYY-MM-DD.")?;
    NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", date_str))
}

fn parse_id(value: Option<String>) -> Result<Uuid, String> {
    let value = value.ok_or("Missing appointment id")?;
    Uuid::parse_str(&value).map_err(|_| format!("Invalid appointment id '{}'", value))
}

pub async fn run_command(command: CliCommand) -> Result<()> {
    if command == CliCommand::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load_or_create().context("Failed to load config")?;
    let store = SqliteStore::open(&config.storage.database)
        .with_context(|| format!("Failed to open {}", config.storage.database.display()))?;
    let (notifier, mut alerts) = TokioNotifier::current()?.with_channel();
    let scheduler = ReminderScheduler::new(notifier, config.notifications.clone());

    let mut planner = Planner::new(store, scheduler);
    planner.load();

    match command {
        CliCommand::Agenda => {
            let upcoming = planner.upcoming()?;
            println!("{}", format_agenda_text("Upcoming", &upcoming.iter().collect::<Vec<_>>()));
        }
        CliCommand::Day(date) => {
            let day = planner.appointments_on(date, &AppointmentFilter::default());
            println!("{}", format_agenda_text(&date.format("%A, %B %d, %Y").to_string(), &day));
        }
        CliCommand::Week(date) => {
            let first_day = config.calendar.week_start();
            let week = planner.week_of(date, first_day, &AppointmentFilter::default());
            let start = week_start(date, first_day);
            println!("{}", format_agenda_text(&format!("Week of {}", start.format("%B %d, %Y")), &week));
        }
        CliCommand::Add(draft) => {
            let created = planner.add(draft);
            println!("Added {} ({})", created.title, created.id);
        }
        CliCommand::Done(id) => {
            planner.toggle_done(id);
            match planner.get(id) {
                Some(appointment) => println!("{}", build_agenda_line(appointment)),
                None => bail!("No appointment with id {}", id),
            }
        }
        CliCommand::Remove(id) => {
            if planner.get(id).is_none() {
                return Err(anyhow!("No appointment with id {}", id));
            }
            planner.remove(id);
            println!("Removed {}", id);
        }
        CliCommand::Presets => {
            for offset in config.reminders.offsets() {
                println!("{:>8}  {}", offset.as_secs(), offset.label());
            }
        }
        CliCommand::Watch => {
            let now = Utc::now();
            let mut scheduled = 0;
            for next in planner.upcoming()? {
                scheduled += planner.reminders().schedule(&next, now).len();
            }
            println!("Watching {} reminders, press Ctrl-C to stop", scheduled);
            loop {
                tokio::select! {
                    Some(alert) = alerts.recv() => println!("{}: {}", alert.title, alert.body),
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        CliCommand::Help => unreachable!(),
    }

    Ok(())
}

fn format_agenda_text(heading: &str, appointments: &[&Appointment]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Agenda – {}", heading));
    lines.push(String::new());

    if appointments.is_empty() {
        lines.push("No appointments scheduled.".to_string());
    } else {
        for appointment in appointments {
            lines.push(format!("- {}", build_agenda_line(appointment)));
        }
    }

    lines.join("\n")
}

fn build_agenda_line(appointment: &Appointment) -> String {
    let when = local_label(appointment.date);
    let done = if appointment.is_done { "[x]" } else { "[ ]" };
    let category = appointment
        .category
        .label()
        .with(TermColor::from(appointment.category.color()));

    let mut line = format!("{} {:<16} {} ({})", done, when, appointment.title, category);
    if appointment.recurrence.is_recurring() {
        line.push_str(&format!(" ↻ {}", appointment.recurrence));
    }
    line.push_str(&format!("  {}", appointment.id));
    line
}

fn local_label(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
