//! Admin CLI for the schedule bot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schedule_bot::store::ScheduleStore;
use schedule_bot::{BotConfig, groups, maintenance, preload, render};
use schedule_scrape::{Fetcher, WeekSchedule, Weekday};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Schedule bot: scrape, store and show weekly class schedules.
#[derive(Parser)]
#[command(name = "schedule-bot", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every group not yet stored for the current week.
    Preload,

    /// Print a group's schedule.
    Show {
        group: String,
        /// Only this day (`monday` or `Понедельник`).
        #[arg(long)]
        day: Option<String>,
        /// Week key (`YYYY-MM-DD` of its Monday); latest if omitted.
        #[arg(long)]
        week: Option<String>,
        /// Record the lookup in the request log as made by this user.
        #[arg(long)]
        user: Option<i64>,
    },

    /// List groups with a stored schedule and their latest week.
    List,

    /// Print usage statistics.
    Stats,

    /// Delete old logs, deactivate stale schedules, drop expired cache.
    Cleanup {
        /// Age threshold in days; defaults to `store.cleanup_days`.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Print the database location and table sizes.
    DbInfo,

    /// Remember a user's group.
    SetGroup { user_id: i64, group: String },

    /// Print a user's group.
    UserGroup { user_id: i64 },

    /// Store a schedule from a JSON file.
    Import {
        group: String,
        file: PathBuf,
        /// Week key; defaults to the current week.
        #[arg(long)]
        week: Option<String>,
    },

    /// Preload, clean up, then clean up periodically until Ctrl+C.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(BotConfig::default_config_path);
    let config = BotConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let _log_guard = schedule_bot::logging::init(&config.logging)?;

    let store = Arc::new(schedule_bot::open_store(&config).context("opening schedule store")?);

    match cli.command {
        Command::Preload => {
            let report = run_preload(&config, &store).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Show {
            group,
            day,
            week,
            user,
        } => show(&store, &group, day.as_deref(), week.as_deref(), user)?,
        Command::List => {
            for record in store.latest_schedules()? {
                let lessons = record.schedule.days_with_lessons().len();
                println!(
                    "{}\t{}\t{} дн. с занятиями{}",
                    record.group_name,
                    record.week_start,
                    lessons,
                    if record.schedule.is_empty() { " (пусто)" } else { "" }
                );
            }
        }
        Command::Stats => {
            let stats = store.statistics()?;
            println!("Пользователей: {}", stats.total_users);
            println!("Запросов: {}", stats.total_requests);
            println!("Популярные группы:");
            for (rank, group) in stats.popular_groups.iter().enumerate() {
                println!("{}. {}: {}", rank + 1, group.group_name, group.count);
            }
        }
        Command::Cleanup { days } => {
            let report = store.cleanup(days.unwrap_or(config.store.cleanup_days))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::DbInfo => {
            println!("{}", serde_json::to_string_pretty(&store.database_info()?)?);
        }
        Command::SetGroup { user_id, group } => {
            if !groups::is_known_group(&group) {
                anyhow::bail!("unknown group: {group}");
            }
            store.save_user_preference(user_id, &group)?;
            println!("{user_id} → {group}");
        }
        Command::UserGroup { user_id } => match store.get_user_group(user_id)? {
            Some(group) => println!("{group}"),
            None => println!("группа не выбрана"),
        },
        Command::Import { group, file, week } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let schedule = WeekSchedule::from_json(&json)
                .with_context(|| format!("parsing {}", file.display()))?;
            let week = week.unwrap_or_else(preload::current_week_start);
            let id = store.save_schedule(&group, &schedule, &week)?;
            println!("saved {group} for week {week} (record {id})");
        }
        Command::Run => run(config, store).await?,
    }

    Ok(())
}

async fn run_preload(
    config: &BotConfig,
    store: &Arc<ScheduleStore>,
) -> anyhow::Result<schedule_bot::PreloadReport> {
    let fetcher = Fetcher::http(&config.scrape).context("building HTTP client")?;
    let week = preload::current_week_start();
    Ok(preload::preload_all(store, &fetcher, groups::all_groups(), &week).await)
}

fn show(
    store: &ScheduleStore,
    group: &str,
    day: Option<&str>,
    week: Option<&str>,
    user: Option<i64>,
) -> anyhow::Result<()> {
    let Some(schedule) = store.get_schedule(group, week)? else {
        println!("Группа: {group}\n\nДанные не найдены");
        return Ok(());
    };
    let label = match day {
        Some(day) => {
            let day = Weekday::parse(day).with_context(|| format!("unknown day: {day}"))?;
            println!("{}", render::render_day(&schedule, day, group));
            day.display_name()
        }
        None => {
            println!("{}", render::render_week(&schedule, group));
            "Вся неделя"
        }
    };
    if let Some(user_id) = user {
        store.log_request(user_id, group, label);
    }
    Ok(())
}

async fn run(config: BotConfig, store: Arc<ScheduleStore>) -> anyhow::Result<()> {
    let report = run_preload(&config, &store).await?;
    info!(stored = report.stored(), total = report.total, "initial preload done");

    let swept = maintenance::run_cleanup(Arc::clone(&store), config.store.cleanup_days).await?;
    info!(?swept, "initial cleanup done");

    let cancel = CancellationToken::new();
    let cleanup = maintenance::spawn_cleanup_loop(
        Arc::clone(&store),
        config.store.cleanup_interval(),
        config.store.cleanup_days,
        cancel.clone(),
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();
    cleanup.await?;

    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => tracing::warn!("store still shared at shutdown, skipping close"),
    }
    Ok(())
}
