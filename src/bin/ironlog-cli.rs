use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use structopt::StructOpt;
use time::OffsetDateTime;
use uuid::Uuid;

use ironlog::analytics::{self, SortOrder};
use ironlog::catalog;
use ironlog::client::{Gateway, HttpGateway, WorkoutLog};
use ironlog::errors::TrackerError;
use ironlog::session::{FileStorage, Session};
use ironlog::environment::Config;
use ironlog::timer::{format_remaining, RestTimer, TimerDriver, TimerState};
use ironlog::urls::Urls;
use ironlog::workout::{Category, Intensity, WorkoutDraft, WorkoutRecord};
use log::{debug, initialize_logger};

#[derive(Debug, StructOpt)]
#[structopt(name = "ironlog-cli", about = "Log workouts and review your training")]
struct Opt {
    /// Base URL of the gateway
    #[structopt(long, env = "IRONLOG_URL", default_value = "http://localhost:8080/")]
    url: String,

    /// Path segment the gateway's endpoints live under
    #[structopt(long, env = "IRONLOG_API_PREFIX", default_value = "api")]
    api_prefix: String,

    /// Where the logged-in user is remembered
    #[structopt(long, env = "IRONLOG_SESSION_FILE", default_value = ".ironlog-session.json")]
    session: String,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Log in and remember the user
    Login {
        email: String,

        #[structopt(long, env = "IRONLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the logged-in user
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Record a workout
    Log {
        exercise: String,

        #[structopt(long, default_value = "strength")]
        category: Category,

        #[structopt(long)]
        sets: Option<i32>,

        #[structopt(long)]
        reps: Option<i32>,

        /// Leave out for bodyweight exercises
        #[structopt(long)]
        weight: Option<f64>,

        /// In minutes
        #[structopt(long)]
        duration: Option<i32>,

        #[structopt(long)]
        distance: Option<f64>,

        #[structopt(long, default_value = "medium")]
        intensity: Intensity,

        /// Unix timestamp of the session; defaults to now
        #[structopt(long)]
        date: Option<i64>,
    },
    /// List logged workouts
    List {
        /// One of date, exercise, volume
        #[structopt(long, default_value = "date")]
        sort: SortOrder,
    },
    /// Delete a workout by ID
    Delete { id: Uuid },
    /// Show totals, streak and trends
    Stats {
        #[structopt(long, default_value = "30")]
        window: usize,
    },
    /// Show personal records
    Records {
        #[structopt(long, default_value = "5")]
        limit: usize,
    },
    /// Browse the exercise catalog
    Exercises { category: Option<Category> },
    /// Count down a rest interval
    Rest {
        /// Defaults to IRONLOG_REST_PRESET_SECONDS, or 90
        #[structopt(long)]
        seconds: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let urls = Urls::new(&opt.url, &opt.api_prefix)?;
    let gateway = HttpGateway::new(urls);
    let mut session = Session::load(FileStorage::new(&opt.session))?;

    debug!(logger, "Loaded session"; "path" => &opt.session, "logged_in" => session.current_user().is_some());

    match opt.command {
        Command::Login { email, password } => {
            let user = gateway.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
            session.login(user)?;
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("Not logged in"),
        },
        Command::Exercises { category } => {
            let categories = match category {
                Some(c) => vec![catalog::category(c)],
                None => catalog::all().to_vec(),
            };

            for info in categories {
                println!("{}", info.name);
                for group in info.groups {
                    println!("  {}: {}", group.name, group.exercises.join(", "));
                }
            }
        }
        Command::Rest { seconds } => {
            let config = Config::from_env();
            rest(logger, seconds.unwrap_or(config.rest_preset_seconds)).await?;
        }
        command => {
            let user = session
                .current_user()
                .ok_or(TrackerError::NotLoggedIn)?;
            let mut workouts = WorkoutLog::new(gateway, user.email.clone(), &logger);
            workouts.refresh().await?;

            run(&mut workouts, command).await?;
        }
    }

    Ok(())
}

async fn run(
    workouts: &mut WorkoutLog<HttpGateway>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    let now = OffsetDateTime::now_utc();

    match command {
        Command::Log {
            exercise,
            category,
            sets,
            reps,
            weight,
            duration,
            distance,
            intensity,
            date,
        } => {
            let draft = WorkoutDraft {
                exercise,
                category,
                sets,
                reps,
                weight,
                duration,
                distance,
                intensity,
            };
            if let Some(note) = catalog::hint(category, &draft.exercise) {
                println!("Note: {}", note);
            }

            let occurred_at = date.map(OffsetDateTime::from_unix_timestamp).unwrap_or(now);

            let record = workouts.submit_at(&draft, occurred_at).await?;
            println!("Saved {}", describe(&record));
        }
        Command::List { sort } => {
            for record in analytics::sorted(workouts.records(), sort) {
                println!("{}", describe(record));
            }
        }
        Command::Delete { id } => {
            workouts.remove(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Stats { window } => {
            let summary = workouts.summary(now, window);

            println!("Workouts:  {}", summary.total_workouts);
            println!("This week: {}", summary.this_week);
            println!("Volume:    {}", summary.total_volume);
            println!("Streak:    {} days", summary.streak);
            for (group, count) in &summary.muscle_groups {
                println!("  {}: {}", group, count);
            }
            for point in &summary.volume_by_date {
                println!("  {}: {}", point.date.format("%F"), point.volume);
            }
        }
        Command::Records { limit } => {
            let personal_records = workouts.personal_records();

            for (exercise, bests) in &personal_records.records_by_exercise {
                println!(
                    "{}: {} kg, {} reps, {} sets, {} volume over {} sessions",
                    exercise,
                    bests.max_weight,
                    bests.max_reps,
                    bests.max_sets,
                    bests.max_volume,
                    bests.total_workouts
                );
            }
            for event in personal_records.recent_events(limit) {
                println!(
                    "New {:?} on {} for {}: {}",
                    event.metric,
                    event.occurred_at.date().format("%F"),
                    event.exercise,
                    event.value
                );
            }
        }
        _ => {}
    }

    Ok(())
}

fn describe(record: &WorkoutRecord) -> String {
    let details = match record.category {
        Category::Strength => format!(
            "{} x {} @ {}",
            record.sets.unwrap_or(0),
            record.reps.unwrap_or(0),
            record
                .weight
                .map(|w| format!("{} kg", w))
                .unwrap_or_else(|| "bodyweight".to_owned())
        ),
        Category::Cardio | Category::Flexibility => format!(
            "{} min, {}",
            record.duration.unwrap_or(0),
            record.intensity
        ),
    };

    format!(
        "{} {} ({}) {} [{}]",
        record.occurred_at.date().format("%F"),
        record.exercise,
        record.category,
        details,
        record.id
    )
}

async fn rest(logger: log::Logger, seconds: u32) -> Result<(), Box<dyn Error>> {
    let notifier = Arc::new(|| {
        println!("\x07Rest is over");
        Ok::<(), TrackerError>(())
    });
    let timer = RestTimer::with_preset(logger, seconds)?.with_notifier(notifier);
    let mut driver = TimerDriver::new(timer);
    driver.start();

    let mut display = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = display.tick() => {
                match driver.state() {
                    TimerState::Expired => break,
                    state => println!("{}", format_remaining(state.remaining())),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                driver.pause();
                println!("Paused at {}", format_remaining(driver.remaining()));
                break;
            }
        }
    }

    Ok(())
}
