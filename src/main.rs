use bags::{
    analytics,
    report::{self, HISTORY_HEADER},
    runtime::{
        CommandSource, LineCommandSource, PracticeCommand, RunOutcome, RunReport, Runner,
        ScriptCommandSource,
    },
    settings::{FileSettingsStore, Settings, SettingsStore},
    store::PAGE_SIZE,
    SessionId, SessionStore, SessionTracker, SortOrder, SqliteSessionStore, TrackerEvent,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::{error::Error, io, path::PathBuf};

/// cornhole practice tracker
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Record 10-round cornhole practice sessions, keep your history, and see how your points per round and four-baggers are trending."
)]
pub struct Cli {
    /// path to the session database
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// path to the settings file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// practice interactively: type h/b/m per throw, u to undo, s to save
    Practice {
        #[clap(long)]
        bag_type: Option<String>,
        #[clap(long)]
        style: Option<String>,
    },
    /// record a whole session from a throw script, e.g. "hhbm hhhh ..."
    Record {
        throws: String,
        #[clap(long)]
        bag_type: Option<String>,
        #[clap(long)]
        style: Option<String>,
    },
    /// list saved sessions, newest first
    History {
        #[clap(long, default_value_t = 0)]
        page: usize,
    },
    /// performance overview, trends and insights
    Trends,
    /// compare performance across bag types
    Compare,
    /// change the labels of a saved session
    Edit {
        id: SessionId,
        #[clap(long)]
        bag_type: Option<String>,
        #[clap(long, conflicts_with = "clear_style")]
        style: Option<String>,
        #[clap(long)]
        clear_style: bool,
    },
    /// delete a saved session
    Delete { id: SessionId },
    /// manage bag types
    BagTypes {
        #[clap(subcommand)]
        action: LabelAction,
    },
    /// manage throwing styles
    Styles {
        #[clap(subcommand)]
        action: LabelAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum LabelAction {
    List,
    Add { label: String },
    Remove { label: String },
    Default { label: String },
}

impl Cli {
    fn open_store(&self) -> Result<SqliteSessionStore, Box<dyn Error>> {
        Ok(match &self.db {
            Some(path) => SqliteSessionStore::open(path)?,
            None => SqliteSessionStore::open_default()?,
        })
    }

    fn settings_store(&self) -> FileSettingsStore {
        match &self.config {
            Some(path) => FileSettingsStore::with_path(path),
            None => FileSettingsStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = cli.settings_store();

    match &cli.command {
        Command::Practice { bag_type, style } => {
            let store = cli.open_store()?;
            let source = LineCommandSource::new(io::stdin().lock());
            run_session(source, &store, &settings, bag_type, style, true)
        }
        Command::Record {
            throws,
            bag_type,
            style,
        } => {
            let store = cli.open_store()?;
            let script = ScriptCommandSource::parse(throws)?.followed_by(PracticeCommand::Save);
            run_session(script, &store, &settings, bag_type, style, false)
        }
        Command::History { page } => {
            let store = cli.open_store()?;
            let offset = page
                .checked_mul(PAGE_SIZE)
                .ok_or_else(|| format!("page {page} is out of range"))?;
            let sessions = store.page(SortOrder::NewestFirst, offset, PAGE_SIZE)?;
            if sessions.is_empty() {
                println!("No saved sessions");
                return Ok(());
            }
            let now = Utc::now();
            println!("{HISTORY_HEADER}");
            for s in &sessions {
                println!("{}", report::history_row(s, now));
            }
            let total = store.count()?;
            if total > offset + sessions.len() {
                println!("... more sessions: --page {}", page + 1);
            }
            Ok(())
        }
        Command::Trends => {
            let store = cli.open_store()?;
            let sessions = store.load_all(SortOrder::OldestFirst)?;
            println!("Performance Overview");
            for line in report::overview_lines(&analytics::overview(&sessions)) {
                println!("  {line}");
            }
            println!("Detailed Insights");
            for line in report::insight_lines(&analytics::insights(&sessions)) {
                println!("  {line}");
            }
            Ok(())
        }
        Command::Compare => {
            let store = cli.open_store()?;
            let sessions = store.load_all(SortOrder::OldestFirst)?;
            let performance = analytics::bag_performance(&sessions);
            if performance.is_empty() {
                println!("No bag performance data available");
            }
            for p in &performance {
                for line in report::bag_lines(p) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        Command::Edit {
            id,
            bag_type,
            style,
            clear_style,
        } => {
            let store = cli.open_store()?;
            let Some(current) = store.get(*id)? else {
                return Err(bags::StoreError::NotFound(*id).into());
            };
            let bag_type = bag_type.as_deref().unwrap_or(&current.bag_type);
            let style = match (style, clear_style) {
                (_, true) => None,
                (Some(s), false) => Some(s.as_str()),
                (None, false) => current.throwing_style.as_deref(),
            };
            store.update_labels(*id, bag_type, style)?;
            println!("Updated session {id}");
            Ok(())
        }
        Command::Delete { id } => {
            let store = cli.open_store()?;
            store.delete(*id)?;
            println!("Deleted session {id}");
            Ok(())
        }
        Command::BagTypes { action } => manage_labels(&settings, action, LabelKind::BagType),
        Command::Styles { action } => manage_labels(&settings, action, LabelKind::Style),
    }
}

fn run_session<C: CommandSource>(
    source: C,
    store: &dyn SessionStore,
    settings: &dyn SettingsStore,
    bag_type: &Option<String>,
    style: &Option<String>,
    interactive: bool,
) -> Result<(), Box<dyn Error>> {
    let mut tracker = SessionTracker::new(settings);
    let bag_type = bag_type
        .clone()
        .unwrap_or_else(|| tracker.bag_type().to_string());
    let style = style
        .clone()
        .or_else(|| tracker.throwing_style().map(str::to_string));
    tracker.set_labels(bag_type, style);
    tracker.setup_new_session();

    if interactive {
        println!("{}", report::tracker_status(&tracker));
    }

    let mut runner = Runner::new(source);
    let outcome = runner.run(&mut tracker, store, |t, r| match r {
        RunReport::SaveFailed(e) => eprintln!("Could not save session: {e}"),
        RunReport::Event(TrackerEvent::RoundComplete { round, score }) if interactive => {
            println!("Round {round}: {score} points");
            println!("{}", report::tracker_status(t));
        }
        RunReport::Event(TrackerEvent::Ignored) if interactive => {
            println!("Nothing to do. {}", report::tracker_status(t));
        }
        RunReport::Event(_) if interactive => println!("{}", report::tracker_status(t)),
        RunReport::Event(_) => {}
    });

    match outcome {
        RunOutcome::Saved(summary) => {
            println!(
                "Saved session {}: {:.2} PPR, {} in hole, {} on board, {} off board, {} four baggers",
                summary.id,
                summary.points_per_round,
                summary.total_bags_in_hole,
                summary.bags_on_board,
                summary.bags_off_board,
                summary.four_baggers
            );
            Ok(())
        }
        RunOutcome::Discarded => {
            println!("Session discarded");
            Ok(())
        }
        RunOutcome::Abandoned if interactive => {
            println!("Session not saved");
            Ok(())
        }
        RunOutcome::Abandoned => Err("session was not saved".into()),
    }
}

#[derive(Debug, Clone, Copy)]
enum LabelKind {
    BagType,
    Style,
}

fn manage_labels(
    store: &dyn SettingsStore,
    action: &LabelAction,
    kind: LabelKind,
) -> Result<(), Box<dyn Error>> {
    let mut settings: Settings = store.load();
    match (action, kind) {
        (LabelAction::List, LabelKind::BagType) => {
            for label in &settings.bag_types {
                let marker = if *label == settings.default_bag_type { "*" } else { " " };
                println!("{marker} {label}");
            }
            return Ok(());
        }
        (LabelAction::List, LabelKind::Style) => {
            for label in &settings.throwing_styles {
                let marker = if settings.default_throwing_style.as_ref() == Some(label) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {label}");
            }
            return Ok(());
        }
        (LabelAction::Add { label }, LabelKind::BagType) => {
            if !settings.add_bag_type(label) {
                println!("'{label}' not added (blank or already present)");
            }
        }
        (LabelAction::Add { label }, LabelKind::Style) => {
            if !settings.add_throwing_style(label) {
                println!("'{label}' not added (blank or already present)");
            }
        }
        (LabelAction::Remove { label }, LabelKind::BagType) => settings.remove_bag_type(label)?,
        (LabelAction::Remove { label }, LabelKind::Style) => {
            settings.remove_throwing_style(label)?
        }
        (LabelAction::Default { label }, LabelKind::BagType) => {
            settings.set_default_bag_type(label)?
        }
        (LabelAction::Default { label }, LabelKind::Style) => {
            settings.set_default_throwing_style(label)?
        }
    }
    store.save(&settings)?;
    Ok(())
}
