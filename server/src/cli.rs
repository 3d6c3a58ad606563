//! Subcommand definitions and dispatch.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use portal::{
    parse_id, parse_parts, GroupSortKey, GroupWordSortKey, Listing, NewStudySession, NewWord,
    NewWordReview, PageRequest, SortOrder, StudySessionFilter, WordFilter,
};
use serde::Serialize;

use lang_portal_server::config::{self, DatabaseConfig};
use lang_portal_server::persistence::sqlite::{
    seed_from_dir, Database, SqliteDashboardRepository, SqliteGroupRepository,
    SqliteStudyActivityRepository, SqliteStudySessionRepository, SqliteWordRepository,
};
use lang_portal_server::persistence::traits::{
    DashboardRepository, GroupRepository, StudyActivityRepository, StudySessionRepository,
    WordRepository,
};
use lang_portal_server::persistence::{with_deadline, PersistenceError};

#[derive(Parser)]
#[command(name = "lang-portal", about = "Vocabulary store for the language learning portal")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database if needed and apply pending migrations.
    Migrate,
    /// Import the starter vocabulary into an empty database.
    Seed {
        /// Directory holding study_activities.json, groups.json and words.json.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Vocabulary words.
    Words {
        #[command(subcommand)]
        action: WordAction,
    },
    /// Word groups.
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// The study activity catalog.
    Activities {
        #[command(subcommand)]
        action: ActivityAction,
    },
    /// Study sessions and word reviews.
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Aggregate statistics.
    Dashboard {
        #[command(subcommand)]
        action: DashboardAction,
    },
}

/// Raw page arguments; normalized per listing by [`PageRequest::new`].
#[derive(Args, Clone, Copy)]
struct PageArgs {
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    /// Page size. Values below 1 select the listing's default.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    per_page: i64,
}

impl PageArgs {
    fn request(self, listing: Listing) -> PageRequest {
        PageRequest::new(self.page, self.per_page, listing)
    }
}

#[derive(Args)]
struct SortArgs {
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long)]
    order: Option<String>,
}

#[derive(Args)]
struct WordFields {
    #[arg(long)]
    kanji: String,
    #[arg(long)]
    romaji: String,
    #[arg(long)]
    english: String,
    /// JSON value stored verbatim. Defaults to `{}`.
    #[arg(long)]
    parts: Option<String>,
}

impl WordFields {
    fn into_new_word(self) -> Result<NewWord, PersistenceError> {
        let mut word = NewWord::new(self.kanji, self.romaji, self.english);
        if let Some(raw) = self.parts {
            word = word.with_parts(parse_parts(&raw)?);
        }
        word.validate()?;
        Ok(word)
    }
}

#[derive(Subcommand)]
enum WordAction {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        kanji: Option<String>,
        #[arg(long)]
        romaji: Option<String>,
        #[arg(long)]
        english: Option<String>,
        #[arg(long)]
        group: Option<i64>,
    },
    Get {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: WordFields,
    },
    /// Overwrite every field of an existing word.
    Update {
        id: String,
        #[command(flatten)]
        fields: WordFields,
    },
    Delete {
        id: String,
    },
    AddToGroup {
        word_id: String,
        group_id: String,
    },
    RemoveFromGroup {
        word_id: String,
        group_id: String,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        sort: SortArgs,
    },
    Get {
        id: String,
    },
    Create {
        name: String,
    },
    /// Words of a group with review counts over all history.
    Words {
        id: String,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Every word of a group including parts, unpaginated.
    WordsRaw {
        id: String,
    },
    Sessions {
        id: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
enum ActivityAction {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Get {
        id: String,
    },
    /// Number of sessions run with the activity.
    Details {
        id: String,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        activity: Option<i64>,
        #[arg(long)]
        group: Option<i64>,
    },
    /// Start a session now.
    Create {
        #[arg(long)]
        group: String,
        #[arg(long)]
        activity: String,
    },
    /// Record one correct/wrong judgment.
    Review {
        session_id: String,
        word_id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        correct: bool,
    },
    /// Words reviewed in the session with counts scoped to it.
    Words {
        id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Details {
        id: String,
    },
    Reviews {
        id: String,
    },
}

#[derive(Subcommand)]
enum DashboardAction {
    LastSession,
    Progress,
    Stats,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_ok() -> anyhow::Result<()> {
    print_json(&serde_json::json!({ "status": "ok" }))
}

fn id(raw: &str) -> Result<i64, PersistenceError> {
    Ok(parse_id(raw)?)
}

fn group_sort(sort: &SortArgs) -> (GroupSortKey, SortOrder) {
    let key = GroupSortKey::from_param(sort.sort_by.as_deref());
    let order = SortOrder::from_param(sort.order.as_deref());
    log_fallback(sort, key.as_str(), order.as_str());
    (key, order)
}

fn group_word_sort(sort: &SortArgs) -> (GroupWordSortKey, SortOrder) {
    let key = GroupWordSortKey::from_param(sort.sort_by.as_deref());
    let order = SortOrder::from_param(sort.order.as_deref());
    log_fallback(sort, key.as_str(), order.as_str());
    (key, order)
}

fn log_fallback(sort: &SortArgs, key: &str, order: &str) {
    if let Some(requested) = sort.sort_by.as_deref().filter(|s| *s != key) {
        tracing::debug!(requested, used = key, "Unknown sort key, using default");
    }
    if let Some(requested) = sort.order.as_deref().filter(|s| *s != order) {
        tracing::debug!(requested, used = order, "Unknown sort order, using default");
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_env();
    let timeout = config::get_query_timeout();
    let db = Database::open(&db_config)
        .await
        .with_context(|| format!("opening {}", db_config.path.display()))?;

    let result = dispatch(cli.command, &db, timeout).await;
    db.close().await;
    result
}

async fn dispatch(command: Command, db: &Database, timeout: Duration) -> anyhow::Result<()> {
    let pool = db.pool().clone();

    match command {
        Command::Migrate => {
            tracing::info!("Database is migrated");
            print_ok()
        }
        Command::Seed { dir } => {
            let dir = dir.unwrap_or_else(config::get_seed_dir);
            let report = with_deadline(timeout, seed_from_dir(&pool, &dir)).await?;
            print_json(&serde_json::json!({
                "skipped": report.skipped,
                "study_activities": report.study_activities,
                "groups": report.groups,
                "words": report.words,
                "memberships": report.memberships,
            }))
        }
        Command::Words { action } => words(action, SqliteWordRepository::new(pool), timeout).await,
        Command::Groups { action } => groups(action, SqliteGroupRepository::new(pool), timeout).await,
        Command::Activities { action } => {
            activities(action, SqliteStudyActivityRepository::new(pool), timeout).await
        }
        Command::Sessions { action } => {
            sessions(action, SqliteStudySessionRepository::new(pool), timeout).await
        }
        Command::Dashboard { action } => {
            dashboard(action, SqliteDashboardRepository::new(pool), timeout).await
        }
    }
}

async fn words(action: WordAction, repo: impl WordRepository, timeout: Duration) -> anyhow::Result<()> {
    match action {
        WordAction::List {
            page,
            kanji,
            romaji,
            english,
            group,
        } => {
            let filter = WordFilter {
                kanji,
                romaji,
                english,
                group_id: group,
            };
            let listed = with_deadline(timeout, repo.list(&filter, page.request(Listing::Words))).await?;
            print_json(&listed)
        }
        WordAction::Get { id: raw } => print_json(&with_deadline(timeout, repo.get(id(&raw)?)).await?),
        WordAction::Create { fields } => {
            let word = fields.into_new_word()?;
            print_json(&with_deadline(timeout, repo.create(&word)).await?)
        }
        WordAction::Update { id: raw, fields } => {
            let word = fields.into_new_word()?.into_word(id(&raw)?);
            word.validate().map_err(PersistenceError::from)?;
            with_deadline(timeout, repo.update(&word)).await?;
            print_json(&word)
        }
        WordAction::Delete { id: raw } => {
            with_deadline(timeout, repo.delete(id(&raw)?)).await?;
            print_ok()
        }
        WordAction::AddToGroup { word_id, group_id } => {
            with_deadline(timeout, repo.add_to_group(id(&word_id)?, id(&group_id)?)).await?;
            print_ok()
        }
        WordAction::RemoveFromGroup { word_id, group_id } => {
            with_deadline(timeout, repo.remove_from_group(id(&word_id)?, id(&group_id)?)).await?;
            print_ok()
        }
    }
}

async fn groups(action: GroupAction, repo: impl GroupRepository, timeout: Duration) -> anyhow::Result<()> {
    match action {
        GroupAction::List { page, sort } => {
            let (key, order) = group_sort(&sort);
            let listed = with_deadline(timeout, repo.list(page.request(Listing::Groups), key, order)).await?;
            print_json(&listed)
        }
        GroupAction::Get { id: raw } => print_json(&with_deadline(timeout, repo.get(id(&raw)?)).await?),
        GroupAction::Create { name } => {
            if name.trim().is_empty() {
                return Err(PersistenceError::from(portal::ValidationError::MissingField("name")).into());
            }
            print_json(&with_deadline(timeout, repo.create(&name)).await?)
        }
        GroupAction::Words { id: raw, page, sort } => {
            let (key, order) = group_word_sort(&sort);
            let listed = with_deadline(
                timeout,
                repo.words(id(&raw)?, page.request(Listing::GroupWords), key, order),
            )
            .await?;
            print_json(&listed)
        }
        GroupAction::WordsRaw { id: raw } => {
            print_json(&with_deadline(timeout, repo.words_raw(id(&raw)?)).await?)
        }
        GroupAction::Sessions { id: raw, page } => {
            let listed = with_deadline(
                timeout,
                repo.study_sessions(id(&raw)?, page.request(Listing::GroupStudySessions)),
            )
            .await?;
            print_json(&listed)
        }
    }
}

async fn activities(
    action: ActivityAction,
    repo: impl StudyActivityRepository,
    timeout: Duration,
) -> anyhow::Result<()> {
    match action {
        ActivityAction::List { page } => {
            print_json(&with_deadline(timeout, repo.list(page.request(Listing::StudyActivities))).await?)
        }
        ActivityAction::Get { id: raw } => print_json(&with_deadline(timeout, repo.get(id(&raw)?)).await?),
        ActivityAction::Details { id: raw } => {
            print_json(&with_deadline(timeout, repo.details(id(&raw)?)).await?)
        }
    }
}

async fn sessions(
    action: SessionAction,
    repo: impl StudySessionRepository,
    timeout: Duration,
) -> anyhow::Result<()> {
    match action {
        SessionAction::List {
            page,
            activity,
            group,
        } => {
            let filter = StudySessionFilter {
                study_activity_id: activity,
                group_id: group,
            };
            let listed =
                with_deadline(timeout, repo.list(&filter, page.request(Listing::StudySessions))).await?;
            print_json(&listed)
        }
        SessionAction::Create { group, activity } => {
            let session = NewStudySession::now(id(&group)?, id(&activity)?);
            print_json(&with_deadline(timeout, repo.create(&session)).await?)
        }
        SessionAction::Review {
            session_id,
            word_id,
            correct,
        } => {
            let review = NewWordReview::now(id(&session_id)?, id(&word_id)?, correct);
            print_json(&with_deadline(timeout, repo.create_word_review(&review)).await?)
        }
        SessionAction::Words { id: raw, page } => {
            let listed = with_deadline(
                timeout,
                repo.words(id(&raw)?, page.request(Listing::StudySessionWords)),
            )
            .await?;
            print_json(&listed)
        }
        SessionAction::Details { id: raw } => {
            print_json(&with_deadline(timeout, repo.details(id(&raw)?)).await?)
        }
        SessionAction::Reviews { id: raw } => {
            print_json(&with_deadline(timeout, repo.reviews(id(&raw)?)).await?)
        }
    }
}

async fn dashboard(
    action: DashboardAction,
    repo: impl DashboardRepository,
    timeout: Duration,
) -> anyhow::Result<()> {
    match action {
        DashboardAction::LastSession => {
            print_json(&with_deadline(timeout, repo.last_study_session()).await?)
        }
        DashboardAction::Progress => {
            let progress = with_deadline(timeout, repo.study_progress()).await?;
            print_json(&serde_json::json!({
                "total_words_studied": progress.total_words_studied,
                "total_available_words": progress.total_available_words,
                "study_progress_percentage": progress.percentage(),
            }))
        }
        DashboardAction::Stats => print_json(&with_deadline(timeout, repo.quick_stats()).await?),
    }
}
