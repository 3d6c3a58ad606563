use chrono::{Duration, NaiveDate, TimeZone, Utc};
use portal::{
    GroupWordSortKey, Listing, NewStudySession, NewWord, NewWordReview, PageRequest, SortOrder,
    StudySessionFilter, WordFilter,
};

use super::{
    seed_from_dir, Database, SqliteDashboardRepository, SqliteGroupRepository,
    SqliteStudyActivityRepository, SqliteStudySessionRepository, SqliteWordRepository,
};
use crate::config::{get_seed_dir, DatabaseConfig};
use crate::persistence::traits::{
    DashboardRepository, GroupRepository, StudyActivityRepository, StudySessionRepository,
    WordRepository,
};
use crate::persistence::{Entity, ErrorClass, PersistenceError};

async fn insert_activity(db: &Database, name: &str) -> i64 {
    sqlx::query("INSERT INTO study_activities (name, url) VALUES (?, '')")
        .bind(name)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}

async fn review_rows(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM word_review_items")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_group_and_session_word_scopes() {
    let db = Database::new_in_memory().await.unwrap();
    let pool = db.pool().clone();
    let words = SqliteWordRepository::new(pool.clone());
    let groups = SqliteGroupRepository::new(pool.clone());
    let sessions = SqliteStudySessionRepository::new(pool.clone());

    let verbs = groups.create("Verbs").await.unwrap();
    let eat = words.create(&NewWord::new("食べる", "taberu", "eat")).await.unwrap();
    let drink = words.create(&NewWord::new("飲む", "nomu", "drink")).await.unwrap();
    words.add_to_group(eat.id, verbs.id).await.unwrap();
    words.add_to_group(drink.id, verbs.id).await.unwrap();
    assert_eq!(groups.get(verbs.id).await.unwrap().words_count, 2);

    let page = PageRequest::new(1, 10, Listing::GroupWords);
    let listed = groups
        .words(verbs.id, page, GroupWordSortKey::default(), SortOrder::default())
        .await
        .unwrap();
    assert_eq!(listed.total_items, 2);
    assert!(listed
        .items
        .iter()
        .all(|w| w.correct_count == 0 && w.wrong_count == 0));

    let activity = insert_activity(&db, "Flashcards").await;
    let session = sessions
        .create(&NewStudySession::now(verbs.id, activity))
        .await
        .unwrap();
    sessions
        .create_word_review(&NewWordReview::now(session.id, eat.id, true))
        .await
        .unwrap();

    let scoped = sessions
        .words(session.id, PageRequest::new(1, 10, Listing::StudySessionWords))
        .await
        .unwrap();
    assert_eq!(scoped.items.len(), 1);
    assert_eq!(scoped.items[0].id, eat.id);
    assert_eq!((scoped.items[0].correct_count, scoped.items[0].wrong_count), (1, 0));

    let global = groups
        .words(verbs.id, page, GroupWordSortKey::default(), SortOrder::default())
        .await
        .unwrap();
    let eat_stats = global.items.iter().find(|w| w.id == eat.id).unwrap();
    assert_eq!(eat_stats.correct_count, 1);

    // A second session widens the global counts but not the first session's.
    let later = sessions
        .create(&NewStudySession::now(verbs.id, activity))
        .await
        .unwrap();
    sessions
        .create_word_review(&NewWordReview::now(later.id, eat.id, false))
        .await
        .unwrap();

    let scoped = sessions
        .words(session.id, PageRequest::first(Listing::StudySessionWords))
        .await
        .unwrap();
    assert_eq!((scoped.items[0].correct_count, scoped.items[0].wrong_count), (1, 0));
    let global = groups
        .words(verbs.id, page, GroupWordSortKey::default(), SortOrder::default())
        .await
        .unwrap();
    let eat_stats = global.items.iter().find(|w| w.id == eat.id).unwrap();
    assert_eq!((eat_stats.correct_count, eat_stats.wrong_count), (1, 1));
}

#[tokio::test]
async fn test_word_round_trip() {
    let db = Database::new_in_memory().await.unwrap();
    let words = SqliteWordRepository::new(db.pool().clone());
    let input = NewWord::new("美味しい", "oishii", "delicious")
        .with_parts(serde_json::json!([{"kanji": "美", "romaji": ["o"]}, {"kanji": "味", "romaji": ["i"]}]));

    let created = words.create(&input).await.unwrap();
    let loaded = words.get(created.id).await.unwrap();
    assert_eq!(loaded, input.into_word(created.id));
}

#[tokio::test]
async fn test_referential_failures_leave_reviews_unchanged() {
    let db = Database::new_in_memory().await.unwrap();
    let pool = db.pool().clone();
    let words = SqliteWordRepository::new(pool.clone());
    let groups = SqliteGroupRepository::new(pool.clone());
    let sessions = SqliteStudySessionRepository::new(pool.clone());

    let group = groups.create("Verbs").await.unwrap();
    let word = words.create(&NewWord::new("来る", "kuru", "come")).await.unwrap();
    let activity = insert_activity(&db, "Typing").await;
    let session = sessions
        .create(&NewStudySession::now(group.id, activity))
        .await
        .unwrap();
    sessions
        .create_word_review(&NewWordReview::now(session.id, word.id, true))
        .await
        .unwrap();

    let before = review_rows(&db).await;
    for review in [
        NewWordReview::now(session.id, word.id + 50, true),
        NewWordReview::now(session.id + 50, word.id, false),
    ] {
        let err = sessions.create_word_review(&review).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Referential);
    }
    assert_eq!(review_rows(&db).await, before);

    let err = words.add_to_group(word.id, group.id + 50).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Referential);
    let err = words.add_to_group(word.id + 50, group.id).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Referential);
    assert_eq!(groups.get(group.id).await.unwrap().words_count, 0);
}

#[tokio::test]
async fn test_pagination_normalizes_out_of_range_input() {
    let db = Database::new_in_memory().await.unwrap();
    let words = SqliteWordRepository::new(db.pool().clone());
    for i in 0..25 {
        words
            .create(&NewWord::new(format!("k{i}"), format!("r{i}"), format!("e{i}")))
            .await
            .unwrap();
    }

    let negative = words
        .list(&WordFilter::default(), PageRequest::new(-3, 0, Listing::Words))
        .await
        .unwrap();
    let first = words
        .list(&WordFilter::default(), PageRequest::first(Listing::Words))
        .await
        .unwrap();
    assert_eq!(negative, first);
    assert_eq!(first.per_page, 10);
    assert_eq!(first.total_pages, 3);

    let none = words
        .list(&WordFilter::default().english("absent"), PageRequest::first(Listing::Words))
        .await
        .unwrap();
    assert_eq!(none.total_items, 0);
    assert_eq!(none.total_pages, 0);
}

#[tokio::test]
async fn test_word_deletion_clears_memberships() {
    let db = Database::new_in_memory().await.unwrap();
    let pool = db.pool().clone();
    let words = SqliteWordRepository::new(pool.clone());
    let groups = SqliteGroupRepository::new(pool.clone());

    let food = groups.create("Food").await.unwrap();
    let verbs = groups.create("Verbs").await.unwrap();
    let eat = words.create(&NewWord::new("食べる", "taberu", "eat")).await.unwrap();
    words.add_to_group(eat.id, food.id).await.unwrap();
    words.add_to_group(eat.id, verbs.id).await.unwrap();

    words.delete(eat.id).await.unwrap();

    for group in [food.id, verbs.id] {
        assert_eq!(groups.get(group).await.unwrap().words_count, 0);
        assert!(groups.words_raw(group).await.unwrap().words.is_empty());
    }
    assert!(matches!(
        words.get(eat.id).await,
        Err(PersistenceError::NotFound {
            entity: Entity::Word,
            ..
        })
    ));
}

#[tokio::test]
async fn test_dashboard_after_seed() {
    let db = Database::new_in_memory().await.unwrap();
    let pool = db.pool().clone();
    let report = seed_from_dir(&pool, &get_seed_dir()).await.unwrap();

    let dashboard = SqliteDashboardRepository::new(pool.clone());
    let sessions = SqliteStudySessionRepository::new(pool.clone());
    let activities = SqliteStudyActivityRepository::new(pool.clone());
    let words = SqliteWordRepository::new(pool.clone());

    let progress = dashboard.study_progress().await.unwrap();
    assert_eq!(progress.total_words_studied, 0);
    assert_eq!(progress.total_available_words as u64, report.words);

    let activity = activities
        .list(PageRequest::first(Listing::StudyActivities))
        .await
        .unwrap()
        .items[0]
        .id;
    let word = words
        .list(&WordFilter::default(), PageRequest::first(Listing::Words))
        .await
        .unwrap()
        .items[0]
        .id;

    let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let midday = Utc.from_utc_datetime(&today.and_hms_opt(12, 0, 0).unwrap());
    for created_at in [midday, midday - Duration::days(1)] {
        let session = sessions
            .create(&NewStudySession {
                group_id: 1,
                study_activity_id: activity,
                created_at,
            })
            .await
            .unwrap();
        sessions
            .create_word_review(&NewWordReview {
                word_id: word,
                study_session_id: session.id,
                correct: created_at == midday,
                created_at: created_at + Duration::minutes(3),
            })
            .await
            .unwrap();
    }

    let stats = dashboard.quick_stats_on(today).await.unwrap();
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.success_rate, 50);
    assert_eq!(stats.total_study_sessions, 2);
    assert_eq!(stats.total_active_groups, 3);

    let last = dashboard.last_study_session().await.unwrap();
    assert_eq!(last.created_at, midday);
    assert_eq!(activities.details(activity).await.unwrap().total_sessions, 2);

    let listed = sessions
        .list(
            &StudySessionFilter::default().activity(activity),
            PageRequest::first(Listing::StudySessions),
        )
        .await
        .unwrap();
    assert_eq!(listed.total_items, 2);
    assert_eq!(listed.items[0].start_time, midday);
    assert_eq!(listed.items[0].end_time, midday + Duration::minutes(3));
}

#[tokio::test]
async fn test_concurrent_repo_access() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DatabaseConfig::at(dir.path().join("concurrent.db"));
    config.max_connections = 4;
    let db = Database::open(&config).await.unwrap();
    let pool = db.pool().clone();

    let groups = SqliteGroupRepository::new(pool.clone());
    let group_id = groups.create("Shared").await.unwrap().id;
    let activity = insert_activity(&db, "Flashcards").await;

    let mut tasks = Vec::new();
    for worker in 0..4_i64 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move {
            let words = SqliteWordRepository::new(pool.clone());
            let sessions = SqliteStudySessionRepository::new(pool);
            let session = sessions
                .create(&NewStudySession::now(group_id, activity))
                .await
                .unwrap();
            for i in 0..5_i64 {
                let word = words
                    .create(&NewWord::new(
                        format!("k{worker}-{i}"),
                        format!("r{worker}-{i}"),
                        format!("e{worker}-{i}"),
                    ))
                    .await
                    .unwrap();
                words.add_to_group(word.id, group_id).await.unwrap();
                sessions
                    .create_word_review(&NewWordReview::now(session.id, word.id, i % 2 == 0))
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(groups.get(group_id).await.unwrap().words_count, 20);
    assert_eq!(review_rows(&db).await, 20);

    let dashboard = SqliteDashboardRepository::new(pool.clone());
    let stats = dashboard.quick_stats().await.unwrap();
    assert_eq!(stats.total_study_sessions, 4);
    assert_eq!(stats.success_rate, 60);
    assert_eq!(stats.current_streak, 1);
}
