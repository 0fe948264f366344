use chrono::Duration;
use mehfil_core::model::{
    AdminIdentity, ContentItemDraft, DayContent, DayNumber, EventSettings, ScoreRecord,
    UserIdentity,
};
use mehfil_core::time::fixed_now;
use storage::repository::{
    AttemptRepository, ContentRepository, NoteRepository, QuizBankRepository, ResultRepository,
    SessionRepository, SettingsRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_identity(name: &str) -> UserIdentity {
    UserIdentity::new(name, "pw").unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_day_content_with_items() {
    let repo = connect("memdb_content").await;

    let items = vec![
        ContentItemDraft::VideoLink {
            url: "https://youtu.be/abc123".into(),
        }
        .validate()
        .unwrap(),
        ContentItemDraft::DocumentLink {
            url: "https://example.com/notes.pdf".into(),
        }
        .validate()
        .unwrap(),
        ContentItemDraft::AudioUpload {
            name: "recitation.mp3".into(),
            data: vec![0x49, 0x44, 0x33, 0x04],
        }
        .validate()
        .unwrap(),
    ];
    let content = DayContent::new(DayNumber::new(3), Some("Aug 23".into()), items);
    repo.upsert_day(&content).await.unwrap();

    let fetched = repo.get_day(DayNumber::new(3)).await.unwrap().unwrap();
    assert_eq!(fetched, content);

    assert_eq!(repo.get_day(DayNumber::new(4)).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_upsert_replaces_item_list() {
    let repo = connect("memdb_replace").await;
    let day = DayNumber::new(1);

    let first = DayContent::new(
        day,
        Some("Aug 21".into()),
        vec![
            ContentItemDraft::VideoLink {
                url: "https://youtu.be/old".into(),
            }
            .validate()
            .unwrap(),
        ],
    );
    repo.upsert_day(&first).await.unwrap();

    let second = DayContent::new(
        day,
        None,
        vec![
            ContentItemDraft::DocumentLink {
                url: "https://example.com/new.pdf".into(),
            }
            .validate()
            .unwrap(),
        ],
    );
    repo.upsert_day(&second).await.unwrap();

    let fetched = repo.get_day(day).await.unwrap().unwrap();
    assert_eq!(fetched, second);
    assert_eq!(fetched.items().len(), 1);
}

#[tokio::test]
async fn sqlite_lists_sparse_days_in_order() {
    let repo = connect("memdb_days").await;
    for day in [7, 2, 11] {
        let content = DayContent::new(DayNumber::new(day), None, Vec::new());
        repo.upsert_day(&content).await.unwrap();
    }

    let days = repo.list_days().await.unwrap();
    let numbers: Vec<u32> = days.iter().map(|d| d.day.value()).collect();
    assert_eq!(numbers, [2, 7, 11]);
}

#[tokio::test]
async fn sqlite_notes_are_keyed_by_day_and_identity() {
    let repo = connect("memdb_notes").await;
    let day = DayNumber::new(2);
    let ayesha = build_identity("ayesha");

    repo.save_note(day, &ayesha, "first draft").await.unwrap();
    repo.save_note(day, &ayesha, "second draft").await.unwrap();
    assert_eq!(
        repo.get_note(day, &ayesha).await.unwrap().as_deref(),
        Some("second draft")
    );

    let bilal = build_identity("bilal");
    assert_eq!(repo.get_note(day, &bilal).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_quiz_override_set_get_clear() {
    let repo = connect("memdb_override").await;
    assert_eq!(repo.get_override().await.unwrap(), None);

    repo.set_override("Q,A\nq1,a1").await.unwrap();
    repo.set_override("Q,A\nq2,a2").await.unwrap();
    assert_eq!(
        repo.get_override().await.unwrap().as_deref(),
        Some("Q,A\nq2,a2")
    );

    repo.clear_override().await.unwrap();
    assert_eq!(repo.get_override().await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_settings_roundtrip() {
    let repo = connect("memdb_settings").await;
    assert_eq!(repo.get_settings().await.unwrap(), None);

    let settings = EventSettings::from_persisted(
        true,
        false,
        Some("https://forms.example.com/quiz".into()),
        true,
    )
    .unwrap();
    repo.save_settings(&settings).await.unwrap();

    let fetched = repo.get_settings().await.unwrap().unwrap();
    assert_eq!(fetched, settings);
}

#[tokio::test]
async fn sqlite_results_keep_submission_order() {
    let repo = connect("memdb_results").await;
    let now = fixed_now();

    for (name, score, offset) in [("a", 3_u32, 0_i64), ("b", 9, 1), ("c", 3, 2)] {
        let record = ScoreRecord::new(
            build_identity(name),
            score,
            now + Duration::minutes(offset),
        );
        repo.append_result(&record).await.unwrap();
    }

    let results = repo.list_results().await.unwrap();
    let names: Vec<_> = results.iter().map(ScoreRecord::name).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(results[1].score(), 9);

    repo.clear_results().await.unwrap();
    assert!(repo.list_results().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_attempt_flag_is_one_shot() {
    let repo = connect("memdb_attempts").await;
    let identity = build_identity("ayesha");

    assert!(!repo.has_attempted(&identity).await.unwrap());
    repo.mark_attempted(&identity, fixed_now()).await.unwrap();
    repo.mark_attempted(&identity, fixed_now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(repo.has_attempted(&identity).await.unwrap());

    // Another identity sharing the name but not the password is distinct.
    let other = UserIdentity::new("ayesha", "other-pw").unwrap();
    assert!(!repo.has_attempted(&other).await.unwrap());
}

#[tokio::test]
async fn sqlite_sessions_roundtrip() {
    let repo = connect("memdb_sessions").await;

    let user = build_identity("ayesha");
    let admin = AdminIdentity::new("admin@example.com").unwrap();

    repo.save_user(&user).await.unwrap();
    repo.save_admin(&admin).await.unwrap();
    assert_eq!(repo.load_user().await.unwrap(), Some(user.clone()));
    assert_eq!(repo.load_admin().await.unwrap(), Some(admin));

    let replacement = build_identity("bilal");
    repo.save_user(&replacement).await.unwrap();
    assert_eq!(repo.load_user().await.unwrap(), Some(replacement));

    repo.clear_user().await.unwrap();
    repo.clear_admin().await.unwrap();
    assert_eq!(repo.load_user().await.unwrap(), None);
    assert_eq!(repo.load_admin().await.unwrap(), None);
}
