use std::sync::Arc;

use async_trait::async_trait;
use mehfil_core::csv::Table;
use mehfil_core::model::{ContentItemDraft, ContentItemKind, DayNumber, ScoreRecord, UserIdentity};
use mehfil_core::time::{fixed_clock, fixed_now};
use services::{AdminCredentials, AdminError, AppServices, FetchError, MainQuizCard, SheetFetcher};
use storage::repository::Storage;

const PUBLISHED_BANK: &str = "Q,A,B\nPublished question?,right,wrong";

struct StubFetcher;

#[async_trait]
impl SheetFetcher for StubFetcher {
    async fn fetch_users(&self) -> Result<Table, FetchError> {
        Ok(Table::parse("Name,Password")?)
    }

    async fn fetch_main_quiz(&self) -> Result<Table, FetchError> {
        Ok(Table::parse(PUBLISHED_BANK)?)
    }

    async fn fetch_demo_quiz(&self) -> Result<Table, FetchError> {
        Ok(Table::parse(PUBLISHED_BANK)?)
    }
}

fn build_services() -> AppServices {
    AppServices::from_parts(
        Storage::in_memory(),
        Arc::new(StubFetcher),
        AdminCredentials::new("admin@example.com", "pw"),
        fixed_clock(),
    )
}

fn build_identity() -> UserIdentity {
    UserIdentity::new("ayesha", "pw").unwrap()
}

#[tokio::test]
async fn day_content_saves_wholesale_and_reloads() {
    let services = build_services();
    let admin = services.admin();
    let day = DayNumber::new(2);

    let saved = admin
        .save_day_content(
            day,
            Some("Aug 22".into()),
            vec![
                ContentItemDraft::VideoLink {
                    url: "https://youtu.be/abc".into(),
                },
                ContentItemDraft::DocumentUpload {
                    name: "handout.pdf".into(),
                    data: vec![0x25, 0x50, 0x44, 0x46],
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(saved.items().len(), 2);

    // A later save replaces the whole value.
    admin
        .save_day_content(day, None, Vec::new())
        .await
        .unwrap();
    let reloaded = admin.day_content(day).await.unwrap().unwrap();
    assert_eq!(reloaded.date_label(), None);
    assert!(reloaded.items().is_empty());
}

#[tokio::test]
async fn invalid_draft_rejects_before_writing() {
    let services = build_services();
    let admin = services.admin();
    let day = DayNumber::new(1);

    admin
        .save_day_content(
            day,
            Some("Aug 21".into()),
            vec![ContentItemDraft::VideoLink {
                url: "https://youtu.be/keep-me".into(),
            }],
        )
        .await
        .unwrap();

    let err = admin
        .save_day_content(
            day,
            Some("broken".into()),
            vec![ContentItemDraft::DocumentLink {
                url: "not a url".into(),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Content(_)));
    assert!(!err.is_quota_exceeded());

    // The previously saved day is untouched.
    let kept = admin.day_content(day).await.unwrap().unwrap();
    assert_eq!(kept.date_label(), Some("Aug 21"));
    assert_eq!(kept.items()[0].kind(), ContentItemKind::VideoLink);
}

#[tokio::test]
async fn quiz_override_requires_two_columns_and_a_row() {
    let services = build_services();
    let admin = services.admin();

    let err = admin.save_quiz_override("Question\nonly-one").await.unwrap_err();
    assert!(matches!(err, AdminError::InvalidQuizCsv { .. }));

    let err = admin.save_quiz_override("Q,A\n").await.unwrap_err();
    assert!(matches!(err, AdminError::InvalidQuizCsv { .. }));

    admin
        .save_quiz_override("Q,A\nOverride question?,right")
        .await
        .unwrap();

    let text = admin.quiz_bank_text().await.unwrap();
    assert!(text.is_override());
    assert!(text.text().contains("Override question?"));
}

#[tokio::test]
async fn quiz_bank_text_falls_back_to_published_bank() {
    let services = build_services();
    let admin = services.admin();

    let text = admin.quiz_bank_text().await.unwrap();
    assert!(!text.is_override());
    assert!(text.text().contains("Published question?"));

    admin
        .save_quiz_override("Q,A\nOverride question?,right")
        .await
        .unwrap();
    admin.clear_quiz_override().await.unwrap();

    let text = admin.quiz_bank_text().await.unwrap();
    assert!(!text.is_override());
}

#[tokio::test]
async fn visibility_toggles_drive_the_dashboard() {
    let services = build_services();
    let admin = services.admin();
    let dashboard = services.dashboard();
    let identity = build_identity();

    let view = dashboard.dashboard(&identity).await.unwrap();
    assert_eq!(view.main_quiz, MainQuizCard::Locked);
    assert!(!view.main_quiz.can_enter());
    assert!(view.demo_quiz_open);
    assert_eq!(view.leaderboard, None);

    admin.set_main_quiz_visible(true).await.unwrap();
    let view = dashboard.dashboard(&identity).await.unwrap();
    assert_eq!(view.main_quiz, MainQuizCard::Open);
    assert!(view.demo_quiz_open);

    admin.set_main_quiz_visible(false).await.unwrap();
    let view = dashboard.dashboard(&identity).await.unwrap();
    assert_eq!(view.main_quiz, MainQuizCard::Locked);
    // The demo card never locks.
    assert!(view.demo_quiz_open);
}

#[tokio::test]
async fn attempted_identity_sees_completed_card() {
    let services = build_services();
    let identity = build_identity();
    services.admin().set_main_quiz_visible(true).await.unwrap();
    services
        .storage()
        .attempts
        .mark_attempted(&identity, fixed_now())
        .await
        .unwrap();

    let view = services.dashboard().dashboard(&identity).await.unwrap();
    assert_eq!(view.main_quiz, MainQuizCard::Completed);
    assert!(!view.main_quiz.can_enter());
}

#[tokio::test]
async fn external_form_card_needs_url_and_toggle() {
    let services = build_services();
    let admin = services.admin();
    let dashboard = services.dashboard();
    let identity = build_identity();

    admin
        .set_external_form(Some("https://forms.example.com/quiz".into()), false)
        .await
        .unwrap();
    let view = dashboard.dashboard(&identity).await.unwrap();
    assert_eq!(view.external_form_url, None);

    admin
        .set_external_form(Some("https://forms.example.com/quiz".into()), true)
        .await
        .unwrap();
    let view = dashboard.dashboard(&identity).await.unwrap();
    assert_eq!(
        view.external_form_url.as_deref(),
        Some("https://forms.example.com/quiz")
    );

    let err = admin
        .set_external_form(Some("not a url".into()), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Settings(_)));
}

#[tokio::test]
async fn leaderboard_lists_standings_when_visible() {
    let services = build_services();
    let admin = services.admin();
    let identity = build_identity();

    for (name, score) in [("low", 2_u32), ("high", 9), ("tied-first", 5), ("tied-second", 5)] {
        let record = ScoreRecord::new(
            UserIdentity::new(name, "pw").unwrap(),
            score,
            fixed_now(),
        );
        services.storage().results.append_result(&record).await.unwrap();
    }

    admin.set_leaderboard_visible(true).await.unwrap();
    let view = services.dashboard().dashboard(&identity).await.unwrap();
    let rows = view.leaderboard.unwrap();
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["high", "tied-first", "tied-second", "low"]);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[3].rank, 4);

    // Admin results view is sorted the same way.
    let results = admin.results().await.unwrap();
    assert_eq!(results[0].score(), 9);

    admin.clear_results().await.unwrap();
    assert!(admin.results().await.unwrap().is_empty());
    let view = services.dashboard().dashboard(&identity).await.unwrap();
    assert_eq!(view.leaderboard.unwrap(), Vec::new());
}
