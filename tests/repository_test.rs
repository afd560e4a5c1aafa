//! Integration tests for the SQLite investigation and lesson stores.

mod common;

use common::{setup_test_pool, OWNER};
use sleuth::adapters::sqlite::{SqliteInvestigationRepository, SqliteLessonRepository};
use sleuth::domain::models::{
    InfoSlide, Investigation, InvestigationSession, InvestigationSlide, InvestigationState, Lesson, Slide,
    SynthesizedProblem, TurnRecord,
};
use sleuth::domain::ports::{InvestigationRepository, LessonRepository};
use sleuth::DomainError;
use uuid::Uuid;

fn problem(title: &str) -> SynthesizedProblem {
    SynthesizedProblem {
        title: title.to_string(),
        problem_description: "Orders vanish from the queue overnight.".to_string(),
        problem_context: "Worker logs show visibility timeouts.".to_string(),
        solution: "Jobs outlived the visibility timeout and were redelivered then dropped as duplicates.".to_string(),
        hints: vec!["Compare job duration to the queue settings".to_string()],
    }
}

fn session(title: &str) -> InvestigationSession {
    InvestigationSession::new(OWNER, Investigation::from_problem(problem(title)))
}

fn coach(reply: &str) -> TurnRecord {
    TurnRecord {
        reply: reply.to_string(),
        is_correct: false,
        hint_provided: false,
        next_state: InvestigationState::Investigating,
    }
}

#[tokio::test]
async fn test_investigation_round_trip() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let mut original = session("Vanishing orders");
    original
        .investigation
        .record_turn("What do the worker logs say?", coach("Look at the timestamps."))
        .unwrap();

    let id = repo.create(&original).await.unwrap();
    assert_eq!(id, original.id);

    let loaded = repo.get(id, OWNER).await.unwrap().expect("session exists");
    assert_eq!(loaded.investigation, original.investigation);
    assert_eq!(loaded.owner, OWNER);
    assert_eq!(loaded.version, 1);
}

#[tokio::test]
async fn test_investigation_update_bumps_version_and_detects_stale_writes() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let id = repo.create(&session("Vanishing orders")).await.unwrap();

    let mut first = repo.get(id, OWNER).await.unwrap().unwrap();
    let mut second = repo.get(id, OWNER).await.unwrap().unwrap();

    first.investigation.record_turn("q1", coach("r1")).unwrap();
    let version = repo.update(&first).await.unwrap();
    assert_eq!(version, 2);

    second.investigation.record_turn("q2", coach("r2")).unwrap();
    let err = repo.update(&second).await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

    let stored = repo.get(id, OWNER).await.unwrap().unwrap();
    assert_eq!(stored.investigation.chat_history.len(), 2);
    assert_eq!(stored.investigation.chat_history[0].message, "q1");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn test_investigation_update_missing_row_is_not_found() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let mut ghost = session("Ghost");
    ghost.version = 1;

    let err = repo.update(&ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::InvestigationNotFound(id) if id == ghost.id));
}

#[tokio::test]
async fn test_investigation_owner_scoping() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let id = repo.create(&session("Private")).await.unwrap();

    assert!(repo.get(id, "someone-else").await.unwrap().is_none());
    let err = repo.delete(id, "someone-else").await.unwrap_err();
    assert!(matches!(err, DomainError::InvestigationNotFound(_)));
    assert!(repo.get(id, OWNER).await.unwrap().is_some());

    repo.delete(id, OWNER).await.unwrap();
    assert!(repo.get(id, OWNER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_investigation_list_newest_first() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let first = repo.create(&session("First")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = repo.create(&session("Second")).await.unwrap();

    let mut other = session("Not mine");
    other.owner = "someone-else".to_string();
    repo.create(&other).await.unwrap();

    let list = repo.list_by_owner(OWNER).await.unwrap();
    let ids: Vec<Uuid> = list.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(list[0].title, "Second");
    assert_eq!(list[0].current_state, InvestigationState::Investigating);
}

#[tokio::test]
async fn test_investigation_summary_reflects_terminal_state() {
    let repo = SqliteInvestigationRepository::new(setup_test_pool().await);
    let id = repo.create(&session("Closing")).await.unwrap();

    let mut loaded = repo.get(id, OWNER).await.unwrap().unwrap();
    loaded
        .investigation
        .record_turn(
            "i give up",
            TurnRecord {
                reply: "Here is what happened".to_string(),
                is_correct: false,
                hint_provided: false,
                next_state: InvestigationState::GivenUp,
            },
        )
        .unwrap();
    repo.update(&loaded).await.unwrap();

    let list = repo.list_by_owner(OWNER).await.unwrap();
    assert_eq!(list[0].current_state, InvestigationState::GivenUp);
    assert_eq!(list[0].turns, 1);
    assert!(list[0].completed_at.is_some());
}

fn lesson_with_slides() -> Lesson {
    let info = Slide::Info(InfoSlide {
        id: "intro".to_string(),
        title: "Queues".to_string(),
        content: "How our job queue works.".to_string(),
        code_snippet: None,
        image_url: None,
    });
    let investigation = Slide::InteractiveInvestigation(InvestigationSlide::new(Investigation::from_problem(
        problem("Queue puzzle"),
    )));
    Lesson::new(OWNER, "Job queues", "Redelivery in practice", vec![info, investigation])
}

#[tokio::test]
async fn test_lesson_round_trip_and_versioning() {
    let repo = SqliteLessonRepository::new(setup_test_pool().await);
    let lesson = lesson_with_slides();
    repo.create(&lesson).await.unwrap();

    let mut loaded = repo.get(lesson.id, OWNER).await.unwrap().expect("lesson exists");
    assert_eq!(loaded.slides, lesson.slides);
    assert_eq!(loaded.version, 1);

    let stale = loaded.clone();
    loaded.title = "Job queues, revised".to_string();
    assert_eq!(repo.update(&loaded).await.unwrap(), 2);

    let err = repo.update(&stale).await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

    let summaries = repo.list_by_owner(OWNER).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, "Job queues, revised");
    assert_eq!(summaries[0].slide_count, 2);
}

#[tokio::test]
async fn test_lesson_missing_and_foreign() {
    let repo = SqliteLessonRepository::new(setup_test_pool().await);
    let lesson = lesson_with_slides();
    repo.create(&lesson).await.unwrap();

    assert!(repo.get(lesson.id, "someone-else").await.unwrap().is_none());
    let err = repo.delete(lesson.id, "someone-else").await.unwrap_err();
    assert!(matches!(err, DomainError::LessonNotFound(_)));

    let mut ghost = lesson_with_slides();
    ghost.version = 1;
    let err = repo.update(&ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::LessonNotFound(_)));

    repo.delete(lesson.id, OWNER).await.unwrap();
    assert!(repo.get(lesson.id, OWNER).await.unwrap().is_none());
}
