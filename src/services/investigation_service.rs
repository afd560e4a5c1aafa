//! Investigation service: the inbound operations.
//!
//! Coordinates synthesis, the dialogue controller and the two document
//! stores. Every mutation of a stored document happens under that document's
//! lock and is written back as one versioned full replace, so a turn either
//! lands completely or not at all.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::dialogue_controller::{DialogueConfig, DialogueController};
use super::problem_synthesizer::{ProblemSynthesizer, SynthesisConfig};
use super::session_locks::SessionLocks;
use super::solution_grader::{GradingPolicy, SolutionGrader};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Investigation, InvestigationConfig, InvestigationSession, InvestigationSlide, InvestigationSummary,
    InvestigationVariant, InvestigationView, Lesson, LessonDraft, LessonSummary, LessonView, Slide, SlideTurn,
    TurnReply,
};
use crate::domain::ports::{EvidenceRetriever, InvestigationRepository, LessonRepository, ReasoningOracle};

fn investigation_key(id: Uuid) -> String {
    format!("investigation:{id}")
}

fn lesson_key(id: Uuid) -> String {
    format!("lesson:{id}")
}

fn validate_message(message: &str) -> DomainResult<()> {
    if message.trim().is_empty() {
        return Err(DomainError::ValidationFailed("Message must not be empty".to_string()));
    }
    Ok(())
}

pub struct InvestigationService<S, L>
where
    S: InvestigationRepository,
    L: LessonRepository,
{
    sessions: Arc<S>,
    lessons: Arc<L>,
    synthesizer: ProblemSynthesizer,
    controller: DialogueController,
    locks: SessionLocks,
}

impl<S, L> InvestigationService<S, L>
where
    S: InvestigationRepository,
    L: LessonRepository,
{
    pub fn new(sessions: Arc<S>, lessons: Arc<L>, synthesizer: ProblemSynthesizer, controller: DialogueController) -> Self {
        Self {
            sessions,
            lessons,
            synthesizer,
            controller,
            locks: SessionLocks::new(),
        }
    }

    /// Wire synthesizer, grader and controller from the investigation policy.
    pub fn from_config(
        sessions: Arc<S>,
        lessons: Arc<L>,
        oracle: Arc<dyn ReasoningOracle>,
        retriever: Arc<dyn EvidenceRetriever>,
        config: &InvestigationConfig,
    ) -> Self {
        let dialogue = DialogueConfig::from(config);
        let grader = SolutionGrader::new(oracle.clone(), GradingPolicy::from(config), dialogue.timeout);
        let synthesizer = ProblemSynthesizer::new(oracle.clone(), retriever, SynthesisConfig::from(config));
        let controller = DialogueController::new(oracle, grader, dialogue);
        Self::new(sessions, lessons, synthesizer, controller)
    }

    // ------------------------------------------------------------------
    // Standalone investigations
    // ------------------------------------------------------------------

    /// Synthesize a problem and persist it as a new session.
    ///
    /// Nothing is stored when synthesis fails.
    #[instrument(skip(self), err)]
    pub async fn start_investigation(&self, owner: &str, topic: Option<&str>) -> DomainResult<InvestigationView> {
        let problem = self.synthesizer.synthesize(topic, InvestigationVariant::Standalone).await?;
        let mut session = InvestigationSession::new(owner, Investigation::from_problem(problem));
        session.id = self.sessions.create(&session).await?;

        tracing::info!(session_id = %session.id, title = %session.investigation.title, "investigation started");
        Ok(session.view())
    }

    /// Run one turn against a standalone session and persist the outcome.
    #[instrument(skip(self, message), err)]
    pub async fn post_message(&self, owner: &str, id: Uuid, message: &str) -> DomainResult<TurnReply> {
        validate_message(message)?;
        let _guard = self.locks.lock(&investigation_key(id)).await;

        let mut session = self
            .sessions
            .get(id, owner)
            .await?
            .ok_or(DomainError::InvestigationNotFound(id))?;

        let reply = self
            .controller
            .take_turn(
                &mut session.investigation,
                &id.to_string(),
                InvestigationVariant::Standalone,
                message,
            )
            .await?;

        session.updated_at = Utc::now();
        session.version = self.sessions.update(&session).await?;
        Ok(reply)
    }

    pub async fn get_investigation(&self, owner: &str, id: Uuid) -> DomainResult<InvestigationView> {
        self.sessions
            .get(id, owner)
            .await?
            .map(|s| s.view())
            .ok_or(DomainError::InvestigationNotFound(id))
    }

    pub async fn list_investigations(&self, owner: &str) -> DomainResult<Vec<InvestigationSummary>> {
        self.sessions.list_by_owner(owner).await
    }

    #[instrument(skip(self), err)]
    pub async fn delete_investigation(&self, owner: &str, id: Uuid) -> DomainResult<()> {
        let _guard = self.locks.lock(&investigation_key(id)).await;
        self.sessions.delete(id, owner).await?;
        tracing::info!(session_id = %id, "investigation deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lessons
    // ------------------------------------------------------------------

    /// Store a lesson from imported content.
    #[instrument(skip(self, draft), fields(title = %draft.title), err)]
    pub async fn import_lesson(&self, owner: &str, draft: LessonDraft) -> DomainResult<LessonView> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::ValidationFailed("Lesson title must not be empty".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = draft.slides.iter().map(Slide::id).find(|id| !seen.insert(*id)) {
            return Err(DomainError::ValidationFailed(format!("Duplicate slide id: {dup}")));
        }
        for slide in &draft.slides {
            if let Slide::InteractiveInvestigation(s) = slide {
                s.investigation.check_integrity()?;
            }
        }

        let mut lesson = Lesson::new(owner, draft.title, draft.description, draft.slides);
        lesson.estimated_duration_minutes = draft.estimated_duration_minutes;
        self.lessons.create(&lesson).await?;

        tracing::info!(lesson_id = %lesson.id, slides = lesson.slides.len(), "lesson imported");
        Ok(lesson.view())
    }

    pub async fn get_lesson(&self, owner: &str, id: Uuid) -> DomainResult<LessonView> {
        self.find_lesson(owner, id).await.map(|lesson| lesson.view())
    }

    pub async fn list_lessons(&self, owner: &str) -> DomainResult<Vec<LessonSummary>> {
        self.lessons.list_by_owner(owner).await
    }

    #[instrument(skip(self), err)]
    pub async fn delete_lesson(&self, owner: &str, id: Uuid) -> DomainResult<()> {
        let _guard = self.locks.lock(&lesson_key(id)).await;
        self.lessons.delete(id, owner).await?;
        tracing::info!(lesson_id = %id, "lesson deleted");
        Ok(())
    }

    /// Synthesize an investigation and append it as the lesson's last slide.
    ///
    /// The lesson lock is only taken for the write, so turns on other slides
    /// are not held up while the oracle works.
    #[instrument(skip(self), err)]
    pub async fn add_investigation_slide(
        &self,
        owner: &str,
        lesson_id: Uuid,
        topic: Option<&str>,
    ) -> DomainResult<InvestigationView> {
        self.find_lesson(owner, lesson_id).await?;
        let problem = self.synthesizer.synthesize(topic, InvestigationVariant::Slide).await?;
        let slide = InvestigationSlide::new(Investigation::from_problem(problem));
        let view = slide.view();

        let _guard = self.locks.lock(&lesson_key(lesson_id)).await;
        let mut lesson = self.find_lesson(owner, lesson_id).await?;
        lesson.slides.push(Slide::InteractiveInvestigation(slide));
        lesson.updated_at = Utc::now();
        lesson.version = self.lessons.update(&lesson).await?;

        tracing::info!(lesson_id = %lesson_id, slide_id = %view.id, "investigation slide added");
        Ok(view)
    }

    /// Run one turn against an investigation slide and persist the lesson.
    #[instrument(skip(self, message), err)]
    pub async fn post_slide_message(
        &self,
        owner: &str,
        lesson_id: Uuid,
        slide_id: &str,
        message: &str,
    ) -> DomainResult<SlideTurn> {
        validate_message(message)?;
        let _guard = self.locks.lock(&lesson_key(lesson_id)).await;

        let mut lesson = self.find_lesson(owner, lesson_id).await?;
        let slide = lesson
            .investigation_slide_mut(slide_id)
            .ok_or_else(|| DomainError::SlideNotFound {
                lesson_id,
                slide_id: slide_id.to_string(),
            })?;

        let turn = self
            .controller
            .take_turn(&mut slide.investigation, slide_id, InvestigationVariant::Slide, message)
            .await?;
        let view = slide.view();

        lesson.updated_at = Utc::now();
        lesson.version = self.lessons.update(&lesson).await?;
        Ok(SlideTurn { turn, slide: view })
    }

    async fn find_lesson(&self, owner: &str, id: Uuid) -> DomainResult<Lesson> {
        self.lessons
            .get(id, owner)
            .await?
            .ok_or(DomainError::LessonNotFound(id))
    }
}
