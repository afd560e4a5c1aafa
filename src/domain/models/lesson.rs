//! Lesson domain model.
//!
//! A lesson is an ordered deck of typed slides. Only the interactive
//! investigation slide carries mutable state; the rest are static content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::investigation::{Investigation, InvestigationView, TurnReply};

/// Plain explanatory slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoSlide {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Narrated video slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSlide {
    pub id: String,
    pub title: String,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

/// Multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqSlide {
    pub id: String,
    pub question: String,
    pub options: Vec<McqOption>,
    pub correct_answer_id: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragDropItem {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Categorisation question: drag items into buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragDropSlide {
    pub id: String,
    pub question: String,
    pub items: Vec<DragDropItem>,
    pub categories: Vec<String>,
    pub correct_mapping: HashMap<String, String>,
    pub explanation: String,
}

/// Investigation embedded as a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationSlide {
    pub id: String,
    #[serde(flatten)]
    pub investigation: Investigation,
}

impl InvestigationSlide {
    pub fn new(investigation: Investigation) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            investigation,
        }
    }

    pub fn view(&self) -> InvestigationView {
        self.investigation.view(self.id.clone())
    }
}

/// A lesson slide, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Slide {
    Info(InfoSlide),
    Video(VideoSlide),
    Mcq(McqSlide),
    DragDrop(DragDropSlide),
    InteractiveInvestigation(InvestigationSlide),
}

impl Slide {
    pub fn id(&self) -> &str {
        match self {
            Self::Info(s) => &s.id,
            Self::Video(s) => &s.id,
            Self::Mcq(s) => &s.id,
            Self::DragDrop(s) => &s.id,
            Self::InteractiveInvestigation(s) => &s.id,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::Video(_) => "video",
            Self::Mcq(_) => "mcq",
            Self::DragDrop(_) => "drag_drop",
            Self::InteractiveInvestigation(_) => "interactive_investigation",
        }
    }

    /// Client projection; investigation slides lose their solution and hints.
    pub fn view(&self) -> SlideView {
        match self {
            Self::Info(s) => SlideView::Info(s.clone()),
            Self::Video(s) => SlideView::Video(s.clone()),
            Self::Mcq(s) => SlideView::Mcq(s.clone()),
            Self::DragDrop(s) => SlideView::DragDrop(s.clone()),
            Self::InteractiveInvestigation(s) => SlideView::InteractiveInvestigation(s.view()),
        }
    }
}

/// Client-facing counterpart of [`Slide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideView {
    Info(InfoSlide),
    Video(VideoSlide),
    Mcq(McqSlide),
    DragDrop(DragDropSlide),
    InteractiveInvestigation(InvestigationView),
}

const fn default_duration() -> u32 {
    15
}

/// A stored lesson document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub slides: Vec<Slide>,
    #[serde(default = "default_duration")]
    pub estimated_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

impl Lesson {
    pub fn new(owner: impl Into<String>, title: impl Into<String>, description: impl Into<String>, slides: Vec<Slide>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            description: description.into(),
            slides,
            estimated_duration_minutes: default_duration(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Find an interactive investigation slide by id.
    ///
    /// Slides of any other type never match, even with the same id.
    pub fn investigation_slide_mut(&mut self, slide_id: &str) -> Option<&mut InvestigationSlide> {
        self.slides.iter_mut().find_map(|slide| match slide {
            Slide::InteractiveInvestigation(s) if s.id == slide_id => Some(s),
            _ => None,
        })
    }

    pub fn investigation_slide(&self, slide_id: &str) -> Option<&InvestigationSlide> {
        self.slides.iter().find_map(|slide| match slide {
            Slide::InteractiveInvestigation(s) if s.id == slide_id => Some(s),
            _ => None,
        })
    }

    pub fn view(&self) -> LessonView {
        LessonView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            slides: self.slides.iter().map(Slide::view).collect(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> LessonSummary {
        LessonSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            slide_count: self.slides.len(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            created_at: self.created_at,
        }
    }
}

/// Lesson as shipped to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slides: Vec<SlideView>,
    pub estimated_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slide_count: usize,
    pub estimated_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
}

/// Reply to a message on an investigation slide, with the slide as it now stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideTurn {
    #[serde(flatten)]
    pub turn: TurnReply,
    pub slide: InvestigationView,
}

/// Importable lesson content, before it has an owner or identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default = "default_duration")]
    pub estimated_duration_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::investigation::SynthesizedProblem;

    fn investigation_slide() -> InvestigationSlide {
        InvestigationSlide::new(Investigation::from_problem(SynthesizedProblem {
            title: "Cache stampede".to_string(),
            problem_description: "Latency spikes every hour on the hour.".to_string(),
            problem_context: "Grafana shows DB CPU at 100% at :00.".to_string(),
            solution: "All cache keys shared one TTL; jitter fixed it.".to_string(),
            hints: vec!["Look at when keys expire".to_string()],
        }))
    }

    #[test]
    fn test_slide_tag_deserialization() {
        let json = r#"[
            {"type": "info", "id": "s1", "title": "Intro", "content": "Hello"},
            {"type": "mcq", "id": "s2", "question": "Q?", "options": [{"id": "a", "text": "A"}, {"id": "b", "text": "B"}],
             "correct_answer_id": "a", "explanation": "Because"},
            {"type": "drag_drop", "id": "s3", "question": "Sort", "items": [{"id": "i1", "text": "x"}],
             "categories": ["c"], "correct_mapping": {"i1": "c"}, "explanation": "ok"},
            {"type": "video", "id": "s4", "title": "Walkthrough", "video_url": "https://videos/1.mp4"}
        ]"#;
        let slides: Vec<Slide> = serde_json::from_str(json).unwrap();
        let kinds: Vec<_> = slides.iter().map(Slide::kind).collect();
        assert_eq!(kinds, vec!["info", "mcq", "drag_drop", "video"]);
        assert_eq!(slides[1].id(), "s2");
    }

    #[test]
    fn test_unknown_slide_type_rejected() {
        let json = r#"{"type": "poll", "id": "s9"}"#;
        assert!(serde_json::from_str::<Slide>(json).is_err());
    }

    #[test]
    fn test_investigation_slide_round_trip_keeps_flattened_state() {
        let slide = Slide::InteractiveInvestigation(investigation_slide());
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["type"], "interactive_investigation");
        assert_eq!(json["current_state"], "investigating");
        assert_eq!(json["hints_given"], 0);

        let back: Slide = serde_json::from_value(json).unwrap();
        assert_eq!(back, slide);
    }

    #[test]
    fn test_lesson_view_strips_solution() {
        let lesson = Lesson::new(
            "dev@example.com",
            "Caching",
            "How our cache fails",
            vec![Slide::InteractiveInvestigation(investigation_slide())],
        );
        let json = serde_json::to_string(&lesson.view()).unwrap();
        assert!(!json.contains("jitter fixed it"));
        assert!(!json.contains("when keys expire"));
        assert!(json.contains("interactive_investigation"));
    }

    #[test]
    fn test_investigation_slide_lookup_ignores_other_kinds() {
        let info = Slide::Info(InfoSlide {
            id: "shared".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            code_snippet: None,
            image_url: None,
        });
        let mut lesson = Lesson::new("dev@example.com", "t", "d", vec![info]);
        assert!(lesson.investigation_slide_mut("shared").is_none());

        let slide = investigation_slide();
        let id = slide.id.clone();
        lesson.slides.push(Slide::InteractiveInvestigation(slide));
        assert!(lesson.investigation_slide(&id).is_some());
    }
}
