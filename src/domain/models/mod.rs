pub mod config;
pub mod evidence;
pub mod investigation;
pub mod lesson;

pub use config::{
    Config, DatabaseConfig, InvestigationConfig, LoggingConfig, OracleConfig, RateLimitConfig,
    RetryConfig,
};
pub use evidence::{EvidenceSource, Snippet, ToolCall, ToolOutput, ToolSpec};
pub use investigation::{
    ChatEntry, ChatRole, Investigation, InvestigationSession, InvestigationState,
    InvestigationSummary, InvestigationVariant, InvestigationView, SynthesizedProblem, TurnRecord,
    TurnReply,
};
pub use lesson::{
    DragDropItem, DragDropSlide, InfoSlide, InvestigationSlide, Lesson, LessonDraft, LessonSummary,
    LessonView, McqOption, McqSlide, Slide, SlideTurn, SlideView, VideoSlide,
};
