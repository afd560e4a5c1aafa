//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - InvestigationRepository / LessonRepository: document persistence
//! - ReasoningOracle / ToolInvoker: LLM completion with tool calling
//! - EvidenceRetriever: search over codebase, tickets and chat

pub mod evidence_retriever;
pub mod investigation_repository;
pub mod lesson_repository;
pub mod null_evidence;
pub mod reasoning_oracle;

pub use evidence_retriever::EvidenceRetriever;
pub use investigation_repository::InvestigationRepository;
pub use lesson_repository::LessonRepository;
pub use null_evidence::NullEvidenceRetriever;
pub use reasoning_oracle::{OraclePurpose, OracleRequest, ReasoningOracle, ToolInvoker};
