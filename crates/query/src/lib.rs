pub mod context;
pub mod interpret;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod retrieve;
pub mod rules;

pub use context::{ContextLimits, build_context};
pub use interpret::{
    ClassifyDebug, EntityType, Intent, Interpretation, Interpreter, format_classification_debug,
};
pub use llm::AnswerClient;
pub use normalize::normalize_question;
pub use pipeline::{RagPipeline, RagResponse};
pub use retrieve::{CompoundSummary, ReactionSummary, Retrieval, Retriever, Trace};
pub use rules::QueryRules;
