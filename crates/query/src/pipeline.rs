use anyhow::Result;
use serde::{Deserialize, Serialize};

use graph::GraphStore;

use crate::context::{ContextLimits, build_context};
use crate::interpret::{Interpretation, Interpreter};
use crate::llm::AnswerClient;
use crate::retrieve::{CompoundSummary, ReactionSummary, Retriever, Trace};
use crate::rules::QueryRules;

/// Everything a caller needs to render or audit one answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub interpretation: Interpretation,
    pub context: String,
    pub reactions: Vec<ReactionSummary>,
    pub compounds: Vec<CompoundSummary>,
    pub enzymes: Vec<String>,
    pub trace: Trace,
}

/// End-to-end orchestration: classify, retrieve, assemble context, generate.
///
/// Stateless across requests; the only shared state is the read-only rule
/// table inside the interpreter. Graph-store faults propagate to the caller,
/// which owns retry and status-code policy.
pub struct RagPipeline<S> {
    interpreter: Interpreter,
    retriever: Retriever<S>,
    answer_client: AnswerClient,
    limits: ContextLimits,
}

impl<S: GraphStore> RagPipeline<S> {
    pub fn new(store: S, answer_client: AnswerClient, limits: ContextLimits) -> Self {
        Self {
            interpreter: Interpreter::new(QueryRules::standard()),
            retriever: Retriever::new(store),
            answer_client,
            limits,
        }
    }

    pub async fn run(&self, question: &str) -> Result<RagResponse> {
        let interpretation = self.interpreter.classify(question);
        tracing::debug!(
            entity_type = %interpretation.entity_type,
            intent = %interpretation.intent,
            confidence = interpretation.confidence,
            "classified question"
        );

        let retrieval = self.retriever.retrieve(&interpretation).await?;
        tracing::debug!(
            reactions = retrieval.reactions.len(),
            compounds = retrieval.compounds.len(),
            enzymes = retrieval.enzymes.len(),
            resolved_entity_id = retrieval.resolved_entity_id.as_deref().unwrap_or("n/a"),
            "retrieved graph context"
        );

        let context = build_context(&retrieval, &self.limits);
        let answer = self.answer_client.generate(question, &context).await;

        Ok(RagResponse {
            answer,
            interpretation: retrieval.interpretation,
            context,
            reactions: retrieval.reactions,
            compounds: retrieval.compounds,
            enzymes: retrieval.enzymes,
            trace: retrieval.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::{CompoundRecord, EnzymeRecord, PathwayRecord, ReactionRecord, ReactionRef};

    /// Store double with a single compound so the full pipeline can run
    /// offline end to end.
    struct SingleCompoundStore;

    impl GraphStore for SingleCompoundStore {
        async fn fetch_compound(&self, compound_id: &str) -> Result<Option<CompoundRecord>> {
            if compound_id != "C00022" {
                return Ok(None);
            }
            Ok(Some(CompoundRecord {
                compound_id: "C00022".to_string(),
                name: Some("pyruvate".to_string()),
                producing_reactions: vec![ReactionRef {
                    reaction_id: "R00200".to_string(),
                    name: Some("pyruvate kinase reaction".to_string()),
                }],
                consuming_reactions: Vec::new(),
            }))
        }

        async fn fetch_reaction(&self, _reaction_id: &str) -> Result<Option<ReactionRecord>> {
            Ok(None)
        }

        async fn fetch_pathway(&self, _pathway_id: &str) -> Result<Option<PathwayRecord>> {
            Ok(None)
        }

        async fn fetch_enzyme(&self, _ec: &str) -> Result<Option<EnzymeRecord>> {
            Ok(None)
        }

        async fn lookup_compound_id_by_name(&self, name: &str) -> Result<Option<String>> {
            Ok((name == "pyruvate").then(|| "C00022".to_string()))
        }

        async fn lookup_reaction_id_by_name(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn lookup_pathway_id_by_name(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn pipeline() -> RagPipeline<SingleCompoundStore> {
        let answer_client = AnswerClient::new(
            "http://localhost:9".to_string(),
            None,
            "test-model".to_string(),
            0.2,
            600,
            std::time::Duration::from_secs(1),
        );
        RagPipeline::new(SingleCompoundStore, answer_client, ContextLimits::default())
    }

    #[tokio::test]
    async fn answers_a_producers_question_end_to_end() {
        let response = pipeline().run("How is pyruvate produced?").await.unwrap();

        assert_eq!(response.interpretation.intent.as_str(), "producers");
        assert_eq!(
            response.interpretation.entity_name.as_deref(),
            Some("pyruvate")
        );
        assert_eq!(response.reactions[0].reaction_id, "R00200");
        assert_eq!(response.compounds[0].compound_id, "C00022");
        assert_eq!(response.trace.reaction_ids, vec!["R00200"]);
        assert!(response.context.contains("- R00200 (pyruvate kinase reaction)"));
        // Without credentials the answer client falls back deterministically.
        assert!(response.answer.starts_with("LLM response unavailable."));
    }

    #[tokio::test]
    async fn unintelligible_question_yields_empty_payload_not_an_error() {
        let response = pipeline().run("zzzz qqqq").await.unwrap();

        assert_eq!(response.interpretation.confidence, 0.0);
        assert!(response.reactions.is_empty());
        assert!(response.compounds.is_empty());
        assert!(response.enzymes.is_empty());
        assert!(response.context.contains("- reactions: 0"));
    }
}
