use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use graph::{GraphStore, ReactionRef};

use crate::interpret::{EntityType, Intent, Interpretation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub reaction_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSummary {
    pub compound_id: String,
    pub name: Option<String>,
}

/// Provenance ids substantiating a retrieval. Always recomputed from the
/// final payload, never tracked incrementally, so it cannot go stale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub reaction_ids: Vec<String>,
    pub compound_ids: Vec<String>,
    pub pathway_ids: Vec<String>,
    pub enzyme_ecs: Vec<String>,
}

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.reaction_ids.is_empty()
            && self.compound_ids.is_empty()
            && self.pathway_ids.is_empty()
            && self.enzyme_ecs.is_empty()
    }
}

/// Normalized graph retrieval payload for one interpreted question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retrieval {
    pub interpretation: Interpretation,
    pub resolved_entity_id: Option<String>,
    pub reactions: Vec<ReactionSummary>,
    pub compounds: Vec<CompoundSummary>,
    /// Enzyme EC numbers, deduplicated and sorted.
    pub enzymes: Vec<String>,
    pub trace: Trace,
}

impl Retrieval {
    fn empty(interpretation: Interpretation, resolved_entity_id: Option<String>) -> Self {
        Self {
            interpretation,
            resolved_entity_id,
            reactions: Vec::new(),
            compounds: Vec::new(),
            enzymes: Vec::new(),
            trace: Trace::default(),
        }
    }
}

/// Drop entries with a missing id or an id already seen, preserving the
/// position of the first occurrence.
fn dedupe_reactions(items: impl IntoIterator<Item = ReactionRef>) -> Vec<ReactionSummary> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for item in items {
        if item.reaction_id.is_empty() || !seen.insert(item.reaction_id.clone()) {
            continue;
        }
        deduped.push(ReactionSummary {
            reaction_id: item.reaction_id,
            name: item.name,
        });
    }
    deduped
}

fn build_trace(result: &Retrieval) -> Trace {
    let mut trace = Trace {
        reaction_ids: result
            .reactions
            .iter()
            .map(|r| r.reaction_id.clone())
            .collect(),
        compound_ids: result
            .compounds
            .iter()
            .map(|c| c.compound_id.clone())
            .collect(),
        pathway_ids: Vec::new(),
        enzyme_ecs: result.enzymes.clone(),
    };
    if result.interpretation.entity_type == EntityType::Pathway {
        if let Some(id) = &result.resolved_entity_id {
            trace.pathway_ids = vec![id.clone()];
        }
    }
    trace
}

/// Maps an interpretation to concrete graph lookups and normalizes the
/// results into a bounded retrieval payload.
///
/// "Not found" anywhere along the way degrades to an empty payload; only
/// transport failures from the store surface as errors.
pub struct Retriever<S> {
    store: S,
}

impl<S: GraphStore> Retriever<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn retrieve(&self, interpretation: &Interpretation) -> Result<Retrieval> {
        let Some(entity_id) = self.resolve_entity_id(interpretation).await? else {
            return Ok(Retrieval::empty(interpretation.clone(), None));
        };

        let mut result = match interpretation.entity_type {
            EntityType::Compound => self.retrieve_compound(interpretation, &entity_id).await?,
            EntityType::Reaction => self.retrieve_reaction(interpretation, &entity_id).await?,
            EntityType::Pathway => self.retrieve_pathway(interpretation, &entity_id).await?,
            EntityType::Enzyme => self.retrieve_enzyme(interpretation, &entity_id).await?,
            EntityType::Unknown => Retrieval::empty(interpretation.clone(), Some(entity_id)),
        };
        result.trace = build_trace(&result);
        Ok(result)
    }

    async fn resolve_entity_id(&self, interpretation: &Interpretation) -> Result<Option<String>> {
        if let Some(id) = &interpretation.entity_id {
            return Ok(Some(id.clone()));
        }
        let Some(name) = &interpretation.entity_name else {
            return Ok(None);
        };
        match interpretation.entity_type {
            EntityType::Compound => self.store.lookup_compound_id_by_name(name).await,
            EntityType::Reaction => self.store.lookup_reaction_id_by_name(name).await,
            EntityType::Pathway => self.store.lookup_pathway_id_by_name(name).await,
            // Enzymes have no separate display-name path; the name is the EC.
            EntityType::Enzyme => Ok(Some(name.clone())),
            EntityType::Unknown => Ok(None),
        }
    }

    async fn retrieve_compound(
        &self,
        interpretation: &Interpretation,
        entity_id: &str,
    ) -> Result<Retrieval> {
        let mut result =
            Retrieval::empty(interpretation.clone(), Some(entity_id.to_string()));
        let Some(compound) = self.store.fetch_compound(entity_id).await? else {
            return Ok(result);
        };

        // Keep the payload minimal: one focal compound + relevant reactions.
        result.compounds = vec![CompoundSummary {
            compound_id: compound.compound_id.clone(),
            name: compound.name.clone(),
        }];
        result.reactions = match interpretation.intent {
            Intent::Producers => dedupe_reactions(compound.producing_reactions),
            Intent::Consumers => dedupe_reactions(compound.consuming_reactions),
            _ => dedupe_reactions(
                compound
                    .producing_reactions
                    .into_iter()
                    .chain(compound.consuming_reactions),
            ),
        };
        if interpretation.intent == Intent::Participants {
            // Enzyme expansion is opt-in for participant-style questions.
            result.enzymes = self.collect_enzymes(&result.reactions).await?;
        }
        Ok(result)
    }

    async fn retrieve_reaction(
        &self,
        interpretation: &Interpretation,
        entity_id: &str,
    ) -> Result<Retrieval> {
        let mut result =
            Retrieval::empty(interpretation.clone(), Some(entity_id.to_string()));
        let Some(reaction) = self.store.fetch_reaction(entity_id).await? else {
            return Ok(result);
        };

        result.reactions = vec![ReactionSummary {
            reaction_id: reaction.reaction_id.clone(),
            name: reaction.name.clone(),
        }];
        result.compounds = reaction
            .substrates
            .into_iter()
            .chain(reaction.products)
            .filter(|c| !c.compound_id.is_empty())
            .map(|c| CompoundSummary {
                compound_id: c.compound_id,
                name: c.name,
            })
            .collect();
        result.enzymes = reaction
            .enzymes
            .into_iter()
            .filter(|ec| !ec.is_empty())
            .collect();
        Ok(result)
    }

    async fn retrieve_pathway(
        &self,
        interpretation: &Interpretation,
        entity_id: &str,
    ) -> Result<Retrieval> {
        let mut result =
            Retrieval::empty(interpretation.clone(), Some(entity_id.to_string()));
        let Some(pathway) = self.store.fetch_pathway(entity_id).await? else {
            return Ok(result);
        };
        // Pathway retrieval stays reaction-scoped to bound the payload size.
        result.reactions = dedupe_reactions(pathway.reactions);
        Ok(result)
    }

    async fn retrieve_enzyme(
        &self,
        interpretation: &Interpretation,
        entity_id: &str,
    ) -> Result<Retrieval> {
        let mut result =
            Retrieval::empty(interpretation.clone(), Some(entity_id.to_string()));
        let Some(enzyme) = self.store.fetch_enzyme(entity_id).await? else {
            return Ok(result);
        };
        result.enzymes = vec![entity_id.to_string()];
        result.reactions = dedupe_reactions(enzyme.reactions);
        Ok(result)
    }

    async fn collect_enzymes(&self, reactions: &[ReactionSummary]) -> Result<Vec<String>> {
        let mut enzymes = BTreeSet::new();
        for reaction in reactions {
            let Some(record) = self.store.fetch_reaction(&reaction.reaction_id).await? else {
                continue;
            };
            for ec in record.enzymes {
                if !ec.is_empty() {
                    enzymes.insert(ec);
                }
            }
        }
        Ok(enzymes.into_iter().collect())
    }
}
