use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::retrieve::Retrieval;

/// Independent caps on how many entries each context section may show.
/// Bounding here keeps the answer-generation payload cost-predictable no
/// matter how large a pathway's reaction set is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContextLimits {
    pub max_reactions: usize,
    pub max_compounds: usize,
    pub max_enzymes: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_reactions: 8,
            max_compounds: 8,
            max_enzymes: 12,
        }
    }
}

fn entry_line(id: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("- {id} ({name})"),
        _ => format!("- {id}"),
    }
}

fn push_section(out: &mut String, title: &str, lines: &[String], cap: usize, noun: &str) {
    // A section is omitted entirely when the unbounded list is empty.
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for line in lines.iter().take(cap) {
        let _ = writeln!(out, "{line}");
    }
    if lines.len() > cap {
        let _ = writeln!(out, "... {} more {noun}", lines.len() - cap);
    }
}

fn joined_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}

/// Render a retrieval into the size-bounded text block handed to the
/// answer generator.
pub fn build_context(retrieval: &Retrieval, limits: &ContextLimits) -> String {
    let interpretation = &retrieval.interpretation;
    let mut out = String::new();

    let _ = writeln!(out, "Metabolic Graph Context");
    let _ = writeln!(out, "Interpretation:");
    let _ = writeln!(out, "- entity_type: {}", interpretation.entity_type);
    let _ = writeln!(out, "- intent: {}", interpretation.intent);
    let _ = writeln!(
        out,
        "- entity_id: {}",
        retrieval.resolved_entity_id.as_deref().unwrap_or("n/a")
    );
    let _ = writeln!(
        out,
        "- entity_name: {}",
        interpretation.entity_name.as_deref().unwrap_or("n/a")
    );

    // True counts before truncation, so the generator knows the full scale.
    let _ = writeln!(out, "Counts:");
    let _ = writeln!(out, "- reactions: {}", retrieval.reactions.len());
    let _ = writeln!(out, "- compounds: {}", retrieval.compounds.len());
    let _ = writeln!(out, "- enzymes: {}", retrieval.enzymes.len());

    let reaction_lines: Vec<String> = retrieval
        .reactions
        .iter()
        .map(|r| entry_line(&r.reaction_id, r.name.as_deref()))
        .collect();
    push_section(
        &mut out,
        "Reactions",
        &reaction_lines,
        limits.max_reactions,
        "reactions",
    );

    let compound_lines: Vec<String> = retrieval
        .compounds
        .iter()
        .map(|c| entry_line(&c.compound_id, c.name.as_deref()))
        .collect();
    push_section(
        &mut out,
        "Compounds",
        &compound_lines,
        limits.max_compounds,
        "compounds",
    );

    let enzyme_lines: Vec<String> = retrieval
        .enzymes
        .iter()
        .map(|ec| format!("- {ec}"))
        .collect();
    push_section(
        &mut out,
        "Enzymes (EC)",
        &enzyme_lines,
        limits.max_enzymes,
        "enzymes",
    );

    if !retrieval.trace.is_empty() {
        let _ = writeln!(out, "Trace IDs:");
        let _ = writeln!(out, "- reactions: {}", joined_or_none(&retrieval.trace.reaction_ids));
        let _ = writeln!(out, "- compounds: {}", joined_or_none(&retrieval.trace.compound_ids));
        let _ = writeln!(out, "- pathways: {}", joined_or_none(&retrieval.trace.pathway_ids));
        let _ = writeln!(out, "- enzymes: {}", joined_or_none(&retrieval.trace.enzyme_ecs));
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::{EntityType, Intent, Interpretation};
    use crate::retrieve::{CompoundSummary, ReactionSummary, Trace};

    fn retrieval(
        reactions: Vec<ReactionSummary>,
        compounds: Vec<CompoundSummary>,
        enzymes: Vec<String>,
    ) -> Retrieval {
        let trace = Trace {
            reaction_ids: reactions.iter().map(|r| r.reaction_id.clone()).collect(),
            compound_ids: compounds.iter().map(|c| c.compound_id.clone()).collect(),
            pathway_ids: Vec::new(),
            enzyme_ecs: enzymes.clone(),
        };
        Retrieval {
            interpretation: Interpretation {
                entity_type: EntityType::Compound,
                entity_id: Some("C00022".to_string()),
                entity_name: Some("pyruvate".to_string()),
                intent: Intent::Producers,
                confidence: 0.9,
            },
            resolved_entity_id: Some("C00022".to_string()),
            reactions,
            compounds,
            enzymes,
            trace,
        }
    }

    #[test]
    fn includes_key_sections() {
        let context = build_context(
            &retrieval(
                vec![ReactionSummary {
                    reaction_id: "R1".to_string(),
                    name: Some("rxn1".to_string()),
                }],
                vec![CompoundSummary {
                    compound_id: "C00022".to_string(),
                    name: Some("pyruvate".to_string()),
                }],
                vec!["1.2.3.4".to_string()],
            ),
            &ContextLimits::default(),
        );

        assert!(context.contains("Metabolic Graph Context"));
        assert!(context.contains("Interpretation:"));
        assert!(context.contains("- entity_type: compound"));
        assert!(context.contains("- intent: producers"));
        assert!(context.contains("- entity_id: C00022"));
        assert!(context.contains("Counts:"));
        assert!(context.contains("Reactions:"));
        assert!(context.contains("- R1 (rxn1)"));
        assert!(context.contains("Compounds:"));
        assert!(context.contains("- C00022 (pyruvate)"));
        assert!(context.contains("Enzymes (EC):"));
        assert!(context.contains("- 1.2.3.4"));
        assert!(context.contains("Trace IDs:"));
        assert!(context.contains("- pathways: none"));
    }

    #[test]
    fn truncates_long_lists_with_remainder_trailers() {
        let context = build_context(
            &retrieval(
                (0..12)
                    .map(|i| ReactionSummary {
                        reaction_id: format!("R{i:05}"),
                        name: None,
                    })
                    .collect(),
                (0..10)
                    .map(|i| CompoundSummary {
                        compound_id: format!("C{i:05}"),
                        name: None,
                    })
                    .collect(),
                (0..20).map(|i| format!("1.1.1.{i}")).collect(),
            ),
            &ContextLimits::default(),
        );

        assert!(context.contains("... 4 more reactions"));
        assert!(context.contains("... 2 more compounds"));
        assert!(context.contains("... 8 more enzymes"));
        let reaction_lines = context
            .lines()
            .filter(|line| line.starts_with("- R0"))
            .count();
        assert_eq!(reaction_lines, 8);
    }

    #[test]
    fn no_trailer_when_within_caps() {
        let context = build_context(
            &retrieval(
                (0..8)
                    .map(|i| ReactionSummary {
                        reaction_id: format!("R{i:05}"),
                        name: None,
                    })
                    .collect(),
                Vec::new(),
                Vec::new(),
            ),
            &ContextLimits::default(),
        );

        assert!(!context.contains("more reactions"));
    }

    #[test]
    fn empty_payload_is_still_informative() {
        let empty = Retrieval {
            interpretation: Interpretation {
                entity_type: EntityType::Unknown,
                entity_id: None,
                entity_name: None,
                intent: Intent::Unknown,
                confidence: 0.0,
            },
            resolved_entity_id: None,
            reactions: Vec::new(),
            compounds: Vec::new(),
            enzymes: Vec::new(),
            trace: Trace::default(),
        };

        let context = build_context(&empty, &ContextLimits::default());

        assert!(context.contains("Metabolic Graph Context"));
        assert!(context.contains("- entity_id: n/a"));
        assert!(context.contains("- entity_name: n/a"));
        assert!(context.contains("- reactions: 0"));
        assert!(context.contains("- compounds: 0"));
        assert!(context.contains("- enzymes: 0"));
        assert!(!context.contains("Reactions:"));
        assert!(!context.contains("Trace IDs:"));
    }

    #[test]
    fn name_suffix_is_omitted_for_unnamed_entries() {
        let context = build_context(
            &retrieval(
                vec![ReactionSummary {
                    reaction_id: "R1".to_string(),
                    name: None,
                }],
                Vec::new(),
                Vec::new(),
            ),
            &ContextLimits::default(),
        );

        assert!(context.contains("\n- R1\n") || context.ends_with("- R1"));
        assert!(!context.contains("- R1 ("));
    }
}
