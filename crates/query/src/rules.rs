use std::collections::HashSet;

use regex::Regex;

use crate::interpret::{EntityType, Intent};

/// Ordered lexical rule table driving query understanding.
///
/// Built once at startup and injected into the interpreter as read-only
/// configuration, so tests can substitute a reduced table. Order carries
/// priority everywhere: the first matching intent, hint, name pattern, or
/// identifier pattern wins.
pub struct QueryRules {
    /// Intents with their substring patterns, in priority order.
    pub intent_patterns: Vec<(Intent, Vec<&'static str>)>,
    /// Entity types with their lexical hint tokens, in priority order.
    pub entity_type_hints: Vec<(EntityType, Vec<&'static str>)>,
    /// Name-extraction patterns, each capturing a `name` group.
    pub name_patterns: Vec<Regex>,
    /// Tokens dropped from extracted name phrases.
    pub stopwords: HashSet<&'static str>,
    pub compound_id: Regex,
    pub reaction_id: Regex,
    pub pathway_id: Regex,
    pub enzyme_ec: Regex,
    /// Guard for the EC pattern: the question must mention enzymes at all
    /// before a bare dotted-numeric token is read as an EC number.
    pub ec_context: Regex,
}

impl QueryRules {
    /// The production rule table for KEGG-style metabolic questions.
    pub fn standard() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("static rule pattern compiles");
        Self {
            intent_patterns: vec![
                (
                    Intent::Producers,
                    vec![
                        "how is",
                        "produced",
                        "produce",
                        "generated",
                        "made from",
                        "synthesized",
                        "forms",
                        "formation",
                    ],
                ),
                (
                    Intent::Consumers,
                    vec![
                        "consume",
                        "consumed",
                        "uses",
                        "used by",
                        "utilize",
                        "degrade",
                        "catabol",
                        "break down",
                    ],
                ),
                (
                    Intent::Summary,
                    vec!["what is", "tell me about", "describe", "overview", "summary"],
                ),
                (
                    Intent::Participants,
                    vec![
                        "participants",
                        "participate",
                        "reactants",
                        "products",
                        "substrates",
                        "involved in",
                        "enzyme",
                        "enzymes",
                        "ec ",
                        "ec:",
                        "cataly",
                        "act on",
                    ],
                ),
            ],
            entity_type_hints: vec![
                (EntityType::Compound, vec!["compound", "metabolite"]),
                (EntityType::Reaction, vec!["reaction"]),
                (EntityType::Pathway, vec!["pathway"]),
                (EntityType::Enzyme, vec!["enzyme", "enzymes", "ec ", "ec:"]),
            ],
            name_patterns: vec![
                compile(
                    r"\bhow is (?P<name>[a-z0-9][a-z0-9 -]*[a-z0-9]) (?:produced|generated|made|synthesized)\b",
                ),
                compile(
                    r"\b(?:consume|consumes|consumed|use|uses|used|utilize|utilizes|degrade|degrades|catabolize|catabolizes|break down) (?P<name>[a-z0-9][a-z0-9 -]*[a-z0-9])\b",
                ),
                compile(
                    r"\b(?:act on|acts on|catalyze|catalyzes|catalyse|catalyses) (?P<name>[a-z0-9][a-z0-9 -]*[a-z0-9])\b",
                ),
                compile(r"\b(?:of|for|on|in|about) (?P<name>[a-z0-9][a-z0-9 -]*[a-z0-9])\??$"),
            ],
            stopwords: HashSet::from([
                "a",
                "an",
                "the",
                "compound",
                "reaction",
                "pathway",
                "enzyme",
                "enzymes",
                "metabolite",
            ]),
            compound_id: compile(r"(?i)\b(C\d{5})\b"),
            reaction_id: compile(r"(?i)\b(R\d{5})\b"),
            pathway_id: compile(r"(?i)\b(?:map\d{5}|[a-z]{2,4}\d{5})\b"),
            enzyme_ec: compile(r"(?i)\b(?:ec[:\s]*)?(\d+\.\d+\.\d+\.\d+)\b"),
            ec_context: compile(r"\b(?:ec|enzymes?)\b"),
        }
    }
}
