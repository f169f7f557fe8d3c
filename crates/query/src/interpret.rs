use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_question;
use crate::rules::QueryRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Compound,
    Reaction,
    Pathway,
    Enzyme,
    Unknown,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Compound => "compound",
            EntityType::Reaction => "reaction",
            EntityType::Pathway => "pathway",
            EntityType::Enzyme => "enzyme",
            EntityType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Producers,
    Consumers,
    Participants,
    Summary,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Producers => "producers",
            Intent::Consumers => "consumers",
            Intent::Participants => "participants",
            Intent::Summary => "summary",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reading of a single user question. Built once by
/// [`Interpreter::classify`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub entity_type: EntityType,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub intent: Intent,
    pub confidence: f64,
}

impl Interpretation {
    fn unknown() -> Self {
        Self {
            entity_type: EntityType::Unknown,
            entity_id: None,
            entity_name: None,
            intent: Intent::Unknown,
            confidence: 0.0,
        }
    }
}

/// Side channel recording every intermediate decision of a classification.
/// Produced by the same computation as the interpretation itself, so the two
/// can never disagree.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyDebug {
    pub normalized_question: String,
    pub matched_intent_rule: Option<String>,
    pub entity_type_from_id: EntityType,
    pub entity_id_from_id: Option<String>,
    pub hinted_entity_type: EntityType,
    pub matched_name_rule: Option<String>,
    pub extracted_entity_name: Option<String>,
    pub resolved_entity_type: EntityType,
    pub intent_before_promotion: Intent,
    pub intent_after_promotion: Intent,
    pub confidence: f64,
}

impl Default for ClassifyDebug {
    fn default() -> Self {
        Self {
            normalized_question: String::new(),
            matched_intent_rule: None,
            entity_type_from_id: EntityType::Unknown,
            entity_id_from_id: None,
            hinted_entity_type: EntityType::Unknown,
            matched_name_rule: None,
            extracted_entity_name: None,
            resolved_entity_type: EntityType::Unknown,
            intent_before_promotion: Intent::Unknown,
            intent_after_promotion: Intent::Unknown,
            confidence: 0.0,
        }
    }
}

/// Render a classification debug record as one `key: value` line per field.
pub fn format_classification_debug(debug: &ClassifyDebug) -> String {
    let opt = |value: &Option<String>| value.clone().unwrap_or_else(|| "n/a".to_string());
    format!(
        "Query understanding debug:\n\
         - normalized_question: {}\n\
         - matched_intent_rule: {}\n\
         - entity_type_from_id: {}\n\
         - entity_id_from_id: {}\n\
         - hinted_entity_type: {}\n\
         - matched_name_rule: {}\n\
         - extracted_entity_name: {}\n\
         - resolved_entity_type: {}\n\
         - intent_before_promotion: {}\n\
         - intent_after_promotion: {}\n\
         - confidence: {:.2}",
        debug.normalized_question,
        opt(&debug.matched_intent_rule),
        debug.entity_type_from_id,
        opt(&debug.entity_id_from_id),
        debug.hinted_entity_type,
        opt(&debug.matched_name_rule),
        opt(&debug.extracted_entity_name),
        debug.resolved_entity_type,
        debug.intent_before_promotion,
        debug.intent_after_promotion,
        debug.confidence,
    )
}

/// Entity-type resolution policy for questions without an explicit id:
/// (intent, hinted type, has extracted name) -> resolved type, where `None`
/// is a wildcard. Rows are scanned in order and the first match wins, so
/// adding a heuristic is a data change.
const TYPE_RESOLUTION: &[(Intent, Option<EntityType>, Option<bool>, EntityType)] = &[
    // "which enzyme ..." with no named substance is about the enzyme itself
    (
        Intent::Participants,
        Some(EntityType::Enzyme),
        Some(false),
        EntityType::Enzyme,
    ),
    // "which enzymes act on X" asks about compound X
    (
        Intent::Participants,
        Some(EntityType::Enzyme),
        Some(true),
        EntityType::Compound,
    ),
    (Intent::Participants, None, None, EntityType::Reaction),
    (Intent::Producers, None, Some(true), EntityType::Compound),
    (Intent::Consumers, None, Some(true), EntityType::Compound),
];

fn resolve_from_table(intent: Intent, hinted: EntityType, has_name: bool) -> Option<EntityType> {
    for (row_intent, row_hint, row_has_name, resolved) in TYPE_RESOLUTION {
        if *row_intent != intent {
            continue;
        }
        if let Some(hint) = row_hint {
            if *hint != hinted {
                continue;
            }
        }
        if let Some(expected) = row_has_name {
            if *expected != has_name {
                continue;
            }
        }
        return Some(*resolved);
    }
    None
}

/// Deterministic rule-based question classifier.
///
/// Pure function of (question, rule table): never fails, degrades to
/// `unknown`/absent on every unmatched step.
pub struct Interpreter {
    rules: QueryRules,
}

impl Interpreter {
    pub fn new(rules: QueryRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, question: &str) -> Interpretation {
        self.classify_with_debug(question).0
    }

    pub fn classify_with_debug(&self, question: &str) -> (Interpretation, ClassifyDebug) {
        let normalized = normalize_question(question);
        let mut debug = ClassifyDebug {
            normalized_question: normalized.clone(),
            ..ClassifyDebug::default()
        };
        // Bail out before rule evaluation so whitespace never matches a rule.
        if normalized.is_empty() {
            return (Interpretation::unknown(), debug);
        }

        let intent = self.match_intent(&normalized, &mut debug);
        let (id_type, entity_id) = self.extract_identifier(&normalized);
        debug.entity_type_from_id = id_type;
        debug.entity_id_from_id = entity_id.clone();

        // Hinting runs even when an id already fixed the type; the hint feeds
        // the contradiction penalty in the confidence score.
        let hinted = self.hint_entity_type(&normalized);
        debug.hinted_entity_type = hinted;

        let entity_name = self.extract_name(&normalized, &mut debug);
        let has_name = entity_name.is_some();

        let resolved = if id_type != EntityType::Unknown {
            id_type
        } else {
            resolve_from_table(intent, hinted, has_name).unwrap_or(hinted)
        };
        debug.resolved_entity_type = resolved;

        // A bare entity reference is an implicit "tell me about X".
        debug.intent_before_promotion = intent;
        let intent = if intent == Intent::Unknown && (entity_id.is_some() || has_name) {
            Intent::Summary
        } else {
            intent
        };
        debug.intent_after_promotion = intent;

        let confidence = score_confidence(intent, entity_id.is_some(), has_name, resolved, hinted);
        debug.confidence = confidence;

        let interpretation = Interpretation {
            entity_type: resolved,
            entity_id,
            entity_name,
            intent,
            confidence,
        };
        (interpretation, debug)
    }

    fn match_intent(&self, question: &str, debug: &mut ClassifyDebug) -> Intent {
        for (intent, patterns) in &self.rules.intent_patterns {
            for pattern in patterns {
                if question.contains(pattern) {
                    debug.matched_intent_rule = Some((*pattern).to_string());
                    return *intent;
                }
            }
        }
        Intent::Unknown
    }

    fn extract_identifier(&self, question: &str) -> (EntityType, Option<String>) {
        if let Some(id) = self
            .rules
            .compound_id
            .captures(question)
            .and_then(|caps| caps.get(1))
        {
            return (EntityType::Compound, Some(id.as_str().to_uppercase()));
        }
        if let Some(id) = self
            .rules
            .reaction_id
            .captures(question)
            .and_then(|caps| caps.get(1))
        {
            return (EntityType::Reaction, Some(id.as_str().to_uppercase()));
        }
        if let Some(id) = self.rules.pathway_id.find(question) {
            return (EntityType::Pathway, Some(id.as_str().to_lowercase()));
        }
        // A dotted numeric quad is only an EC number if the question talks
        // about enzymes; this keeps version-like strings out.
        if self.rules.ec_context.is_match(question) {
            if let Some(ec) = self
                .rules
                .enzyme_ec
                .captures(question)
                .and_then(|caps| caps.get(1))
            {
                return (EntityType::Enzyme, Some(ec.as_str().to_string()));
            }
        }
        (EntityType::Unknown, None)
    }

    fn hint_entity_type(&self, question: &str) -> EntityType {
        for (entity_type, hints) in &self.rules.entity_type_hints {
            for hint in hints {
                if question.contains(hint) {
                    return *entity_type;
                }
            }
        }
        EntityType::Unknown
    }

    fn extract_name(&self, question: &str, debug: &mut ClassifyDebug) -> Option<String> {
        for pattern in &self.rules.name_patterns {
            let Some(raw) = pattern
                .captures(question)
                .and_then(|caps| caps.name("name"))
            else {
                continue;
            };
            let cleaned = self.clean_name_phrase(raw.as_str());
            // An all-stopword capture is a non-match, not a failure; keep
            // scanning the remaining patterns.
            if cleaned.is_empty() {
                continue;
            }
            debug.matched_name_rule = Some(pattern.as_str().to_string());
            debug.extracted_entity_name = Some(cleaned.clone());
            return Some(cleaned);
        }
        None
    }

    fn clean_name_phrase(&self, phrase: &str) -> String {
        let kept: Vec<&str> = phrase
            .split_whitespace()
            .filter(|token| !self.rules.stopwords.contains(*token))
            .collect();
        kept.join(" ")
            .trim_end_matches(|c: char| "?.!,;:".contains(c))
            .trim()
            .to_string()
    }
}

fn score_confidence(
    intent: Intent,
    has_id: bool,
    has_name: bool,
    resolved: EntityType,
    hinted: EntityType,
) -> f64 {
    if intent == Intent::Unknown && !has_id && !has_name {
        return 0.0;
    }
    let mut score: f64 = 0.20;
    if intent != Intent::Unknown {
        score += 0.30;
    }
    if has_id {
        score += 0.35;
    }
    if has_name {
        score += 0.20;
    }
    if resolved != EntityType::Unknown {
        score += 0.10;
    }
    // Contradictory lexical hint vs. final type costs confidence.
    if hinted != EntityType::Unknown && hinted != resolved {
        score -= 0.15;
    }
    score.clamp(0.0, 0.99)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn interpreter() -> Interpreter {
        Interpreter::new(QueryRules::standard())
    }

    #[test]
    fn producers_question_extracts_compound_name() {
        let interpretation = interpreter().classify("How is pyruvate produced?");

        assert_eq!(interpretation.intent, Intent::Producers);
        assert_eq!(interpretation.entity_type, EntityType::Compound);
        assert_eq!(interpretation.entity_name.as_deref(), Some("pyruvate"));
        assert!(interpretation.confidence > 0.0);
    }

    #[test]
    fn consumers_question_extracts_compound_name() {
        let interpretation = interpreter().classify("What reactions consume oxaloacetate?");

        assert_eq!(interpretation.intent, Intent::Consumers);
        assert_eq!(interpretation.entity_type, EntityType::Compound);
        assert_eq!(interpretation.entity_name.as_deref(), Some("oxaloacetate"));
    }

    #[test]
    fn enzyme_hint_with_named_substance_targets_the_compound() {
        let interpretation = interpreter().classify("Which enzymes act on glucose?");

        assert_eq!(interpretation.intent, Intent::Participants);
        assert_eq!(interpretation.entity_type, EntityType::Compound);
        assert_eq!(interpretation.entity_name.as_deref(), Some("glucose"));
    }

    #[test]
    fn reaction_id_fixes_type_and_uppercases() {
        let interpretation = interpreter().classify("Show reaction r00209 participants");

        assert_eq!(interpretation.intent, Intent::Participants);
        assert_eq!(interpretation.entity_type, EntityType::Reaction);
        assert_eq!(interpretation.entity_id.as_deref(), Some("R00209"));
    }

    #[test]
    fn pathway_id_is_lowercased() {
        let interpretation = interpreter().classify("Describe pathway MAP00010");

        assert_eq!(interpretation.intent, Intent::Summary);
        assert_eq!(interpretation.entity_type, EntityType::Pathway);
        assert_eq!(interpretation.entity_id.as_deref(), Some("map00010"));
    }

    #[test]
    fn compound_id_question_is_summary() {
        let interpretation = interpreter().classify("Tell me about compound C00022");

        assert_eq!(interpretation.intent, Intent::Summary);
        assert_eq!(interpretation.entity_type, EntityType::Compound);
        assert_eq!(interpretation.entity_id.as_deref(), Some("C00022"));
    }

    #[test]
    fn empty_and_whitespace_input_degrade_to_unknown() {
        for question in ["", "   ", " \t\n "] {
            let interpretation = interpreter().classify(question);
            assert_eq!(interpretation.intent, Intent::Unknown);
            assert_eq!(interpretation.entity_type, EntityType::Unknown);
            assert_eq!(interpretation.entity_id, None);
            assert_eq!(interpretation.entity_name, None);
            assert_eq!(interpretation.confidence, 0.0);
        }
    }

    #[test]
    fn bare_entity_id_promotes_intent_to_summary() {
        let interpretation = interpreter().classify("C00031");

        assert_eq!(interpretation.intent, Intent::Summary);
        assert_eq!(interpretation.entity_type, EntityType::Compound);
        assert_eq!(interpretation.entity_id.as_deref(), Some("C00031"));
        assert!(interpretation.confidence > 0.0);
    }

    #[test]
    fn ec_number_with_enzyme_context_is_an_enzyme_entity() {
        let interpretation = interpreter().classify("Tell me about enzyme EC 1.2.1.104");

        assert_eq!(interpretation.intent, Intent::Summary);
        assert_eq!(interpretation.entity_type, EntityType::Enzyme);
        assert_eq!(interpretation.entity_id.as_deref(), Some("1.2.1.104"));
        assert!(interpretation.confidence > 0.0);
    }

    #[test]
    fn bare_ec_number_is_not_recognized_without_enzyme_context() {
        // Documents the guard's false negative: a dotted quad on its own is
        // not read as an EC number.
        let interpretation = interpreter().classify("1.2.1.104?");

        assert_eq!(interpretation.entity_type, EntityType::Unknown);
        assert_eq!(interpretation.entity_id, None);
        assert_eq!(interpretation.confidence, 0.0);
    }

    #[test]
    fn version_like_strings_do_not_become_enzymes() {
        let interpretation = interpreter().classify("what changed in release 1.2.3.4");

        assert_ne!(interpretation.entity_type, EntityType::Enzyme);
        assert_eq!(interpretation.entity_id, None);
    }

    #[test]
    fn conflicting_hint_lowers_confidence() {
        let interpreter = interpreter();
        // Hinted "reaction" but resolved compound via the consumers rule.
        let (conflicted, debug) =
            interpreter.classify_with_debug("What reactions consume oxaloacetate?");
        assert_eq!(debug.hinted_entity_type, EntityType::Reaction);
        assert_eq!(conflicted.entity_type, EntityType::Compound);

        let agreeing = interpreter.classify("What consumes oxaloacetate?");
        assert!(conflicted.confidence < agreeing.confidence);
    }

    #[test]
    fn debug_path_agrees_with_plain_path() {
        let interpreter = interpreter();
        for question in [
            "How is pyruvate produced?",
            "Show reaction R00209 participants",
            "C00031",
            "Tell me about enzyme EC 1.2.1.104",
            "",
            "complete nonsense question",
        ] {
            let plain = interpreter.classify(question);
            let (debugged, _) = interpreter.classify_with_debug(question);
            assert_eq!(plain, debugged);
        }
    }

    #[test]
    fn debug_records_intermediate_decisions() {
        let (interpretation, debug) =
            interpreter().classify_with_debug("How is pyruvate produced?");

        assert_eq!(interpretation.intent, Intent::Producers);
        assert_eq!(debug.matched_intent_rule.as_deref(), Some("how is"));
        assert_eq!(debug.extracted_entity_name.as_deref(), Some("pyruvate"));
        assert!(debug.matched_name_rule.is_some());
        assert_eq!(debug.intent_before_promotion, Intent::Producers);
        assert_eq!(debug.intent_after_promotion, Intent::Producers);
    }

    #[test]
    fn debug_formatting_is_readable() {
        let (_, debug) = interpreter().classify_with_debug("C00031");
        let output = format_classification_debug(&debug);

        assert!(output.starts_with("Query understanding debug:"));
        assert!(output.contains("intent_after_promotion: summary"));
        assert!(output.contains("entity_id_from_id: C00031"));
        assert!(output.contains("matched_intent_rule: n/a"));
    }

    #[test]
    fn stopwords_are_removed_from_extracted_names() {
        let interpretation = interpreter().classify("Which reactions consume the compound atp?");
        assert_eq!(interpretation.entity_name.as_deref(), Some("atp"));
    }

    proptest! {
        #[test]
        fn classify_is_total_and_bounded(question in ".*") {
            let interpretation = interpreter().classify(&question);
            prop_assert!((0.0..=1.0).contains(&interpretation.confidence));
        }

        #[test]
        fn classify_is_deterministic(question in ".{0,80}") {
            let interpreter = interpreter();
            prop_assert_eq!(interpreter.classify(&question), interpreter.classify(&question));
        }
    }
}
