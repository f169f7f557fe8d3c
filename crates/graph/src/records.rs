use serde::{Deserialize, Serialize};

/// Minimal reaction reference as stored on compound/pathway/enzyme edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRef {
    pub reaction_id: String,
    pub name: Option<String>,
}

/// Minimal compound reference as stored on reaction edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRef {
    pub compound_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub compound_id: String,
    pub name: Option<String>,
    pub producing_reactions: Vec<ReactionRef>,
    pub consuming_reactions: Vec<ReactionRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub reaction_id: String,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub equation: Option<String>,
    pub reversible: Option<bool>,
    pub substrates: Vec<CompoundRef>,
    pub products: Vec<CompoundRef>,
    /// Catalyzing enzyme EC numbers, sorted by the store.
    pub enzymes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayRecord {
    pub pathway_id: String,
    pub name: Option<String>,
    pub reactions: Vec<ReactionRef>,
    pub reaction_count: usize,
    pub compound_count: usize,
    pub enzyme_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnzymeRecord {
    pub ec: String,
    pub name: Option<String>,
    pub reactions: Vec<ReactionRef>,
}
