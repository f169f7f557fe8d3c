use anyhow::Result;

use crate::records::{CompoundRecord, EnzymeRecord, PathwayRecord, ReactionRecord};

/// Read-side contract the retrieval pipeline depends on.
///
/// Every fetch returns `Ok(None)` when the id is unknown to the graph;
/// `Err` is reserved for transport failures, which callers propagate
/// rather than swallow.
pub trait GraphStore {
    async fn fetch_compound(&self, compound_id: &str) -> Result<Option<CompoundRecord>>;
    async fn fetch_reaction(&self, reaction_id: &str) -> Result<Option<ReactionRecord>>;
    async fn fetch_pathway(&self, pathway_id: &str) -> Result<Option<PathwayRecord>>;
    async fn fetch_enzyme(&self, ec: &str) -> Result<Option<EnzymeRecord>>;

    /// Name lookups are entity-type specific to avoid cross-type collisions.
    async fn lookup_compound_id_by_name(&self, name: &str) -> Result<Option<String>>;
    async fn lookup_reaction_id_by_name(&self, name: &str) -> Result<Option<String>>;
    async fn lookup_pathway_id_by_name(&self, name: &str) -> Result<Option<String>>;
}
