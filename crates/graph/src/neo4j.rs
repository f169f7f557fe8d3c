use anyhow::{Context, Result};
use neo4rs::{Graph, Query};

use crate::names::clean_name;
use crate::records::{
    CompoundRecord, CompoundRef, EnzymeRecord, PathwayRecord, ReactionRecord, ReactionRef,
};
use crate::store::GraphStore;

/// Neo4j-backed graph store.
///
/// All queries are fixed Cypher templates over the KEGG-derived schema:
/// `(Compound)-[:CONSUMED_BY]->(Reaction)-[:PRODUCES]->(Compound)`,
/// `(Reaction)-[:CATALYZED_BY]->(Enzyme)`, `(Pathway)-[:HAS_REACTION]->(Reaction)`.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;
        Ok(Self { graph })
    }

    /// Liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .context("Neo4j ping failed")
    }

    async fn reaction_refs(&self, query: Query) -> Result<Vec<ReactionRef>> {
        let mut result = self.graph.execute(query).await?;
        let mut refs = Vec::new();
        while let Some(row) = result.next().await? {
            let Ok(reaction_id) = row.get::<String>("reaction_id") else {
                continue;
            };
            refs.push(ReactionRef {
                reaction_id,
                name: clean_name(row.get::<String>("name").ok()),
            });
        }
        Ok(refs)
    }

    async fn compound_refs(&self, query: Query) -> Result<Vec<CompoundRef>> {
        let mut result = self.graph.execute(query).await?;
        let mut refs = Vec::new();
        while let Some(row) = result.next().await? {
            let Ok(compound_id) = row.get::<String>("compound_id") else {
                continue;
            };
            refs.push(CompoundRef {
                compound_id,
                name: clean_name(row.get::<String>("name").ok()),
            });
        }
        Ok(refs)
    }

    async fn lookup_id(&self, label: &str, name: &str) -> Result<Option<String>> {
        // Exact case-insensitive match first, then a contains fallback so
        // near-miss names like "pyruvate" vs "Pyruvate;" still resolve.
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        let exact = Query::new(format!(
            "MATCH (n:{label}) WHERE toLower(n.name) = $name RETURN n.id AS id ORDER BY n.id LIMIT 1"
        ))
        .param("name", needle.clone());
        let mut result = self.graph.execute(exact).await?;
        if let Some(row) = result.next().await? {
            if let Ok(id) = row.get::<String>("id") {
                return Ok(Some(id));
            }
        }

        let partial = Query::new(format!(
            "MATCH (n:{label}) WHERE toLower(n.name) CONTAINS $name RETURN n.id AS id ORDER BY n.id LIMIT 1"
        ))
        .param("name", needle);
        let mut result = self.graph.execute(partial).await?;
        if let Some(row) = result.next().await? {
            if let Ok(id) = row.get::<String>("id") {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

impl GraphStore for Neo4jStore {
    async fn fetch_compound(&self, compound_id: &str) -> Result<Option<CompoundRecord>> {
        let base = Query::new(
            "MATCH (c:Compound {id: $id}) RETURN c.id AS compound_id, c.name AS name".to_string(),
        )
        .param("id", compound_id.to_string());

        let mut result = self
            .graph
            .execute(base)
            .await
            .context("Failed to fetch compound")?;
        let Some(row) = result.next().await? else {
            return Ok(None);
        };
        let compound_id: String = row.get("compound_id")?;
        let name = clean_name(row.get::<String>("name").ok());

        let producing = self
            .reaction_refs(
                Query::new(
                    "MATCH (c:Compound {id: $id})<-[:PRODUCES]-(r:Reaction) \
                     RETURN r.id AS reaction_id, r.name AS name ORDER BY r.id"
                        .to_string(),
                )
                .param("id", compound_id.clone()),
            )
            .await
            .context("Failed to fetch producing reactions")?;
        let consuming = self
            .reaction_refs(
                Query::new(
                    "MATCH (c:Compound {id: $id})-[:CONSUMED_BY]->(r:Reaction) \
                     RETURN r.id AS reaction_id, r.name AS name ORDER BY r.id"
                        .to_string(),
                )
                .param("id", compound_id.clone()),
            )
            .await
            .context("Failed to fetch consuming reactions")?;

        Ok(Some(CompoundRecord {
            compound_id,
            name,
            producing_reactions: producing,
            consuming_reactions: consuming,
        }))
    }

    async fn fetch_reaction(&self, reaction_id: &str) -> Result<Option<ReactionRecord>> {
        let base = Query::new(
            "MATCH (r:Reaction {id: $id}) \
             RETURN r.id AS reaction_id, r.name AS name, r.definition AS definition, \
                    r.equation AS equation, r.reversible AS reversible"
                .to_string(),
        )
        .param("id", reaction_id.to_string());

        let mut result = self
            .graph
            .execute(base)
            .await
            .context("Failed to fetch reaction")?;
        let Some(row) = result.next().await? else {
            return Ok(None);
        };
        let reaction_id: String = row.get("reaction_id")?;
        let name = clean_name(row.get::<String>("name").ok());
        let definition = row.get::<String>("definition").ok();
        let equation = row.get::<String>("equation").ok();
        let reversible = row.get::<bool>("reversible").ok();

        let substrates = self
            .compound_refs(
                Query::new(
                    "MATCH (c:Compound)-[:CONSUMED_BY]->(r:Reaction {id: $id}) \
                     RETURN c.id AS compound_id, c.name AS name ORDER BY c.id"
                        .to_string(),
                )
                .param("id", reaction_id.clone()),
            )
            .await
            .context("Failed to fetch substrates")?;
        let products = self
            .compound_refs(
                Query::new(
                    "MATCH (r:Reaction {id: $id})-[:PRODUCES]->(c:Compound) \
                     RETURN c.id AS compound_id, c.name AS name ORDER BY c.id"
                        .to_string(),
                )
                .param("id", reaction_id.clone()),
            )
            .await
            .context("Failed to fetch products")?;

        let enzyme_query = Query::new(
            "MATCH (r:Reaction {id: $id})-[:CATALYZED_BY]->(e:Enzyme) \
             RETURN e.ec AS ec ORDER BY e.ec"
                .to_string(),
        )
        .param("id", reaction_id.clone());
        let mut rows = self
            .graph
            .execute(enzyme_query)
            .await
            .context("Failed to fetch reaction enzymes")?;
        let mut enzymes = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Ok(ec) = row.get::<String>("ec") {
                if !ec.is_empty() {
                    enzymes.push(ec);
                }
            }
        }

        Ok(Some(ReactionRecord {
            reaction_id,
            name,
            definition,
            equation,
            reversible,
            substrates,
            products,
            enzymes,
        }))
    }

    async fn fetch_pathway(&self, pathway_id: &str) -> Result<Option<PathwayRecord>> {
        let base = Query::new(
            "MATCH (p:Pathway {id: $id}) RETURN p.id AS pathway_id, p.name AS name".to_string(),
        )
        .param("id", pathway_id.to_string());

        let mut result = self
            .graph
            .execute(base)
            .await
            .context("Failed to fetch pathway")?;
        let Some(row) = result.next().await? else {
            return Ok(None);
        };
        let pathway_id: String = row.get("pathway_id")?;
        let name = clean_name(row.get::<String>("name").ok());

        let reactions = self
            .reaction_refs(
                Query::new(
                    "MATCH (p:Pathway {id: $id})-[:HAS_REACTION]->(r:Reaction) \
                     RETURN r.id AS reaction_id, r.name AS name ORDER BY r.id"
                        .to_string(),
                )
                .param("id", pathway_id.clone()),
            )
            .await
            .context("Failed to fetch pathway reactions")?;

        let counts = Query::new(
            "MATCH (p:Pathway {id: $id})-[:HAS_REACTION]->(r:Reaction) \
             OPTIONAL MATCH (r)-[:PRODUCES|CONSUMED_BY]-(c:Compound) \
             OPTIONAL MATCH (r)-[:CATALYZED_BY]->(e:Enzyme) \
             RETURN count(DISTINCT c) AS compound_count, count(DISTINCT e) AS enzyme_count"
                .to_string(),
        )
        .param("id", pathway_id.clone());
        let mut rows = self
            .graph
            .execute(counts)
            .await
            .context("Failed to fetch pathway counts")?;
        let (compound_count, enzyme_count) = match rows.next().await? {
            Some(row) => (
                row.get::<i64>("compound_count").unwrap_or(0) as usize,
                row.get::<i64>("enzyme_count").unwrap_or(0) as usize,
            ),
            None => (0, 0),
        };

        let reaction_count = reactions.len();
        Ok(Some(PathwayRecord {
            pathway_id,
            name,
            reactions,
            reaction_count,
            compound_count,
            enzyme_count,
        }))
    }

    async fn fetch_enzyme(&self, ec: &str) -> Result<Option<EnzymeRecord>> {
        let base =
            Query::new("MATCH (e:Enzyme {ec: $ec}) RETURN e.ec AS ec, e.name AS name".to_string())
                .param("ec", ec.to_string());

        let mut result = self
            .graph
            .execute(base)
            .await
            .context("Failed to fetch enzyme")?;
        let Some(row) = result.next().await? else {
            return Ok(None);
        };
        let ec: String = row.get("ec")?;
        let name = clean_name(row.get::<String>("name").ok());

        let reactions = self
            .reaction_refs(
                Query::new(
                    "MATCH (r:Reaction)-[:CATALYZED_BY]->(e:Enzyme {ec: $ec}) \
                     RETURN r.id AS reaction_id, r.name AS name ORDER BY r.id"
                        .to_string(),
                )
                .param("ec", ec.clone()),
            )
            .await
            .context("Failed to fetch enzyme reactions")?;

        Ok(Some(EnzymeRecord {
            ec,
            name,
            reactions,
        }))
    }

    async fn lookup_compound_id_by_name(&self, name: &str) -> Result<Option<String>> {
        self.lookup_id("Compound", name)
            .await
            .context("Failed to look up compound by name")
    }

    async fn lookup_reaction_id_by_name(&self, name: &str) -> Result<Option<String>> {
        self.lookup_id("Reaction", name)
            .await
            .context("Failed to look up reaction by name")
    }

    async fn lookup_pathway_id_by_name(&self, name: &str) -> Result<Option<String>> {
        self.lookup_id("Pathway", name)
            .await
            .context("Failed to look up pathway by name")
    }
}
