pub mod names;
pub mod neo4j;
pub mod records;
pub mod store;

pub use names::clean_name;
pub use neo4j::Neo4jStore;
pub use records::{
    CompoundRecord, CompoundRef, EnzymeRecord, PathwayRecord, ReactionRecord, ReactionRef,
};
pub use store::GraphStore;
