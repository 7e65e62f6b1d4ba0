pub mod common;
pub mod community;
pub mod leiden;
pub mod compare;
pub mod centrality;
pub mod betweenness;
pub mod topology;
pub mod layout;

pub use common::{GraphView, NodeId, WeightedEdge};
pub use community::{compact_membership, modularity, CommunityDetector, Partition};
pub use leiden::{Leiden, LeidenConfig};
pub use compare::normalized_mutual_information;
pub use centrality::{
    degree_centrality, eigenvector_centrality, normalize_by_max, CentralityError, CentralityResult,
    DegreeCentrality, EigenvectorCentrality, EigenvectorConfig, NodeCentrality,
};
pub use betweenness::{betweenness, BetweennessResult};
pub use topology::{average_clustering, count_triangles, local_clustering};
pub use layout::{fruchterman_reingold, LayoutConfig, Point};
