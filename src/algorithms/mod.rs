pub mod dijkstra;
pub mod distance_vector;
pub mod link_state;

pub use dijkstra::{ShortestPathTree, shortest_path_tree};
pub use distance_vector::DistanceVector;
pub use link_state::LinkState;
