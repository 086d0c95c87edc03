pub mod link;
pub mod router;
pub mod topology;

pub use link::Link;
pub use router::{NodeId, Router};
pub use topology::Topology;
