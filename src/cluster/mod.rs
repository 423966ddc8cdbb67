pub mod index;

pub use index::{ClusterIndex, ClusterRegistry, Nearest};
