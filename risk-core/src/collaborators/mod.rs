//! External collaborators
//!
//! Interface boundary only: the graph store output shape and a helper that
//! bounds any collaborator call with a timeout.

pub mod graph;
pub mod timeout;

pub use graph::{Cluster, GraphMetrics, GraphMetricsSource};
pub use timeout::{with_timeout, TimeoutExtractor};
