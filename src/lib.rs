pub mod cli;
pub mod client;
pub mod config;
pub mod hierarchy;
pub mod logging;
pub mod types;

pub use client::SonarClient;
pub use hierarchy::{HierarchyError, HierarchyReconciler};
pub use types::{PortfolioHierarchy, PortfolioKey, ReferenceDelta};
