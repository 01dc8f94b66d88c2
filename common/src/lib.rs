//! Open-set protocol common library
//!
//! WordNet階層の読み込みとプロトコル共通の型

pub mod error;
pub mod hierarchy;
pub mod protocol;
pub mod types;

pub use error::{Error, Result};
pub use hierarchy::{HierarchyNode, ImageNetHierarchy, NodeStats};
pub use protocol::ProtocolDefinition;
pub use types::{LabelGroup, SampleRecord, Split, KNOWN_UNKNOWN_LABEL, UNKNOWN_UNKNOWN_LABEL};
