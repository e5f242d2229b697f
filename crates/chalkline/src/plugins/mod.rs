//! Diagram builders
//!
//! One plugin per diagram type, each with a database, a layout algorithm
//! and a detector, plus the router and the text-to-diagram generator.

pub mod architecture;
pub mod er;
pub mod flowchart;
pub mod freeform;
pub mod generator;
pub mod mindmap;
pub mod router;
pub mod sequence;
pub mod timeline;

pub use architecture::*;
pub use er::*;
pub use flowchart::*;
pub use freeform::*;
pub use generator::{generate, split_elements, Analysis, Connection, Generated};
pub use mindmap::*;
pub use router::{Router, FALLBACK_CONFIDENCE, FALLBACK_REASONING};
pub use sequence::*;
pub use timeline::*;
