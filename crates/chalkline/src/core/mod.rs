//! Core abstractions shared by every diagram builder
//!
//! Geometry, styles, the element model, the shared layout result, scene
//! emission and the document serializer, plus the traits each plugin
//! implements.

mod database;
mod detector;
mod diagram;
pub mod document;
pub mod element;
mod error;
pub mod geometry;
mod layout;
pub mod logging;
pub mod scene;
mod style;
pub mod text;
mod types;

pub use database::*;
pub use detector::*;
pub use diagram::*;
pub use document::{AppState, SceneDocument};
pub use element::*;
pub use error::*;
pub use geometry::{anchor_point, bounding_box, path_midpoint, route, self_loop, AnchorTarget};
pub use layout::*;
pub use logging::{init_logging, LogFormat};
pub use scene::{SceneConfig, SceneEmitter};
pub use style::*;
pub use text::{measure, wrap_label, TextMetrics};
pub use types::*;
