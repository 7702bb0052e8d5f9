//! Service module that exports interfaces to external applications, APIs, etc.

pub mod visualization;

// rexport some traits and utilty functions
pub use visualization::map::{new_route_visualization_handler, MapSurface};
