pub mod camera;
pub mod frame;
pub mod scene_graph;

pub use camera::*;
pub use frame::*;
pub use scene_graph::*;
