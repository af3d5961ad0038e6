mod geometry;
mod material;
mod node;

pub use geometry::Geometry;
pub use material::{Material, MaterialKind};
pub use node::{SceneIter, SceneNode};
