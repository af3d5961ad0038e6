pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod inspect;
pub mod loaders;
pub mod math;
pub mod normalize;
pub mod renderer;
pub mod scene;
pub mod scenes;
pub mod traits;
pub mod viewer;

pub use animation::SpinAnimator;
pub use normalize::{normalize, AssetNormalizer};
pub use scene::{Geometry, Material, MaterialKind, SceneNode};
pub use scenes::{ModelSource, ModelStage, StageStatus};
