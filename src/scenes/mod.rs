mod fallback;
mod model;

pub use fallback::fallback_scene;
pub use model::{ModelSource, ModelStage, StageStatus};
