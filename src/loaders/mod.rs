pub mod environment;
pub mod gltf;
pub mod pending;

pub use environment::{load_environment, EnvironmentMap, TextureMapping};
pub use gltf::{load_gltf, load_gltf_slice};
pub use pending::PendingLoad;
