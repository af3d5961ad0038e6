mod color;
mod transform;

pub use color::{linear_to_srgb, srgb_to_linear, Color, ColorParseError};
pub use transform::{compose_trs, decompose_trs, euler_to_quat, quat_to_euler};
