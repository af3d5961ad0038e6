//! Headless run: load and normalize the model, optionally spin it, and
//! describe the result.

use anyhow::{anyhow, Result};
use std::fmt;

use crate::animation::SpinAnimator;
use crate::config::ViewerConfig;
use crate::frame::FrameInfo;
use crate::normalize::{AssetNormalizer, NormalizeReport};
use crate::scene::SceneNode;
use crate::scenes::{ModelSource, ModelStage, StageStatus};
use crate::traits::FrameHandler;

/// Nominal frame time used for simulated ticks
const SIMULATED_DELTA: f32 = 1.0 / 60.0;

#[derive(Debug, Clone)]
pub struct InspectReport {
    pub source: String,
    pub normalize: NormalizeReport,
    pub frames: u64,
    pub rotation_y: f32,
    /// One line per node, indented by depth
    pub outline: Vec<String>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.source)?;
        for line in &self.outline {
            writeln!(f, "  {}", line)?;
        }
        writeln!(
            f,
            "Normalized: {} nodes, {} meshes, {} materials upgraded",
            self.normalize.visited, self.normalize.meshes, self.normalize.upgraded
        )?;
        write!(
            f,
            "Spin after {} frames: {:.4} rad",
            self.frames, self.rotation_y
        )
    }
}

/// Load the configured model and run it through the stage without a window
pub fn inspect(config: &ViewerConfig, frames: u64) -> Result<InspectReport> {
    let source = ModelSource::File(config.model.model_path.clone());
    let root = source.load()?;
    inspect_tree(
        source,
        root,
        AssetNormalizer::new(config.model.material_defaults),
        SpinAnimator::new(config.model.spin_step),
        frames,
    )
}

pub fn inspect_tree(
    source: ModelSource,
    root: SceneNode,
    normalizer: AssetNormalizer,
    animator: SpinAnimator,
    frames: u64,
) -> Result<InspectReport> {
    let label = source.label();
    let mut stage = ModelStage::new(source, normalizer, animator);
    stage.set_model(root);

    let mut frame = FrameInfo::first();
    for _ in 0..frames {
        stage.on_frame(&frame);
        frame = frame.advance(SIMULATED_DELTA);
    }

    if let StageStatus::Failed(message) = stage.status() {
        return Err(anyhow!("model stage failed: {}", message));
    }
    let root = stage
        .root()
        .ok_or_else(|| anyhow!("model stage has no model after loading"))?;

    Ok(InspectReport {
        source: label,
        normalize: stage.last_report().unwrap_or_default(),
        frames,
        rotation_y: root.rotation.y,
        outline: outline(root),
    })
}

fn outline(root: &SceneNode) -> Vec<String> {
    let mut lines = Vec::new();
    describe(root, 0, &mut lines);
    lines
}

fn describe(node: &SceneNode, depth: usize, lines: &mut Vec<String>) {
    let name = node.name.as_deref().unwrap_or("<unnamed>");
    let mut line = format!("{}{}", "  ".repeat(depth), name);

    if let Some(geometry) = &node.geometry {
        line.push_str(&format!(" [mesh, {} triangles", geometry.triangle_count()));
        if let Some(material) = &node.material {
            line.push_str(&format!(", {}", material.kind.as_str()));
        }
        if node.cast_shadow && node.receive_shadow {
            line.push_str(", shadows");
        }
        line.push(']');
    }
    lines.push(line);

    for child in &node.children {
        describe(child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;
    use crate::scene::{Geometry, Material};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn tree() -> SceneNode {
        SceneNode::group("car").with_child(
            SceneNode::mesh(
                Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)),
                Some(Arc::new(Material::phong(Color::RED))),
            )
            .with_name("door"),
        )
    }

    #[test]
    fn test_report_describes_normalized_tree() {
        let report = inspect_tree(
            ModelSource::File(PathBuf::from("car.glb")),
            tree(),
            AssetNormalizer::default(),
            SpinAnimator::default(),
            10,
        )
        .unwrap();

        assert_eq!(report.source, "car.glb");
        assert_eq!(report.normalize.upgraded, 1);
        assert_eq!(report.outline, vec!["car", "  door [mesh, 12 triangles, standard, shadows]"]);
        assert!((report.rotation_y - 0.02).abs() < 1e-5);

        let text = report.to_string();
        assert!(text.contains("1 materials upgraded"));
        assert!(text.ends_with("Spin after 10 frames: 0.0200 rad"));
    }

    #[test]
    fn test_zero_frames_leaves_rotation() {
        let report = inspect_tree(
            ModelSource::File(PathBuf::from("car.glb")),
            tree(),
            AssetNormalizer::default(),
            SpinAnimator::default(),
            0,
        )
        .unwrap();
        assert_eq!(report.rotation_y, 0.0);
    }

    #[test]
    fn test_missing_model_errors() {
        let mut config = ViewerConfig::default();
        config.model.model_path = PathBuf::from("no/such/model.gltf");
        assert!(inspect(&config, 0).is_err());
    }
}
