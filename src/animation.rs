use std::f64::consts::TAU;

use crate::traits::Oriented;

/// Radians added to the vertical-axis rotation each frame
pub const DEFAULT_SPIN_STEP: f32 = 0.002;

/// Turns one node around its vertical axis by a fixed step per frame
///
/// The angle is accumulated in f64 and only written to the node's f32
/// rotation, so long sessions do not drift from `start + step * frames`.
#[derive(Debug, Clone)]
pub struct SpinAnimator {
    step: f32,
    /// Accumulated angle and the f32 value last written to the node
    spin: Option<(f64, f32)>,
}

impl SpinAnimator {
    pub fn new(step: f32) -> Self {
        Self { step, spin: None }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Forget the accumulated angle; the next frame starts from the node's rotation
    pub fn reset(&mut self) {
        self.spin = None;
    }

    /// Advance the node's Y rotation; does nothing while the node is absent
    pub fn on_frame<N: Oriented + ?Sized>(&mut self, node: Option<&mut N>) {
        let Some(node) = node else {
            return;
        };

        let rotation = node.rotation_mut();
        // Resume from the node when someone else has turned it since the last frame
        let angle = match self.spin {
            Some((angle, written)) if written == rotation.y => angle,
            _ => rotation.y as f64,
        };

        let angle = (angle + self.step as f64).rem_euclid(TAU);
        rotation.y = angle as f32;
        self.spin = Some((angle, rotation.y));
    }
}

impl Default for SpinAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_SPIN_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;
    use glam::Vec3;

    #[test]
    fn test_single_tick_adds_step() {
        let mut node = SceneNode::group("model");
        SpinAnimator::default().on_frame(Some(&mut node));
        assert_eq!(node.rotation.y, 0.002);
    }

    #[test]
    fn test_other_axes_untouched() {
        let mut node = SceneNode::group("model").with_rotation(Vec3::new(0.3, 1.0, -0.7));
        let mut animator = SpinAnimator::default();
        for _ in 0..10 {
            animator.on_frame(Some(&mut node));
        }
        assert_eq!(node.rotation.x, 0.3);
        assert_eq!(node.rotation.z, -0.7);
        assert!((node.rotation.y - 1.02).abs() < 1e-5);
    }

    #[test]
    fn test_absent_node_is_a_no_op() {
        SpinAnimator::default().on_frame::<SceneNode>(None);
    }

    #[test]
    fn test_wraps_past_full_turn() {
        let mut node = SceneNode::group("model").with_rotation(Vec3::new(0.0, std::f32::consts::TAU - 0.001, 0.0));
        SpinAnimator::default().on_frame(Some(&mut node));
        assert!((node.rotation.y - 0.001).abs() < 1e-5);
    }

    #[test]
    fn test_custom_step() {
        let mut node = SceneNode::default();
        SpinAnimator::new(0.5).on_frame(Some(&mut node));
        assert_eq!(node.rotation.y, 0.5);
    }

    #[test]
    fn test_hour_of_frames_does_not_drift() {
        let mut node = SceneNode::group("model");
        let mut animator = SpinAnimator::default();
        let frames = 216_000u32;
        for _ in 0..frames {
            animator.on_frame(Some(&mut node));
        }

        let expected = (DEFAULT_SPIN_STEP as f64 * frames as f64).rem_euclid(TAU);
        assert!((node.rotation.y as f64 - expected).abs() < 1e-4, "{} vs {}", node.rotation.y, expected);
    }

    #[test]
    fn test_external_rotation_is_respected() {
        let mut node = SceneNode::group("model");
        let mut animator = SpinAnimator::new(0.1);
        animator.on_frame(Some(&mut node));

        node.rotation.y = 2.0;
        animator.on_frame(Some(&mut node));
        assert!((node.rotation.y - 2.1).abs() < 1e-6);
    }

    #[test]
    fn test_reset_reseeds_from_node() {
        let mut first = SceneNode::group("a");
        let mut second = SceneNode::group("b");
        let mut animator = SpinAnimator::new(0.25);
        animator.on_frame(Some(&mut first));

        animator.reset();
        animator.on_frame(Some(&mut second));
        assert_eq!(second.rotation.y, 0.25);
    }
}
