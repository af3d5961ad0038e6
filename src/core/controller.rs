/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Shift,
    Control,
    Escape,
    MouseLeft,
    MouseRight,
    MouseMiddle,
}

/// Orbit gesture implied by the held buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
    Dolly,
}

/// Controller - handles button and pointer input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Pointer movement since the last reset, in physical pixels
    fn pointer_delta(&self) -> (f32, f32);

    /// Wheel movement since the last reset, in lines (positive = away from user)
    fn scroll_delta(&self) -> f32;

    /// Gesture for the current drag, following three.js OrbitControls bindings:
    /// left rotates (or pans with a modifier), middle dollies, right pans
    fn drag_mode(&self) -> Option<DragMode> {
        if self.is_down(Button::MouseLeft) {
            if self.is_down(Button::Shift) || self.is_down(Button::Control) {
                Some(DragMode::Pan)
            } else {
                Some(DragMode::Rotate)
            }
        } else if self.is_down(Button::MouseMiddle) {
            Some(DragMode::Dolly)
        } else if self.is_down(Button::MouseRight) {
            Some(DragMode::Pan)
        } else {
            None
        }
    }
}
