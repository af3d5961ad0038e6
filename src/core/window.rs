use serde::{Deserialize, Serialize};

/// Window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Which views share the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Model view on top, fallback view below
    Stacked,
    ModelOnly,
    FallbackOnly,
}

/// Pixel rectangle inside the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width) as f32
            && py < (self.y + self.height) as f32
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Layout {
    /// Rectangles for the model view and the fallback view, `None` when hidden
    pub fn split(&self, dims: WindowDimensions) -> (Option<ViewRect>, Option<ViewRect>) {
        let full = ViewRect {
            x: 0,
            y: 0,
            width: dims.width,
            height: dims.height,
        };

        match self {
            Layout::ModelOnly => (Some(full), None),
            Layout::FallbackOnly => (None, Some(full)),
            Layout::Stacked => {
                let top = dims.height / 2;
                (
                    Some(ViewRect { height: top, ..full }),
                    Some(ViewRect {
                        y: top,
                        height: dims.height - top,
                        ..full
                    }),
                )
            }
        }
    }
}
