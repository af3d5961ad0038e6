use crate::frame::FrameInfo;

/// Per-frame callback driven by the host render loop
pub trait FrameHandler {
    fn on_frame(&mut self, frame: &FrameInfo);
}
