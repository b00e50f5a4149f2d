
/// Book-keeping of the frames going through the render loop.
#[derive(Debug, Default)]
pub struct FrameCounter {

    rendered: u64,
    skipped : u64,
}

/// What the render loop should do after a frame step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FrameAction {
    /// keep rendering.
    Rendering,
    /// the swapchain no longer matches the surface, nothing was presented this frame.
    SwapchainOutdated,
    /// leave the render loop.
    Terminal,
}

impl FrameCounter {

    pub fn new() -> FrameCounter {
        FrameCounter::default()
    }

    /// Record the result of the current frame.
    pub fn tick_frame(&mut self, action: FrameAction) {

        match action {
            | FrameAction::Rendering         => self.rendered += 1,
            | FrameAction::SwapchainOutdated => self.skipped  += 1,
            | FrameAction::Terminal => {},
        }
    }

    pub fn rendered_count(&self) -> u64 {
        self.rendered
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_and_skipped_frames_are_counted_apart() {
        let mut counter = FrameCounter::new();

        counter.tick_frame(FrameAction::Rendering);
        counter.tick_frame(FrameAction::SwapchainOutdated);
        counter.tick_frame(FrameAction::SwapchainOutdated);
        counter.tick_frame(FrameAction::Rendering);
        counter.tick_frame(FrameAction::Rendering);

        assert_eq!(counter.rendered_count(), 3);
        assert_eq!(counter.skipped_count(), 2);
    }

    #[test]
    fn terminal_does_not_count() {
        let mut counter = FrameCounter::new();
        counter.tick_frame(FrameAction::Terminal);

        assert_eq!(counter.rendered_count(), 0);
        assert_eq!(counter.skipped_count(), 0);
    }
}
