//! Frame lifecycle state.

use ash::vk;

use crate::MAX_FRAMES_IN_FLIGHT;

/// Tracks which frame slot is recording and which swapchain image it targets.
///
/// Pure bookkeeping; the renderer asserts its begin/end contract through
/// this type. The slot index always advances modulo
/// [`MAX_FRAMES_IN_FLIGHT`], whether or not the frame presented cleanly.
#[derive(Debug, Default)]
pub struct FrameTracker {
    frame_index: usize,
    image_index: u32,
    command_buffer: vk::CommandBuffer,
    in_progress: bool,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a frame as started, recording the command buffer it records
    /// into. Panics if one is already in progress.
    pub fn begin(&mut self, image_index: u32, command_buffer: vk::CommandBuffer) {
        assert!(
            !self.in_progress,
            "begin_frame called while a frame is already in progress"
        );
        self.in_progress = true;
        self.image_index = image_index;
        self.command_buffer = command_buffer;
    }

    /// Mark the frame as finished and advance to the next slot. Panics if
    /// no frame is in progress.
    pub fn end(&mut self) {
        assert!(self.in_progress, "end_frame called with no frame in progress");
        self.in_progress = false;
        self.command_buffer = vk::CommandBuffer::null();
        self.frame_index = (self.frame_index + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Assert that `cmd` is the buffer the in-progress frame records into.
    ///
    /// Panics when no frame is in progress or when the handle belongs to
    /// another frame slot; both are caller bugs.
    pub fn assert_recording(&self, cmd: vk::CommandBuffer) {
        assert!(
            self.in_progress,
            "command recording attempted outside a frame"
        );
        assert_eq!(
            cmd, self.command_buffer,
            "recording must target the current frame's command buffer"
        );
    }

    #[inline]
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[inline]
    pub fn image_index(&self) -> u32 {
        self.image_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn cmd(raw: u64) -> vk::CommandBuffer {
        vk::CommandBuffer::from_raw(raw)
    }

    #[test]
    fn slot_cycles_modulo_frames_in_flight() {
        let mut tracker = FrameTracker::new();
        for frame in 0..7 {
            assert_eq!(tracker.frame_index(), frame % MAX_FRAMES_IN_FLIGHT);
            tracker.begin(0, cmd(1));
            tracker.end();
        }
        assert_eq!(tracker.frame_index(), 7 % MAX_FRAMES_IN_FLIGHT);
    }

    #[test]
    fn begin_records_image_index() {
        let mut tracker = FrameTracker::new();
        tracker.begin(2, cmd(1));
        assert!(tracker.in_progress());
        assert_eq!(tracker.image_index(), 2);
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn double_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.begin(0, cmd(1));
        tracker.begin(1, cmd(2));
    }

    #[test]
    #[should_panic(expected = "no frame in progress")]
    fn end_without_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.end();
    }

    #[test]
    fn recording_with_the_frames_buffer_is_accepted() {
        let mut tracker = FrameTracker::new();
        tracker.begin(0, cmd(7));
        tracker.assert_recording(cmd(7));
    }

    #[test]
    #[should_panic(expected = "current frame's command buffer")]
    fn recording_with_a_foreign_buffer_panics() {
        let mut tracker = FrameTracker::new();
        tracker.begin(0, cmd(7));
        tracker.assert_recording(cmd(8));
    }

    #[test]
    #[should_panic(expected = "outside a frame")]
    fn recording_outside_a_frame_panics() {
        let tracker = FrameTracker::new();
        tracker.assert_recording(cmd(7));
    }

    #[test]
    fn slot_advances_even_after_skipped_presentation() {
        // A frame that began must advance the slot on end, regardless of
        // how presentation went.
        let mut tracker = FrameTracker::new();
        tracker.begin(0, cmd(1));
        tracker.end();
        assert_eq!(tracker.frame_index(), 1);
        tracker.begin(1, cmd(2));
        tracker.end();
        assert_eq!(tracker.frame_index(), 0);
    }
}
