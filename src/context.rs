//! Seams to the platform that `Kiwi8` is driven on.
//!
//! The core never renders or polls anything by itself. A `Driver` samples an
//! `InputSource` before each cycle and forwards presentation requests raised by
//! the executed program to a `Display`.

use crate::frame::FrameView;

/// Sink for presentation requests
pub trait Display {
    /// Draw current frame to the screen
    ///
    /// Called by `tick_chip` after a cycle that raised the draw request
    fn on_frame(&mut self, frame: FrameView<'_>);
    /// Blank the screen
    ///
    /// Called by `tick_chip` after a cycle that raised the clear request, before
    /// the framebuffer itself is zeroed
    fn on_clear(&mut self);
}

/// Source of the keypad state
pub trait InputSource {
    /// Get state of the 4x4 keyboard, bit k set iff key k is held
    ///
    /// Called by `tick_chip` before each cycle
    fn key_mask(&mut self) -> u16;
}

/// Trait aggregating platform functionalities
pub trait Context: Display + InputSource {}

impl<T: Display + InputSource> Context for T {}

#[cfg(test)]
pub mod testing {
    use super::*;

    use crate::utils::testing::{ImageMask, ToMask};

    pub struct TestingContext {
        frame: Option<ImageMask>,
        frames: usize,
        clears: usize,
        keys: u16,
    }

    impl TestingContext {
        pub fn new() -> Self {
            Self {
                frame: None,
                frames: 0,
                clears: 0,
                keys: 0,
            }
        }

        pub fn get_frame(&self) -> Option<&ImageMask> {
            self.frame.as_ref()
        }

        pub fn frames(&self) -> usize {
            self.frames
        }

        pub fn clears(&self) -> usize {
            self.clears
        }

        pub fn set_key(&mut self, n: u8) {
            self.keys |= 1 << n;
        }

        pub fn reset_key(&mut self, n: u8) {
            self.keys &= !(1 << n);
        }
    }

    impl Display for TestingContext {
        fn on_frame(&mut self, frame: FrameView<'_>) {
            self.frames += 1;
            self.frame = Some(frame.to_mask());
        }

        fn on_clear(&mut self) {
            self.clears += 1;
            self.frame = None;
        }
    }

    impl InputSource for TestingContext {
        fn key_mask(&mut self) -> u16 {
            self.keys
        }
    }

    #[test]
    fn testing_context() {
        use crate::frame::Frame;

        let mut ctx = TestingContext::new();

        let mut frame = Frame::new();
        frame.xor_pixel(1, 0, 1);
        frame.xor_pixel(0, 1, 1);
        let expected = "
            .#
            #.
        ";

        ctx.on_frame(frame.view());
        assert_eq!(ctx.frames(), 1);
        assert_eq!(ctx.get_frame(), Some(&expected.to_mask()));

        ctx.on_clear();
        assert_eq!(ctx.clears(), 1);
        assert!(ctx.get_frame().is_none());

        ctx.set_key(0x01u8);
        ctx.set_key(0x0Fu8);
        assert_eq!(ctx.key_mask(), 0b1000_0000_0000_0010);

        ctx.reset_key(0x0Fu8);
        assert_eq!(ctx.key_mask(), 0b0000_0000_0000_0010);
    }
}
