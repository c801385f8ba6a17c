#[cfg(feature = "embedded-graphics")]
use embedded_graphics::{image::ImageRaw, pixelcolor::BinaryColor};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub(crate) const PACKED_LENGTH: usize = WIDTH * HEIGHT / 8;

/// Framebuffer of the virtual machine
///
/// Cells are addressed `[x][y]` and hold either 0 or 1.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frame([[u8; HEIGHT]; WIDTH]);

/// A shared view over a `Frame`
///
/// Handed to display sinks, which can read cells by coordinates, walk them row by
/// row from top to bottom, or pack them into a bitmap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrameView<'a>(&'a [[u8; HEIGHT]; WIDTH]);

/// Frame packed into concatenated rows, one bit per pixel, most significant bit leftmost
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PackedFrame([u8; PACKED_LENGTH]);

impl<'a> FrameView<'a> {
    /// Access a cell by coordinates, `None` outside of the frame
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.0.get(x).and_then(|column| column.get(y)).copied()
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(1)
    }

    /// Get iterator over rows, each yielding cells from left to right
    pub fn iter_rows(&self) -> impl Iterator<Item = impl Iterator<Item = u8> + 'a> + 'a {
        let cells = self.0;
        (0..HEIGHT).map(move |y| (0..WIDTH).map(move |x| cells[x][y]))
    }

    /// Number of pixels currently set
    pub fn count_set(&self) -> usize {
        self.0
            .iter()
            .flat_map(|column| column.iter())
            .filter(|&&cell| cell == 1)
            .count()
    }

    /// Create an owned copy of the frame
    pub fn copy_frame(self) -> Frame {
        Frame(*self.0)
    }

    pub fn pack(&self) -> PackedFrame {
        let mut packed = [0u8; PACKED_LENGTH];
        for (y, row) in self.iter_rows().enumerate() {
            for (x, cell) in row.enumerate() {
                if cell == 1 {
                    packed[(y * WIDTH + x) / 8] |= 0x80u8 >> (x % 8);
                }
            }
        }
        PackedFrame(packed)
    }
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self([[0; HEIGHT]; WIDTH])
    }

    /// Get view over frame
    pub fn view(&self) -> FrameView<'_> {
        FrameView(&self.0)
    }

    /// XOR a single sprite bit onto the cell at wrapped coordinates
    ///
    /// Returns true when a set bit lands on an already set cell.
    pub(crate) fn xor_pixel(&mut self, x: usize, y: usize, bit: u8) -> bool {
        let (x, y) = (x % WIDTH, y % HEIGHT);
        let current = self.0[x][y];
        self.0[x][y] = current ^ bit;
        bit == 1 && current == 1
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [[0; HEIGHT]; WIDTH];
    }
}

impl PackedFrame {
    /// View the raw memory of a packed frame
    pub fn as_raw(&self) -> &[u8] {
        &self.0
    }

    /// Get `ImageRaw` structure from frame's data
    #[cfg(feature = "embedded-graphics")]
    pub fn as_raw_image(&self) -> ImageRaw<'_, BinaryColor> {
        ImageRaw::new(self.as_raw(), WIDTH as u32, HEIGHT as u32)
    }
}
