#[cfg(test)]
pub mod testing {
    use core::fmt;

    #[cfg(feature = "embedded-graphics")]
    use embedded_graphics::{
        drawable::Pixel,
        image::{ImageRaw, IntoPixelIter},
        pixelcolor::BinaryColor,
    };

    use crate::frame::{FrameView, HEIGHT, WIDTH};

    /// Row-major boolean picture of the screen, compared in tests
    #[derive(Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ImageMask([[bool; WIDTH]; HEIGHT]);

    impl ImageMask {
        pub fn new() -> Self {
            Self([[false; WIDTH]; HEIGHT])
        }
    }

    impl fmt::Debug for ImageMask {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let width = self.0[0].len() + 2;
            write!(f, "\n")?;
            for _ in 0..width {
                write!(f, "-")?;
            }
            write!(f, "\n")?;
            for row in &self.0 {
                write!(f, "|")?;
                row.iter()
                    .map(|&p| if p { write!(f, "#") } else { write!(f, " ") })
                    .fold(Ok(()), |acc, r| acc.and(r))?;
                write!(f, "|\n")?;
            }
            for _ in 0..width {
                write!(f, "-")?;
            }
            Ok(())
        }
    }

    pub trait ToMask {
        fn to_mask(&self) -> ImageMask;
    }

    /// Rows separated by whitespace, `#` marks a set pixel
    impl ToMask for str {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            mask.0
                .iter_mut()
                .zip(self.split_whitespace())
                .for_each(|(m_row, c_row)| {
                    m_row
                        .iter_mut()
                        .zip(c_row.chars())
                        .for_each(|(m, c)| *m = c == '#')
                });
            mask
        }
    }

    impl ToMask for FrameView<'_> {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            self.iter_rows()
                .zip(mask.0.iter_mut())
                .for_each(|(f_row, m_row)| {
                    m_row
                        .iter_mut()
                        .zip(f_row)
                        .for_each(|(m, f)| *m = f == 1)
                });
            mask
        }
    }

    #[cfg(feature = "embedded-graphics")]
    pub fn image_mask(image: ImageRaw<'_, BinaryColor>) -> ImageMask {
        let mut mask = ImageMask::new();
        image.pixel_iter().for_each(|Pixel(point, color)| {
            if color == BinaryColor::On {
                mask.0[point.y as usize][point.x as usize] = true;
            }
        });
        mask
    }

    mod tests {
        use super::*;

        #[test]
        fn str_to_mask() {
            let mask = "
                #..#
                .##.
            "
            .to_mask();
            assert!(mask.0[0][0] && mask.0[0][3]);
            assert!(mask.0[1][1] && mask.0[1][2]);
            assert_eq!(mask.0.iter().flatten().filter(|&&p| p).count(), 4);
        }

        #[cfg(feature = "embedded-graphics")]
        #[test]
        fn image_to_mask() {
            let empty_data: &[u8] = &[0; 8 * HEIGHT];
            let full_data: &[u8] = &[255; 8 * HEIGHT];

            let empty_image: ImageRaw<BinaryColor> = ImageRaw::new(empty_data, WIDTH as u32, HEIGHT as u32);
            let full_image: ImageRaw<BinaryColor> = ImageRaw::new(full_data, WIDTH as u32, HEIGHT as u32);

            assert_eq!(image_mask(empty_image), ImageMask::new());
            assert_eq!(image_mask(full_image), ImageMask([[true; WIDTH]; HEIGHT]));
        }
    }
}
