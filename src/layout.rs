//! Measurement of the player container

/// How the host asked the container's height to be sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestedHeight {
    /// Derive the height from the width (16:9)
    #[default]
    Auto,
    /// Use whatever the host measured
    Exact,
}

/// Measured size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Height for a 16:9 box of the given width, rounded down
pub fn sixteen_nine_height(width: u32) -> u32 {
    (u64::from(width) * 9 / 16) as u32
}

/// Measures the container.
///
/// With [`RequestedHeight::Auto`] the height follows the width at 16:9;
/// otherwise both dimensions pass through unchanged.
pub fn measure(width: u32, height: u32, requested: RequestedHeight) -> Size {
    match requested {
        RequestedHeight::Auto => Size {
            width,
            height: sixteen_nine_height(width),
        },
        RequestedHeight::Exact => Size { width, height },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_height_is_floor_of_sixteen_nine() {
        for width in [0, 1, 15, 16, 100, 1080, 1919, 1920, u32::MAX] {
            let expected = (u64::from(width) * 9 / 16) as u32;
            assert_eq!(measure(width, 0, RequestedHeight::Auto).height, expected);
        }
        assert_eq!(sixteen_nine_height(1920), 1080);
        assert_eq!(sixteen_nine_height(100), 56);
    }

    #[test]
    fn exact_height_passes_through() {
        assert_eq!(
            measure(640, 123, RequestedHeight::Exact),
            Size {
                width: 640,
                height: 123
            }
        );
    }
}
