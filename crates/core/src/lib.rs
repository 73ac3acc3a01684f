//! Core emulator primitives shared by the machine and the frontends.

pub mod cpu_386;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A rendered video frame: 32-bit 0xFFRRGGBB pixels, row-major.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_initialization() {
        let f = types::Frame::new(10, 10);
        assert_eq!(f.pixels.len(), 100);
        assert_eq!(f.width, 10);
        assert_eq!(f.height, 10);
    }

    #[test]
    fn frame_serde_roundtrip() {
        let mut f = types::Frame::new(2, 2);
        f.pixels[3] = 0xFFAA5500;
        let s = serde_json::to_string(&f).expect("serialize");
        let f2: types::Frame = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(f, f2);
    }
}
