/// A single colored point.
///
/// A NaN coordinate marks an invalid or removed point; writers drop such
/// points instead of emitting them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointXYZRGBA {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PointXYZRGBA {
    pub const DEFAULT_COLOR: [u8; 3] = [255, 255, 255];
    pub const DEFAULT_ALPHA: u8 = 0;

    /// White, fully transparent point at the given position.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        let [r, g, b] = Self::DEFAULT_COLOR;
        Self {
            x,
            y,
            z,
            r,
            g,
            b,
            a: Self::DEFAULT_ALPHA,
        }
    }

    pub fn with_rgba(mut self, r: u8, g: u8, b: u8, a: u8) -> Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self.a = a;
        self
    }

    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// PCL-style packed color: `a << 24 | r << 16 | g << 8 | b`.
    pub fn packed_rgba(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    pub fn set_packed_rgba(&mut self, packed: u32) {
        let [a, r, g, b] = packed.to_be_bytes();
        self.r = r;
        self.g = g;
        self.b = b;
        self.a = a;
    }

    /// True when no coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for PointXYZRGBA {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
