use crate::PointXYZRGBA;

/// Ordered point storage. A point's position in the cloud is its index, and
/// faces refer to points by that index.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Colors,
}

/// Per-point color channels, always the same length as the positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
    pub a: Vec<u8>,
}

impl Colors {
    fn filled(n: usize) -> Self {
        let [r, g, b] = PointXYZRGBA::DEFAULT_COLOR;
        Self {
            r: vec![r; n],
            g: vec![g; n],
            b: vec![b; n],
            a: vec![PointXYZRGBA::DEFAULT_ALPHA; n],
        }
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
            a: Vec::with_capacity(n),
        }
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: Colors::default(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            colors: Colors::with_capacity(n),
        }
    }

    /// Builds a cloud from coordinate columns; every point gets the default
    /// white color and zero alpha.
    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        let colors = Colors::filled(x.len());
        Self { x, y, z, colors }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = PointXYZRGBA>,
    {
        let points = points.into_iter();
        let mut cloud = Self::with_capacity(points.size_hint().0);
        for p in points {
            cloud.push(p);
        }
        cloud
    }

    pub fn push(&mut self, p: PointXYZRGBA) {
        self.x.push(p.x);
        self.y.push(p.y);
        self.z.push(p.z);
        self.colors.r.push(p.r);
        self.colors.g.push(p.g);
        self.colors.b.push(p.b);
        self.colors.a.push(p.a);
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        debug_assert_eq!(self.x.len(), self.colors.r.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn point(&self, i: usize) -> PointXYZRGBA {
        PointXYZRGBA {
            x: self.x[i],
            y: self.y[i],
            z: self.z[i],
            r: self.colors.r[i],
            g: self.colors.g[i],
            b: self.colors.b[i],
            a: self.colors.a[i],
        }
    }

    pub fn iter_points(&self) -> impl Iterator<Item = PointXYZRGBA> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }

    /// Number of points with all three coordinates finite.
    pub fn count_finite(&self) -> usize {
        self.iter_points().filter(PointXYZRGBA::is_finite).count()
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut out = Self::with_capacity(indices.len());
        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            out.push(self.point(idx));
        }
        out
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<PointXYZRGBA> for PointCloud {
    fn from_iter<I: IntoIterator<Item = PointXYZRGBA>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}
