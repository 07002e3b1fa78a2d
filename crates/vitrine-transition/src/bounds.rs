//! Axis-aligned bounds and the sweep axis derived from them.

use glam::Vec3;

/// World-space axis-aligned bounding box of an entity, as reported by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Creates bounds, reordering corners if necessary.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A unit cube centred on the origin.
    pub fn unit() -> Self {
        Self::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    /// Size along each axis.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Size along Y.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Centre point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unit()
    }
}

/// The axis a colour sweep travels along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepAxis {
    /// Along X.
    X,
    /// Along Y.
    Y,
    /// Along Z.
    Z,
}

impl SweepAxis {
    /// The dominant (longest) axis of `bounds`. Ties prefer Y, then X.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let e = bounds.extents();
        if e.y >= e.x && e.y >= e.z {
            SweepAxis::Y
        } else if e.x >= e.z {
            SweepAxis::X
        } else {
            SweepAxis::Z
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            SweepAxis::X => Vec3::X,
            SweepAxis::Y => Vec3::Y,
            SweepAxis::Z => Vec3::Z,
        }
    }

    fn component(self, v: Vec3) -> f32 {
        match self {
            SweepAxis::X => v.x,
            SweepAxis::Y => v.y,
            SweepAxis::Z => v.z,
        }
    }

    /// Position of `point` along this axis, normalized to `[0, 1]` over `bounds`.
    pub fn normalized(self, point: Vec3, bounds: &Bounds) -> f32 {
        let lo = self.component(bounds.min);
        let span = self.component(bounds.max) - lo;
        if span <= f32::EPSILON {
            return 0.0;
        }
        ((self.component(point) - lo) / span).clamp(0.0, 1.0)
    }
}
