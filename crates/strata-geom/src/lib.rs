//! Minimal geometry types shared by the meshing and scheduling crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Horizontal footprint of a chunk column in blocks.
pub const CHUNK_WIDTH: i32 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Integer block-space box: `origin` inclusive, `origin + size` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub origin: (i32, i32, i32),
    pub size: (i32, i32, i32),
}

impl BlockBox {
    #[inline]
    pub const fn new(origin: (i32, i32, i32), size: (i32, i32, i32)) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.0 <= 0 || self.size.1 <= 0 || self.size.2 <= 0
    }

    #[inline]
    pub fn max(&self) -> (i32, i32, i32) {
        (
            self.origin.0 + self.size.0,
            self.origin.1 + self.size.1,
            self.origin.2 + self.size.2,
        )
    }

    /// Grows the box by `n` blocks on every side.
    pub fn expand(&self, n: i32) -> Self {
        Self {
            origin: (self.origin.0 - n, self.origin.1 - n, self.origin.2 - n),
            size: (self.size.0 + 2 * n, self.size.1 + 2 * n, self.size.2 + 2 * n),
        }
    }

    /// Inclusive chunk coordinate range `((cx0, cz0), (cx1, cz1))` touched by the box,
    /// or `None` for an empty box.
    pub fn chunk_span(&self) -> Option<((i32, i32), (i32, i32))> {
        if self.is_empty() {
            return None;
        }
        let (x1, _, z1) = self.max();
        Some((
            (
                self.origin.0.div_euclid(CHUNK_WIDTH),
                self.origin.2.div_euclid(CHUNK_WIDTH),
            ),
            ((x1 - 1).div_euclid(CHUNK_WIDTH), (z1 - 1).div_euclid(CHUNK_WIDTH)),
        ))
    }
}
