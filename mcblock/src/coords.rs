use std::fmt;

/// Generic 2D point, ordered by `(z, x)` to match the layout of region headers.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
    derive_more::SubAssign,
)]
pub struct PointXZ<T: Copy> {
    x: T,
    z: T,
}

impl<T: Copy> PointXZ<T> {
    pub const fn new(x: T, z: T) -> Self {
        Self { x, z }
    }

    #[inline]
    pub const fn x(&self) -> T {
        self.x
    }

    #[inline]
    pub const fn z(&self) -> T {
        self.z
    }
}

impl<T: Copy> From<(T, T)> for PointXZ<T> {
    fn from((x, z): (T, T)) -> Self {
        Self::new(x, z)
    }
}

impl<T: Copy> From<PointXZ<T>> for (T, T) {
    fn from(value: PointXZ<T>) -> (T, T) {
        (value.x, value.z)
    }
}

impl<T: Copy + fmt::Display> fmt::Display for PointXZ<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<x={} z={}>", self.x, self.z)
    }
}

impl<T: Copy + Ord> Ord for PointXZ<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.z, self.x).cmp(&(other.z, other.x))
    }
}

impl<T: Copy + Ord> PartialOrd for PointXZ<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Generic 3D point, ordered by `(y, z, x)` to match the block order within a chunk.
///
/// Tuple conversions take `(x, z, y)`, keeping the vertical axis last.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
    derive_more::SubAssign,
)]
pub struct PointXZY<T: Copy> {
    x: T,
    z: T,
    y: T,
}

impl<T: Copy> PointXZY<T> {
    pub const fn new(x: T, z: T, y: T) -> Self {
        Self { x, z, y }
    }

    #[inline]
    pub const fn x(&self) -> T {
        self.x
    }

    #[inline]
    pub const fn z(&self) -> T {
        self.z
    }

    #[inline]
    pub const fn y(&self) -> T {
        self.y
    }
}

impl<T: Copy> From<(T, T, T)> for PointXZY<T> {
    fn from((x, z, y): (T, T, T)) -> Self {
        Self::new(x, z, y)
    }
}

impl<T: Copy> From<PointXZY<T>> for (T, T, T) {
    fn from(value: PointXZY<T>) -> (T, T, T) {
        (value.x, value.z, value.y)
    }
}

impl<T: Copy + fmt::Display> fmt::Display for PointXZY<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<x={} z={} y={}>", self.x, self.z, self.y)
    }
}

impl<T: Copy + Ord> Ord for PointXZY<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.z, self.x).cmp(&(other.y, other.z, other.x))
    }
}

impl<T: Copy + Ord> PartialOrd for PointXZY<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub type CoordsXZ = PointXZ<i32>;
pub type CoordsXZY = PointXZY<i32>;
pub type IndexXZ = PointXZ<u32>;
pub type IndexXZY = PointXZY<u32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointxz() {
        let a = PointXZ::new(1, 2);
        assert_eq!(format!("{}", a), "<x=1 z=2>");
        assert_eq!(PointXZ::from((1, 2)), a);
        assert_eq!((1, 2), a.into());
        assert_eq!(a + PointXZ::new(3, 4), PointXZ::new(4, 6));
    }

    #[test]
    fn test_pointxzy() {
        let a = PointXZY::new(1, 2, 3);
        assert_eq!(format!("{}", a), "<x=1 z=2 y=3>");
        assert_eq!(PointXZY::from((1, 2, 3)), a);
        assert_eq!((1, 2, 3), a.into());
        assert_eq!((a.x(), a.z(), a.y()), (1, 2, 3));
    }

    #[test]
    fn test_ordering() {
        // Z is more significant than X
        assert!(PointXZ::new(5, 0) < PointXZ::new(0, 1));
        // Y is more significant than Z, which is more significant than X
        assert!(PointXZY::new(9, 9, 0) < PointXZY::new(0, 0, 1));
        assert!(PointXZY::new(9, 0, 1) < PointXZY::new(0, 1, 1));
    }
}
