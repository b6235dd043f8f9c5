use std::fmt::{Display, Formatter};

/// An axis-aligned box in three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds<T> {
    min: [T; 3],
    max: [T; 3],
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: [T; 3], max: [T; 3]) -> Self {
        Self { min, max }
    }

    /// Build bounds from per-axis extents, in the order LAS headers store them.
    pub fn from_extent(min_x: T, min_y: T, min_z: T, max_x: T, max_y: T, max_z: T) -> Self {
        Self::new([min_x, min_y, min_z], [max_x, max_y, max_z])
    }

    /// A degenerate box containing exactly `point`.
    pub fn from_point(point: [T; 3]) -> Self {
        Self::new(point, point)
    }

    pub fn min(&self) -> [T; 3] {
        self.min
    }

    pub fn max(&self) -> [T; 3] {
        self.max
    }

    /// Whether the minimum does not exceed the maximum on any axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|axis| self.min[axis] <= self.max[axis])
    }

    /// Whether `point` lies inside the box, boundary included.
    pub fn contains(&self, point: [T; 3]) -> bool {
        (0..3).all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }

    /// Extend the box so that it contains `point`.
    pub fn grow(&mut self, point: [T; 3]) {
        for axis in 0..3 {
            if point[axis] < self.min[axis] {
                self.min[axis] = point[axis];
            }
            if point[axis] > self.max[axis] {
                self.max[axis] = point[axis];
            }
        }
    }
}

impl<T: Display> Display for Bounds<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "([{}, {}], [{}, {}], [{}, {}])",
            self.min[0], self.max[0], self.min[1], self.max[1], self.min[2], self.max[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case([0.0, 0.0, 0.0], true)]
    #[case([1.0, 2.0, 3.0], true)]
    #[case([0.5, 2.5, 1.0], true)]
    #[case([1.5, 1.0, 1.0], false)]
    #[case([0.5, 1.0, -0.1], false)]
    fn contains(#[case] point: [f64; 3], #[case] expected: bool) {
        let bounds = Bounds::from_extent(0.0, 0.0, 0.0, 1.0, 2.0, 3.0);
        assert_eq!(bounds.contains(point), expected);
    }

    #[test]
    fn grow_covers_points() {
        let mut bounds = Bounds::from_point([5, 5, 5]);
        bounds.grow([1, 9, 5]);
        bounds.grow([7, 2, -3]);
        assert_eq!(bounds.min(), [1, 2, -3]);
        assert_eq!(bounds.max(), [7, 9, 5]);
        assert!(bounds.is_valid());
        assert!(!Bounds::new([1, 0, 0], [0, 0, 0]).is_valid());
    }

    #[test]
    fn display() {
        let bounds = Bounds::from_extent(0, 1, 2, 3, 4, 5);
        assert_eq!(bounds.to_string(), "([0, 3], [1, 4], [2, 5])");
    }
}
