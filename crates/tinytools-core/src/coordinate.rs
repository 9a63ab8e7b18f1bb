//! N-dimensional coordinates over signed numbers.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// Numbers a [`Coordinate`] can hold.
pub trait Scalar:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + fmt::Display
    + fmt::Debug
    + FromStr
{
    /// Absolute value.
    #[must_use]
    fn abs(self) -> Self;

    /// Lossy widening used for Euclidean distance.
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Scalar for $t {
                fn abs(self) -> Self {
                    <$t>::abs(self)
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, i128, isize, f32, f64);

/// A point in `N` dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate<T: Scalar, const N: usize> {
    /// Components, first axis first.
    pub data: [T; N],
}

/// Two-dimensional coordinate.
pub type Point<T> = Coordinate<T, 2>;

/// Three-dimensional coordinate.
pub type TriPoint<T> = Coordinate<T, 3>;

impl<T: Scalar, const N: usize> Default for Coordinate<T, N> {
    fn default() -> Self {
        Self {
            data: [T::default(); N],
        }
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Coordinate<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<T: Scalar> Coordinate<T, 2> {
    /// A 2-D point.
    pub const fn new(x: T, y: T) -> Self {
        Self { data: [x, y] }
    }
}

impl<T: Scalar> Coordinate<T, 3> {
    /// A 3-D point.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { data: [x, y, z] }
    }
}

impl<T: Scalar, const N: usize> Coordinate<T, N> {
    /// Number of components.
    pub const DIMENSION: usize = N;

    /// Component-wise absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self {
            data: self.data.map(Scalar::abs),
        }
    }

    /// Sum of squared components.
    #[must_use]
    pub fn distance_squared(&self) -> T {
        self.data
            .iter()
            .fold(T::default(), |acc, &component| acc + component * component)
    }

    /// Euclidean distance from the origin.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance_squared().to_f64().sqrt()
    }
}

impl<T: Scalar, const N: usize> Neg for Coordinate<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            data: self.data.map(Neg::neg),
        }
    }
}

impl<T: Scalar, const N: usize> Add for Coordinate<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            data: std::array::from_fn(|i| self.data[i] + rhs.data[i]),
        }
    }
}

impl<T: Scalar, const N: usize> Sub for Coordinate<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            data: std::array::from_fn(|i| self.data[i] - rhs.data[i]),
        }
    }
}

impl<T: Scalar, const N: usize> AddAssign for Coordinate<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Scalar, const N: usize> SubAssign for Coordinate<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Coordinate<T, N> {
    type Output = T;

    fn index(&self, axis: usize) -> &T {
        &self.data[axis]
    }
}

impl<T: Scalar, const N: usize> IndexMut<usize> for Coordinate<T, N> {
    fn index_mut(&mut self, axis: usize) -> &mut T {
        &mut self.data[axis]
    }
}

impl<T: Scalar, const N: usize> fmt::Display for Coordinate<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (axis, component) in self.data.iter().enumerate() {
            if axis > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }
        f.write_str(")")
    }
}

impl<T: Scalar, const N: usize> FromStr for Coordinate<T, N> {
    type Err = CoreError;

    /// Parse `(a,b,...)` with exactly `N` components.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CoreError::InvalidCoordinate {
            input: s.to_string(),
            reason,
        };

        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| invalid("expected `(` ... `)`".to_string()))?;

        let parts: Vec<&str> = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(str::trim).collect()
        };
        if parts.len() != N {
            return Err(invalid(format!(
                "expected {N} component(s), found {}",
                parts.len()
            )));
        }

        let mut coordinate = Self::default();
        for (slot, part) in coordinate.data.iter_mut().zip(parts) {
            *slot = part
                .parse()
                .map_err(|_| invalid(format!("`{part}` is not a number")))?;
        }
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arithmetic_is_component_wise() {
        let a = Point::new(1, 2);
        let b = Point::new(4, -6);

        assert_eq!(a + b, Point::new(5, -4));
        assert_eq!(b - a, Point::new(3, -8));
        assert_eq!(-a, Point::new(-1, -2));

        let mut c = a;
        c += b;
        c -= Point::new(1, 1);
        assert_eq!(c, Point::new(4, -5));
        assert_ne!(c, a);
    }

    #[test]
    fn abs_and_distance() {
        let p = TriPoint::new(-2, 3, -6);
        assert_eq!(p.abs(), TriPoint::new(2, 3, 6));
        assert_eq!(p.distance_squared(), 49);
        assert!((p.distance() - 7.0).abs() < f64::EPSILON);

        let q = Point::new(0.5_f64, -1.5);
        assert!((q.distance_squared() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn indexing_reaches_components() {
        let mut p = Coordinate::<i32, 4>::from([1, 2, 3, 4]);
        p[3] = 40;
        assert_eq!(p[0], 1);
        assert_eq!(p.data, [1, 2, 3, 40]);
        assert_eq!(Coordinate::<i32, 4>::DIMENSION, 4);
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(Point::new(3, -4).to_string(), "(3,-4)");
        assert_eq!(TriPoint::new(1.5, 0.0, 2.0).to_string(), "(1.5,0,2)");
        assert_eq!(Coordinate::<i8, 0>::default().to_string(), "()");

        let p: Point<i64> = " ( 10 , -20 ) ".parse().expect("parse");
        assert_eq!(p, Point::new(10, -20));

        let t: TriPoint<f64> = "(1,2.5,-3)".parse().expect("parse");
        assert_eq!(t, TriPoint::new(1.0, 2.5, -3.0));

        let empty: Coordinate<i32, 0> = "()".parse().expect("parse");
        assert!(empty.data.is_empty());
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        for bad in ["1,2", "(1,2", "(1)", "(1,2,3)", "(1,x)", "(1,2,)", ""] {
            let err = bad.parse::<Point<i32>>().expect_err(bad);
            assert!(
                matches!(err, CoreError::InvalidCoordinate { ref input, .. } if input == bad),
                "{bad}: {err}"
            );
        }
    }
}
