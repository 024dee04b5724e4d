use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Scalar types a [`Matrix`](super::Matrix) can hold
pub trait Element:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// additive identity
    fn zero() -> Self;

    /// multiplicative identity
    fn one() -> Self;

    /// Equality within `epsilon`. Integers ignore `epsilon` and compare exactly.
    fn approx_eq(self, other: Self, epsilon: f64) -> bool;
}

macro_rules! integer_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self {
                    0
                }

                fn one() -> Self {
                    1
                }

                fn approx_eq(self, other: Self, _epsilon: f64) -> bool {
                    self == other
                }
            }
        )*
    };
}

macro_rules! float_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn zero() -> Self {
                    0.0
                }

                fn one() -> Self {
                    1.0
                }

                fn approx_eq(self, other: Self, epsilon: f64) -> bool {
                    // exact match first so equal infinities compare equal
                    self == other || f64::from((self - other).abs()) <= epsilon
                }
            }
        )*
    };
}

integer_element!(i32, i64, u32, u64);
float_element!(f32, f64);
