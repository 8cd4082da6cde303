use std::fmt::Debug;
use std::ops::{Add, Mul};

/// Scalar types the engine can multiply.
///
/// Accumulation happens in `Self`, so a product computed by the tiled
/// engine is bitwise comparable to a sequential reference in the same type.
pub trait Element:
    Copy + Debug + PartialEq + Send + Sync + 'static + Add<Output = Self> + Mul<Output = Self>
{
    /// Short name used in log output (e.g. "f32").
    const NAME: &'static str;

    /// Additive identity. Also the fill value for masked loads.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;
}

macro_rules! impl_element {
    ($t:ty, $name:literal) => {
        impl Element for $t {
            const NAME: &'static str = $name;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn one() -> Self {
                1.0
            }
        }
    };
}

impl_element!(f32, "f32");
impl_element!(f64, "f64");
