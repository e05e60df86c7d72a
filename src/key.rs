use core::fmt::{Debug, Display};

use num_traits::{PrimInt, Signed};

/// Key type accepted by [`RbTree`](crate::RbTree) and [`MinHeap`](crate::MinHeap).
///
/// Implemented for every primitive signed integer (`i8` through `i128` and
/// `isize`).
pub trait Key: PrimInt + Signed + Debug + Display {}

impl<T> Key for T where T: PrimInt + Signed + Debug + Display {}
