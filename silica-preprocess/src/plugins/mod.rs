//! Theory simplifier plugins.
//!
//! One plugin per theory family, registered in a fixed order: basic
//! (Boolean), arithmetic, arrays, bit-vectors, datatypes, floating-point,
//! sequences. Each plugin only rewrites kinds it owns.

mod arith;
mod array;
mod basic;
mod bv;
mod datatype;
mod fp;
mod seq;

pub use arith::ArithPlugin;
pub use array::ArrayPlugin;
pub use basic::BasicPlugin;
pub use bv::BvPlugin;
pub use datatype::DatatypePlugin;
pub use fp::FpPlugin;
pub use seq::SeqPlugin;
