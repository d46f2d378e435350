//! Small, dependency-light helpers shared by the layout, hyphenation,
//! image and URL crates.

#[macro_use]
mod macros;
mod bitset;
mod round;

pub use self::bitset::{BitSet, SmallBitSet};
pub use self::round::distribute_rounded;

use std::hash::Hash;

use siphasher::sip128::{Hasher128, SipHasher13};

/// Calculate a 128-bit siphash of a value.
///
/// Used to derive the style flyweight keys `dillo-layout` interns its
/// `StyleAttrs` under.
pub fn hash128<T: Hash + ?Sized>(value: &T) -> u128 {
    let mut state = SipHasher13::new();
    value.hash(&mut state);
    state.finish128().as_u128()
}
