//! Deterministic hash functions for simulation randomness.
//!
//! Naming follows `hash{inputs}1{input_type}{output_type}32`:
//! - `u` = `u32`, `i` = `i32`, `f` = `f32` in `[0.0, 1.0)`
//!
//! `hash21uu32(tick, cell)` is the workhorse used to pick a lateral side
//! for blocked atoms and a palette entry for new atoms.

/// Avalanche mixer for 32-bit values.
#[inline]
fn mix32(mut h: u32) -> u32 {
  h ^= h >> 16;
  h = h.wrapping_mul(0x7feb_352d);
  h ^= h >> 15;
  h = h.wrapping_mul(0x846c_a68b);
  h ^= h >> 16;
  h
}

/// Maps the high 24 bits to `[0.0, 1.0)`.
#[inline]
fn to_frac32(h: u32) -> f32 {
  (h >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Folds inputs into one word, rotating each by a distinct amount so
/// permuted arguments hash differently.
macro_rules! fold {
  ($a:expr) => { $a };
  ($a:expr, $b:expr) => { $a ^ $b.rotate_left(16) };
  ($a:expr, $b:expr, $c:expr) => { $a ^ $b.rotate_left(11) ^ $c.rotate_left(22) };
}

/// Emits the `uu`, `uf`, `iu` and `ii` variants for one arity.
macro_rules! define_hashes {
  ($($name:ident => ($($arg:ident),+);)+) => {
    $(
      paste::paste! {
        #[inline]
        pub fn [<$name uu32>]($($arg: u32),+) -> u32 {
          mix32(fold!($($arg),+))
        }

        #[inline]
        pub fn [<$name uf32>]($($arg: u32),+) -> f32 {
          to_frac32(mix32(fold!($($arg),+)))
        }

        #[inline]
        pub fn [<$name iu32>]($($arg: i32),+) -> u32 {
          mix32(fold!($($arg as u32),+))
        }

        #[inline]
        pub fn [<$name ii32>]($($arg: i32),+) -> i32 {
          mix32(fold!($($arg as u32),+)) as i32
        }
      }
    )+
  };
}

define_hashes! {
  hash11 => (a);
  hash21 => (a, b);
  hash31 => (a, b, c);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hash_deterministic() {
    assert_eq!(hash21uu32(7, 99), hash21uu32(7, 99));
    assert_ne!(hash21uu32(7, 99), hash21uu32(99, 7));
  }

  #[test]
  fn test_frac_in_unit_range() {
    for i in 0..1000 {
      let f = hash11uf32(i);
      assert!((0.0..1.0).contains(&f));
    }
  }

  #[test]
  fn test_side_bit_is_balanced() {
    let ones: u32 = (0..4096).map(|i| hash21uu32(3, i) & 1).sum();
    assert!((1536..2560).contains(&ones), "ones = {ones}");
  }
}
