//! Generic 2D buffer used for chunk atoms and region pixels.
//!
//! # Coordinate System
//!
//! Surfaces share the world's Y+ up convention:
//! - **(0, 0)** is the bottom-left element
//! - data is row-major, row 0 is the bottom row (`y * width + x`)

use std::ops::{Index, IndexMut};

use crate::coords::Coord;
use crate::primitives::CoordRect;
use crate::render::Rgba;

// Region buffers are handed to renderers as raw bytes.
const _: () = assert!(std::mem::size_of::<Rgba>() == 4);

/// A 2D buffer of elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface<T> {
  data: Box<[T]>,
  width: u32,
  height: u32,
}

impl<T: Clone> Surface<T> {
  /// Creates a surface with every element set to `value`.
  pub fn filled(width: u32, height: u32, value: T) -> Self {
    let len = (width as usize) * (height as usize);
    Self {
      data: vec![value; len].into_boxed_slice(),
      width,
      height,
    }
  }

  /// Fills every element inside `rect` (clipped to the surface) with `value`.
  pub fn fill_rect(&mut self, rect: &CoordRect, value: T) {
    let Some(rect) = rect.intersection(&self.bounds()) else {
      return;
    };
    for y in rect.min.y..=rect.max.y {
      let row = y as usize * self.width as usize;
      let start = row + rect.min.x as usize;
      let end = row + rect.max.x as usize + 1;
      self.data[start..end].fill(value.clone());
    }
  }
}

impl<T: Clone + Default> Surface<T> {
  /// Creates a surface filled with the default value.
  pub fn new(width: u32, height: u32) -> Self {
    Self::filled(width, height, T::default())
  }
}

impl<T> Surface<T> {
  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Rect covering the whole surface.
  #[inline]
  pub fn bounds(&self) -> CoordRect {
    CoordRect::new(
      Coord::ZERO,
      Coord::new(self.width as i32 - 1, self.height as i32 - 1),
    )
  }

  #[inline]
  fn index_of(&self, at: Coord) -> Option<usize> {
    if at.x >= 0 && at.y >= 0 && (at.x as u32) < self.width && (at.y as u32) < self.height {
      Some(at.y as usize * self.width as usize + at.x as usize)
    } else {
      None
    }
  }

  /// Element at `at`, or `None` if out of bounds.
  #[inline]
  pub fn get(&self, at: Coord) -> Option<&T> {
    self.index_of(at).map(|i| &self.data[i])
  }

  #[inline]
  pub fn get_mut(&mut self, at: Coord) -> Option<&mut T> {
    self.index_of(at).map(|i| &mut self.data[i])
  }

  /// Sets the element at `at`. Returns `false` if out of bounds.
  #[inline]
  pub fn set(&mut self, at: Coord, value: T) -> bool {
    match self.index_of(at) {
      Some(i) => {
        self.data[i] = value;
        true
      }
      None => false,
    }
  }

  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }

  #[inline]
  pub fn as_slice_mut(&mut self) -> &mut [T] {
    &mut self.data
  }
}

impl Surface<Rgba> {
  /// Pixel data as bytes, ready for texture upload.
  pub fn as_bytes(&self) -> &[u8] {
    let len = self.data.len() * std::mem::size_of::<Rgba>();
    // SAFETY: Rgba is repr(C) with four u8 fields and no padding.
    unsafe { std::slice::from_raw_parts(self.data.as_ptr() as *const u8, len) }
  }
}

impl<T> Index<Coord> for Surface<T> {
  type Output = T;

  #[inline]
  fn index(&self, at: Coord) -> &Self::Output {
    &self.data[at.y as usize * self.width as usize + at.x as usize]
  }
}

impl<T> IndexMut<Coord> for Surface<T> {
  #[inline]
  fn index_mut(&mut self, at: Coord) -> &mut Self::Output {
    &mut self.data[at.y as usize * self.width as usize + at.x as usize]
  }
}
