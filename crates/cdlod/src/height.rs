//! Height sources feeding the quadtree's min/max bounds.

use crate::error::{CdlodError, Result};

/// Trait for anything that can report the height interval of a grid region.
///
/// [`crate::QuadTree::build_par`] additionally requires `Sync`. Heights are
/// normalized to [-1, 1].
pub trait HeightSource {
  /// Number of samples along grid x.
  fn width(&self) -> u32;

  /// Number of samples along grid y.
  fn height(&self) -> u32;

  /// Min and max height over `size_x * size_y` samples starting at `(x, y)`.
  ///
  /// The region is clipped to the field. An empty region yields
  /// `(f32::INFINITY, f32::NEG_INFINITY)`.
  fn area_min_max(&self, x: u32, y: u32, size_x: u32, size_y: u32) -> (f32, f32);
}

impl<T: HeightSource + ?Sized> HeightSource for &T {
  fn width(&self) -> u32 {
    (**self).width()
  }

  fn height(&self) -> u32 {
    (**self).height()
  }

  fn area_min_max(&self, x: u32, y: u32, size_x: u32, size_y: u32) -> (f32, f32) {
    (**self).area_min_max(x, y, size_x, size_y)
  }
}

impl<T: HeightSource + ?Sized> HeightSource for Box<T> {
  fn width(&self) -> u32 {
    (**self).width()
  }

  fn height(&self) -> u32 {
    (**self).height()
  }

  fn area_min_max(&self, x: u32, y: u32, size_x: u32, size_y: u32) -> (f32, f32) {
    (**self).area_min_max(x, y, size_x, size_y)
  }
}

/// Row-major array of normalized height samples.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
  width: u32,
  height: u32,
  samples: Vec<f32>,
}

impl HeightMap {
  /// Wrap `width * height` row-major samples, clamping each to [-1, 1].
  pub fn new(width: u32, height: u32, mut samples: Vec<f32>) -> Result<Self> {
    let expected = width as usize * height as usize;
    if samples.len() != expected {
      return Err(CdlodError::HeightMapSizeMismatch {
        expected,
        got: samples.len(),
      });
    }
    for sample in &mut samples {
      *sample = sample.clamp(-1.0, 1.0);
    }
    Ok(Self {
      width,
      height,
      samples,
    })
  }

  /// Fill a map by evaluating `f(x, y)` at every sample.
  pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
    let mut samples = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
      for x in 0..width {
        samples.push(f(x, y).clamp(-1.0, 1.0));
      }
    }
    Self {
      width,
      height,
      samples,
    }
  }

  /// A map with every sample at `value`.
  pub fn flat(width: u32, height: u32, value: f32) -> Self {
    Self::from_fn(width, height, |_, _| value)
  }

  /// Height at `(x, y)`, or `None` outside the map.
  #[inline]
  pub fn sample(&self, x: u32, y: u32) -> Option<f32> {
    if x < self.width && y < self.height {
      Some(self.samples[y as usize * self.width as usize + x as usize])
    } else {
      None
    }
  }

  /// Raw row-major samples.
  pub fn samples(&self) -> &[f32] {
    &self.samples
  }

  /// Map 16-bit grayscale pixels from [0, 65535] to [-1, 1].
  #[cfg(feature = "image")]
  pub fn from_luma16(image: &image::ImageBuffer<image::Luma<u16>, Vec<u16>>) -> Self {
    let (width, height) = image.dimensions();
    Self::from_fn(width, height, |x, y| {
      image.get_pixel(x, y).0[0] as f32 / u16::MAX as f32 * 2.0 - 1.0
    })
  }

  /// Load a height map from any image format the `image` crate can decode.
  #[cfg(feature = "image")]
  pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
    let image = image::open(path)?.into_luma16();
    Ok(Self::from_luma16(&image))
  }
}

impl HeightSource for HeightMap {
  fn width(&self) -> u32 {
    self.width
  }

  fn height(&self) -> u32 {
    self.height
  }

  fn area_min_max(&self, x: u32, y: u32, size_x: u32, size_y: u32) -> (f32, f32) {
    let x_end = x.saturating_add(size_x).min(self.width);
    let y_end = y.saturating_add(size_y).min(self.height);

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    if x >= x_end {
      return (min, max);
    }
    for row in y..y_end {
      let start = row as usize * self.width as usize;
      for &sample in &self.samples[start + x as usize..start + x_end as usize] {
        min = min.min(sample);
        max = max.max(sample);
      }
    }
    (min, max)
  }
}

#[cfg(test)]
#[path = "height_test.rs"]
mod height_test;
