use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};

/// Rectangle covered by a raster. `max_*` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of a `width x height` grid anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> u32 {
        (self.max_x as i64 - self.min_x as i64).clamp(0, u32::MAX as i64) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y as i64 - self.min_y as i64).clamp(0, u32::MAX as i64) as u32
    }

    /// Two rasters are comparable when their extents match; origins may differ.
    pub fn same_size(&self, other: &Bounds) -> bool {
        self.width() == other.width() && self.height() == other.height()
    }
}

/// Random-access pixel source handed to the comparators.
///
/// Pixels come out alpha-premultiplied with 16 bits per channel and are
/// addressed in the raster's own (absolute) coordinate space.
pub trait Raster {
    fn bounds(&self) -> Bounds;

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4];

    /// Normalized pixel at an offset relative to this raster's origin.
    ///
    /// `dx < width` and `dy < height` keep the absolute coordinate inside
    /// `bounds()`.
    fn pixel_at(&self, dx: u32, dy: u32) -> Rgba<u8> {
        let b = self.bounds();
        normalize(self.rgba64_at(
            b.min_x.wrapping_add(dx as i32),
            b.min_y.wrapping_add(dy as i32),
        ))
    }
}

/// Premultiplied 16-bit RGBA -> 8-bit RGBA by integer division by 257.
///
/// Colour channels stay premultiplied, so translucent pixels darken; opaque
/// pixels survive a round trip through [`premultiply`] unchanged.
pub fn normalize([r, g, b, a]: [u16; 4]) -> Rgba<u8> {
    let narrow = |c: u16| (c / 0x101) as u8;
    Rgba([narrow(r), narrow(g), narrow(b), narrow(a)])
}

/// Straight 8-bit RGBA -> premultiplied 16-bit RGBA.
pub fn premultiply(Rgba([r, g, b, a]): Rgba<u8>) -> [u16; 4] {
    let a = a as u32;
    let scale = |c: u8| ((c as u32 * 0x101 * a) / 0xff) as u16;
    [scale(r), scale(g), scale(b), (a * 0x101) as u16]
}

fn premultiply16(Rgba([r, g, b, a]): Rgba<u16>) -> [u16; 4] {
    let a32 = a as u32;
    let scale = |c: u16| ((c as u32 * a32) / 0xffff) as u16;
    [scale(r), scale(g), scale(b), a]
}

impl Raster for RgbaImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4] {
        premultiply(*self.get_pixel(x as u32, y as u32))
    }
}

impl Raster for ImageBuffer<Rgba<u16>, Vec<u16>> {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4] {
        premultiply16(*self.get_pixel(x as u32, y as u32))
    }
}

impl Raster for DynamicImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4] {
        match self {
            DynamicImage::ImageRgba8(buf) => buf.rgba64_at(x, y),
            DynamicImage::ImageRgba16(buf) => buf.rgba64_at(x, y),
            other => premultiply(other.get_pixel(x as u32, y as u32)),
        }
    }
}

impl<R: Raster + ?Sized> Raster for &R {
    fn bounds(&self) -> Bounds {
        (**self).bounds()
    }

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4] {
        (**self).rgba64_at(x, y)
    }
}

/// A raster re-anchored so that its top-left pixel sits at `origin`.
pub struct Placed<R> {
    inner: R,
    origin: (i32, i32),
}

impl<R: Raster> Placed<R> {
    /// `None` when the far edge of the raster would not fit in `i32`.
    pub fn new(inner: R, origin_x: i32, origin_y: i32) -> Option<Self> {
        let b = inner.bounds();
        origin_x.checked_add_unsigned(b.width())?;
        origin_y.checked_add_unsigned(b.height())?;
        Some(Self {
            inner,
            origin: (origin_x, origin_y),
        })
    }
}

impl<R: Raster> Raster for Placed<R> {
    fn bounds(&self) -> Bounds {
        let b = self.inner.bounds();
        let (ox, oy) = self.origin;
        // In range: checked by `Placed::new`.
        Bounds::new(
            ox,
            oy,
            ox.wrapping_add_unsigned(b.width()),
            oy.wrapping_add_unsigned(b.height()),
        )
    }

    fn rgba64_at(&self, x: i32, y: i32) -> [u16; 4] {
        let b = self.inner.bounds();
        let (ox, oy) = self.origin;
        self.inner.rgba64_at(x - ox + b.min_x, y - oy + b.min_y)
    }
}
