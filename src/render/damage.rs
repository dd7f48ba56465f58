use crate::foundation::core::Rect;

/// Screen area that must be repainted on the next flush.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// Union bounding box of every change, in screen px.
    Rect(Rect),
    Full,
}

impl DamageRegion {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn add_rect(&mut self, r: Rect) {
        if !(r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()) {
            *self = Self::Full;
            return;
        }
        let r = r.abs();
        if r.width() <= 0.0 && r.height() <= 0.0 {
            return;
        }
        *self = match *self {
            Self::None => Self::Rect(r),
            Self::Rect(cur) => Self::Rect(cur.union(r)),
            Self::Full => Self::Full,
        };
    }

    pub fn add_full(&mut self) {
        *self = Self::Full;
    }

    pub fn merge(&mut self, other: &Self) {
        match *other {
            Self::None => {}
            Self::Rect(r) => self.add_rect(r),
            Self::Full => self.add_full(),
        }
    }

    /// Integer pixel box covering the damage (grown by `pad` px for anti-aliasing), clamped to
    /// the output. `None` when there is no damage or it misses the output entirely.
    pub fn pixel_rect(&self, width: u32, height: u32, pad: f64) -> Option<PixelRect> {
        let r = match *self {
            Self::None => return None,
            Self::Full => return Some(PixelRect::full(width, height)).filter(|p| p.area() > 0),
            Self::Rect(r) => r,
        };
        let x0 = (r.x0 - pad).floor().clamp(0.0, f64::from(width)) as u32;
        let y0 = (r.y0 - pad).floor().clamp(0.0, f64::from(height)) as u32;
        let x1 = (r.x1 + pad).ceil().clamp(0.0, f64::from(width)) as u32;
        let y1 = (r.y1 + pad).ceil().clamp(0.0, f64::from(height)) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect { x0, y0, x1, y1 })
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}
