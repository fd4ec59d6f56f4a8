pub mod detection;
pub mod track;

pub use detection::Detection;
pub use track::Track;

use std::fmt;
use ndarray::prelude::*;

/// Appearance embedding of shape `(N,)`, `N` fixed by the upstream feature extractor.
pub type Vector = Array1<f32>;

/// Raw image buffer `(height, width, channels)`. Never interpreted by this crate.
pub type NpImage = Array3<u8>;

///
/// Box in format `[xmin, ymin, xmax, ymax]`, in whatever frame the caller
/// uses (usually pixels).
///
/// `xmin <= xmax` and `ymin <= ymax` is a precondition of every consumer;
/// it is never checked here.
///
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox([f32; 4]);

impl BBox {
    #[inline]
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        BBox([xmin, ymin, xmax, ymax])
    }

    #[inline]
    pub fn as_view(&self) -> ArrayView1<'_, f32> {
        aview1(&self.0)
    }

    #[inline]
    pub fn as_array(&self) -> &[f32; 4] {
        &self.0
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    #[inline]
    pub fn area(&self) -> f32 {
        (self.right() - self.left()) * (self.bottom() - self.top())
    }

    /// Intersection over union in `[0, 1]`; `0` when both boxes are degenerate.
    pub fn iou(&self, other: &BBox) -> f32 {
        let i_xmin = self.left().max(other.left());
        let i_ymin = self.top().max(other.top());
        let i_xmax = self.right().min(other.right());
        let i_ymax = self.bottom().min(other.bottom());

        let intersection_area = (i_xmax - i_xmin).max(0.0) * (i_ymax - i_ymin).max(0.0);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area <= 0.0 {
            return 0.0;
        }

        intersection_area / union_area
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_view(), f)
    }
}

impl From<[f32; 4]> for BBox {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        BBox(v)
    }
}

#[test]
fn bbox_display_uses_array_form() {
    let bbox = BBox::new(0.0, 0.0, 10.0, 10.0);

    assert_eq!(bbox.to_string(), "[0, 0, 10, 10]");
    assert_eq!(bbox.to_string(), format!("{}", aview1(&[0.0f32, 0.0, 10.0, 10.0])));
}

#[test]
fn bbox_reads_back() {
    let bbox = BBox::from([10.0, 20.0, 50.0, 100.0]);

    assert_eq!(bbox.as_array(), &[10.0, 20.0, 50.0, 100.0]);
    assert_eq!(bbox.left(), 10.0);
    assert_eq!(bbox.bottom(), 100.0);
    assert_eq!(bbox.area(), 3200.0);
}

#[test]
fn bbox_iou() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(5.0, 0.0, 15.0, 10.0);
    let far = BBox::new(20.0, 20.0, 30.0, 30.0);

    assert_eq!(a.iou(&a), 1.0);
    assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
    assert_eq!(a.iou(&far), 0.0);

    let point = BBox::new(1.0, 1.0, 1.0, 1.0);
    assert_eq!(point.iou(&point), 0.0);
}
