use std::fmt;
use ndarray::prelude::*;
use crate::mot::{BBox, Vector};

///
/// One candidate object observed in a single frame.
///
/// Parameters
///
/// bbox : BBox in format `(xmin, ymin, xmax, ymax)`. The only required field.
/// score : Option<f32> - Detector confidence, usually in `[0, 1]` but never checked.
/// class_id : Option<i64> - Category index.
/// cls : Option<String> - Category name, independent of `class_id`.
/// feature : Option<Vector> - Appearance embedding used for association.
/// seg_mask : Option<Array2<f32>> - Per-pixel mask aligned to `bbox`.
/// points_3d, position, bbox_3d, bbox_2d : alternate geometry, each optional.
///
/// Absent values are `None`; a zeroed array is a present value.
///
#[derive(Clone, PartialEq)]
pub struct Detection {
    pub bbox: BBox,
    pub score: Option<f32>,
    pub class_id: Option<i64>,
    pub feature: Option<Vector>,
    pub cls: Option<String>,
    pub seg_mask: Option<Array2<f32>>,
    pub points_3d: Option<Array2<f32>>,
    pub position: Option<Array1<f32>>,
    pub bbox_3d: Option<Array1<f32>>,
    pub bbox_2d: Option<Array1<f32>>,
}

impl Detection {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            score: None,
            class_id: None,
            feature: None,
            cls: None,
            seg_mask: None,
            points_3d: None,
            position: None,
            bbox_3d: None,
            bbox_2d: None,
        }
    }

    #[inline]
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    #[inline]
    pub fn with_class_id(mut self, class_id: i64) -> Self {
        self.class_id = Some(class_id);
        self
    }

    #[inline]
    pub fn with_feature(mut self, feature: Vector) -> Self {
        self.feature = Some(feature);
        self
    }

    #[inline]
    pub fn with_cls<S: Into<String>>(mut self, cls: S) -> Self {
        self.cls = Some(cls.into());
        self
    }

    #[inline]
    pub fn with_seg_mask(mut self, seg_mask: Array2<f32>) -> Self {
        self.seg_mask = Some(seg_mask);
        self
    }

    #[inline]
    pub fn with_points_3d(mut self, points_3d: Array2<f32>) -> Self {
        self.points_3d = Some(points_3d);
        self
    }

    #[inline]
    pub fn with_position(mut self, position: Array1<f32>) -> Self {
        self.position = Some(position);
        self
    }

    #[inline]
    pub fn with_bbox_3d(mut self, bbox_3d: Array1<f32>) -> Self {
        self.bbox_3d = Some(bbox_3d);
        self
    }

    #[inline]
    pub fn with_bbox_2d(mut self, bbox_2d: Array1<f32>) -> Self {
        self.bbox_2d = Some(bbox_2d);
        self
    }
}

struct OrNone<'a, T>(&'a Option<T>);

impl<'a, T: fmt::Display> fmt::Display for OrNone<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("None"),
        }
    }
}

// A missing score renders as `NaN`.
impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detection(box={}, score={:.5}, class_id={}, feature={})",
            self.bbox,
            self.score.unwrap_or(f32::NAN),
            OrNone(&self.class_id),
            OrNone(&self.feature),
        )
    }
}

impl fmt::Debug for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[test]
fn detection_defaults_to_absent() {
    let bbox = BBox::new(1.0, 2.0, 3.0, 4.0);
    let det = Detection::new(bbox);

    assert_eq!(det.bbox, bbox);
    assert_eq!(det.score, None);
    assert_eq!(det.class_id, None);
    assert_eq!(det.feature, None);
    assert_eq!(det.cls, None);
    assert_eq!(det.seg_mask, None);
    assert_eq!(det.points_3d, None);
    assert_eq!(det.position, None);
    assert_eq!(det.bbox_3d, None);
    assert_eq!(det.bbox_2d, None);
}

#[test]
fn detection_repr() {
    let det = Detection::new(BBox::new(0.0, 0.0, 10.0, 10.0))
        .with_score(0.5)
        .with_class_id(3)
        .with_feature(arr1(&[0.1, 0.2]));

    let expected = "Detection(box=[0, 0, 10, 10], score=0.50000, class_id=3, feature=[0.1, 0.2])";

    assert_eq!(format!("{}", det), expected);
    assert_eq!(format!("{:?}", det), expected);
}

#[test]
fn detection_repr_without_optionals() {
    let det = Detection::new(BBox::new(0.0, 0.0, 10.0, 10.0));

    assert_eq!(
        det.to_string(),
        "Detection(box=[0, 0, 10, 10], score=NaN, class_id=None, feature=None)"
    );
    assert_eq!(format!("{:?}", det), det.to_string());
}

#[test]
fn zeroed_geometry_is_not_absent() {
    let det = Detection::new(BBox::new(0.0, 0.0, 1.0, 1.0))
        .with_points_3d(Array2::zeros((4, 3)))
        .with_cls("car");

    assert_eq!(det.points_3d, Some(Array2::zeros((4, 3))));
    assert_eq!(det.position, None);
    assert_eq!(det.cls.as_deref(), Some("car"));
    assert_eq!(det.class_id, None);
}
