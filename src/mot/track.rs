use ndarray::prelude::*;
use crate::mot::{BBox, Detection};

///
///     The state of one tracked object as emitted by a tracker.
///
///     Fields keep the order `id, bbox, score, class_id, cls, points_3d,
///     position, bbox_3d, bbox_2d`. Every field is present on every track;
///     anything a tracker cannot estimate is `None`.
///
///     Attributes
///     ----------
///     id : String
///         Stable identity of the track across frames.
///     bbox : BBox
///         Current estimated box, same layout as `Detection::bbox`.
///     score : Option<f32>
///         Current confidence.
///     class_id, cls :
///         Category index and name.
///     points_3d, position, bbox_3d, bbox_2d :
///         Alternate geometry passed through from detections or estimated.
///
///     A track is an owned snapshot; it never borrows tracker internals.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub bbox: BBox,
    pub score: Option<f32>,
    pub class_id: Option<i64>,
    pub cls: Option<String>,
    pub points_3d: Option<Array2<f32>>,
    pub position: Option<Array1<f32>>,
    pub bbox_3d: Option<Array1<f32>>,
    pub bbox_2d: Option<Array1<f32>>,
}

impl Track {
    /// Builds a track that carries the detection's fields through unchanged.
    /// The appearance feature and the mask are not part of a track.
    pub fn from_detection<I: Into<String>>(id: I, detection: &Detection) -> Self {
        Self {
            id: id.into(),
            bbox: detection.bbox,
            score: detection.score,
            class_id: detection.class_id,
            cls: detection.cls.clone(),
            points_3d: detection.points_3d.clone(),
            position: detection.position.clone(),
            bbox_3d: detection.bbox_3d.clone(),
            bbox_2d: detection.bbox_2d.clone(),
        }
    }
}

#[test]
fn track_preserves_fields() {
    let track = Track {
        id: "t1".to_string(),
        bbox: BBox::new(0.0, 0.0, 5.0, 5.0),
        score: Some(0.9),
        class_id: Some(2),
        cls: Some("car".to_string()),
        points_3d: None,
        position: None,
        bbox_3d: None,
        bbox_2d: None,
    };

    let snapshot = track.clone();

    assert_eq!(snapshot.id, "t1");
    assert_eq!(snapshot.bbox.as_array(), &[0.0, 0.0, 5.0, 5.0]);
    assert_eq!(snapshot.score, Some(0.9));
    assert_eq!(snapshot.class_id, Some(2));
    assert_eq!(snapshot.cls.as_deref(), Some("car"));
    assert!(snapshot.points_3d.is_none());
    assert!(snapshot.position.is_none());
    assert!(snapshot.bbox_3d.is_none());
    assert!(snapshot.bbox_2d.is_none());
    assert_eq!(snapshot, track);
}

#[test]
fn track_from_detection() {
    let det = Detection::new(BBox::new(1.0, 1.0, 4.0, 6.0))
        .with_score(0.75)
        .with_cls("person")
        .with_feature(arr1(&[1.0, 0.0]))
        .with_position(arr1(&[0.0, 0.0, 0.0]));

    let track = Track::from_detection("7", &det);

    assert_eq!(track.id, "7");
    assert_eq!(track.bbox, det.bbox);
    assert_eq!(track.score, Some(0.75));
    assert_eq!(track.class_id, None);
    assert_eq!(track.cls.as_deref(), Some("person"));
    assert_eq!(track.position, Some(arr1(&[0.0, 0.0, 0.0])));
    assert!(track.points_3d.is_none());
    assert!(track.bbox_2d.is_none());
}
