use motpy_core::{setup_logger, BBox, Detection, Track, DEFAULT_ENVVAR};
use ndarray::prelude::*;

const NAMES: [&str; 3] = ["person", "bicycle", "car"];

fn main() -> anyhow::Result<()> {
    let logger = setup_logger("track_dump", None, true, DEFAULT_ENVVAR)?;

    let frame: Vec<Detection> = (0..3)
        .map(|i| {
            let x = i as f32 * 40.0;

            Detection::new(BBox::new(x, 10.0, x + 32.0, 74.0))
                .with_score(0.6 + 0.1 * i as f32)
                .with_class_id(i as i64)
                .with_cls(NAMES[i])
                .with_feature(Array1::from_elem(4, 0.5))
        })
        .collect();

    for det in &frame {
        logger.debug(det);
    }

    let tracks: Vec<Track> = frame
        .iter()
        .enumerate()
        .map(|(i, det)| Track::from_detection(format!("{:04}", i), det))
        .collect();

    for track in &tracks {
        logger.info(format!(
            "track {} {} score={:.2} cls={}",
            track.id,
            track.bbox,
            track.score.unwrap_or(f32::NAN),
            track.cls.as_deref().unwrap_or("-"),
        ));
    }

    Ok(())
}
