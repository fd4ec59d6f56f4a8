use motpy_core::logger::{global_sink_level, LoggerRegistry};
use motpy_core::{setup_logger, BBox, Detection, Error, LoggerConfig, Severity, Track, DEFAULT_ENVVAR};
use ndarray::prelude::*;

fn detections() -> Vec<Detection> {
    vec![
        Detection::new(BBox::new(0.0, 0.0, 10.0, 10.0))
            .with_score(0.9)
            .with_class_id(2)
            .with_cls("car")
            .with_feature(arr1(&[0.1, 0.2])),
        Detection::new(BBox::new(20.0, 5.0, 30.0, 25.0))
            .with_score(0.4)
            .with_bbox_3d(arr1(&[1.0, 2.0, 3.0, 0.5, 0.5, 1.5, 0.0])),
    ]
}

#[test]
fn tracks_are_owned_snapshots() {
    let dets = detections();
    let tracks: Vec<Track> = dets
        .iter()
        .enumerate()
        .map(|(i, det)| Track::from_detection(format!("t{}", i), det))
        .collect();

    drop(dets);

    assert_eq!(tracks[0].id, "t0");
    assert_eq!(tracks[0].cls.as_deref(), Some("car"));
    assert_eq!(tracks[0].class_id, Some(2));
    assert!(tracks[0].bbox_3d.is_none());

    assert_eq!(tracks[1].score, Some(0.4));
    assert_eq!(tracks[1].class_id, None);
    assert_eq!(tracks[1].bbox_3d.as_ref().map(|b| b.len()), Some(7));
}

#[test]
fn detection_repr_matches_contract() {
    let dets = detections();
    let det = &dets[0];

    assert_eq!(
        det.to_string(),
        "Detection(box=[0, 0, 10, 10], score=0.90000, class_id=2, feature=[0.1, 0.2])"
    );
    assert_eq!(format!("{:?}", det), det.to_string());
}

#[test]
fn global_setup_logger() {
    let logger = setup_logger("data_contract.worker", Some("DEBUG"), false, DEFAULT_ENVVAR).unwrap();
    assert_eq!(logger.level(), Severity::Debug);
    assert_eq!(logger.name(), "data_contract.worker");

    let same = LoggerRegistry::global().get("data_contract.worker").unwrap();
    assert!(std::sync::Arc::ptr_eq(&logger, &same));

    let err = setup_logger("data_contract.bad", Some("NOT_A_LEVEL"), false, DEFAULT_ENVVAR).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(LoggerRegistry::global().get("data_contract.bad").is_none());
}

#[test]
fn main_sink_installs_once() {
    let main = setup_logger("data_contract.main", Some("WARNING"), true, DEFAULT_ENVVAR).unwrap();
    assert_eq!(global_sink_level(), Some(Severity::Warning));

    let again = setup_logger("data_contract.main", Some("ERROR"), true, DEFAULT_ENVVAR).unwrap();
    assert_eq!(global_sink_level(), Some(Severity::Warning));
    assert_eq!(again.level(), Severity::Error);
    assert!(std::sync::Arc::ptr_eq(&main, &again));

    main.error("reaches stdout");
    main.info("filtered by the logger threshold");
}

#[test]
fn level_from_process_environment() {
    std::env::set_var("MOTPY_CORE_DATA_CONTRACT_LEVEL", "ERROR");
    let logger = setup_logger("data_contract.env", None, false, "MOTPY_CORE_DATA_CONTRACT_LEVEL").unwrap();
    assert_eq!(logger.level(), Severity::Error);

    let registry = LoggerRegistry::new();

    let config = LoggerConfig::new("data_contract.unset").with_envvar_name("MOTPY_CORE_DATA_CONTRACT_UNSET");
    assert_eq!(registry.setup(&config).unwrap().level(), Severity::Info);

    std::env::set_var("MOTPY_CORE_DATA_CONTRACT_BAD", "LOUD");
    let config = LoggerConfig::new("data_contract.bad_env").with_envvar_name("MOTPY_CORE_DATA_CONTRACT_BAD");
    assert!(matches!(registry.setup(&config), Err(Error::InvalidArgument(_))));
    assert!(registry.is_empty());
}
