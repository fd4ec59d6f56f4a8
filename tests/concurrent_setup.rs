use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use motpy_core::logger::global_sink_level;
use motpy_core::{setup_logger, LoggerConfig, LoggerRegistry, Severity, DEFAULT_ENVVAR};

const ENVVAR: &str = "MOTPY_CORE_CONCURRENT_LEVEL";

#[test]
fn mixed_setup_paths_with_debug_sink() {
    setup_logger("concurrent.main", Some("DEBUG"), true, DEFAULT_ENVVAR).unwrap();
    assert_eq!(global_sink_level(), Some(Severity::Debug));

    std::env::set_var(ENVVAR, "DEBUG");

    let (tx, rx) = mpsc::channel();

    let from_env = tx.clone();
    thread::spawn(move || {
        for i in 0..300 {
            setup_logger(&format!("a{}", i), None, false, ENVVAR).unwrap();
        }
        from_env.send("env").unwrap();
    });

    let explicit = tx.clone();
    thread::spawn(move || {
        for i in 0..300 {
            setup_logger(&format!("c{}", i), Some("DEBUG"), false, DEFAULT_ENVVAR).unwrap();
        }
        explicit.send("explicit").unwrap();
    });

    thread::spawn(move || {
        for i in 0..300 {
            let config = LoggerConfig::new(format!("b{}", i)).with_level("DEBUG");
            LoggerRegistry::global()
                .setup_with_env(&config, |_| None, &mut Vec::new())
                .unwrap();
        }
        tx.send("injected").unwrap();
    });

    for _ in 0..3 {
        rx.recv_timeout(Duration::from_secs(60)).expect("setup threads stalled");
    }

    let registry = LoggerRegistry::global();
    for name in ["a299", "b299", "c299"].iter() {
        assert_eq!(registry.get(name).map(|l| l.level()), Some(Severity::Debug));
    }
}
