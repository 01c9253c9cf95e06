//! Integration tests for the log funnel
//!
//! These tests verify:
//! - Exactly-once delivery from many producer threads
//! - Per-producer ordering and non-interleaved lines
//! - Child logger names and hierarchical handler lookup
//! - Per-handler thresholds
//! - Fail-fast configuration
//! - Direct (non-concurrent) mode

use cqlog::{
    init_log, Funnel, FormatterConfig, HandlerConfig, LogConfig, LogLevel, LoggerConfig,
    LoggerError, RootConfig,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn file_handler(path: &Path, level: LogLevel) -> HandlerConfig {
    HandlerConfig::RotatingFile {
        formatter: "plain".to_string(),
        level,
        path: path.to_path_buf(),
        max_bytes: 0,
        backup_count: 0,
        compress: false,
    }
}

/// One file handler on the root, lines rendered as `name|LEVEL|message`
fn file_config(path: &Path, level: LogLevel) -> LogConfig {
    LogConfig {
        version: 1,
        formatters: BTreeMap::from([(
            "plain".to_string(),
            FormatterConfig {
                format: "{name}|{level}|{message}".to_string(),
                datefmt: "%H:%M:%S".to_string(),
            },
        )]),
        handlers: BTreeMap::from([("file".to_string(), file_handler(path, level))]),
        root: RootConfig {
            level: LogLevel::Debug,
            handlers: vec!["file".to_string()],
        },
        loggers: BTreeMap::new(),
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(String::from)
        .collect()
}

fn temp_log(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

#[test]
fn test_concurrent_producers_exactly_once() {
    let (_dir, path) = temp_log("funnel.log");
    let funnel = Funnel::start(file_config(&path, LogLevel::Debug)).expect("funnel");

    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 250;

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let log = funnel.logger().child(format!("p{}", p));
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    log.info(format!("{}", i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = funnel.shutdown().expect("shutdown");
    assert_eq!(metrics.enqueued(), (PRODUCERS * PER_PRODUCER) as u64);
    assert_eq!(metrics.dispatched(), metrics.enqueued());
    assert_eq!(metrics.backlog(), 0);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), PRODUCERS * PER_PRODUCER);

    // every line is whole and each producer's lines keep their order
    let mut next: HashMap<String, usize> = HashMap::new();
    for line in &lines {
        let parts: Vec<&str> = line.split('|').collect();
        assert_eq!(parts.len(), 3, "interleaved line: {:?}", line);
        assert_eq!(parts[1], "INFO");
        let seq: usize = parts[2].parse().expect("sequence number");
        let expected = next.entry(parts[0].to_string()).or_insert(0);
        assert_eq!(seq, *expected, "out of order for {}", parts[0]);
        *expected += 1;
    }
    assert_eq!(next.len(), PRODUCERS);
    assert!(next.values().all(|&n| n == PER_PRODUCER));
}

#[test]
fn test_child_and_root_names() {
    let (_dir, path) = temp_log("names.log");
    let funnel = Funnel::start(file_config(&path, LogLevel::Debug)).unwrap();

    let root = funnel.logger().clone();
    root.warning("from root");
    root.child("db").error("from db");
    root.child("db").child("db.pool").debug("from pool");

    funnel.shutdown().unwrap();
    assert_eq!(
        read_lines(&path),
        vec![
            "root|WARNING|from root",
            "db|ERROR|from db",
            "db.pool|DEBUG|from pool"
        ]
    );
}

#[test]
fn test_unknown_operation_enqueues_nothing() {
    let (_dir, path) = temp_log("emit.log");
    let funnel = Funnel::start(file_config(&path, LogLevel::Debug)).unwrap();
    let log = funnel.logger().child("jobs");

    let err = log.emit("trace", "nope").unwrap_err();
    assert!(matches!(err, LoggerError::UnknownCapability { ref name } if name == "trace"));
    assert!(log.emit("_info", "nope").is_err());
    log.emit("critical", "yes").unwrap();

    let metrics = funnel.shutdown().unwrap();
    assert_eq!(metrics.enqueued(), 1);
    assert_eq!(read_lines(&path), vec!["jobs|CRITICAL|yes"]);
}

#[test]
fn test_shutdown_drains_queue() {
    let (_dir, path) = temp_log("drain.log");
    let funnel = Funnel::builder()
        .config(file_config(&path, LogLevel::Debug))
        .bounded(16)
        .start()
        .unwrap();

    let log = funnel.logger().clone();
    for i in 0..1_000 {
        log.debug(format!("{}", i));
    }
    funnel.shutdown().unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1_000);
    assert_eq!(lines.last().map(String::as_str), Some("root|DEBUG|999"));
}

#[test]
fn test_handler_thresholds_are_independent() {
    let dir = TempDir::new().unwrap();
    let verbose = dir.path().join("verbose.log");
    let errors = dir.path().join("errors.log");

    let mut config = file_config(&verbose, LogLevel::Debug);
    config
        .handlers
        .insert("errors".to_string(), file_handler(&errors, LogLevel::Error));
    config.root.handlers.push("errors".to_string());

    let funnel = Funnel::start(config).unwrap();
    let log = funnel.logger().clone();
    log.debug("d");
    log.info("i");
    log.error("e");
    log.critical("c");
    funnel.shutdown().unwrap();

    assert_eq!(read_lines(&verbose).len(), 4);
    assert_eq!(read_lines(&errors), vec!["root|ERROR|e", "root|CRITICAL|c"]);
}

#[test]
fn test_hierarchy_and_propagation() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.log");
    let db = dir.path().join("db.log");
    let audit = dir.path().join("audit.log");

    let mut config = file_config(&main, LogLevel::Debug);
    config
        .handlers
        .insert("db".to_string(), file_handler(&db, LogLevel::Debug));
    config
        .handlers
        .insert("audit".to_string(), file_handler(&audit, LogLevel::Debug));
    config.loggers.insert(
        "db".to_string(),
        LoggerConfig {
            handlers: vec!["db".to_string()],
            ..LoggerConfig::default()
        },
    );
    config.loggers.insert(
        "audit".to_string(),
        LoggerConfig {
            handlers: vec!["audit".to_string()],
            propagate: false,
            ..LoggerConfig::default()
        },
    );

    let funnel = Funnel::start(config).unwrap();
    let log = funnel.logger().clone();
    log.child("db.pool").info("pooled");
    log.child("audit").info("secret");
    log.child("web").info("request");
    funnel.shutdown().unwrap();

    assert_eq!(read_lines(&db), vec!["db.pool|INFO|pooled"]);
    assert_eq!(read_lines(&audit), vec!["audit|INFO|secret"]);
    assert_eq!(read_lines(&main), vec!["db.pool|INFO|pooled", "web|INFO|request"]);
}

#[test]
fn test_configuration_error_fails_fast() {
    let (_dir, path) = temp_log("bad.log");
    let mut config = file_config(&path, LogLevel::Debug);
    config.root.handlers.push("nowhere".to_string());

    let err = Funnel::start(config.clone()).err().expect("must fail");
    assert!(err.is_config());
    assert!(init_log(true, Some(config.clone())).is_err());
    assert!(init_log(false, Some(config)).is_err());
}

#[test]
fn test_bad_template_fails_fast() {
    let (_dir, path) = temp_log("template.log");
    let mut config = file_config(&path, LogLevel::Debug);
    config.formatters.insert(
        "plain".to_string(),
        FormatterConfig {
            format: "{level} {thread}".to_string(),
            datefmt: "%H".to_string(),
        },
    );

    let err = Funnel::start(config).err().expect("must fail");
    assert!(err.to_string().contains("formatters.plain"), "{}", err);
}

#[test]
fn test_json_configuration() {
    let (_dir, path) = temp_log("json.log");
    let json = serde_json::json!({
        "version": 1,
        "formatters": { "plain": { "format": "{level}:{message}" } },
        "handlers": {
            "file": {
                "kind": "rotating-file",
                "formatter": "plain",
                "level": "INFO",
                "path": path,
                "maxBytes": 1024,
                "backupCount": 2
            }
        },
        "root": { "handlers": ["file"] }
    });
    let config = LogConfig::from_json_str(&json.to_string()).unwrap();

    let funnel = Funnel::start(config).unwrap();
    funnel.logger().debug("dropped by threshold");
    funnel.logger().info("kept");
    funnel.shutdown().unwrap();

    assert_eq!(read_lines(&path), vec!["INFO:kept"]);
}

#[test]
fn test_init_log_concurrent_writes_everything_before_shutdown_returns() {
    let (_dir, path) = temp_log("init.log");
    let log = init_log(true, Some(file_config(&path, LogLevel::Debug))).unwrap();
    assert!(log.is_concurrent());

    let handles: Vec<_> = (0..4)
        .map(|p| {
            let log = log.child(format!("w{}", p));
            thread::spawn(move || {
                for i in 0..5_000 {
                    log.info(format!("{}", i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    log.shutdown();
    assert_eq!(read_lines(&path).len(), 20_000);
}

#[test]
fn test_init_log_concurrent_drains_when_handles_dropped() {
    let (_dir, path) = temp_log("dropped.log");
    let log = init_log(true, Some(file_config(&path, LogLevel::Debug))).unwrap();
    let child = log.child("svc");

    for i in 0..10_000 {
        child.debug(format!("{}", i));
    }
    drop(log);
    drop(child);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 10_000);
    assert_eq!(lines.last().map(String::as_str), Some("svc|DEBUG|9999"));
}

#[test]
fn test_direct_mode() {
    let (_dir, path) = temp_log("direct.log");
    let mut config = file_config(&path, LogLevel::Debug);
    config.loggers.insert(
        "quiet".to_string(),
        LoggerConfig {
            level: Some(LogLevel::Error),
            ..LoggerConfig::default()
        },
    );

    let log = init_log(false, Some(config)).unwrap();
    assert!(!log.is_concurrent());
    log.info("root info");
    log.child("quiet").warning("suppressed by logger level");
    log.child("quiet.inner").error("inherits quiet's level");
    log.shutdown();

    assert_eq!(
        read_lines(&path),
        vec!["root|INFO|root info", "quiet.inner|ERROR|inherits quiet's level"]
    );
}

#[test]
fn test_missing_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("app.log");

    let funnel = Funnel::start(file_config(&path, LogLevel::Debug)).unwrap();
    funnel.logger().info("hello");
    funnel.shutdown().unwrap();

    assert_eq!(read_lines(&path), vec!["root|INFO|hello"]);
}
