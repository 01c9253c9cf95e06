//! Rotating file example
//!
//! Loads a JSON configuration with a small, compressed rotating file and
//! writes enough to roll it over a few times.
//!
//! Run with: cargo run --example rotating_file

use cqlog::prelude::*;

const CONFIG: &str = r#"{
    "version": 1,
    "formatters": {
        "plain": { "format": "{level} {timestamp} [{name}] {message}" }
    },
    "handlers": {
        "console": { "kind": "console", "formatter": "plain", "level": "WARNING" },
        "file": {
            "kind": "rotating-file",
            "formatter": "plain",
            "level": "DEBUG",
            "path": "logs/rotating_demo.log",
            "maxBytes": 4096,
            "backupCount": 3,
            "compress": true
        }
    },
    "root": { "level": "DEBUG", "handlers": ["console", "file"] }
}"#;

fn main() -> Result<()> {
    let config = LogConfig::from_json_str(CONFIG)?;
    let funnel = Funnel::start(config)?;
    let log = funnel.logger().child("demo");

    for i in 0..500 {
        log.debug(format!("filler line {:04}", i));
        if i % 100 == 0 {
            log.warning(format!("checkpoint {}", i));
        }
    }

    funnel.shutdown()?;
    println!("Check 'logs/' for rotating_demo.log and its compressed backups");
    Ok(())
}
