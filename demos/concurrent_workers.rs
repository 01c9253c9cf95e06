//! Concurrent workers example
//!
//! Ten worker threads log at every level once per second through one shared
//! funnel. Pass `--direct` to log synchronously from a single thread instead.
//!
//! Run with: cargo run --example concurrent_workers [-- --direct]

use cqlog::prelude::*;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 10;
const ROUNDS: usize = 5;

fn work(log: Logger) {
    let me = thread::current();
    let who = me.name().unwrap_or("main");
    for _ in 0..ROUNDS {
        log.debug(format!("{}, Debug", who));
        log.info(format!("{}, Info", who));
        log.warning(format!("{}, Warning", who));
        log.error(format!("{}, Error", who));
        log.critical(format!("{}, Critical", who));
        thread::sleep(Duration::from_secs(1));
    }
}

fn main() -> Result<()> {
    let direct = std::env::args().any(|arg| arg == "--direct");

    if direct {
        let log = init_log(false, None)?;
        work(log);
        return Ok(());
    }

    let funnel = Funnel::start(LogConfig::default())?;
    let workers = (0..WORKERS)
        .map(|i| {
            let log = funnel.logger().child(format!("worker.{}", i));
            thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || work(log))
                .map_err(|e| LoggerError::io_operation("spawn worker", "thread spawn failed", e))
        })
        .collect::<Result<Vec<_>>>()?;

    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    let metrics = funnel.shutdown()?;
    println!(
        "dispatched {} of {} entries, {} handler failures",
        metrics.dispatched(),
        metrics.enqueued(),
        metrics.handler_failures()
    );
    Ok(())
}
