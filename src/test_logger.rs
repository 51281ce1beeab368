//! Capturing logger for unit tests.
//!
//! Records are kept per thread, so tests running in parallel only see what
//! they logged themselves.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

struct CapturingLogger;

static LOGGER: CapturingLogger = CapturingLogger;
static INIT: Once = Once::new();

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|r| {
            r.borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

/// Install the logger (once per process) and clear this thread's records.
pub fn capture() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

/// Take the records logged on this thread since the last call.
pub fn take() -> Vec<(Level, String)> {
    RECORDS.with(|r| std::mem::take(&mut *r.borrow_mut()))
}
