//! `tracing` output routed to the Workers console

use std::io;
use std::sync::Once;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use worker::Env;

static INIT: Once = Once::new();

/// Installs the subscriber once per isolate. Level comes from `LOG_LEVEL`.
pub fn init(env: &Env) {
    INIT.call_once(|| {
        let level = crate::config::env_string(env, "LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

        // no clock in the isolate, and the console adds its own timestamps
        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(ConsoleMakeWriter)
            .without_time()
            .with_ansi(false)
            .with_target(false)
            .try_init();
        if let Err(e) = result {
            worker::console_error!("tracing init failed: {}", e);
        }
    });
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(false)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level() <= Level::WARN)
    }
}

/// Buffers one formatted event and emits it as a single console line on drop
struct ConsoleWriter {
    buf: Vec<u8>,
    is_error: bool,
}

impl ConsoleWriter {
    fn new(is_error: bool) -> Self {
        Self {
            buf: Vec::new(),
            is_error,
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if self.is_error {
            worker::console_error!("{}", line);
        } else {
            worker::console_log!("{}", line);
        }
    }
}
