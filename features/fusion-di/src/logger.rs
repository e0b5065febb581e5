/// Sink for the container's informational and error messages
///
/// Replace it with [Container::set_logger](crate::Container::set_logger).
pub trait Logger {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Default [Logger], forwarding to `tracing` under the `fusion_di` target
///
/// Where the messages end up is decided by the subscriber the host installs,
/// e.g. `tracing_subscriber::fmt()` writes them to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(target: "fusion_di", "{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "fusion_di", "{msg}");
    }
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}
