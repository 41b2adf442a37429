//! Logging capability.
//!
//! Components receive an `Arc<dyn Logger>` through their constructors
//! instead of reaching for a global. The default implementation forwards
//! to `tracing` under the `cortex` target, with debug output gated by
//! the plugin's `debug` setting.

/// Where plugin diagnostics go.
pub trait Logger: Send + Sync {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn debug(&self, msg: &str);
}

/// Forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
    debug: bool,
}

impl TracingLogger {
    /// `debug = false` drops debug lines before they reach the subscriber.
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }
}

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(target: "cortex", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "cortex", "{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "cortex", "{msg}");
    }

    fn debug(&self, msg: &str) {
        if self.debug {
            tracing::debug!(target: "cortex", "{msg}");
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn loggers_are_usable_as_trait_objects() {
        let loggers: Vec<Arc<dyn Logger>> = vec![Arc::new(TracingLogger::new(true)), Arc::new(NoopLogger)];
        for logger in loggers {
            logger.info("info");
            logger.warn("warn");
            logger.error("error");
            logger.debug("debug");
        }
    }

    #[test]
    fn debug_flag_is_kept() {
        assert!(TracingLogger::new(true).debug_enabled());
        assert!(!TracingLogger::default().debug_enabled());
    }
}
