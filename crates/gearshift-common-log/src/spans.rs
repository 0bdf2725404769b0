//! Span helpers for the pipeline stages.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info_span, Instrument, Span};

/// Span for a workflow step (`analyze`, `implement`, ...).
pub fn step_span(step: &str) -> Span {
    info_span!("step", step = %step)
}

/// Span for parsing or extracting from one input document.
pub fn document_span(kind: &str, path: &str) -> Span {
    info_span!("document", kind = %kind, path = %path)
}

/// Span for rendering a named template.
pub fn render_span(template: &str) -> Span {
    info_span!("render", template = %template)
}

/// Span for a file operation.
pub fn file_span(operation: &str, path: &str) -> Span {
    info_span!("file", op = %operation, path = %path)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Log the elapsed time at debug level and return it.
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}

/// Time a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}

pub use tracing::instrument;

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn with_subscriber<F>(f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_span_nesting() {
        with_subscriber(|| {
            let step = step_span("create-specs");
            let _g1 = step.enter();

            let doc = document_span("features", "docs/features.md");
            let _g2 = doc.enter();

            let file = file_span("write", "/tmp/specs/features/001-login.md");
            let _g3 = file.enter();

            tracing::info!("nested operation");
        });
    }

    #[test]
    fn test_record_error() {
        with_subscriber(|| {
            let span = render_span("feature-spec");
            let _guard = span.enter();
            let error = std::io::Error::new(std::io::ErrorKind::NotFound, "template missing");
            record_error(&error);
        });
    }

    #[tokio::test]
    async fn test_context_propagation_across_async() {
        let step = step_span("analyze");
        let future = async {
            let inner = async { tracing::info!("inner") };
            instrument_future(inner, document_span("constitution", "a.md")).await;
            7
        };
        assert_eq!(instrument_future(future, step).await, 7);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start("test_operation");
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.finish() >= Duration::from_millis(10));

        with_subscriber(|| {
            let result = timed!("macro_test", { "success" });
            assert_eq!(result, "success");
        });
    }
}
