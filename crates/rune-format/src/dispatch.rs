use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::PayloadFormatter;
use crate::css::CssFormatter;
use crate::json::JsonFormatter;
use crate::kind::FormatKind;
use crate::markup::{MarkupFormatter, XmlFormatter};
use crate::options::FormatOptions;
use crate::report::{FailureReporter, TracingReporter};

/// Routes a payload to the formatter registered for its kind.
pub struct Dispatcher {
    formatters: HashMap<FormatKind, Arc<dyn PayloadFormatter>>,
}

impl Dispatcher {
    /// A dispatcher with nothing registered; only `FormatKind::None` and empty
    /// payloads can go through it.
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// HTML, CSS, JSON and XML formatters sharing `options` and `reporter`.
    pub fn with_defaults(options: FormatOptions, reporter: Arc<dyn FailureReporter>) -> Self {
        Self::empty()
            .register(
                FormatKind::Html,
                Arc::new(MarkupFormatter::with_reporter(options.clone(), reporter.clone())),
            )
            .register(
                FormatKind::Css,
                Arc::new(CssFormatter::with_reporter(options.clone(), reporter.clone())),
            )
            .register(
                FormatKind::Json,
                Arc::new(JsonFormatter::with_reporter(options.clone(), reporter.clone())),
            )
            .register(
                FormatKind::Xml,
                Arc::new(XmlFormatter::with_reporter(options, reporter)),
            )
    }

    pub fn register(mut self, kind: FormatKind, formatter: Arc<dyn PayloadFormatter>) -> Self {
        self.formatters.insert(kind, formatter);
        self
    }

    pub fn is_registered(&self, kind: FormatKind) -> bool {
        self.formatters.contains_key(&kind)
    }

    /// Format `source` as `kind`.
    ///
    /// `FormatKind::None` and empty input come back borrowed without touching
    /// any formatter.
    ///
    /// # Panics
    ///
    /// When no formatter is registered for `kind`. That is a wiring mistake,
    /// not a property of the payload.
    pub fn format<'a>(&self, kind: FormatKind, source: &'a str) -> Cow<'a, str> {
        if kind == FormatKind::None || source.is_empty() {
            return Cow::Borrowed(source);
        }
        let Some(formatter) = self.formatters.get(&kind) else {
            panic!("no formatter registered for payload kind `{}`", kind);
        };
        trace!(kind = %kind, len = source.len(), "dispatching payload");
        Cow::Owned(formatter.format(source))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_defaults(FormatOptions::default(), Arc::new(TracingReporter))
    }
}

/// Format `source` as `kind` with the process-wide default dispatcher.
pub fn format(kind: FormatKind, source: &str) -> String {
    static DEFAULT: OnceLock<Dispatcher> = OnceLock::new();
    DEFAULT.get_or_init(Dispatcher::default).format(kind, source).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl PayloadFormatter for Counting {
        fn format(&self, source: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            source.to_uppercase()
        }
    }

    #[test]
    fn none_and_empty_never_reach_a_formatter() {
        let counting = Arc::new(Counting::default());
        let dispatcher = Dispatcher::empty().register(FormatKind::Html, counting.clone());

        assert!(matches!(
            dispatcher.format(FormatKind::None, "<p>x</p>"),
            Cow::Borrowed("<p>x</p>")
        ));
        assert!(matches!(dispatcher.format(FormatKind::Html, ""), Cow::Borrowed("")));
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);

        assert_eq!(dispatcher.format(FormatKind::Html, "<p>"), "<P>");
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "no formatter registered for payload kind `json`")]
    fn unregistered_kind_panics() {
        Dispatcher::empty().format(FormatKind::Json, "{}");
    }

    #[test]
    fn defaults_cover_every_kind() {
        let dispatcher = Dispatcher::default();
        for kind in FormatKind::ALL {
            assert_eq!(dispatcher.is_registered(kind), kind != FormatKind::None);
        }
    }
}
