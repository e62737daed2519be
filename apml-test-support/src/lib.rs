//! Shared test utilities used across the apml crates.

pub mod tracing {
    //! Capture spans and events emitted while a closure runs.
    //!
    //! ```
    //! use apml_test_support::tracing::capture;
    //!
    //! let ((), recording) = capture(|| {
    //!     let span = tracing::info_span!("probe", socket = 1_u8);
    //!     let _entered = span.enter();
    //!     tracing::warn!(label = "TDP", "summary read failed");
    //! });
    //! assert_eq!(recording.span("probe").and_then(|s| s.field("socket")), Some("1"));
    //! assert_eq!(recording.messages(), vec!["summary read failed"]);
    //! ```
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

    /// Run `f` with a fresh [`RecordingLayer`] as the thread's default
    /// subscriber and return what it recorded.
    pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Recording) {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, layer.snapshot())
    }

    /// Layer storing closed spans and emitted events in memory.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        store: Arc<Mutex<Recording>>,
    }

    impl RecordingLayer {
        /// Copy of everything recorded so far.
        #[must_use]
        pub fn snapshot(&self) -> Recording {
            self.lock().clone()
        }

        fn lock(&self) -> MutexGuard<'_, Recording> {
            self.store.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Spans in close order and events in emission order.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Recording {
        /// Closed spans.
        pub spans: Vec<SpanRecord>,
        /// Emitted events.
        pub events: Vec<EventRecord>,
    }

    impl Recording {
        /// First closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<&SpanRecord> {
            self.spans.iter().find(|span| span.name == name)
        }

        /// Events emitted at `level`.
        pub fn events_at(&self, level: Level) -> impl Iterator<Item = &EventRecord> {
            self.events.iter().filter(move |event| event.level == level)
        }

        /// `message` field of every event, in order.
        #[must_use]
        pub fn messages(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|event| event.field("message"))
                .collect()
        }
    }

    /// A closed span with the final value of each of its fields.
    ///
    /// Fields declared empty and never recorded are absent.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from its metadata.
        pub name: String,
        /// Recorded fields, rendered as text.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Value recorded for `name`.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target.
        pub target: String,
        /// Name of the innermost span the event was emitted in.
        pub span: Option<String>,
        /// Event fields, including `message`, rendered as text.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Value recorded for `name`.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    struct OpenSpan(SpanRecord);

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut Fields(&mut fields));
            span.extensions_mut().insert(OpenSpan(SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields,
            }));
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut Fields(&mut open.0.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().remove::<OpenSpan>() {
                self.lock().spans.push(open.0);
            }
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut Fields(&mut fields));
            let span = ctx.event_span(event).map(|span| span.name().to_owned());
            self.lock().events.push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                span,
                fields,
            });
        }
    }

    struct Fields<'a>(&'a mut HashMap<String, String>);

    impl Fields<'_> {
        fn put(&mut self, field: &Field, value: impl ToString) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }
    }

    impl Visit for Fields<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value);
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value);
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.put(field, value);
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.put(field, value);
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.put(field, value);
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.put(field, value);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn late_recorded_fields_reach_the_closed_span() {
            let ((), recording) = capture(|| {
                let span = tracing::info_span!("work", outcome = tracing::field::Empty);
                span.record("outcome", "usage");
            });
            let span = recording.span("work").expect("span closed");
            assert_eq!(span.field("outcome"), Some("usage"));
        }

        #[test]
        fn events_remember_their_span() {
            let ((), recording) = capture(|| {
                tracing::info_span!("outer").in_scope(|| tracing::warn!(code = 3, "failed"));
                tracing::info!("outside");
            });
            let warned: Vec<_> = recording.events_at(Level::WARN).collect();
            assert_eq!(warned.len(), 1);
            assert_eq!(warned[0].span.as_deref(), Some("outer"));
            assert_eq!(warned[0].field("code"), Some("3"));
            assert_eq!(recording.messages(), vec!["failed", "outside"]);
        }
    }
}
