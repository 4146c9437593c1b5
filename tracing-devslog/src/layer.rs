//! A [`Layer`] that writes `tracing` events through a [`Handler`].
//!
//! Spans map onto the groups of a handler: entering a span opens a group
//! named after the span, holding the span's fields, and every event or span
//! inside of it is nested in that group.
//!
//! # Examples
//!
//! ```
//! use tracing_devslog::{DevslogLayer, Handler};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let layer = DevslogLayer::new(Handler::new(std::io::stdout()));
//! let subscriber = tracing_subscriber::Registry::default().with(layer);
//!
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info_span!("request", method = "GET").in_scope(|| {
//!         tracing::info!(status = 200, "finished");
//!     });
//! });
//! ```
//! ```log
//! 23:00:00 INFO finished
//!  ↳ request:
//!      ↳ method: GET
//!      ↳ status: 200
//! ```
use crate::fail;
use crate::handler::Handler;
use crate::record::Record;
use crate::value::Attr;
use chrono::Local;
use std::error::Error;
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::span::{self, Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

const MESSAGE_FIELD: &str = "message";

/// The handler of a span, stored in the span's extensions.
///
/// The span's fields are kept apart from the handler, so recording a field
/// again replaces its value instead of adding another attribute.
struct SpanHandler<W> {
    parent: Handler<W>,
    name: &'static str,
    fields: Vec<Attr>,
    handler: Handler<W>,
}

impl<W> SpanHandler<W> {
    fn new(parent: Handler<W>, name: &'static str, fields: Vec<Attr>) -> Self {
        let handler = parent.with_group(name).with_attrs(fields.clone());
        SpanHandler {
            parent,
            name,
            fields,
            handler,
        }
    }

    fn record(&mut self, attrs: Vec<Attr>) {
        if attrs.is_empty() {
            return;
        }

        for attr in attrs {
            match self.fields.iter_mut().find(|field| field.key == attr.key) {
                Some(field) => *field = attr,
                None => self.fields.push(attr),
            }
        }

        self.handler = self
            .parent
            .with_group(self.name)
            .with_attrs(self.fields.clone());
    }
}

/// A [`Layer`] that renders events with a [`Handler`].
///
/// Spans are always enabled so that their groups are available to the events
/// inside of them. Events below the handler's level are skipped by this layer
/// only, so other layers composed with it still see them.
#[derive(Debug)]
pub struct DevslogLayer<W> {
    handler: Handler<W>,
    with_time: bool,
}

impl<W> Clone for DevslogLayer<W> {
    fn clone(&self) -> Self {
        DevslogLayer {
            handler: self.handler.clone(),
            with_time: self.with_time,
        }
    }
}

impl<W> DevslogLayer<W> {
    /// Returns a layer writing events through `handler`.
    ///
    /// Records carry the local time of the event.
    pub fn new(handler: Handler<W>) -> Self {
        DevslogLayer {
            handler,
            with_time: true,
        }
    }

    /// Leaves the time out of every record.
    pub fn without_time(self) -> Self {
        DevslogLayer {
            with_time: false,
            ..self
        }
    }

    /// The root handler, used for events outside of any span.
    pub fn handler(&self) -> &Handler<W> {
        &self.handler
    }
}

impl<S, W> Layer<S> for DevslogLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: 'static + Write + Send,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span = ctx.span(id).unwrap_or_else(fail::span_not_in_ctx);

        let mut visitor = Visitor::for_span();
        attrs.record(&mut visitor);

        let parent = match span.parent() {
            Some(parent) => parent
                .extensions()
                .get::<SpanHandler<W>>()
                .unwrap_or_else(fail::handler_not_in_exts)
                .handler
                .clone(),
            None => self.handler.clone(),
        };

        let handler = SpanHandler::new(parent, attrs.metadata().name(), visitor.attrs);
        span.extensions_mut().insert(handler);
    }

    fn on_record(&self, id: &Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let span = ctx.span(id).unwrap_or_else(fail::span_not_in_ctx);

        let mut visitor = Visitor::for_span();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        extensions
            .get_mut::<SpanHandler<W>>()
            .unwrap_or_else(fail::handler_not_in_exts)
            .record(visitor.attrs);
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if !self.handler.enabled(*event.metadata().level()) {
            return;
        }

        let mut visitor = Visitor::for_event();
        event.record(&mut visitor);

        let mut record = Record::new(
            *event.metadata().level(),
            visitor.message.unwrap_or_default(),
        );
        if self.with_time {
            record = record.with_time(Local::now());
        }
        record.add_attrs(visitor.attrs);

        let handler = match ctx.event_span(event) {
            Some(span) => span
                .extensions()
                .get::<SpanHandler<W>>()
                .unwrap_or_else(fail::handler_not_in_exts)
                .handler
                .clone(),
            None => self.handler.clone(),
        };

        if let Err(err) = handler.handle(&record) {
            fail::write_error(&err);
        }
    }
}

/// Collects the fields of an event or span into attributes.
struct Visitor {
    message: Option<String>,
    attrs: Vec<Attr>,
    take_message: bool,
}

impl Visitor {
    fn for_event() -> Self {
        Visitor {
            message: None,
            attrs: Vec::new(),
            take_message: true,
        }
    }

    fn for_span() -> Self {
        Visitor {
            message: None,
            attrs: Vec::new(),
            take_message: false,
        }
    }

    fn is_message(&self, field: &Field) -> bool {
        self.take_message && self.message.is_none() && field.name() == MESSAGE_FIELD
    }
}

impl Visit for Visitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if self.is_message(field) {
            self.message = Some(value.to_owned());
        } else {
            self.attrs.push(Attr::new(field.name(), value.to_owned()));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.attrs.push(Attr::new(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value = format!("{:?}", value);
        if self.is_message(field) {
            self.message = Some(value);
        } else {
            self.attrs.push(Attr::new(field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerOptions;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(options: HandlerOptions, f: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let layer = DevslogLayer::new(Handler::with_options(buffer.clone(), options.ansi(false)))
            .without_time();
        tracing::subscriber::with_default(Registry::default().with(layer), f);
        buffer.contents()
    }

    #[test]
    fn events_outside_spans_use_the_root() {
        let out = capture(HandlerOptions::new(), || {
            tracing::info!(answer = 42, "hello");
        });

        assert_eq!(out, "INFO hello\n ↳ answer: 42\n");
    }

    #[test]
    fn spans_become_groups() {
        let out = capture(HandlerOptions::new(), || {
            tracing::info_span!("outer", id = 7_u64).in_scope(|| {
                tracing::info_span!("inner").in_scope(|| {
                    tracing::warn!(flag = true, "deep");
                });
            });
        });

        assert_eq!(
            out,
            concat!(
                "WARN deep\n",
                " ↳ outer:\n",
                "     ↳ id: 7\n",
                "     ↳ inner:\n",
                "         ↳ flag: true\n",
            )
        );
    }

    #[test]
    fn empty_trailing_spans_are_pruned() {
        let out = capture(HandlerOptions::new(), || {
            tracing::info_span!("outer", id = 7_u64).in_scope(|| {
                tracing::info_span!("empty").in_scope(|| {
                    tracing::info!("no fields");
                });
            });
        });

        assert_eq!(out, "INFO no fields\n ↳ outer:\n     ↳ id: 7\n");
    }

    #[test]
    fn recorded_fields_are_appended_to_the_span() {
        let out = capture(HandlerOptions::new(), || {
            let span = tracing::info_span!("task", result = tracing::field::Empty);
            span.record("result", "done");
            span.in_scope(|| tracing::info!(step = 1, "recorded"));
        });

        assert_eq!(
            out,
            "INFO recorded\n ↳ task:\n     ↳ result: done\n     ↳ step: 1\n"
        );
    }

    #[test]
    fn recording_a_field_again_replaces_its_value() {
        let out = capture(HandlerOptions::new(), || {
            let span = tracing::info_span!(
                "job",
                progress = tracing::field::Empty,
                name = "import",
            );
            for i in 0..3_u64 {
                span.record("progress", i);
            }
            span.in_scope(|| tracing::info!(x = 1, "tick"));
        });

        assert_eq!(
            out,
            concat!(
                "INFO tick\n",
                " ↳ job:\n",
                "     ↳ name: import\n",
                "     ↳ progress: 2\n",
                "     ↳ x: 1\n",
            )
        );
    }

    #[test]
    fn recording_many_times_keeps_the_span_small() {
        let out = capture(HandlerOptions::new(), || {
            let span = tracing::info_span!("loop", done = tracing::field::Empty);
            for i in 0..20_000_u64 {
                span.record("done", i);
            }
            span.in_scope(|| tracing::info!("finished"));
        });

        assert_eq!(out, "INFO finished\n ↳ loop:\n     ↳ done: 19999\n");
    }

    #[test]
    fn children_keep_the_fields_their_parent_had() {
        let out = capture(HandlerOptions::new(), || {
            let parent = tracing::info_span!("parent", state = "old");
            let child = tracing::info_span!(parent: &parent, "child");
            parent.record("state", "new");

            child.in_scope(|| tracing::info!(k = 1, "in child"));
            parent.in_scope(|| tracing::info!("in parent"));
        });

        assert_eq!(
            out,
            concat!(
                "INFO in child\n",
                " ↳ parent:\n",
                "     ↳ state: old\n",
                "     ↳ child:\n",
                "         ↳ k: 1\n",
                "INFO in parent\n",
                " ↳ parent:\n",
                "     ↳ state: new\n",
            )
        );
    }

    #[test]
    fn events_below_the_level_are_dropped() {
        let out = capture(HandlerOptions::new().level(Level::WARN), || {
            tracing::info!("quiet");
            tracing::debug_span!("verbose").in_scope(|| {
                tracing::error!("loud");
            });
        });

        assert_eq!(out, "ERROR loud\n");
    }

    #[test]
    fn only_the_first_message_is_taken() {
        let out = capture(HandlerOptions::new(), || {
            tracing::info!(text = "a string", debug = ?Some(1), "the message");
        });

        assert_eq!(
            out,
            "INFO the message\n ↳ text: a string\n ↳ debug: Some(1)\n"
        );
    }
}
