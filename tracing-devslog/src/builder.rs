//! Build a [`DevslogLayer`] and [`Subscriber`] with custom configuration values.
//!
//! To start, call [`builder`] to create a [`LayerBuilder`], which configures
//! the [`DevslogLayer`] by chaining methods.
//!
//! After the layer is configured, call [`into_subscriber`] on the
//! [`LayerBuilder`] to get a [`SubscriberBuilder`]. At this point, other
//! [`Layer`]s can be composed onto it by chaining calls to the [`with`]
//! method.
//!
//! Finally, code can be run in the context of the [`Subscriber`] by calling
//! either [`on_closure`] or [`on_future`], or the subscriber can be installed
//! for the whole process with [`set_global`].
//!
//! # Examples
//! Writing to stderr without colors, and only showing warnings and errors.
//! ```
//! use tracing::Level;
//!
//! tracing_devslog::builder()
//!     .with_writer(std::io::stderr())
//!     .with_ansi(false)
//!     .with_level(Level::WARN)
//!     .into_subscriber()
//!     .on_closure(|| {
//!         tracing::info!("if it's brown get down");
//!         tracing::warn!("if it's black fight back");
//!         tracing::error!("if it's white good night");
//!     })
//! ```
//! ```log
//! 23:00:00 WARN if it's black fight back
//! 23:00:00 ERROR if it's white good night
//! ```
//!
//! [`into_subscriber`]: LayerBuilder::into_subscriber
//! [`with`]: SubscriberBuilder::with
//! [`on_closure`]: SubscriberBuilder::on_closure
//! [`on_future`]: SubscriberBuilder::on_future
//! [`set_global`]: SubscriberBuilder::set_global
use crate::error::Error;
use crate::handler::{Handler, HandlerOptions};
use crate::layer::DevslogLayer;
use std::future::Future;
use std::io::{self, Write};
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

crate::cfg_env_filter! {
    use tracing_subscriber::filter::EnvFilter;
}

/// Creates a new [`LayerBuilder`] that writes to stdout.
///
/// See the [module level documentation] for details on using [`builder`].
///
/// [module level documentation]: self
pub fn builder() -> LayerBuilder<io::Stdout> {
    LayerBuilder {
        writer: io::stdout(),
        options: HandlerOptions::default(),
        with_time: true,
    }
}

/// A type for configuring [`DevslogLayer`]s.
///
/// See the [module level documentation] for details on using [`LayerBuilder`].
///
/// [module level documentation]: self
#[derive(Debug)]
pub struct LayerBuilder<W> {
    writer: W,
    options: HandlerOptions,
    with_time: bool,
}

impl<W> LayerBuilder<W>
where
    W: 'static + Write + Send,
{
    /// Applies a writer whose output is captured by the test harness.
    ///
    /// # Examples
    /// ```
    /// tracing_devslog::builder()
    ///     .with_test_writer()
    ///     .into_subscriber()
    ///     .on_closure(|| {
    ///         tracing::info!("Hello, world!");
    ///     })
    /// ```
    pub fn with_test_writer(self) -> LayerBuilder<TestWriter> {
        self.with_writer(TestWriter::new())
    }

    /// Applies the specified writer.
    ///
    /// # Examples
    /// ```
    /// tracing_devslog::builder()
    ///     .with_writer(std::io::stderr())
    ///     .into_subscriber()
    ///     .on_closure(|| {
    ///         tracing::info!("Hello, world!");
    ///     })
    /// ```
    pub fn with_writer<W2>(self, writer: W2) -> LayerBuilder<W2> {
        LayerBuilder {
            writer,
            options: self.options,
            with_time: self.with_time,
        }
    }

    /// Sets the least severe level that is written. Defaults to `INFO`.
    pub fn with_level(mut self, level: Level) -> Self {
        self.options = self.options.level(level);
        self
    }

    /// Sets whether ANSI color codes are written. Defaults to `true`.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.options = self.options.ansi(ansi);
        self
    }

    /// Leaves the time out of every line.
    pub fn without_time(mut self) -> Self {
        self.with_time = false;
        self
    }

    /// Finalizes the layer.
    pub fn layer(self) -> DevslogLayer<W> {
        let layer = DevslogLayer::new(Handler::with_options(self.writer, self.options));
        if self.with_time {
            layer
        } else {
            layer.without_time()
        }
    }

    /// Finalizes the layer and places it on top of a [`Registry`].
    pub fn into_subscriber(self) -> SubscriberBuilder<Layered<DevslogLayer<W>, Registry>> {
        SubscriberBuilder {
            subscriber: Registry::default().with(self.layer()),
        }
    }
}

/// A type for building [`Subscriber`]s by composing many [`Layer`]s.
#[derive(Debug)]
pub struct SubscriberBuilder<S> {
    subscriber: S,
}

impl<S> SubscriberBuilder<S>
where
    S: Subscriber + Send + Sync + 'static,
{
    /// Wraps the inner subscriber with the provided `layer`.
    ///
    /// # Examples
    /// ```
    /// use tracing_subscriber::filter::LevelFilter;
    ///
    /// tracing_devslog::builder()
    ///     .into_subscriber()
    ///     .with(LevelFilter::INFO)
    ///     .on_closure(|| {
    ///         // do stuff here...
    ///     })
    /// ```
    pub fn with<L>(self, layer: L) -> SubscriberBuilder<Layered<L, S>>
    where
        L: Layer<S>,
    {
        SubscriberBuilder {
            subscriber: self.subscriber.with(layer),
        }
    }

    /// Adds an environment filter to this subscriber. This is based on the
    /// [`tracing_subscriber`] [`EnvFilter`] and uses the same `RUST_LOG`
    /// syntax.
    ///
    /// If the `RUST_LOG` environment variable is not set, this will
    /// default to `info`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if `RUST_LOG` can't be parsed.
    #[cfg(feature = "env-filter")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env-filter")))]
    pub fn with_env_filter(self) -> Result<SubscriberBuilder<Layered<EnvFilter, S>>, Error> {
        let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(directives) => EnvFilter::try_new(directives)
                .map_err(|e| Error::InvalidFilter(Box::new(e)))?,
            Err(_) => EnvFilter::new("info"),
        };
        Ok(self.with(filter))
    }

    /// Runs the provided closure in the context of the subscriber.
    ///
    /// The subscriber is only the default for the current thread, and only
    /// until the closure returns.
    pub fn on_closure<R>(self, closure: impl FnOnce() -> R) -> R {
        tracing::subscriber::with_default(self.subscriber, closure)
    }

    /// Runs the provided future in the context of the subscriber.
    ///
    /// # Examples
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// tracing_devslog::builder()
    ///     .into_subscriber()
    ///     .on_future(async {
    ///         tracing::info!("Hello from Tokio");
    ///     })
    ///     .await
    /// # }
    /// ```
    pub fn on_future<F: Future>(self, future: F) -> WithDispatch<F> {
        WithSubscriber::with_subscriber(future, self.subscriber)
    }

    /// Installs the subscriber as the default for the whole process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetGlobalDefault`] if a global default subscriber
    /// was already set.
    pub fn set_global(self) -> Result<(), Error> {
        tracing::subscriber::set_global_default(self.subscriber)?;
        Ok(())
    }

    /// Returns the subscriber.
    pub fn into_inner(self) -> S {
        self.subscriber
    }
}
