//! Indented, colorized, multi-line logs for development terminals.
//!
//! # Overview
//!
//! [`tracing`] is a framework for instrumenting programs to collect structured
//! diagnostics via the [`Subscriber`] trait. This crate provides
//! [`DevslogLayer`], a [`Layer`] that writes every event as one line for the
//! time, level and message, followed by one line per field. Fields of the
//! spans an event happens in are nested under a header for each span, so the
//! context of an event is readable at a glance.
//!
//! ```log
//! 23:00:00 INFO request finished
//!  ↳ request:
//!      ↳ method: GET
//!      ↳ path: /index.html
//!      ↳ status: 200
//! ```
//!
//! The formatting core doesn't depend on `tracing` being the source of logs:
//! a [`Handler`] can also be driven directly with [`Record`]s, and extended
//! with groups and attributes that apply to every record it handles.
//!
//! [`Layer`]: tracing_subscriber::layer::Layer
//! [`Subscriber`]: tracing::subscriber::Subscriber
//!
//! # Getting started
//!
//! Add the [`#[tracing_devslog::main]`][attr_main] attribute to your main
//! function, with the `attributes` feature enabled:
//! ```
//! # #[allow(clippy::needless_doctest_main)]
//! #[tracing_devslog::main]
//! fn main() {
//!     tracing::info!(answer = 42, "Hello, world!");
//! }
//! ```
//! ```log
//! 23:00:00 INFO Hello, world!
//!  ↳ answer: 42
//! ```
//! For more configuration options, see the
//! [`builder` module documentation][mod@crate::builder].
//!
//! # Groups and attributes
//!
//! Handlers are never changed in place. Adding a group or attributes returns a
//! new handler, and handlers derived from the same ancestor don't observe each
//! other's attributes.
//! ```
//! use tracing::Level;
//! use tracing_devslog::{Attr, Handler, Record};
//!
//! let root = Handler::new(std::io::stdout());
//! let request = root.with_group("request");
//!
//! let get = request.with_attrs(vec![Attr::new("method", "GET")]);
//! let post = request.with_attrs(vec![Attr::new("method", "POST")]);
//!
//! get.handle(&Record::new(Level::INFO, "received")).unwrap();
//! post.handle(&Record::new(Level::INFO, "received")).unwrap();
//! ```
//! ```log
//! INFO received
//!  ↳ request:
//!      ↳ method: GET
//! INFO received
//!  ↳ request:
//!      ↳ method: POST
//! ```
//!
//! # Feature flags
//!
//! * `full`: Enables all features listed below.
//! * `smallvec`: Stores the attributes of small records inline.
//! * `attributes`: Enables the [`#[tracing_devslog::test]`][attr_test] and
//! [`#[tracing_devslog::main]`][attr_main] attributes.
//! * `env-filter`: Enables [`SubscriberBuilder::with_env_filter`].
//!
//! [attr_test]: tracing_devslog_macros::test
//! [attr_main]: tracing_devslog_macros::main
//! [`SubscriberBuilder::with_env_filter`]: crate::builder::SubscriberBuilder
#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(hidden)]
#[macro_use]
mod cfg;

pub mod builder;
pub mod error;
pub mod handler;
pub mod layer;
pub mod record;
pub mod scope;
pub mod value;
mod color;
mod fail;
mod pretty;

// Items that are required for macros but not intended for public API
#[doc(hidden)]
pub mod private {
    pub use tracing::Level;
}

pub use crate::builder::builder;
pub use crate::error::Error;
pub use crate::handler::{Handler, HandlerOptions};
pub use crate::layer::DevslogLayer;
pub use crate::pretty::Pretty;
pub use crate::record::Record;
pub use crate::value::{Attr, Value};

use std::io::Write;

/// Installs a [`DevslogLayer`] writing to `writer` as the global default
/// subscriber.
///
/// This is a shorthand for configuring the layer with [`builder`] and calling
/// [`set_global`]. Tests and other callers that need isolation should use
/// [`on_closure`] or [`on_future`] instead, which only install the subscriber
/// for a limited scope.
///
/// # Errors
///
/// Returns [`Error::SetGlobalDefault`] if a global default subscriber was
/// already set.
///
/// # Examples
/// ```
/// use tracing::Level;
/// use tracing_devslog::HandlerOptions;
///
/// tracing_devslog::set_global_default(
///     std::io::stderr(),
///     HandlerOptions::new().level(Level::DEBUG),
/// )
/// .expect("no other global subscriber was set");
///
/// tracing::debug!("written to stderr");
/// ```
///
/// [`set_global`]: crate::builder::SubscriberBuilder::set_global
/// [`on_closure`]: crate::builder::SubscriberBuilder::on_closure
/// [`on_future`]: crate::builder::SubscriberBuilder::on_future
pub fn set_global_default<W>(writer: W, options: HandlerOptions) -> Result<(), Error>
where
    W: 'static + Write + Send,
{
    builder()
        .with_writer(writer)
        .with_level(options.min_level())
        .with_ansi(options.is_ansi())
        .into_subscriber()
        .set_global()
}

cfg_attributes! {
    /// Marks test to run in the context of a [`DevslogLayer`] subscriber,
    /// suitable to test environment.
    ///
    /// Logs are written with a writer that the test harness captures, so they
    /// only show up for failing tests or with `--nocapture`.
    ///
    /// # Examples
    ///
    /// ```
    /// #[tracing_devslog::test]
    /// fn test_subscriber() {
    ///     tracing::info!("Hello, world!");
    /// }
    /// ```
    /// Equivalent code not using `#[tracing_devslog::test]`
    /// ```
    /// #[test]
    /// fn test_subscriber() {
    ///     tracing_devslog::builder()
    ///         .with_test_writer()
    ///         .into_subscriber()
    ///         .on_closure(|| {
    ///             tracing::info!("Hello, world!");
    ///         })
    /// }
    /// ```
    ///
    /// ### Levels
    ///
    /// The least severe level that is written can be set with the `level`
    /// argument, which is one of `"trace"`, `"debug"`, `"info"`, `"warn"` or
    /// `"error"`.
    /// ```
    /// #[tracing_devslog::test(level = "debug")]
    /// fn test_verbose() {
    ///     tracing::debug!("shown");
    /// }
    /// ```
    ///
    /// ### Using with Tokio runtime
    ///
    /// This attribute can also be proceeded by the `#[tokio::test]` attribute
    /// to run the test in the context of an async runtime.
    /// ```
    /// #[tracing_devslog::test]
    /// #[tokio::test]
    /// async fn test_tokio() {
    ///     tracing::info!("Hello from Tokio!");
    /// }
    /// ```
    /// Equivalent code not using `#[tracing_devslog::test]`
    /// ```
    /// #[tokio::test]
    /// async fn test_tokio() {
    ///     tracing_devslog::builder()
    ///         .with_test_writer()
    ///         .into_subscriber()
    ///         .on_future(async {
    ///             tracing::info!("Hello from Tokio!");
    ///         })
    ///         .await
    /// }
    /// ```
    pub use tracing_devslog_macros::test;

    /// Marks function to run in the context of a [`DevslogLayer`] subscriber.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[allow(clippy::needless_doctest_main)]
    /// #[tracing_devslog::main]
    /// fn main() {
    ///     tracing::info!("Hello, world!");
    /// }
    /// ```
    /// Equivalent code not using `#[tracing_devslog::main]`
    /// ```
    /// # #[allow(clippy::needless_doctest_main)]
    /// fn main() {
    ///     tracing_devslog::builder()
    ///         .into_subscriber()
    ///         .on_closure(|| {
    ///             tracing::info!("Hello, world!");
    ///         })
    /// }
    /// ```
    ///
    /// ### Using with Tokio runtime
    ///
    /// This attribute can also be proceeded by the `#[tokio::main]` attribute
    /// to run the function in the context of an async runtime.
    /// ```
    /// #[tracing_devslog::main]
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     tracing::info!("Hello from Tokio!");
    /// }
    /// ```
    pub use tracing_devslog_macros::main;
}
