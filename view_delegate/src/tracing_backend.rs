// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! Configures a default [`tracing`] subscriber for hosts embedding the delegate.
//!
//! Logs are printed to the console with the time of day in UTC and without targets.
//! The default filter includes all [`DEBUG`](tracing::Level::DEBUG) messages in debug mode
//! and [`INFO`](tracing::Level::INFO) messages in release mode, and can be overridden
//! with `RUST_LOG`.
//!
//! If a `tracing` subscriber is already set, it is left alone.

use std::error::Error;
use std::fmt;

use time::macros::format_description;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

fn env_filter(default_level: LevelFilter) -> (EnvFilter, Option<Box<dyn Error>>) {
    let env_filter_builder = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("RUST_LOG");
    let err = env_filter_builder
        .from_env()
        .err()
        .map(|err| format!("failed to parse RUST_LOG environment variable: {err:#}").into());
    (env_filter_builder.from_env_lossy(), err)
}

fn timer() -> UtcTime<&'static [time::format_description::BorrowedFormatItem<'static>]> {
    UtcTime::new(format_description!(
        "[hour repr:24]:[minute]:[second].[subsecond digits:3]Z"
    ))
}

/// Constructs the default subscriber with a given `default_level` filter.
///
/// Returns the subscriber, and the error in case of a recoverable error.
pub fn default_tracing_subscriber(
    default_level: LevelFilter,
) -> (impl Subscriber, Option<Box<dyn Error>>) {
    let (env_filter, err) = env_filter(default_level);
    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer())
        .with_target(false)
        .with_filter(env_filter);
    (tracing_subscriber::registry().with(console_layer), err)
}

/// An Error indicating that a tracing subscriber has been set before.
#[derive(Debug)]
pub struct TracingSubscriberHasBeenSetError;

impl fmt::Display for TracingSubscriberHasBeenSetError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad("A tracing subscriber has been set before.")
    }
}

impl Error for TracingSubscriberHasBeenSetError {}

fn verify_subscriber_has_not_been_set() -> Result<(), TracingSubscriberHasBeenSetError> {
    if tracing_core::dispatcher::has_been_set() {
        return Err(TracingSubscriberHasBeenSetError);
    }
    Ok(())
}

/// Initialise tracing for a unit test.
///
/// Only warnings and errors are shown, through the test harness' captured output.
pub fn try_init_test_tracing() -> Result<(), TracingSubscriberHasBeenSetError> {
    verify_subscriber_has_not_been_set()?;

    let (env_filter, err) = env_filter(LevelFilter::WARN);
    let test_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer())
        .with_target(false)
        .with_test_writer()
        .with_filter(env_filter);

    // Already checked above that no subscriber has been set.
    let _ = tracing::subscriber::set_global_default(tracing_subscriber::registry().with(test_layer));
    if let Some(err) = err {
        tracing::error!("Initialising logging encountered recoverable error: {err}");
    }
    Ok(())
}

/// Initialise tracing with the default subscriber for an application.
pub fn try_init_tracing() -> Result<(), TracingSubscriberHasBeenSetError> {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    verify_subscriber_has_not_been_set()?;

    let (subscriber, err) = default_tracing_subscriber(default_level);

    // Already checked above that no subscriber has been set.
    let _ = tracing::subscriber::set_global_default(subscriber);
    if let Some(err) = err {
        tracing::error!("Initialising logging encountered recoverable error: {err}");
    }
    Ok(())
}
