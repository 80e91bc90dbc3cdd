// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

use super::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Install a global subscriber built from `tracing_config`. Does nothing for
/// [`WriterConfig::None`].
///
/// # Errors
///
/// When the log file can't be opened, or a global subscriber is already installed.
pub fn try_initialize_logging_global(tracing_config: TracingConfig) -> miette::Result<()> {
    let Some(layers) = try_create_layers(&tracing_config)? else {
        return Ok(());
    };
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|err| miette::miette!("Can't install tracing subscriber: {err}"))
}

/// Returns the layers. This does not initialize the tracing system, see
/// [`try_initialize_logging_global`] for that.
///
/// # Errors
///
/// When the log file can't be opened.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    if tracing_config.writer_config == WriterConfig::None {
        return Ok(None);
    }

    let level_filter = tracing_config.level_filter;
    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Needed when layers without their own filter are added later.
    return_it.push(Box::new(level_filter));

    if let Some(preferred_display) = tracing_config.display_preference() {
        return_it.push(create_display_layer(level_filter, preferred_display));
    }

    if let Some(file_path) = tracing_config.file_path() {
        return_it.push(try_create_file_layer(level_filter, file_path)?);
    }

    Ok(Some(return_it))
}

fn create_display_layer<S>(
    level_filter: LevelFilter,
    preferred_display: DisplayPreference,
) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!().with_ansi(true);
    match preferred_display {
        DisplayPreference::Stdout => Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
    }
}

fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    file_path: &str,
) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let file = rolling_file_appender_impl::try_create(file_path)?;
    Ok(Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(level_filter),
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_layers_when_disabled() {
        assert!(try_create_layers(&TracingConfig::disabled()).unwrap().is_none());
    }

    #[test]
    fn test_display_layers() {
        let config =
            TracingConfig::new_display(DisplayPreference::Stderr, LevelFilter::INFO);
        let layers = try_create_layers(&config).unwrap().unwrap();
        // Level filter plus the display layer.
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn test_bad_file_path_is_an_error() {
        let config = TracingConfig::new_file(Some("/".into()), LevelFilter::INFO);
        assert!(try_create_layers(&config).is_err());
    }
}
