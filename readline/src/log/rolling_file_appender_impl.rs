// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

use tracing_appender::rolling::RollingFileAppender;

/// A file appender that never rolls over. Relative paths are relative to the current
/// working directory.
///
/// # Errors
///
/// When `path_str` has no file name.
pub fn try_create(path_str: &str) -> miette::Result<RollingFileAppender> {
    let path = PathBuf::from(path_str);

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Can't use {} as a log file, it has no file name.", path.display())
    })?;

    let parent = match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok(tracing_appender::rolling::never(parent, file_name))
}
