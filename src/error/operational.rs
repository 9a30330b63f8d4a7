//! Operational error context propagation with `anyhow`.
//!
//! This module provides extension traits and utilities for enhancing
//! error context and centralized error reporting.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{error, warn},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// Centralized error reporting and logging.
///
/// Errors of user commands are recoverable and reported as warnings;
/// anything that ends the session is reported as an error.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a recoverable error.
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %error, "Recoverable error");
    }

    /// Reports a non-recoverable error.
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = format!("{error:#}"), "Fatal error");
    }

    /// Converts an error to a one-line message for the terminal.
    ///
    /// The outermost context comes first, followed by each cause.
    pub fn to_user_message(error: &Error) -> String {
        error
            .chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    };

    use anyhow::anyhow;

    use crate::error::operational::{ErrorReporter, ResultExt};

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            write!(f, "Test error")
        }
    }

    impl Error for TestError {}

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<i32, TestError> = Err(TestError);
        let error = result.add_context("Additional context").unwrap_err();

        assert_eq!(error.to_string(), "Additional context");
        assert_eq!(error.root_cause().to_string(), "Test error");
    }

    #[test]
    fn test_result_ext_with_contextf() {
        let result: Result<i32, TestError> = Err(TestError);
        let error = result.add_contextf(format!("Loading {}", "a.mp3")).unwrap_err();

        assert_eq!(error.to_string(), "Loading a.mp3");
    }

    #[test]
    fn test_user_message_includes_causes() {
        let result: Result<i32, TestError> = Err(TestError);
        let error = result.add_context("Could not load track").unwrap_err();
        assert_eq!(
            ErrorReporter::to_user_message(&error),
            "Could not load track: Test error"
        );

        let plain = anyhow!("Test error message");
        assert_eq!(ErrorReporter::to_user_message(&plain), "Test error message");
    }
}
