//! Dispatch error taxonomy.
//!
//! Everything except `Command` originates in the engine and is reported by
//! `Dispatcher::handle` instead of being returned. `Command` wraps whatever an
//! invoked operation failed with and is handed back to the host unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command name '{name}' is ambiguous ({count} registered commands match)")]
    AmbiguousCommand { name: String, count: usize },

    #[error("command '{command}' requires resource {resource}, but none is registered")]
    MissingResource { command: String, resource: String },

    #[error("unknown option '{option}' for command '{command}'")]
    UnknownOption { command: String, option: String },

    #[error("'{token}' bundles more than one option that requires a value")]
    AmbiguousAggregateValue { token: String },

    #[error("option '{option}' requires a value")]
    MissingOptionValue { option: String },

    #[error("no converter registered for type {0}")]
    UnregisteredConverter(String),

    #[error("cannot convert '{token}' to {ty}: {reason}")]
    Conversion {
        token: String,
        ty: String,
        reason: String,
    },

    #[error(
        "no handler of '{command}' accepts {arity} argument(s){}",
        format_rejections(.rejections)
    )]
    NoMatchingHandler {
        command: String,
        arity: usize,
        rejections: Vec<String>,
    },

    #[error("command '{command}' declares more than one operation with signature ({signature})")]
    DuplicateSignature { command: String, signature: String },

    #[error("command '{command}' declares option '{option}' more than once")]
    DuplicateOption { command: String, option: String },

    #[error("internal argument mismatch: expected {expected}")]
    TypeMismatch { expected: String },

    #[error("{0:#}")]
    Command(anyhow::Error),
}

impl DispatchError {
    /// True for failures produced by the engine itself (everything but `Command`).
    pub fn is_engine_error(&self) -> bool {
        !matches!(self, DispatchError::Command(_))
    }

    /// True when a resolver candidate should be skipped rather than aborting.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            DispatchError::UnregisteredConverter(_) | DispatchError::Conversion { .. }
        )
    }
}

fn format_rejections(rejections: &[String]) -> String {
    if rejections.is_empty() {
        return String::new();
    }
    let mut out = String::from(":");
    for r in rejections {
        out.push_str("\n  - ");
        out.push_str(r);
    }
    out
}
