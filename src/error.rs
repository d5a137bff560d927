//! Unified error types for the application module runtime.
//!
//! Every registry and lifecycle operation funnels into [`Error`]. All
//! variants are `Copy` so they can be returned from the console path and
//! the supervisor without allocation. None of them ever crosses the
//! interrupt/task boundary: `invoke()` is infallible.

use core::fmt;

use crate::callbacks::TickEvent;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Tick callback slot conflict.
    Callback(CallbackError),
    /// Console command table or dispatch failure.
    Command(CommandError),
    /// Module start/stop misuse.
    Lifecycle(LifecycleError),
    /// Configuration rejected by validation.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(e) => write!(f, "callback: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Lifecycle(e) => write!(f, "lifecycle: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Callback registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackError {
    /// Another owner already holds the slot for this event.
    AlreadyRegistered { event: TickEvent, owner: &'static str },
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered { event, owner } => {
                write!(f, "{event:?} callback already registered by '{owner}'")
            }
        }
    }
}

impl From<CallbackError> for Error {
    fn from(e: CallbackError) -> Self {
        Self::Callback(e)
    }
}

// ---------------------------------------------------------------------------
// Command registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// A command with this name is already registered.
    DuplicateName,
    /// No command with this name is registered.
    UnknownCommand,
    /// The fixed-capacity command table is full.
    TableFull,
    /// Name is empty, non-ASCII or contains whitespace.
    InvalidName,
    /// Input line has more arguments than the parser accepts.
    TooManyArgs,
    /// Input line contained no command.
    EmptyLine,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "duplicate command name"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::TableFull => write!(f, "command table full"),
            Self::InvalidName => write!(f, "invalid command name"),
            Self::TooManyArgs => write!(f, "too many arguments"),
            Self::EmptyLine => write!(f, "empty command line"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Lifecycle errors
// ---------------------------------------------------------------------------

/// Supervisor misuse of `start()` / `stop()`.  These are logic errors and
/// are always surfaced, never swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start()` called while the module is not `Stopped`.
    AlreadyRunning,
    /// `stop()` called while the module is `Stopped`.
    NotRunning,
    /// The background task could not be created.
    SpawnFailed,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "module already running"),
            Self::NotRunning => write!(f, "module not running"),
            Self::SpawnFailed => write!(f, "background task spawn failed"),
        }
    }
}

impl From<LifecycleError> for Error {
    fn from(e: LifecycleError) -> Self {
        Self::Lifecycle(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation; the message names the field.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
