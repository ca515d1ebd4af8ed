//! Shell-like session over a read-only tar archive.
//!
//! [`Interpreter`] turns one command line into one response string. Misuse
//! and lookup misses come back as text; only environment failures are errors.

pub mod action_log;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod session;

pub use action_log::{ActionLog, Clock, FileActionLog, LocalClock, LogRecord, MemoryActionLog};
pub use config::{Config, ListingMode};
pub use error::{ConfigError, LogError, ShellError};
pub use interpreter::{BuiltinKind, CommandRequest, Interpreter, Outcome};
pub use session::Session;
