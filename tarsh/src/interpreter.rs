use std::sync::Arc;

use log::{debug, info, warn};
use tarfs::{ArchiveError, ArchiveIndex};

use crate::action_log::{ActionLog, Clock, FileActionLog, LocalClock, LogRecord};
use crate::config::{Config, ListingMode};
use crate::error::ShellError;
use crate::session::Session;

pub const DEFAULT_HEAD_LINES: usize = 10;
pub const EXIT_NOTICE: &str = "Exiting shell...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind { Ls, Cd, Uname, Head, Exit }

impl BuiltinKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ls" => Some(BuiltinKind::Ls),
            "cd" => Some(BuiltinKind::Cd),
            "uname" => Some(BuiltinKind::Uname),
            "head" => Some(BuiltinKind::Head),
            "exit" => Some(BuiltinKind::Exit),
            _ => None,
        }
    }
}

/// One parsed command line. `kind` is `None` for names outside the builtin set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: String,
    pub kind: Option<BuiltinKind>,
    pub args: Vec<String>,
}

impl CommandRequest {
    /// Whitespace split; blank input yields an empty, unknown name.
    pub fn parse(line: &str) -> Self {
        let mut toks = line.split_whitespace().map(|s| s.to_string());
        let name = toks.next().unwrap_or_default();
        let args = toks.collect();
        CommandRequest { kind: BuiltinKind::from_name(&name), name, args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Response text; the session keeps running.
    Continue(String),
    /// Termination notice; no further commands are accepted.
    Exit(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self { Outcome::Continue(s) | Outcome::Exit(s) => s }
    }
    pub fn is_exit(&self) -> bool { matches!(self, Outcome::Exit(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State { Running, Terminated }

pub struct Interpreter {
    archive: ArchiveIndex,
    log: Arc<dyn ActionLog>,
    clock: Arc<dyn Clock>,
    host: String,
    listing: ListingMode,
    session: Session,
    state: State,
}

impl Interpreter {
    /// Opens the configured archive and appends to the configured log file.
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        let archive = ArchiveIndex::open(&config.archive_location)?;
        let log = Arc::new(FileActionLog::new(&config.log_destination));
        Self::with_parts(config, archive, log, Arc::new(LocalClock))
    }

    pub fn with_parts(config: &Config, archive: ArchiveIndex, log: Arc<dyn ActionLog>, clock: Arc<dyn Clock>) -> Result<Self, ShellError> {
        let host = config.host_identity()?.to_string();
        Ok(Interpreter { archive, log, clock, host, listing: config.listing, session: Session::new(config.home.clone()), state: State::Running })
    }

    pub fn session(&self) -> &Session { &self.session }
    pub fn host(&self) -> &str { &self.host }
    pub fn is_terminated(&self) -> bool { self.state == State::Terminated }

    pub fn run_command(&mut self, line: &str) -> Result<Outcome, ShellError> {
        if self.state == State::Terminated {
            warn!("command after exit rejected: {line:?}");
            return Err(ShellError::SessionTerminated);
        }
        let req = CommandRequest::parse(line);
        debug!("dispatch {:?} args={:?}", req.name, req.args);
        let text = match req.kind {
            Some(BuiltinKind::Ls) => self.run_builtin_ls(&req.args)?,
            Some(BuiltinKind::Cd) => self.run_builtin_cd(&req.args)?,
            Some(BuiltinKind::Uname) => self.host.clone(),
            Some(BuiltinKind::Head) => self.run_builtin_head(&req.args)?,
            Some(BuiltinKind::Exit) => return self.run_builtin_exit(),
            None => format!("Unknown command: {}", req.name),
        };
        Ok(Outcome::Continue(text))
    }

    fn run_builtin_ls(&self, args: &[String]) -> Result<String, ShellError> {
        let path = args.first().map(String::as_str).unwrap_or(self.session.current_dir());
        let names = match self.listing {
            ListingMode::Prefix => self.archive.list_by_prefix(path)?,
            ListingMode::Children => self.archive.list_children(path)?,
        };
        Ok(names.join("\n"))
    }

    fn run_builtin_cd(&mut self, args: &[String]) -> Result<String, ShellError> {
        let Some(path) = args.first() else { return Ok("cd: missing argument".to_string()) };
        if self.archive.is_directory(path)? {
            self.session.set_current_dir(path);
            Ok(format!("Changed directory to {path}"))
        } else {
            Ok(format!("cd: no such directory: {path}"))
        }
    }

    fn run_builtin_head(&self, args: &[String]) -> Result<String, ShellError> {
        let (path, limit) = match parse_head_args(args) {
            Ok(Some(v)) => v,
            Ok(None) => return Ok("head: missing filename argument".to_string()),
            Err(bad) => return Ok(format!("head: invalid line count: {bad}")),
        };
        match self.archive.read_lines(&path, limit) {
            Ok(lines) => Ok(lines.join("\n")),
            Err(ArchiveError::NotFound(_)) => Ok(format!("head: no such file: {path}")),
            Err(ArchiveError::IsDirectory(_)) => Ok(format!("head: is a directory: {path}")),
            Err(e @ ArchiveError::Decode(_)) => {
                warn!("head {path}: {e} ({})", e.code());
                Ok(format!("head: cannot decode file: {path}"))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn run_builtin_exit(&mut self) -> Result<Outcome, ShellError> {
        self.log.append(&LogRecord::new(self.clock.now(), "exit", &[]))?;
        self.state = State::Terminated;
        info!("session on {} terminated in {}", self.host, self.session.current_dir());
        Ok(Outcome::Exit(EXIT_NOTICE.to_string()))
    }
}

/// `head FILE [N]`. `Ok(None)` when no file is named, `Err(arg)` when the
/// count is not an integer. A negative count reads nothing.
fn parse_head_args(args: &[String]) -> Result<Option<(String, usize)>, String> {
    let Some(path) = args.first() else { return Ok(None) };
    let limit = match args.get(1) {
        Some(c) => {
            let n = c.parse::<i64>().map_err(|_| c.to_string())?;
            usize::try_from(n.max(0)).unwrap_or(usize::MAX)
        }
        None => DEFAULT_HEAD_LINES,
    };
    Ok(Some((path.clone(), limit)))
}
