pub const DEFAULT_HOME: &str = "/home/user";

/// Per-interpreter mutable state. The home path is taken as-is; later values
/// come only from a `cd` that the archive confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    current_dir: String,
}

impl Session {
    pub fn new(home: impl Into<String>) -> Self { Session { current_dir: home.into() } }
    pub fn current_dir(&self) -> &str { &self.current_dir }
    pub(crate) fn set_current_dir(&mut self, path: &str) { self.current_dir = path.to_string(); }
}

impl Default for Session {
    fn default() -> Self { Session::new(DEFAULT_HOME) }
}
