/// Reserved input that requests shutdown instead of naming a file.
pub const DEFAULT_QUIT_TOKEN: &str = "q";

/// One line of input from either producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Empty,
    /// A candidate structure path, kept verbatim.
    Load(String),
}

impl Command {
    /// Classifies a line whose terminator has already been removed.
    pub fn parse(line: &str, quit_token: &str) -> Self {
        if line == quit_token {
            Command::Quit
        } else if line.is_empty() {
            Command::Empty
        } else {
            Command::Load(line.to_string())
        }
    }
}

/// Removes a single trailing `\n` or `\r\n`.
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
