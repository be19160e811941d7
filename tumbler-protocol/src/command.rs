//! NORMAL-mode command parsing
//!
//! A command line is split on whitespace. The first token is the keyword,
//! matched without regard to case; following tokens are arguments. Tokens
//! past the ones a command needs are ignored.

/// Errors from parsing a command's arguments
///
/// Both variants are reported to the operator the same way; they are kept
/// apart for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A required argument was not given
    MissingArgument,
    /// An argument is not a number of the expected kind
    InvalidNumber,
}

/// A parsed NORMAL-mode command line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `SHOW <int>`
    Show(i64),
    /// `SHOWF <float> <int>`
    ShowFloat { value: f64, decimals: i32 },
    /// `COUNTDOWN <int>`
    Countdown(i64),
    /// `INFO`
    Info,
    /// `SAVE`
    Save,
    /// `SET <int>`
    Set(i64),
    /// `CONFIGURE`
    Configure,
    /// Line with no tokens
    Empty,
    /// Unrecognised keyword
    Unknown,
}

impl Command {
    /// Parse one command line (without its terminating newline)
    ///
    /// Unrecognised keywords parse to [`Command::Unknown`] rather than an
    /// error, since the console ignores them silently.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(Command::Empty);
        };

        let command = if keyword.eq_ignore_ascii_case("SHOW") {
            Command::Show(parse_arg(tokens.next())?)
        } else if keyword.eq_ignore_ascii_case("SHOWF") {
            let value = parse_arg(tokens.next())?;
            let decimals = parse_arg(tokens.next())?;
            Command::ShowFloat { value, decimals }
        } else if keyword.eq_ignore_ascii_case("COUNTDOWN") {
            Command::Countdown(parse_arg(tokens.next())?)
        } else if keyword.eq_ignore_ascii_case("INFO") {
            Command::Info
        } else if keyword.eq_ignore_ascii_case("SAVE") {
            Command::Save
        } else if keyword.eq_ignore_ascii_case("SET") {
            Command::Set(parse_arg(tokens.next())?)
        } else if keyword.eq_ignore_ascii_case("CONFIGURE") {
            Command::Configure
        } else {
            Command::Unknown
        };

        Ok(command)
    }
}

fn parse_arg<T: core::str::FromStr>(token: Option<&str>) -> Result<T, CommandError> {
    token
        .ok_or(CommandError::MissingArgument)?
        .parse()
        .map_err(|_| CommandError::InvalidNumber)
}
