//! Operator commands
//!
//! Commands are single tokens, optionally followed by one integer argument
//! separated by whitespace (`r 72`, `m -400`).

/// A parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `1`: start (or restart) the cardiac cycle
    StartCycle,
    /// `0`: stop stepping and de-energize the motor
    Stop,
    /// `e`: emergency stop
    EmergencyStop,
    /// `s`: report status
    Status,
    /// `+`: raise heart rate by one increment
    RateUp,
    /// `-`: lower heart rate by one increment
    RateDown,
    /// `r <bpm>`: set heart rate directly
    SetRate(u16),
    /// `v+`: grow stroke volume
    VolumeUp,
    /// `v-`: shrink stroke volume
    VolumeDown,
    /// `m <steps>`: move to an absolute step position and hold
    MoveTo(i32),
    /// `g`: finish the current cycle, return home and hold
    Shutdown,
}

/// Reasons a command line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line was blank
    Empty,
    /// First token is not a known command
    Unknown,
    /// Command needs an argument that was not supplied
    MissingArgument,
    /// Argument is not an integer in range, or an unexpected extra token
    InvalidArgument,
}

impl CommandError {
    /// Short human-readable description
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandError::Empty => "empty command",
            CommandError::Unknown => "unknown command",
            CommandError::MissingArgument => "missing argument",
            CommandError::InvalidArgument => "invalid argument",
        }
    }
}

impl Command {
    /// Parse a trimmed command line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or(CommandError::Empty)?;
        let arg = tokens.next();

        if tokens.next().is_some() {
            return Err(CommandError::InvalidArgument);
        }

        let cmd = match head {
            "1" => Command::StartCycle,
            "0" => Command::Stop,
            "e" | "E" => Command::EmergencyStop,
            "s" | "S" => Command::Status,
            "+" => Command::RateUp,
            "-" => Command::RateDown,
            "v+" | "V+" => Command::VolumeUp,
            "v-" | "V-" => Command::VolumeDown,
            "g" | "G" => Command::Shutdown,
            "r" | "R" => {
                let bpm = arg
                    .ok_or(CommandError::MissingArgument)?
                    .parse::<u16>()
                    .map_err(|_| CommandError::InvalidArgument)?;
                return Ok(Command::SetRate(bpm));
            }
            "m" | "M" => {
                let target = arg
                    .ok_or(CommandError::MissingArgument)?
                    .parse::<i32>()
                    .map_err(|_| CommandError::InvalidArgument)?;
                return Ok(Command::MoveTo(target));
            }
            _ => return Err(CommandError::Unknown),
        };

        // Argument-less commands reject trailing tokens
        if arg.is_some() {
            return Err(CommandError::InvalidArgument);
        }
        Ok(cmd)
    }

    /// Whether this command only reads state
    pub const fn is_query(&self) -> bool {
        matches!(self, Command::Status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_char_commands() {
        assert_eq!(Command::parse("1"), Ok(Command::StartCycle));
        assert_eq!(Command::parse("0"), Ok(Command::Stop));
        assert_eq!(Command::parse("e"), Ok(Command::EmergencyStop));
        assert_eq!(Command::parse("s"), Ok(Command::Status));
        assert_eq!(Command::parse("+"), Ok(Command::RateUp));
        assert_eq!(Command::parse("-"), Ok(Command::RateDown));
        assert_eq!(Command::parse("g"), Ok(Command::Shutdown));
    }

    #[test]
    fn test_volume_commands() {
        assert_eq!(Command::parse("v+"), Ok(Command::VolumeUp));
        assert_eq!(Command::parse("v-"), Ok(Command::VolumeDown));
        assert_eq!(Command::parse("V+"), Ok(Command::VolumeUp));
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(Command::parse("r 72"), Ok(Command::SetRate(72)));
        assert_eq!(Command::parse("m -400"), Ok(Command::MoveTo(-400)));
        assert_eq!(Command::parse("m\t25"), Ok(Command::MoveTo(25)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(Command::parse("x"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("v"), Err(CommandError::Unknown));
        assert_eq!(Command::parse("r"), Err(CommandError::MissingArgument));
        assert_eq!(Command::parse("m"), Err(CommandError::MissingArgument));
        assert_eq!(Command::parse("r fast"), Err(CommandError::InvalidArgument));
        assert_eq!(Command::parse("r -5"), Err(CommandError::InvalidArgument));
        assert_eq!(Command::parse("m 1 2"), Err(CommandError::InvalidArgument));
        assert_eq!(Command::parse("1 2"), Err(CommandError::InvalidArgument));
    }

    #[test]
    fn test_is_query() {
        assert!(Command::Status.is_query());
        assert!(!Command::Stop.is_query());
    }
}
