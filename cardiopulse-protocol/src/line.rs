//! Line accumulation for the serial command channel.
//!
//! Bytes arrive one at a time from the UART. The reader buffers them until a
//! newline and hands back the completed, trimmed line.

use heapless::String;

/// Maximum accepted command line length in bytes (excluding the newline)
pub const MAX_LINE_LEN: usize = 64;

/// Errors that can occur while accumulating a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`]; input is discarded up to the next newline
    Overflow,
    /// Line contained bytes that are not valid UTF-8
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Accumulating bytes
    Reading,
    /// Overflowed, dropping bytes until the next newline
    Discarding,
}

/// State machine for assembling newline-terminated lines
#[derive(Debug, Clone)]
pub struct LineReader {
    state: ReadState,
    buffer: heapless::Vec<u8, MAX_LINE_LEN>,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create a new line reader
    pub const fn new() -> Self {
        Self {
            state: ReadState::Reading,
            buffer: heapless::Vec::new(),
        }
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.state = ReadState::Reading;
        self.buffer.clear();
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(line))` when a newline completes a line,
    /// `Ok(None)` when more bytes are needed, or `Err` once per overflowed
    /// or undecodable line. Empty lines are returned as empty strings so the
    /// caller decides whether to ignore them.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<MAX_LINE_LEN>>, LineError> {
        match (self.state, byte) {
            (ReadState::Discarding, b'\n') => {
                self.reset();
                Ok(None)
            }
            (ReadState::Discarding, _) => Ok(None),
            (ReadState::Reading, b'\n') => {
                let result = core::str::from_utf8(&self.buffer)
                    .map_err(|_| LineError::InvalidUtf8)
                    .and_then(|s| String::try_from(s.trim()).map_err(|_| LineError::Overflow));
                self.buffer.clear();
                result.map(Some)
            }
            (ReadState::Reading, b'\r') => Ok(None),
            (ReadState::Reading, _) => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = ReadState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }
}
