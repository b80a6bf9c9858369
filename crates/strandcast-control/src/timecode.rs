//! SMPTE timecode listener.
//!
//! Show controllers broadcast a wall-clock position as `HH:MM:SS:FF` text
//! datagrams. The daemon only logs them today, but the listener keeps the
//! wire contract strict so cue support can build on it.

use std::fmt;
use std::net::{SocketAddr, UdpSocket};
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use tracing::{error, info, trace};

use crate::error::{ControlError, Result};

/// One `HH:MM:SS:FF` timecode value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    /// Hours, 0-23.
    pub hours: u8,
    /// Minutes, 0-59.
    pub minutes: u8,
    /// Seconds, 0-59.
    pub seconds: u8,
    /// Frame within the second, 0-59.
    pub frames: u8,
}

impl FromStr for Timecode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let malformed = || ControlError::MalformedTimecode(text.to_string());

        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 4 {
            return Err(malformed());
        }
        let field = |part: &str| part.parse::<u8>().map_err(|_| malformed());
        let hours = field(parts[0])?;
        let minutes = field(parts[1])?;
        let seconds = field(parts[2])?;
        let frames = field(parts[3])?;
        if hours > 23 || minutes > 59 || seconds > 59 || frames > 59 {
            return Err(malformed());
        }
        Ok(Timecode {
            hours,
            minutes,
            seconds,
            frames,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Timecode delivery callback.
pub type TimecodeCallback = Box<dyn Fn(Timecode) + Send>;

/// Receives timecode datagrams and delivers parsed values to a callback.
/// Malformed datagrams are dropped.
pub struct TimecodeListener {
    socket: UdpSocket,
    callback: TimecodeCallback,
}

impl TimecodeListener {
    /// Bind the timecode socket.
    pub fn bind<F>(addr: SocketAddr, callback: F) -> Result<Self>
    where
        F: Fn(Timecode) + Send + 'static,
    {
        let socket = UdpSocket::bind(addr)?;
        info!("timecode listener on {}", addr);
        Ok(Self {
            socket,
            callback: Box::new(callback),
        })
    }

    /// Spawn the listener thread, consuming the listener.
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(self) {
        let mut buf = [0u8; 64];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, _)) => {
                    let parsed = std::str::from_utf8(&buf[..len])
                        .ok()
                        .and_then(|text| text.parse::<Timecode>().ok());
                    match parsed {
                        Some(timecode) => (self.callback)(timecode),
                        None => trace!("dropping malformed timecode datagram"),
                    }
                }
                Err(e) => {
                    error!("timecode receive failed: {}", e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_timecode() {
        let timecode: Timecode = "01:02:03:04".parse().unwrap();
        assert_eq!(
            timecode,
            Timecode {
                hours: 1,
                minutes: 2,
                seconds: 3,
                frames: 4
            }
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let timecode: Timecode = "  23:59:59:29\n".parse().unwrap();
        assert_eq!(timecode.hours, 23);
        assert_eq!(timecode.frames, 29);
    }

    #[test]
    fn test_parse_rejects_out_of_range_fields() {
        assert!("24:00:00:00".parse::<Timecode>().is_err());
        assert!("00:60:00:00".parse::<Timecode>().is_err());
        assert!("00:00:60:00".parse::<Timecode>().is_err());
        assert!("00:00:00:60".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!("1:2:3".parse::<Timecode>().is_err());
        assert!("01-02-03-04".parse::<Timecode>().is_err());
        assert!("aa:bb:cc:dd".parse::<Timecode>().is_err());
        assert!("".parse::<Timecode>().is_err());
        assert!("01:02:03:04:05".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let timecode: Timecode = "09:08:07:06".parse().unwrap();
        assert_eq!(timecode.to_string(), "09:08:07:06");
    }
}
