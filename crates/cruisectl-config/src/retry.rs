//! Graceful-then-forceful stop schedules.
//!
//! Schedules use the `start-stop-daemon --retry` notation: alternating signal
//! and timeout items separated by `/`, such as `TERM/30/KILL/5`. A bare
//! timeout `N` is shorthand for `TERM/N/KILL/N`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Signals understood by the supervisors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SignalName {
    /// Hangup; asks the daemon to reload its configuration.
    Hup,
    /// Interrupt.
    Int,
    /// Quit.
    Quit,
    /// Unconditional kill.
    Kill,
    /// User-defined signal 1.
    Usr1,
    /// User-defined signal 2.
    Usr2,
    /// Termination request.
    Term,
}

impl SignalName {
    /// Conventional Linux signal number.
    #[must_use]
    pub const fn number(self) -> i32 {
        match self {
            Self::Hup => 1,
            Self::Int => 2,
            Self::Quit => 3,
            Self::Kill => 9,
            Self::Usr1 => 10,
            Self::Usr2 => 12,
            Self::Term => 15,
        }
    }

    fn from_number(number: i32) -> Option<Self> {
        [
            Self::Hup,
            Self::Int,
            Self::Quit,
            Self::Kill,
            Self::Usr1,
            Self::Usr2,
            Self::Term,
        ]
        .into_iter()
        .find(|signal| signal.number() == number)
    }

    /// Parses a signal name (`TERM`, `SIGTERM`) or number (`15`).
    pub fn parse(input: &str) -> Result<Self, SignalNameParseError> {
        let trimmed = input.trim();
        if let Ok(number) = trimmed.parse::<i32>() {
            return Self::from_number(number)
                .ok_or_else(|| SignalNameParseError(trimmed.to_owned()));
        }
        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        Self::from_str(name).map_err(|_| SignalNameParseError(trimmed.to_owned()))
    }
}

/// Raised when a signal name cannot be recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown signal '{0}'")]
pub struct SignalNameParseError(pub String);

/// One step of a stop schedule: deliver `signal`, then wait up to `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStep {
    /// Signal delivered at the start of the step.
    pub signal: SignalName,
    /// How long to wait for the process to exit before moving on.
    pub timeout: Duration,
}

/// Ordered sequence of signal/timeout steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RetrySchedule {
    steps: Vec<RetryStep>,
}

impl RetrySchedule {
    /// Builds the common `TERM/<graceful>/KILL/<forceful>` schedule.
    #[must_use]
    pub fn graceful_then_forceful(graceful_secs: u64, forceful_secs: u64) -> Self {
        Self {
            steps: vec![
                RetryStep {
                    signal: SignalName::Term,
                    timeout: Duration::from_secs(graceful_secs),
                },
                RetryStep {
                    signal: SignalName::Kill,
                    timeout: Duration::from_secs(forceful_secs),
                },
            ],
        }
    }

    /// Steps in delivery order.
    #[must_use]
    pub fn steps(&self) -> &[RetryStep] {
        &self.steps
    }

    /// Sum of all step timeouts.
    #[must_use]
    pub fn total_timeout(&self) -> Duration {
        self.steps.iter().map(|step| step.timeout).sum()
    }
}

impl fmt::Display for RetrySchedule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            if !first {
                formatter.write_str("/")?;
            }
            first = false;
            write!(formatter, "{}/{}", step.signal, step.timeout.as_secs())?;
        }
        Ok(())
    }
}

impl FromStr for RetrySchedule {
    type Err = RetryScheduleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RetryScheduleError::Empty);
        }
        if let Ok(seconds) = trimmed.parse::<u64>() {
            return Ok(Self::graceful_then_forceful(seconds, seconds));
        }

        let mut items = trimmed.split('/');
        let mut steps = Vec::new();
        while let Some(signal) = items.next() {
            let signal = signal.trim();
            if signal.eq_ignore_ascii_case("forever") {
                return Err(RetryScheduleError::Forever);
            }
            let signal = SignalName::parse(signal.trim_start_matches('-'))?;
            let timeout = items.next().ok_or_else(|| RetryScheduleError::MissingTimeout {
                signal: signal.to_string(),
            })?;
            let seconds = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| RetryScheduleError::InvalidTimeout {
                    value: timeout.to_owned(),
                })?;
            steps.push(RetryStep {
                signal,
                timeout: Duration::from_secs(seconds),
            });
        }
        Ok(Self { steps })
    }
}

impl TryFrom<String> for RetrySchedule {
    type Error = RetryScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RetrySchedule> for String {
    fn from(schedule: RetrySchedule) -> Self {
        schedule.to_string()
    }
}

/// Errors raised while parsing a [`RetrySchedule`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetryScheduleError {
    /// The schedule was blank.
    #[error("stop schedule must not be empty")]
    Empty,
    /// A signal item was not followed by a timeout.
    #[error("signal {signal} in stop schedule has no timeout")]
    MissingTimeout { signal: String },
    /// A timeout item was not a whole number of seconds.
    #[error("invalid stop schedule timeout '{value}'")]
    InvalidTimeout { value: String },
    /// `forever` repetition is not supported.
    #[error("'forever' is not supported in stop schedules")]
    Forever,
    /// A signal item was not recognised.
    #[error(transparent)]
    Signal(#[from] SignalNameParseError),
}
