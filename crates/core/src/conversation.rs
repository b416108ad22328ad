//! Agent speaking state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Whether the agent is currently producing speech output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Agent is silent, user turns are answered
    #[default]
    Idle,
    /// Agent speech is playing, user speech may interrupt it
    Speaking,
}

impl AgentState {
    /// Check if the agent is speaking
    pub fn is_speaking(&self) -> bool {
        matches!(self, Self::Speaking)
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Speaking => "speaking",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "speaking" => Ok(Self::Speaking),
            other => Err(Error::Config(format!("Unknown agent state: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!("idle".parse::<AgentState>().unwrap(), AgentState::Idle);
        assert_eq!(" Speaking ".parse::<AgentState>().unwrap(), AgentState::Speaking);
        assert!("listening".parse::<AgentState>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&AgentState::Speaking).unwrap();
        assert_eq!(json, "\"speaking\"");
        let state: AgentState = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(state, AgentState::Idle);
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(AgentState::default(), AgentState::Idle);
        assert!(!AgentState::default().is_speaking());
    }
}
