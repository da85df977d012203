use serde::{Deserialize, Serialize};
use std::fmt;

/// States used when a request names none.
pub const DEFAULT_STATES: [&str; 5] = [
    "Maharashtra",
    "Karnataka",
    "Tamil Nadu",
    "Gujarat",
    "Uttar Pradesh",
];

/// Indian state or union territory, identified by its trimmed display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct State(String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn defaults() -> Vec<State> {
        DEFAULT_STATES.iter().map(|s| State::new(*s)).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        State::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        State::new(name)
    }
}

impl From<State> for String {
    fn from(state: State) -> Self {
        state.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
