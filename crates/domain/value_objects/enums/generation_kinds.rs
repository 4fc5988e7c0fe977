use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Song,
    Prayer,
    Meditation,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Song => "song",
            GenerationKind::Prayer => "prayer",
            GenerationKind::Meditation => "meditation",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "song" => Some(GenerationKind::Song),
            "prayer" => Some(GenerationKind::Prayer),
            "meditation" => Some(GenerationKind::Meditation),
            _ => None,
        }
    }
}

impl Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
