use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Canceled,
    Expired,
    Paused,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Canceled => "canceled",
            AccountStatus::Expired => "expired",
            AccountStatus::Paused => "paused",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "canceled" => AccountStatus::Canceled,
            "expired" => AccountStatus::Expired,
            "paused" => AccountStatus::Paused,
            _ => AccountStatus::Active,
        }
    }
}

impl Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
