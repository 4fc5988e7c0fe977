use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    #[default]
    Free,
    OneTime,
    Unlimited,
    Subscription,
}

impl AccountTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountTier::Free => "free",
            AccountTier::OneTime => "one_time",
            AccountTier::Unlimited => "unlimited",
            AccountTier::Subscription => "subscription",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "one_time" => AccountTier::OneTime,
            "unlimited" => AccountTier::Unlimited,
            "subscription" => AccountTier::Subscription,
            _ => AccountTier::Free,
        }
    }
}

impl Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
