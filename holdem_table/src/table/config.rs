//! Table configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{
    GameSettings,
    constants::{DEFAULT_COUNTDOWN, MAX_TABLE_NAME_LENGTH},
    entities::Chips,
};

/// Table speed variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    #[default]
    Normal,
    Turbo,
    Hyper,
}

impl std::fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSpeed::Normal => write!(f, "normal"),
            TableSpeed::Turbo => write!(f, "turbo"),
            TableSpeed::Hyper => write!(f, "hyper"),
        }
    }
}

impl std::str::FromStr for TableSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(TableSpeed::Normal),
            "turbo" => Ok(TableSpeed::Turbo),
            "hyper" => Ok(TableSpeed::Hyper),
            other => Err(format!("Unknown table speed '{}'", other)),
        }
    }
}

impl TableSpeed {
    /// Countdown ticks a seat gets to act
    pub fn countdown_ticks(&self) -> u32 {
        match self {
            TableSpeed::Normal => DEFAULT_COUNTDOWN,
            TableSpeed::Turbo => 8,
            TableSpeed::Hyper => 4,
        }
    }
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Minimum buy-in in chips
    pub min_buy_in: Chips,

    /// Maximum buy-in in chips
    pub max_buy_in: Chips,

    /// Table speed
    pub speed: TableSpeed,

    /// Fixed shuffle seed for reproducible tables
    #[serde(default)]
    pub deck_seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            speed: TableSpeed::Normal,
            deck_seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.name.len() > MAX_TABLE_NAME_LENGTH {
            return Err(format!(
                "Table name must be between 1 and {} characters",
                MAX_TABLE_NAME_LENGTH
            ));
        }

        if self.small_blind == 0 {
            return Err("Small blind must be positive".to_string());
        }

        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }

        if self.max_buy_in < self.min_buy_in {
            return Err("Max buy-in must not be less than min buy-in".to_string());
        }

        // A seat has to be able to post the big blind.
        if self.min_buy_in < self.big_blind {
            return Err(format!(
                "Min buy-in ({}) must be at least the big blind ({})",
                self.min_buy_in, self.big_blind
            ));
        }

        Ok(())
    }

    /// Engine settings for this table
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            countdown_ticks: self.speed.countdown_ticks(),
            deck_seed: self.deck_seed,
            ..GameSettings::new(
                self.small_blind,
                self.big_blind,
                self.min_buy_in,
                self.max_buy_in,
            )
        }
    }
}
