use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Store-native identifier of a clothing item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClothingId(pub Uuid);

impl ClothingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClothingId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClothingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClothingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A clothing row as the store holds it
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClothingRecord {
    pub id: Uuid,
    pub name: String,
    pub weather_conditions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A clothing recommendation returned to the client
///
/// The identifier is always the string form of the store's native id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub weather_conditions: Vec<String>,
}

impl From<ClothingRecord> for ClothingItem {
    fn from(record: ClothingRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            weather_conditions: record.weather_conditions,
        }
    }
}

/// Validated input for creating an item
#[derive(Debug, Clone, PartialEq)]
pub struct NewClothingItem {
    pub name: String,
    pub weather_conditions: Vec<String>,
}

impl NewClothingItem {
    pub fn new(name: impl Into<String>, weather_conditions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            weather_conditions: dedup_conditions(weather_conditions),
        }
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClothingPatch {
    pub name: Option<String>,
    pub weather_conditions: Option<Vec<String>>,
}

impl ClothingPatch {
    pub fn new(name: Option<String>, weather_conditions: Option<Vec<String>>) -> Self {
        Self {
            name,
            weather_conditions: weather_conditions.map(dedup_conditions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.weather_conditions.is_none()
    }

    /// Applies the patch to a record in place
    pub fn apply(&self, record: &mut ClothingRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(conditions) = &self.weather_conditions {
            record.weather_conditions = conditions.clone();
        }
    }
}

/// Set-membership filter over `weather_conditions`
///
/// An item matches when its conditions contain any of the filter tokens.
/// Tokens are compared exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFilter {
    tokens: Vec<String>,
}

impl ConditionFilter {
    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: dedup_conditions(tokens.into_iter().map(Into::into).collect()),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn matches(&self, weather_conditions: &[String]) -> bool {
        weather_conditions
            .iter()
            .any(|condition| self.tokens.contains(condition))
    }
}

/// Removes repeated tokens, keeping the first occurrence
fn dedup_conditions(conditions: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(conditions.len());
    for condition in conditions {
        if !unique.contains(&condition) {
            unique.push(condition);
        }
    }
    unique
}
