//! Core types for issdex

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Named fields of a stored game.
///
/// Index names double as the JSON keys of a hit's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameField {
    GameId,
    Forehand,
    Middlehand,
    Rearhand,
    CompleteGame,
}

impl GameField {
    /// Every field in schema order
    pub const ALL: [GameField; 5] = [
        GameField::GameId,
        GameField::Forehand,
        GameField::Middlehand,
        GameField::Rearhand,
        GameField::CompleteGame,
    ];

    /// The three player seats searched by an identity query
    pub const IDENTITY: [GameField; 3] = [
        GameField::Forehand,
        GameField::Middlehand,
        GameField::Rearhand,
    ];

    /// Field name inside the search index
    pub fn index_name(&self) -> &'static str {
        match self {
            Self::GameId => "gameID",
            Self::Forehand => "forehand",
            Self::Middlehand => "middlehand",
            Self::Rearhand => "rearhand",
            Self::CompleteGame => "completegame",
        }
    }

    /// Look a field up by its index name
    pub fn from_index_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.index_name() == name)
    }
}

impl fmt::Display for GameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

/// A single game record as stored and searched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDocument {
    /// Game identifier (`ID[...]`)
    #[serde(rename = "gameID", default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    /// Player in seat 0 (`P0[...]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forehand: Option<String>,
    /// Player in seat 1 (`P1[...]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlehand: Option<String>,
    /// Player in seat 2 (`P2[...]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rearhand: Option<String>,
    /// The raw record line, verbatim
    #[serde(rename = "completegame")]
    pub complete_game: String,
}

impl GameDocument {
    /// Create a document holding only the raw record
    pub fn new(complete_game: impl Into<String>) -> Self {
        Self {
            complete_game: complete_game.into(),
            ..Default::default()
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: GameField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Overwrite a field
    pub fn set(&mut self, field: GameField, value: impl Into<String>) {
        let value = value.into();
        match field {
            GameField::GameId => self.game_id = Some(value),
            GameField::Forehand => self.forehand = Some(value),
            GameField::Middlehand => self.middlehand = Some(value),
            GameField::Rearhand => self.rearhand = Some(value),
            GameField::CompleteGame => self.complete_game = value,
        }
    }

    /// Read a field, `None` if absent
    pub fn get(&self, field: GameField) -> Option<&str> {
        match field {
            GameField::GameId => self.game_id.as_deref(),
            GameField::Forehand => self.forehand.as_deref(),
            GameField::Middlehand => self.middlehand.as_deref(),
            GameField::Rearhand => self.rearhand.as_deref(),
            GameField::CompleteGame => Some(self.complete_game.as_str()),
        }
    }

    /// Read a field by its index name, e.g. `"forehand"`
    pub fn field(&self, name: &str) -> Option<&str> {
        GameField::from_index_name(name).and_then(|field| self.get(field))
    }

    /// Players that were present in the record, in seat order
    pub fn players(&self) -> impl Iterator<Item = &str> {
        GameField::IDENTITY
            .into_iter()
            .filter_map(move |field| self.get(field))
    }

    /// JSON source of the document, as the index stores it
    pub fn to_source(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.complete_game.clone())
    }
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Relevance score assigned by the engine
    pub score: f32,
    /// Stored document
    pub document: GameDocument,
}

impl Hit {
    /// Raw JSON source of the hit
    pub fn source(&self) -> String {
        self.document.to_source()
    }
}

/// Normalized result of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Total number of matching games
    pub total_hits: u64,
    /// Time the engine spent executing the query
    pub took: Duration,
    /// Best-scoring game, present iff `total_hits > 0`
    pub first_hit: Option<Hit>,
}

impl QueryResult {
    pub fn new(total_hits: u64, took: Duration, first_hit: Option<Hit>) -> Self {
        // A reported hit count without a retrievable hit still counts as a hit,
        // but a hit without a count never shows up.
        let first_hit = if total_hits > 0 { first_hit } else { None };
        Self {
            total_hits,
            took,
            first_hit,
        }
    }

    pub fn empty(took: Duration) -> Self {
        Self::new(0, took, None)
    }

    pub fn is_empty(&self) -> bool {
        self.total_hits == 0
    }

    pub fn took_millis(&self) -> u128 {
        self.took.as_millis()
    }
}
