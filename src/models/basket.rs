//! Basket records keyed by their QR payload.
//!
//! A basket's `state` always reflects its item list: `Empty` exactly when
//! the list is empty. The item mutation paths only toggle `Empty`/`Full`;
//! an `InUse` marker survives until the next mutation, which resets it to
//! `Full` while the basket stays non-empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupancy state of a physical basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasketState {
    Empty,
    Full,
    InUse,
}

impl BasketState {
    /// Returns the persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasketState::Empty => "EMPTY",
            BasketState::Full => "FULL",
            BasketState::InUse => "IN_USE",
        }
    }

    /// Parse from the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EMPTY" => Some(BasketState::Empty),
            "FULL" => Some(BasketState::Full),
            "IN_USE" => Some(BasketState::InUse),
            _ => None,
        }
    }

    /// Human-readable label for presentation use.
    pub fn label(&self) -> &'static str {
        match self {
            BasketState::Empty => "Empty",
            BasketState::Full => "Full",
            BasketState::InUse => "In use",
        }
    }
}

impl fmt::Display for BasketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A basket record. The id is the QR payload printed on the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Stable id, equals the QR payload, unique per store
    pub id: String,
    /// Occupancy state, kept in sync with `items`
    pub state: BasketState,
    /// Item names in insertion order; duplicates permitted
    pub items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Basket {
    /// Creates a new empty basket.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: BasketState::Empty,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the item list and recomputes the state.
    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self.refresh_state();
        self
    }

    /// Overrides the state. The caller keeps the empty-iff-no-items
    /// invariant; used for seeding `InUse` baskets.
    pub fn with_state(mut self, state: BasketState) -> Self {
        self.state = state;
        self
    }

    /// Appends an item and recomputes the state.
    pub fn push_item(&mut self, name: impl Into<String>) {
        self.items.push(name.into());
        self.refresh_state();
    }

    /// Removes the first occurrence of `name`, recomputing the state.
    /// Returns whether anything was removed.
    pub fn remove_item(&mut self, name: &str) -> bool {
        let removed = match self.items.iter().position(|item| item == name) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        };
        self.refresh_state();
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bumps `updated_at` ahead of a write.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // Mutations only toggle Empty/Full; InUse is reset to Full here.
    fn refresh_state(&mut self) {
        self.state = if self.items.is_empty() {
            BasketState::Empty
        } else {
            BasketState::Full
        };
    }
}
