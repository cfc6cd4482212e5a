//! Data structures describing a Pokemon as returned by PokeAPI.
//!
//! Only the fields the report needs are modelled. Everything else in the API
//! payload is ignored during deserialization so upstream additions never break
//! parsing.

use serde::{Deserialize, Serialize};

/// A named reference to another API resource, e.g. `{"name": "static", "url": "..."}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

impl NamedResource {
    /// Creates a resource reference with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One entry of the `abilities` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

impl AbilitySlot {
    /// Creates an ability slot wrapping the named ability.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ability: NamedResource::new(name),
        }
    }
}

/// The attributes of a single Pokemon.
///
/// Height is measured in decimetres and weight in hectograms, matching the units
/// PokeAPI reports. Only `name` is required; the other fields default to zero or
/// empty when a response leaves them out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
}

impl EntityRecord {
    /// Returns the ability names in the order the API listed them.
    pub fn ability_names(&self) -> impl Iterator<Item = &str> {
        self.abilities.iter().map(|slot| slot.ability.name.as_str())
    }
}
