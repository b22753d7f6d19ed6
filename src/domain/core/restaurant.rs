use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{DataAccessError, Entity, Id, ValidationError};

use super::{OpeningHours, TimeOfDay};

/// Restaurant repository trait.
#[async_trait]
pub trait RestaurantRepository {
    /// Returns the id the next inserted restaurant should receive.
    async fn next_id(&self) -> Result<RestaurantId, DataAccessError>;
    /// Finds a restaurant by id.
    async fn find_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, DataAccessError>;
    /// Returns every restaurant in insertion order.
    async fn list(&self) -> Result<Vec<Restaurant>, DataAccessError>;
    /// Inserts or replaces a restaurant; true when a new record was inserted.
    async fn save(&mut self, entity: &Restaurant) -> Result<bool, DataAccessError>;
    /// Removes a restaurant; true when a record was removed.
    async fn delete(&mut self, id: RestaurantId) -> Result<bool, DataAccessError>;
}

/// Restaurant id, assigned by the store on insertion.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Deref,
    Default,
)]
pub struct RestaurantId(u64);

impl Id for RestaurantId {
    type Inner = u64;
}

/// Price tier, rendered as dollar signs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceRange {
    fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Expensive => "$$$",
            PriceRange::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$" => Ok(PriceRange::Budget),
            "$$" => Ok(PriceRange::Moderate),
            "$$$" => Ok(PriceRange::Expensive),
            "$$$$" => Ok(PriceRange::Luxury),
            _ => Err(ValidationError::InvalidPriceRange(s.to_owned())),
        }
    }
}

/// Canonical street address, kept as a single rendered string.
///
/// Ingestion accepts either free text or the structured
/// `{street, number, city}` shape and normalizes immediately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AddressInput")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.trim().to_owned())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressInput {
    Structured {
        street: String,
        number: HouseNumber,
        city: String,
    },
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HouseNumber {
    Number(u64),
    Text(String),
}

impl fmt::Display for HouseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HouseNumber::Number(n) => n.fmt(f),
            HouseNumber::Text(s) => f.write_str(s),
        }
    }
}

impl From<AddressInput> for Address {
    fn from(value: AddressInput) -> Self {
        match value {
            AddressInput::Text(text) => Address::from(text),
            AddressInput::Structured {
                street,
                number,
                city,
            } => Address(format!("{} {}, {}", street.trim(), number, city.trim())),
        }
    }
}

const DEFAULT_MAX_GUESTS: u32 = 50;

fn default_max_guests() -> u32 {
    DEFAULT_MAX_GUESTS
}

/// Creation payload; the store assigns the id.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDraft {
    pub name: String,
    pub cuisine: String,
    pub address: Address,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, alias = "budget")]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub opening_hours: OpeningHours,
    #[serde(default = "default_max_guests")]
    pub max_guests: u32,
    #[serde(default)]
    pub curr_guests: u32,
}

/// Partial update; absent fields keep their stored value, the id is immutable.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, alias = "budget")]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub max_guests: Option<u32>,
    #[serde(default)]
    pub curr_guests: Option<u32>,
}

/// Restaurant entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    id: RestaurantId,
    name: String,
    cuisine: String,
    address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_range: Option<PriceRange>,
    #[serde(default)]
    opening_hours: OpeningHours,
    max_guests: u32,
    curr_guests: u32,
}

impl Restaurant {
    pub fn create(id: RestaurantId, draft: RestaurantDraft) -> Result<Self, ValidationError> {
        let entity = Restaurant {
            id,
            name: draft.name,
            cuisine: draft.cuisine,
            address: draft.address,
            rating: draft.rating,
            price_range: draft.price_range,
            opening_hours: draft.opening_hours,
            max_guests: draft.max_guests,
            curr_guests: draft.curr_guests,
        };
        entity.validate()?;
        Ok(entity)
    }

    /// Merges a patch into the entity; no field changes if the merge is invalid.
    pub fn apply_patch(&mut self, patch: RestaurantPatch) -> Result<(), ValidationError> {
        let mut updated = self.clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(cuisine) = patch.cuisine {
            updated.cuisine = cuisine;
        }
        if let Some(address) = patch.address {
            updated.address = address;
        }
        if let Some(rating) = patch.rating {
            updated.rating = Some(rating);
        }
        if let Some(price_range) = patch.price_range {
            updated.price_range = Some(price_range);
        }
        if let Some(opening_hours) = patch.opening_hours {
            updated.opening_hours = opening_hours;
        }
        if let Some(max_guests) = patch.max_guests {
            updated.max_guests = max_guests;
        }
        if let Some(curr_guests) = patch.curr_guests {
            updated.curr_guests = curr_guests;
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cuisine(&self) -> &str {
        &self.cuisine
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    pub fn price_range(&self) -> Option<PriceRange> {
        self.price_range
    }

    pub fn opening_hours(&self) -> &OpeningHours {
        &self.opening_hours
    }

    pub fn max_guests(&self) -> u32 {
        self.max_guests
    }

    pub fn curr_guests(&self) -> u32 {
        self.curr_guests
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.max_guests - self.curr_guests
    }

    /// Whether the restaurant is open at the given civil date and time (UTC calendar).
    pub fn is_open_at(&self, date: NaiveDate, time: TimeOfDay) -> bool {
        self.opening_hours.is_open_at(date.weekday().into(), time)
    }

    /// Case-insensitive substring match on the cuisine.
    pub fn matches_cuisine(&self, query: &str) -> bool {
        self.cuisine
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    /// Exact price tier equality; restaurants without a tier never match.
    pub fn matches_budget(&self, budget: PriceRange) -> bool {
        self.price_range == Some(budget)
    }

    /// Case-insensitive substring match on the rendered address.
    pub fn matches_location(&self, query: &str) -> bool {
        self.address
            .as_str()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    /// Whether a rating exists and meets the minimum.
    pub fn meets_rating(&self, minimum: f32) -> bool {
        self.rating.map_or(false, |rating| rating >= minimum)
    }

    /// Whether the remaining capacity can seat `guests` more people.
    pub fn has_capacity_for(&self, guests: u32) -> bool {
        self.remaining_capacity() >= guests
    }

    /// Seats `guests` more people, rejecting the request when it would
    /// overflow the capacity.
    pub fn receive_guests(&mut self, guests: u32) -> Result<(), RestaurantError> {
        let remaining = self.remaining_capacity();
        if guests > remaining {
            return Err(RestaurantError::CapacityExceeded {
                requested: guests,
                remaining,
            });
        }
        self.curr_guests += guests;
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Self::validate_not_blank(&self.name, "name")?;
        Self::validate_not_blank(&self.cuisine, "cuisine")?;
        Self::validate_not_blank(self.address.as_str(), "address")?;
        self.validate_rating()?;
        self.validate_guests()
    }

    fn validate_not_blank(value: &str, field: &'static str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::BlankField(field));
        }
        Ok(())
    }

    fn validate_rating(&self) -> Result<(), ValidationError> {
        match self.rating {
            Some(rating) if !(0.0..=5.0).contains(&rating) => {
                Err(ValidationError::InvalidRating(rating))
            }
            _ => Ok(()),
        }
    }

    fn validate_guests(&self) -> Result<(), ValidationError> {
        if self.curr_guests > self.max_guests {
            return Err(ValidationError::GuestsExceedCapacity);
        }
        Ok(())
    }
}

impl Entity for Restaurant {
    type Id = RestaurantId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Error, Display, Debug)]
pub enum RestaurantError {
    #[display(fmt = "Requested {} guests but only {} seats remain", requested, remaining)]
    CapacityExceeded { requested: u32, remaining: u32 },
}
