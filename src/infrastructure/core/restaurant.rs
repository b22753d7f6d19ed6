use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::domain::core::{
    Address, DayHours, OpeningHours, PriceRange, Restaurant, RestaurantDraft, RestaurantId,
    RestaurantRepository, Weekday,
};
use crate::domain::{DataAccessError, Entity};

/// In-memory restaurant collection. Contents live for the process only and
/// reset to the seed data on every restart.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRestaurantRepository {
    restaurants: Vec<Restaurant>,
}

impl InMemoryRestaurantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-populated with the seed collection.
    pub fn seeded() -> Self {
        Self {
            restaurants: SEED.clone(),
        }
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurantRepository {
    async fn next_id(&self) -> Result<RestaurantId, DataAccessError> {
        let max = self.restaurants.iter().map(|r| *r.id()).max().unwrap_or(0);
        Ok(RestaurantId::from(max + 1))
    }

    async fn find_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, DataAccessError> {
        Ok(self.restaurants.iter().find(|r| r.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Restaurant>, DataAccessError> {
        Ok(self.restaurants.clone())
    }

    async fn save(&mut self, entity: &Restaurant) -> Result<bool, DataAccessError> {
        match self.restaurants.iter_mut().find(|r| r.id() == entity.id()) {
            Some(stored) => {
                *stored = entity.clone();
                Ok(false)
            }
            None => {
                self.restaurants.push(entity.clone());
                Ok(true)
            }
        }
    }

    async fn delete(&mut self, id: RestaurantId) -> Result<bool, DataAccessError> {
        let before = self.restaurants.len();
        self.restaurants.retain(|r| r.id() != id);
        Ok(self.restaurants.len() < before)
    }
}

static SEED: Lazy<Vec<Restaurant>> = Lazy::new(seed_restaurants);

fn window(open: &str, close: &str) -> DayHours {
    DayHours::window(
        open.parse().expect("seed time"),
        close.parse().expect("seed time"),
    )
}

fn daily(open: &str, close: &str) -> OpeningHours {
    Weekday::ALL
        .iter()
        .fold(OpeningHours::new(), |hours, day| {
            hours.with(*day, window(open, close))
        })
}

fn seed_entry(id: u64, draft: RestaurantDraft) -> Restaurant {
    Restaurant::create(RestaurantId::from(id), draft).expect("seed restaurant is well-formed")
}

fn seed_restaurants() -> Vec<Restaurant> {
    vec![
        seed_entry(
            1,
            RestaurantDraft {
                name: "Da Mario".to_owned(),
                cuisine: "Italian".to_owned(),
                address: Address::from("Via Roma 12, Torino"),
                rating: Some(4.5),
                price_range: Some(PriceRange::Moderate),
                opening_hours: daily("12:00", "23:00").with(Weekday::Monday, DayHours::closed()),
                max_guests: 60,
                curr_guests: 0,
            },
        ),
        seed_entry(
            2,
            RestaurantDraft {
                name: "Sakura Garden".to_owned(),
                cuisine: "Japanese".to_owned(),
                address: Address::from("Cherry Lane 5, Kyoto"),
                rating: Some(4.8),
                price_range: Some(PriceRange::Expensive),
                opening_hours: daily("11:30", "22:00"),
                max_guests: 40,
                curr_guests: 0,
            },
        ),
        seed_entry(
            3,
            RestaurantDraft {
                name: "El Fuego".to_owned(),
                cuisine: "Mexican".to_owned(),
                address: Address::from("Calle Mayor 44, Madrid"),
                rating: Some(4.1),
                price_range: Some(PriceRange::Budget),
                opening_hours: daily("18:00", "01:00"),
                max_guests: 35,
                curr_guests: 0,
            },
        ),
        seed_entry(
            4,
            RestaurantDraft {
                name: "Le Petit Jardin".to_owned(),
                cuisine: "French".to_owned(),
                address: Address::from("Rue de la Paix 8, Paris"),
                rating: Some(4.7),
                price_range: Some(PriceRange::Luxury),
                opening_hours: daily("19:00", "23:30").with(Weekday::Sunday, DayHours::closed()),
                max_guests: 25,
                curr_guests: 0,
            },
        ),
        seed_entry(
            5,
            RestaurantDraft {
                name: "Spice Route".to_owned(),
                cuisine: "Indian".to_owned(),
                address: Address::from("Curry Street 21, London"),
                rating: Some(4.3),
                price_range: Some(PriceRange::Moderate),
                opening_hours: daily("12:00", "22:30"),
                max_guests: 55,
                curr_guests: 0,
            },
        ),
        seed_entry(
            6,
            RestaurantDraft {
                name: "Midnight Ramen".to_owned(),
                cuisine: "Japanese".to_owned(),
                address: Address::from("Night Market 3, Osaka"),
                rating: Some(4.0),
                price_range: Some(PriceRange::Budget),
                opening_hours: daily("22:00", "04:00"),
                max_guests: 18,
                curr_guests: 0,
            },
        ),
        seed_entry(
            7,
            RestaurantDraft {
                name: "Golden Dragon".to_owned(),
                cuisine: "Chinese".to_owned(),
                address: Address::from("Lantern Road 88, Shanghai"),
                rating: Some(3.9),
                price_range: Some(PriceRange::Moderate),
                opening_hours: daily("11:00", "22:00"),
                max_guests: 70,
                curr_guests: 0,
            },
        ),
        seed_entry(
            8,
            RestaurantDraft {
                name: "Olympos Taverna".to_owned(),
                cuisine: "Greek".to_owned(),
                address: Address::from("Harbour Walk 2, Athens"),
                rating: None,
                price_range: Some(PriceRange::Budget),
                opening_hours: daily("12:00", "00:00").with(Weekday::Tuesday, DayHours::closed()),
                max_guests: 45,
                curr_guests: 0,
            },
        ),
        seed_entry(
            9,
            RestaurantDraft {
                name: "Smokehouse 55".to_owned(),
                cuisine: "American Barbecue".to_owned(),
                address: Address::from("Rib Lane 55, Austin"),
                rating: Some(4.4),
                price_range: Some(PriceRange::Moderate),
                opening_hours: daily("17:00", "23:00"),
                max_guests: 80,
                curr_guests: 0,
            },
        ),
        seed_entry(
            10,
            RestaurantDraft {
                name: "Casa do Mar".to_owned(),
                cuisine: "Portuguese Seafood".to_owned(),
                address: Address::from("Avenida Atlantica 7, Lisbon"),
                rating: Some(4.6),
                price_range: Some(PriceRange::Expensive),
                opening_hours: daily("12:30", "23:00").with(Weekday::Monday, DayHours::closed()),
                max_guests: 30,
                curr_guests: 0,
            },
        ),
    ]
}
