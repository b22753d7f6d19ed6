use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{parse_upcoming_date, ValidationError};

use super::{PriceRange, Restaurant, TimeOfDay};

/// Conjunctive search criteria; an absent field imposes no constraint.
///
/// Deserializes directly from the query string of the search endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub budget: Option<PriceRange>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub num_guests: Option<u32>,
}

impl SearchCriteria {
    /// Validates the date/time pair. Both must be present or both absent;
    /// the date must be well-formed and not in the past.
    fn open_at(&self) -> Result<Option<(NaiveDate, TimeOfDay)>, ValidationError> {
        match (self.date.as_deref(), self.time.as_deref()) {
            (None, None) => Ok(None),
            (Some(date), Some(time)) => Ok(Some((parse_upcoming_date(date)?, time.parse()?))),
            _ => Err(ValidationError::UnpairedDateTime),
        }
    }

    fn matches(&self, restaurant: &Restaurant, open_at: Option<(NaiveDate, TimeOfDay)>) -> bool {
        if let Some(cuisine) = &self.cuisine {
            if !restaurant.matches_cuisine(cuisine) {
                return false;
            }
        }
        if let Some((date, time)) = open_at {
            if !restaurant.is_open_at(date, time) {
                return false;
            }
        }
        if let Some(budget) = self.budget {
            if !restaurant.matches_budget(budget) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !restaurant.matches_location(location) {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if !restaurant.meets_rating(rating) {
                return false;
            }
        }
        if let Some(num_guests) = self.num_guests {
            if !restaurant.has_capacity_for(num_guests) {
                return false;
            }
        }
        true
    }
}

/// Filters the collection by every present criterion, preserving input order.
/// An invalid criterion aborts the whole search; an empty result does not.
pub fn search(
    collection: &[Restaurant],
    criteria: &SearchCriteria,
) -> Result<Vec<Restaurant>, ValidationError> {
    if criteria.num_guests == Some(0) {
        return Err(ValidationError::InvalidGuestCount);
    }
    let open_at = criteria.open_at()?;
    Ok(collection
        .iter()
        .filter(|restaurant| criteria.matches(restaurant, open_at))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::{
        Address, DayHours, OpeningHours, RestaurantDraft, RestaurantId, Weekday,
    };
    use crate::domain::Entity;

    fn restaurant(
        id: u64,
        name: &str,
        cuisine: &str,
        address: &str,
        rating: Option<f32>,
        price_range: Option<PriceRange>,
        free_seats: u32,
    ) -> Restaurant {
        Restaurant::create(
            RestaurantId::from(id),
            RestaurantDraft {
                name: name.to_owned(),
                cuisine: cuisine.to_owned(),
                address: Address::from(address),
                rating,
                price_range,
                opening_hours: OpeningHours::new().with(
                    Weekday::Monday,
                    DayHours::window("12:00".parse().unwrap(), "23:00".parse().unwrap()),
                ),
                max_guests: free_seats,
                curr_guests: 0,
            },
        )
        .unwrap()
    }

    fn collection() -> Vec<Restaurant> {
        vec![
            restaurant(
                1,
                "Da Mario",
                "Italian",
                "Via Roma 1, Torino",
                Some(4.5),
                Some(PriceRange::Moderate),
                30,
            ),
            restaurant(
                2,
                "Sakura",
                "Japanese",
                "Cherry Lane 5, Kyoto",
                Some(4.8),
                Some(PriceRange::Expensive),
                12,
            ),
            restaurant(
                3,
                "Trattoria Nonna",
                "Italian",
                "Main Street 9, Rome",
                None,
                Some(PriceRange::Budget),
                6,
            ),
        ]
    }

    fn ids(restaurants: &[Restaurant]) -> Vec<u64> {
        restaurants.iter().map(|r| *r.id()).collect()
    }

    #[test]
    fn test_no_criteria_returns_all_in_order() {
        let data = collection();
        let found = search(&data, &SearchCriteria::default()).unwrap();
        assert_eq!(ids(&found), vec![1, 2, 3]);
    }

    #[test]
    fn test_criteria_are_conjunctive_and_order_preserving() {
        let data = collection();
        let criteria = SearchCriteria {
            cuisine: Some("italian".to_owned()),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![1, 3]);

        let criteria = SearchCriteria {
            cuisine: Some("italian".to_owned()),
            num_guests: Some(10),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![1]);
    }

    #[test]
    fn test_empty_result_is_ok() {
        let data = collection();
        let criteria = SearchCriteria {
            cuisine: Some("ethiopian".to_owned()),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&data, &criteria).unwrap(), Vec::new());
    }

    #[test]
    fn test_budget_and_rating_filters() {
        let data = collection();
        let criteria = SearchCriteria {
            budget: Some(PriceRange::Expensive),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![2]);

        // An unrated restaurant never meets a minimum rating.
        let criteria = SearchCriteria {
            rating: Some(0.0),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_location_filter_matches_rendered_address() {
        let data = collection();
        let criteria = SearchCriteria {
            location: Some("rome".to_owned()),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![3]);
    }

    #[test]
    fn test_unpaired_date_or_time_is_rejected() {
        let data = collection();
        let criteria = SearchCriteria {
            date: Some("2999-01-01".to_owned()),
            ..SearchCriteria::default()
        };
        assert!(matches!(
            search(&data, &criteria),
            Err(ValidationError::UnpairedDateTime)
        ));

        let criteria = SearchCriteria {
            time: Some("13:00".to_owned()),
            ..SearchCriteria::default()
        };
        assert!(matches!(
            search(&data, &criteria),
            Err(ValidationError::UnpairedDateTime)
        ));
    }

    #[test]
    fn test_malformed_or_past_date_aborts_search() {
        let data = collection();
        let criteria = SearchCriteria {
            date: Some("2024-13-01".to_owned()),
            time: Some("13:00".to_owned()),
            ..SearchCriteria::default()
        };
        assert!(matches!(
            search(&data, &criteria),
            Err(ValidationError::InvalidDate(_))
        ));

        let criteria = SearchCriteria {
            date: Some("2000-01-01".to_owned()),
            time: Some("13:00".to_owned()),
            ..SearchCriteria::default()
        };
        assert!(matches!(
            search(&data, &criteria),
            Err(ValidationError::PastDate(_))
        ));
    }

    #[test]
    fn test_open_at_filter_applies_weekday_hours() {
        let data = collection();
        // Find an upcoming Monday; the fixtures are open Mondays 12:00-23:00.
        let mut date = chrono::Utc::now().date_naive() + chrono::Duration::days(7);
        while Weekday::from(chrono::Datelike::weekday(&date)) != Weekday::Monday {
            date = date.succ_opt().unwrap();
        }
        let date = date.format("%Y-%m-%d").to_string();

        let criteria = SearchCriteria {
            date: Some(date.clone()),
            time: Some("13:00".to_owned()),
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&search(&data, &criteria).unwrap()), vec![1, 2, 3]);

        let criteria = SearchCriteria {
            date: Some(date),
            time: Some("23:00".to_owned()),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&data, &criteria).unwrap(), Vec::new());
    }

    #[test]
    fn test_zero_guests_is_rejected() {
        let data = collection();
        let criteria = SearchCriteria {
            num_guests: Some(0),
            ..SearchCriteria::default()
        };
        assert!(matches!(
            search(&data, &criteria),
            Err(ValidationError::InvalidGuestCount)
        ));
    }
}
