use derive_more::{Display, Error};
use serde::Deserialize;

use crate::domain::core::{Restaurant, RestaurantError, RestaurantId, RestaurantRepository};
use crate::domain::{parse_upcoming_date, DataAccessError, ValidationError};

/// Reservation request. Only its side effect on the restaurant's guest
/// counter is retained; there is no stored reservation record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub restaurant_id: RestaurantId,
    pub date: String,
    pub time: String,
    pub num_guests: u32,
}

#[derive(Error, Display, Debug)]
pub enum ReserveError {
    #[display(fmt = "{}", _0)]
    Validation(#[error(source)] ValidationError),
    #[display(fmt = "Restaurant {} not found", _0)]
    RestaurantNotFound(#[error(not(source))] RestaurantId),
    #[display(fmt = "The restaurant is not open at the requested date and time")]
    Closed,
    #[display(fmt = "Requested {} guests but only {} seats remain", requested, remaining)]
    CapacityExceeded { requested: u32, remaining: u32 },
    #[display(fmt = "{}", _0)]
    DataAccess(#[error(source)] DataAccessError),
}

impl From<ValidationError> for ReserveError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DataAccessError> for ReserveError {
    fn from(value: DataAccessError) -> Self {
        Self::DataAccess(value)
    }
}

impl From<RestaurantError> for ReserveError {
    fn from(value: RestaurantError) -> Self {
        match value {
            RestaurantError::CapacityExceeded {
                requested,
                remaining,
            } => Self::CapacityExceeded {
                requested,
                remaining,
            },
        }
    }
}

/// Seats `num_guests` at the requested restaurant, mutating the stored
/// record only when every check passes.
///
/// Checks run in order and short-circuit: input validation, date not in the
/// past, restaurant exists, open at the requested date/time, capacity.
pub async fn reserve<R>(
    repository: &mut R,
    request: ReservationRequest,
) -> Result<Restaurant, ReserveError>
where
    R: RestaurantRepository + Send + Sync,
{
    if request.num_guests == 0 {
        return Err(ValidationError::InvalidGuestCount.into());
    }
    let date = parse_upcoming_date(&request.date)?;
    let time = request.time.parse()?;
    let mut restaurant = repository
        .find_by_id(request.restaurant_id)
        .await?
        .ok_or(ReserveError::RestaurantNotFound(request.restaurant_id))?;
    if !restaurant.is_open_at(date, time) {
        return Err(ReserveError::Closed);
    }
    restaurant.receive_guests(request.num_guests)?;
    repository.save(&restaurant).await?;
    Ok(restaurant)
}
