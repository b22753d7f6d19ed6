use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::domain::ValidationError;

/// Day-of-week keys as they appear in stored opening hours.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

/// Minute-resolution time of day, rendered as `"HH:MM"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 5 {
            return Err(ValidationError::InvalidTime(s.to_owned()));
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidTime(s.to_owned()))
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Opening hours for a single weekday.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayHours {
    Open {
        #[serde_as(as = "DisplayFromStr")]
        open: TimeOfDay,
        #[serde_as(as = "DisplayFromStr")]
        close: TimeOfDay,
    },
    Closed { closed: bool },
}

impl DayHours {
    pub fn window(open: TimeOfDay, close: TimeOfDay) -> Self {
        DayHours::Open { open, close }
    }

    pub fn closed() -> Self {
        DayHours::Closed { closed: true }
    }
}

/// Weekly opening hours keyed by weekday. A missing weekday counts as closed.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpeningHours(BTreeMap<Weekday, DayHours>);

impl OpeningHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, weekday: Weekday, hours: DayHours) -> Self {
        self.0.insert(weekday, hours);
        self
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayHours> {
        self.0.get(&weekday)
    }

    /// Whether the venue is open at `time` on `weekday`.
    ///
    /// The open boundary is inclusive and the close boundary exclusive. A
    /// close time earlier than the open time is a window crossing midnight.
    pub fn is_open_at(&self, weekday: Weekday, time: TimeOfDay) -> bool {
        match self.0.get(&weekday) {
            Some(DayHours::Open { open, close }) => {
                if close >= open {
                    *open <= time && time < *close
                } else {
                    time >= *open || time < *close
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_closed_day_is_never_open() {
        let hours = OpeningHours::new().with(Weekday::Monday, DayHours::closed());
        assert!(!hours.is_open_at(Weekday::Monday, t("00:00")));
        assert!(!hours.is_open_at(Weekday::Monday, t("12:00")));
        assert!(!hours.is_open_at(Weekday::Monday, t("23:59")));
    }

    #[test]
    fn test_missing_day_is_never_open() {
        let hours = OpeningHours::new().with(
            Weekday::Monday,
            DayHours::window(t("12:00"), t("23:00")),
        );
        assert!(!hours.is_open_at(Weekday::Tuesday, t("12:00")));
    }

    #[test]
    fn test_same_day_window_boundaries() {
        let hours = OpeningHours::new().with(
            Weekday::Monday,
            DayHours::window(t("12:00"), t("23:00")),
        );
        assert!(hours.is_open_at(Weekday::Monday, t("12:00")));
        assert!(hours.is_open_at(Weekday::Monday, t("18:30")));
        assert!(!hours.is_open_at(Weekday::Monday, t("23:00")));
        assert!(!hours.is_open_at(Weekday::Monday, t("11:59")));
    }

    #[test]
    fn test_overnight_window_wraps_midnight() {
        let hours = OpeningHours::new().with(
            Weekday::Friday,
            DayHours::window(t("22:00"), t("02:00")),
        );
        assert!(hours.is_open_at(Weekday::Friday, t("23:30")));
        assert!(hours.is_open_at(Weekday::Friday, t("22:00")));
        assert!(hours.is_open_at(Weekday::Friday, t("01:00")));
        assert!(!hours.is_open_at(Weekday::Friday, t("02:00")));
        assert!(!hours.is_open_at(Weekday::Friday, t("12:00")));
        assert!(!hours.is_open_at(Weekday::Friday, t("21:59")));
    }

    #[test]
    fn test_time_of_day_rejects_loose_formats() {
        for input in ["9:00", "09:0", "25:00", "12:60", "12-00", "12:00:00"] {
            assert!(input.parse::<TimeOfDay>().is_err());
        }
    }

    #[test]
    fn test_day_hours_renders_minutes_only() {
        let hours = DayHours::window(t("22:05"), t("23:00"));
        assert_eq!(
            serde_json::to_string(&hours).unwrap(),
            r#"{"open":"22:05","close":"23:00"}"#
        );
    }

    #[test]
    fn test_day_hours_accepts_both_stored_shapes() {
        let open: DayHours =
            serde_json::from_str(r#"{"open":"10:00","close":"20:00"}"#).unwrap();
        assert_eq!(open, DayHours::window(t("10:00"), t("20:00")));
        let closed: DayHours = serde_json::from_str(r#"{"closed":true}"#).unwrap();
        assert_eq!(closed, DayHours::closed());
    }
}
