//! Weekly opening-hours table and the single defaulting rule used by all providers.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

const DEFAULT_OPEN: &str = "08:00";
const DEFAULT_CLOSE: &str = "22:00";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub is_open: bool,
    /// Opening time as `HH:MM` (24h).
    pub open: String,
    /// Closing time as `HH:MM` (24h). Earlier than `open` means the range wraps past midnight.
    pub close: String,
}

impl DayHours {
    #[must_use]
    pub fn open(open: &str, close: &str) -> Self {
        Self {
            is_open: true,
            open: open.to_owned(),
            close: close.to_owned(),
        }
    }

    #[must_use]
    pub fn closed() -> Self {
        Self {
            is_open: false,
            open: DEFAULT_OPEN.to_owned(),
            close: DEFAULT_CLOSE.to_owned(),
        }
    }

    fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((parse_hhmm(&self.open)?, parse_hhmm(&self.close)?))
    }

    fn wraps_midnight(&self) -> bool {
        self.bounds().is_some_and(|(open, close)| close < open)
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self::open(DEFAULT_OPEN, DEFAULT_CLOSE)
    }
}

/// Seven-day hours table. `Default` is every day open 08:00–22:00.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklyHours {
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (&'static str, &DayHours)> {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
        .into_iter()
    }

    /// Whether the business is open at `time` on `weekday`.
    ///
    /// Ranges whose close is earlier than their open spill into the next
    /// day; equal open and close means open around the clock. Unparseable
    /// times count as closed.
    #[must_use]
    pub fn is_open_at(&self, weekday: Weekday, time: NaiveTime) -> bool {
        let today = self.day(weekday);
        if today.is_open {
            if let Some((open, close)) = today.bounds() {
                let open_now = match open.cmp(&close) {
                    std::cmp::Ordering::Less => open <= time && time < close,
                    std::cmp::Ordering::Greater => time >= open,
                    std::cmp::Ordering::Equal => true,
                };
                if open_now {
                    return true;
                }
            }
        }

        let yesterday = self.day(weekday.pred());
        yesterday.is_open
            && yesterday.wraps_midnight()
            && yesterday
                .bounds()
                .is_some_and(|(_, close)| time < close)
    }

    /// Checks every day's `open`/`close` strings are `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHours`] for the first malformed value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (day, hours) in self.days() {
            for value in [&hours.open, &hours.close] {
                if parse_hhmm(value).is_none() {
                    return Err(ValidationError::InvalidHours {
                        day,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}
