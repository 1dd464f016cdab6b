//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

use thiserror::Error;
use time::{Date, Month};
use time::util::days_in_year_month;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("The value {0:?} is not a date.")]
    Malformed(String),
    #[error(transparent)]
    Range(#[from] time::error::ComponentRange),
}

/// Parses `YYYY-MM-DD`, `YYYY.MM.DD`, `YYYY/MM/DD` and `YYYYMMDD`.
/// A trailing time like `2024-01-01 09:00:00` or `2024-01-01T09:00` is ignored.
pub fn parse_date(value: &str) -> Result<Date, DateParseError> {
    let value = value.trim();
    let day_part = value
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.');

    let parts: Vec<&str> = if day_part.len() == 8 && day_part.bytes().all(|b| b.is_ascii_digit()) {
        vec![&day_part[0..4], &day_part[4..6], &day_part[6..8]]
    } else {
        day_part.split(['-', '.', '/']).map(str::trim).collect()
    };

    let [year, month, day] = parts.as_slice() else {
        return Err(DateParseError::Malformed(value.to_string()))
    };
    let malformed = || DateParseError::Malformed(value.to_string());
    let year: i32 = year.parse().map_err(|_| malformed())?;
    let month: u8 = month.parse().map_err(|_| malformed())?;
    let day: u8 = day.parse().map_err(|_| malformed())?;
    Ok(Date::from_calendar_date(year, Month::try_from(month)?, day)?)
}

/// Formats as `YYYYMMDD`
pub fn compact_date(date: Date) -> String {
    format!("{:04}{:02}{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Formats as `YYYY-MM-DD`
pub fn iso_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Adds calendar months, the day is clamped to the last day of the target month.
pub fn add_months(date: Date, months: u32) -> Date {
    let total = date.year() as i64 * 12 + (u8::from(date.month()) as i64 - 1) + months as i64;
    let year = total.div_euclid(12) as i32;
    // div_euclid keeps this in 1..=12
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8).unwrap_or(Month::December);
    let day = date.day().min(days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).unwrap_or(Date::MAX)
}

/// Serde support for dates as `YYYY-MM-DD` strings.
pub mod iso_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use super::*;

    #[test]
    fn parses_the_common_formats() {
        assert_eq!(date!(2024 - 01 - 05), parse_date("2024-01-05").unwrap());
        assert_eq!(date!(2024 - 01 - 05), parse_date("2024.01.05").unwrap());
        assert_eq!(date!(2024 - 01 - 05), parse_date("2024.1.5.").unwrap());
        assert_eq!(date!(2024 - 01 - 05), parse_date("20240105").unwrap());
        assert_eq!(date!(2024 - 01 - 05), parse_date("2024-01-05 09:30:00").unwrap());
        assert_eq!(date!(2024 - 01 - 05), parse_date("2024/01/05").unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("").is_err());
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2023-02-29").is_err());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(date!(2024 - 02 - 29), add_months(date!(2024 - 01 - 31), 1));
        assert_eq!(date!(2023 - 02 - 28), add_months(date!(2023 - 01 - 31), 1));
        assert_eq!(date!(2025 - 01 - 15), add_months(date!(2024 - 12 - 15), 1));
        assert_eq!(date!(2024 - 04 - 30), add_months(date!(2024 - 03 - 31), 1));
        assert_eq!(date!(2024 - 03 - 31), add_months(date!(2024 - 03 - 31), 0));
    }

    #[test]
    fn formats() {
        assert_eq!("20240105", compact_date(date!(2024 - 01 - 05)));
        assert_eq!("2024-01-05", iso_date(date!(2024 - 01 - 05)));
    }
}
