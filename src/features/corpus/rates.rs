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

use serde::{Deserialize, Serialize};
use time::Date;
use crate::features::corpus::dates::iso_format;

/// A daily call rate in percent.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateObservation {
    #[serde(with = "iso_format")]
    pub date: Date,
    pub rate: f64,
}

impl RateObservation {
    pub fn new(date: Date, rate: f64) -> Self {
        Self { date, rate }
    }
}

/// A series of rate observations, sorted ascending by date with unique dates.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct RateSeries {
    observations: Vec<RateObservation>
}

impl<'de> Deserialize<'de> for RateSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>
    {
        Ok(Self::new(Vec::<RateObservation>::deserialize(deserializer)?))
    }
}

impl RateSeries {
    /// Sorts the observations, for duplicate dates the last occurrence wins.
    pub fn new(mut observations: Vec<RateObservation>) -> Self {
        observations.retain(|value| value.rate.is_finite());
        // stable, duplicates keep their input order
        observations.sort_by_key(|value| value.date);
        let mut deduplicated: Vec<RateObservation> = Vec::with_capacity(observations.len());
        for observation in observations {
            match deduplicated.last_mut() {
                Some(last) if last.date == observation.date => *last = observation,
                _ => deduplicated.push(observation)
            }
        }
        Self { observations: deduplicated }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn observations(&self) -> &[RateObservation] {
        &self.observations
    }

    pub fn first(&self) -> Option<&RateObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&RateObservation> {
        self.observations.last()
    }

    /// The most recent observation at or before [date].
    pub fn at_or_before(&self, date: Date) -> Option<&RateObservation> {
        let idx = self.observations.partition_point(|value| value.date <= date);
        if idx == 0 {
            None
        } else {
            self.observations.get(idx - 1)
        }
    }
}

impl FromIterator<RateObservation> for RateSeries {
    fn from_iter<T: IntoIterator<Item=RateObservation>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use super::*;

    #[test]
    fn duplicates_keep_the_last_occurrence() {
        let series = RateSeries::new(vec![
            RateObservation::new(date!(2024 - 01 - 02), 3.4),
            RateObservation::new(date!(2024 - 01 - 01), 3.5),
            RateObservation::new(date!(2024 - 01 - 02), 3.6),
            RateObservation::new(date!(2024 - 01 - 03), f64::NAN),
        ]);
        assert_eq!(2, series.len());
        assert_eq!(date!(2024 - 01 - 01), series.observations()[0].date);
        assert_eq!(3.6, series.observations()[1].rate);
    }

    #[test]
    fn lookup_finds_the_last_observation_at_or_before() {
        let series = RateSeries::new(vec![
            RateObservation::new(date!(2024 - 01 - 01), 3.5),
            RateObservation::new(date!(2024 - 01 - 10), 3.25),
        ]);
        assert!(series.at_or_before(date!(2023 - 12 - 31)).is_none());
        assert_eq!(3.5, series.at_or_before(date!(2024 - 01 - 01)).unwrap().rate);
        assert_eq!(3.5, series.at_or_before(date!(2024 - 01 - 09)).unwrap().rate);
        assert_eq!(3.25, series.at_or_before(date!(2024 - 05 - 01)).unwrap().rate);
    }

    #[test]
    fn deserializing_sorts() {
        let series: RateSeries = serde_json::from_str(
            r#"[{"date": "2024-02-01", "rate": 3.6}, {"date": "2024-01-01", "rate": 3.5}]"#
        ).unwrap();
        assert_eq!(date!(2024 - 01 - 01), series.first().unwrap().date);
    }
}
