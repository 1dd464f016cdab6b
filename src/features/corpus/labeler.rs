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

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter};
use time::Date;
use crate::core::config::LabelingConfig;
use crate::features::corpus::dates::add_months;
use crate::features::corpus::rates::RateSeries;

/// The policy stance of a document or sentence.
/// Serialized as `0` (dovish) and `1` (hawkish).
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Display, EnumIter)]
pub enum Label {
    Dovish,
    Hawkish,
}

impl Label {
    /// The position in the class order `[Dovish, Hawkish]`.
    pub const fn index(self) -> usize {
        match self {
            Label::Dovish => 0,
            Label::Hawkish => 1,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Dovish),
            1 => Some(Label::Hawkish),
            _ => None
        }
    }

    pub const fn is_hawkish(self) -> bool {
        matches!(self, Label::Hawkish)
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index() as u8)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Label::from_index(value as usize).ok_or_else(|| {
            serde::de::Error::custom(format!("Expected 0 or 1 as label but got {value}"))
        })
    }
}

/// The outcome of labeling a date.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RateLabel {
    Labeled(Label),
    /// No rate was observed before the date or the horizon lies after the series.
    Unlabeled,
}

impl RateLabel {
    pub fn label(self) -> Option<Label> {
        match self {
            RateLabel::Labeled(label) => Some(label),
            RateLabel::Unlabeled => None
        }
    }
}

/// The rate diffs are rounded to this precision before comparing,
/// otherwise `3.53 - 3.50` would exceed a threshold of `0.03`.
const DIFF_PRECISION: f64 = 1e6;

/// Labels dates by the movement of the call rate over the following horizon.
#[derive(Debug, Copy, Clone)]
pub struct RateLabeler<'a> {
    series: &'a RateSeries,
    threshold: f64,
    horizon_months: u32,
}

impl<'a> RateLabeler<'a> {
    pub fn new(series: &'a RateSeries, config: &LabelingConfig) -> Self {
        Self {
            series,
            threshold: config.threshold,
            horizon_months: config.horizon_months,
        }
    }

    pub fn series(&self) -> &'a RateSeries {
        self.series
    }

    /// The rate in effect at [date].
    pub fn effective_rate(&self, date: Date) -> Option<f64> {
        self.series.at_or_before(date).map(|value| value.rate)
    }

    /// The rate in effect after the horizon. None if the horizon is not covered by the series.
    pub fn future_rate(&self, date: Date) -> Option<f64> {
        let target = add_months(date, self.horizon_months);
        if self.series.last()?.date < target {
            return None
        }
        self.effective_rate(target)
    }

    pub fn label_for(&self, date: Date) -> RateLabel {
        let Some(current) = self.effective_rate(date) else {
            return RateLabel::Unlabeled
        };
        let Some(future) = self.future_rate(date) else {
            return RateLabel::Unlabeled
        };
        let diff = ((future - current) * DIFF_PRECISION).round() / DIFF_PRECISION;
        if diff > self.threshold {
            RateLabel::Labeled(Label::Hawkish)
        } else if diff < -self.threshold {
            RateLabel::Labeled(Label::Dovish)
        } else {
            RateLabel::Unlabeled
        }
    }
}

/// Labels [date] with the default horizon of one month.
pub fn label_for(date: Date, series: &RateSeries, threshold: f64) -> RateLabel {
    RateLabeler::new(series, &LabelingConfig { threshold, ..LabelingConfig::default() }).label_for(date)
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use crate::core::config::pipeline::DEFAULT_RATE_THRESHOLD;
    use crate::features::corpus::rates::RateObservation;
    use super::*;

    fn series(values: &[(Date, f64)]) -> RateSeries {
        values.iter().map(|(date, rate)| RateObservation::new(*date, *rate)).collect()
    }

    #[test]
    fn labeling_is_deterministic() {
        let series = series(&[(date!(2024 - 01 - 01), 3.50), (date!(2024 - 02 - 01), 3.60)]);
        let first = label_for(date!(2024 - 01 - 01), &series, DEFAULT_RATE_THRESHOLD);
        let second = label_for(date!(2024 - 01 - 01), &series, DEFAULT_RATE_THRESHOLD);
        assert_eq!(first, second);
        assert_eq!(RateLabel::Labeled(Label::Hawkish), first);
    }

    #[test]
    fn threshold_is_strict() {
        let check = |future: f64| {
            let series = series(&[(date!(2024 - 01 - 01), 3.50), (date!(2024 - 02 - 01), future)]);
            label_for(date!(2024 - 01 - 01), &series, DEFAULT_RATE_THRESHOLD)
        };
        assert_eq!(RateLabel::Unlabeled, check(3.53));
        assert_eq!(RateLabel::Unlabeled, check(3.47));
        assert_eq!(RateLabel::Unlabeled, check(3.50));
        assert_eq!(RateLabel::Labeled(Label::Hawkish), check(3.5301));
        assert_eq!(RateLabel::Labeled(Label::Dovish), check(3.4699));
    }

    #[test]
    fn missing_observations_are_unlabeled() {
        let series = series(&[(date!(2024 - 01 - 10), 3.50), (date!(2024 - 02 - 10), 3.00)]);
        // nothing before the start
        assert_eq!(RateLabel::Unlabeled, label_for(date!(2024 - 01 - 01), &series, 0.03));
        // horizon after the end
        assert_eq!(RateLabel::Unlabeled, label_for(date!(2024 - 01 - 20), &series, 0.03));
        assert_eq!(RateLabel::Labeled(Label::Dovish), label_for(date!(2024 - 01 - 10), &series, 0.03));
        assert_eq!(RateLabel::Unlabeled, label_for(date!(2024 - 01 - 10), &RateSeries::default(), 0.03));
    }

    #[test]
    fn horizon_is_clamped_to_month_end() {
        let series = series(&[
            (date!(2024 - 01 - 31), 3.50),
            (date!(2024 - 02 - 29), 3.75),
            (date!(2024 - 03 - 01), 3.00),
        ]);
        assert_eq!(RateLabel::Labeled(Label::Hawkish), label_for(date!(2024 - 01 - 31), &series, 0.03));
    }

    #[test]
    fn labels_serialize_as_numbers() {
        assert_eq!("1", serde_json::to_string(&Label::Hawkish).unwrap());
        assert_eq!(Label::Dovish, serde_json::from_str::<Label>("0").unwrap());
        assert!(serde_json::from_str::<Label>("2").is_err());
    }
}
