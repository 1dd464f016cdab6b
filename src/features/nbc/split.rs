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

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use strum::IntoEnumIterator;
use crate::features::corpus::Label;
use crate::features::nbc::error::TrainingError;

/// The indices of a train/test split, both sorted ascending.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits the indices of [labels] per class.
///
/// Every class contributes `round(class size * test_fraction)` examples to the test split,
/// chosen by shuffling the class with a [StdRng] seeded with [seed]. The largest class is
/// adjusted so that the test split holds `ceil(len * test_fraction)` examples.
/// Fails if a class would end up without a train or test example.
pub fn stratified_split(labels: &[Label], test_fraction: f64, seed: u64) -> Result<TrainTestSplit, TrainingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainingError::InvalidTestFraction(test_fraction))
    }
    if labels.is_empty() {
        return Err(TrainingError::EmptyCorpus)
    }

    let mut classes: Vec<(Label, Vec<usize>, usize)> = Label::iter()
        .map(|label| {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, value)| **value == label)
                .map(|(idx, _)| idx)
                .collect();
            let test_count = (members.len() as f64 * test_fraction).round() as usize;
            (label, members, test_count)
        })
        .filter(|(_, members, _)| !members.is_empty())
        .collect();

    // the rounding error goes to the largest class
    let expected = (labels.len() as f64 * test_fraction - 1e-9).ceil() as usize;
    let assigned: usize = classes.iter().map(|(_, _, test_count)| *test_count).sum();
    if let Some((_, _, test_count)) = classes.iter_mut().max_by_key(|(_, members, _)| members.len()) {
        *test_count = (*test_count + expected).saturating_sub(assigned);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(expected);

    for (label, mut members, test_count) in classes {
        let available = members.len();
        if test_count == 0 || test_count >= available {
            return Err(
                TrainingError::InfeasibleSplit {
                    label,
                    available,
                    test_fraction,
                    test: test_count,
                    train: available.saturating_sub(test_count),
                }
            )
        }
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..test_count]);
        train.extend_from_slice(&members[test_count..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

#[cfg(test)]
mod test {
    use super::*;

    fn labels(hawkish: usize, dovish: usize) -> Vec<Label> {
        let mut result = vec![Label::Hawkish; hawkish];
        result.extend(vec![Label::Dovish; dovish]);
        // interleave a bit
        result.rotate_left(hawkish / 2);
        result
    }

    #[test]
    fn splits_are_reproducible_and_disjoint() {
        let labels = labels(120, 280);
        let a = stratified_split(&labels, 0.1, 33).unwrap();
        let b = stratified_split(&labels, 0.1, 33).unwrap();
        let c = stratified_split(&labels, 0.1, 34).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(40, a.test.len());
        assert_eq!(360, a.train.len());
        assert!(a.test.iter().all(|idx| a.train.binary_search(idx).is_err()));
    }

    #[test]
    fn test_splits_keep_the_class_balance() {
        let labels = labels(333, 667);
        let corpus_share = 333.0 / 1000.0;
        for seed in 33..63 {
            let split = stratified_split(&labels, 0.1, seed).unwrap();
            let hawkish = split.test.iter().filter(|idx| labels[**idx].is_hawkish()).count();
            let share = hawkish as f64 / split.test.len() as f64;
            assert!((share - corpus_share).abs() <= 0.02, "seed {seed}: {share}");
        }
    }

    #[test]
    fn infeasible_splits_fail() {
        let labels = labels(3, 100);
        assert!(matches!(
            stratified_split(&labels, 0.1, 33),
            Err(TrainingError::InfeasibleSplit { label: Label::Hawkish, available: 3, test: 0, .. })
        ));
        assert_eq!(Err(TrainingError::InvalidTestFraction(1.0)), stratified_split(&labels, 1.0, 33));
        assert_eq!(Err(TrainingError::EmptyCorpus), stratified_split(&[], 0.1, 33));
    }
}
