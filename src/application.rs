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

use std::collections::HashSet;
use std::fmt::Formatter;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;
use crate::core::config::Configs;
use crate::core::io::artifacts::{read_json, write_bincode, write_csv, write_json, write_json_pretty, write_lines};
use crate::core::io::ArtifactError;
use crate::features::corpus::input::{load_documents, load_rate_series, InputError};
use crate::features::corpus::{assemble, AssembledCorpus, AssemblyError, Label, LabeledDocument};
use crate::features::nbc::{BaggedTrainer, TrainingError, TrainingOutcome};
use crate::features::ngrams::{Extraction, ExtractionError, NgramExtractor, SentenceNgrams};
use crate::features::sentences::{split_corpus, Sentence, SentenceCorpus, SentenceSplitter};
use crate::features::tokenizing::{create_tagger, TaggerError};

/// The stages of the pipeline in execution order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Assemble,
    Split,
    Extract,
    Train,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display)]
pub enum StageStatus {
    Succeeded,
    Failed,
}

/// The outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Records read by the stage
    pub processed: usize,
    /// Records filtered by the rules of the stage
    pub dropped: usize,
    /// Records rejected because they were malformed
    pub errors: usize,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StageReport {
    fn succeeded(stage: Stage, processed: usize, dropped: usize, errors: usize) -> Self {
        Self { stage, processed, dropped, errors, status: StageStatus::Succeeded, message: None }
    }

    fn failed(stage: Stage, error: &PipelineError) -> Self {
        Self { stage, processed: 0, dropped: 0, errors: 0, status: StageStatus::Failed, message: Some(error.to_string()) }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Succeeded
    }
}

impl std::fmt::Display for StageReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<8} {:<9} processed: {:>7}, dropped: {:>7}, errors: {:>5}",
            self.stage, self.status, self.processed, self.dropped, self.errors
        )?;
        if let Some(ref message) = self.message {
            write!(f, " - {message}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No rate series is configured (paths.rates).")]
    MissingRates,
    #[error("No document inputs are configured (paths.documents).")]
    MissingDocuments,
    #[error("Failed to load {path}: {source}")]
    Input {
        path: Utf8PathBuf,
        #[source]
        source: InputError,
    },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Tagger(#[from] TaggerError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// The reports of a pipeline run and the error that stopped it.
#[derive(Debug)]
pub struct PipelineRun {
    pub reports: Vec<StageReport>,
    pub error: Option<PipelineError>,
}

impl PipelineRun {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the stages, every stage materializes its output under the root path.
#[derive(Debug, Clone)]
pub struct Pipeline {
    configs: Configs,
}

impl Pipeline {
    pub fn new(configs: Configs) -> Self {
        Self { configs }
    }

    pub fn configs(&self) -> &Configs {
        &self.configs
    }

    /// Loads the inputs, labels the documents and writes the corpus.
    pub fn assemble(&self) -> Result<(AssembledCorpus, StageReport), PipelineError> {
        let paths = &self.configs.paths;
        let rates_path = paths.rates.as_ref().ok_or(PipelineError::MissingRates)?;
        if paths.documents.is_empty() {
            return Err(PipelineError::MissingDocuments)
        }
        let (rates, rejected_rates) = load_rate_series(rates_path)
            .map_err(|source| PipelineError::Input { path: rates_path.clone(), source })?;

        let mut documents = Vec::new();
        let mut rejected = rejected_rates;
        for input in &paths.documents {
            let loaded = load_documents(input)
                .map_err(|source| PipelineError::Input { path: input.path.clone(), source })?;
            rejected += loaded.rejected;
            documents.extend(loaded.values);
        }

        let corpus = assemble(documents, &rates, &self.configs.labeling)?;
        write_json(paths.file_corpus(), &corpus.documents)?;

        let report = StageReport::succeeded(
            Stage::Assemble,
            corpus.stats.processed,
            corpus.stats.dropped_empty + corpus.stats.dropped_unlabeled,
            rejected,
        );
        Ok((corpus, report))
    }

    /// Splits the documents and writes the sentences with their statistics.
    pub fn split(&self, documents: &[LabeledDocument]) -> Result<(SentenceCorpus, StageReport), PipelineError> {
        let splitter = SentenceSplitter::new(&self.configs.splitting);
        let corpus = split_corpus(documents, &splitter);
        write_json(self.configs.paths.file_sentence_corpus(), &corpus.sentences)?;
        write_json_pretty(self.configs.paths.file_sentence_stats(), &corpus.stats)?;
        let without_sentences = documents.len() - corpus.sentences.iter().map(|value| value.document_key).collect::<HashSet<_>>().len();
        let report = StageReport::succeeded(Stage::Split, documents.len(), without_sentences, 0);
        Ok((corpus, report))
    }

    /// Extracts the n-grams and writes them with the vocabulary.
    pub fn extract(&self, sentences: &[Sentence]) -> Result<(Extraction, StageReport), PipelineError> {
        let tagger = create_tagger(&self.configs.extraction)?;
        let extractor = NgramExtractor::new(tagger, self.configs.extraction.clone());
        let extraction = extractor.extract(sentences)?;
        let paths = &self.configs.paths;
        write_json(paths.file_sentence_ngrams(), &extraction.sentences)?;
        write_csv(paths.file_vocabulary(), extraction.vocabulary.entries())?;
        write_json_pretty(paths.file_extraction_stats(), &extraction.stats)?;
        let report = StageReport::succeeded(
            Stage::Extract,
            extraction.stats.total_sentences,
            extraction.stats.total_sentences - extraction.stats.sentences_with_ngrams,
            0,
        );
        Ok((extraction, report))
    }

    /// Trains the ensemble and writes the model with the polarity lexicon.
    /// Sentences without n-grams carry no features and are dropped.
    pub fn train(&self, sentences: &[SentenceNgrams]) -> Result<(TrainingOutcome, StageReport), PipelineError> {
        let trainer = BaggedTrainer::new(self.configs.bagging, self.configs.system.threads)?;
        let dropped = sentences.iter().filter(|sentence| sentence.ngrams.is_empty()).count();
        let outcome = if dropped == 0 {
            trainer.train_and_evaluate(sentences)?
        } else {
            log::warn!("Dropping {dropped} sentences without n-grams before training.");
            let usable: Vec<SentenceNgrams> = sentences
                .iter()
                .filter(|sentence| !sentence.ngrams.is_empty())
                .cloned()
                .collect();
            trainer.train_and_evaluate(&usable)?
        };
        let paths = &self.configs.paths;
        write_bincode(paths.file_ensemble(), &outcome.artifact)?;
        write_csv(paths.file_polarity(), outcome.polarity.entries())?;
        write_lines(paths.file_hawkish_ngrams(), outcome.polarity.top_list(Label::Hawkish))?;
        write_lines(paths.file_dovish_ngrams(), outcome.polarity.top_list(Label::Dovish))?;
        write_json_pretty(paths.file_model_stats(), &outcome.stats)?;
        write_json(paths.file_pr_curve(), &outcome.pr_curve)?;
        let report = StageReport::succeeded(Stage::Train, sentences.len(), dropped, 0);
        Ok((outcome, report))
    }

    /// Runs a single stage on the materialized output of its predecessor.
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport, PipelineError> {
        log::info!("Starting stage {stage}.");
        let paths = &self.configs.paths;
        let report = match stage {
            Stage::Assemble => self.assemble()?.1,
            Stage::Split => {
                let documents: Vec<LabeledDocument> = read_json(paths.file_corpus())?;
                self.split(&documents)?.1
            }
            Stage::Extract => {
                let sentences: Vec<Sentence> = read_json(paths.file_sentence_corpus())?;
                self.extract(&sentences)?.1
            }
            Stage::Train => {
                let sentences: Vec<SentenceNgrams> = read_json(paths.file_sentence_ngrams())?;
                self.train(&sentences)?.1
            }
        };
        log::info!("{report}");
        Ok(report)
    }

    fn record<T>(reports: &mut Vec<StageReport>, stage: Stage, result: Result<(T, StageReport), PipelineError>) -> Result<T, PipelineError> {
        match result {
            Ok((value, report)) => {
                log::info!("{report}");
                reports.push(report);
                Ok(value)
            }
            Err(err) => {
                log::error!("Stage {stage} failed: {err}");
                reports.push(StageReport::failed(stage, &err));
                Err(err)
            }
        }
    }

    /// Runs all stages in order and stops at the first failing one.
    pub fn run(&self) -> PipelineRun {
        let mut reports = Vec::with_capacity(4);
        let result = (|| -> Result<(), PipelineError> {
            log::info!("Starting stage {}.", Stage::Assemble);
            let corpus = Self::record(&mut reports, Stage::Assemble, self.assemble())?;
            log::info!("Starting stage {}.", Stage::Split);
            let sentences = Self::record(&mut reports, Stage::Split, self.split(&corpus.documents))?;
            log::info!("Starting stage {}.", Stage::Extract);
            let extraction = Self::record(&mut reports, Stage::Extract, self.extract(&sentences.sentences))?;
            log::info!("Starting stage {}.", Stage::Train);
            Self::record(&mut reports, Stage::Train, self.train(&extraction.sentences))?;
            Ok(())
        })();
        PipelineRun { reports, error: result.err() }
    }
}

/// Writes the default configuration as `mpb_stance.json` to [folder].
pub fn write_default_config(folder: impl AsRef<Utf8Path>) -> Result<Utf8PathBuf, ArtifactError> {
    let path = folder.as_ref().join("mpb_stance.json");
    write_json_pretty(&path, &Configs::default())?;
    Ok(path)
}

#[cfg(test)]
mod test {
    use std::fs;
    use camino::Utf8Path;
    use camino_tempfile::tempdir;
    use crate::core::config::{BaggingConfig, DocumentInput, PathsConfig, TaggerKind};
    use crate::core::io::artifacts::read_bincode;
    use crate::features::corpus::Source;
    use crate::features::nbc::EnsembleArtifact;
    use super::*;

    const HAWKISH: [&str; 6] = [
        "위원들은 물가 상승 압력이 높아 금리 인상 필요성을 강조하였다.",
        "여러 위원은 인플레이션 기대 확대로 금리 인상 의견을 제시하였다.",
        "한 위원은 가계부채 증가세를 고려하여 금리 인상 폭을 논의하였다.",
        "다른 위원은 물가 상승 지속 가능성으로 인상 기조 유지를 주장하였다.",
        "일부 위원은 주택가격 상승 우려로 금리 인상 시기를 앞당길 것을 주장하였다.",
        "위원들은 근원물가 상승 흐름을 감안하여 인상 결정을 지지하였다.",
    ];

    const DOVISH: [&str; 6] = [
        "위원들은 경기 둔화 우려가 커져 금리 인하 필요성을 강조하였다.",
        "여러 위원은 수출 부진 심화로 금리 인하 의견을 제시하였다.",
        "한 위원은 고용 악화 흐름을 고려하여 금리 인하 폭을 논의하였다.",
        "다른 위원은 성장 둔화 지속 가능성으로 인하 기조 전환을 주장하였다.",
        "일부 위원은 소비 위축 우려로 금리 인하 시기를 앞당길 것을 주장하였다.",
        "위원들은 투자 부진 흐름을 감안하여 인하 결정을 지지하였다.",
    ];

    fn document(date: &str, sentences: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "date": date,
            "title": "통화정책방향",
            "content": sentences.join(" "),
            "source": "mpb"
        })
    }

    fn prepare(root: &Utf8Path) -> Configs {
        let rates = root.join("rates.csv");
        fs::write(
            &rates,
            "날짜,콜금리\n2020-01-01,1.00\n2020-02-01,1.25\n2020-03-01,1.50\n2020-04-01,1.25\n2020-05-01,1.00\n2020-06-01,1.00\n",
        ).unwrap();
        let documents = root.join("documents.json");
        let values = serde_json::json!([
            document("2020-01-15", &HAWKISH),
            document("2020.02.15", &HAWKISH),
            document("2020-03-15", &DOVISH),
            document("20200415", &DOVISH),
            document("2020-05-15", &DOVISH),
            {"date": "2020-01-20", "title": "", "content": "   ", "source": "mpb"},
            {"date": "not a date", "content": "위원들은 금리 인상을 주장하였다."},
        ]);
        fs::write(&documents, serde_json::to_string(&values).unwrap()).unwrap();

        let mut configs = Configs::default();
        configs.paths = PathsConfig::new(
            root.join("out"),
            vec![DocumentInput::new(&documents, Some(Source::Mpb))],
            Some(rates),
        );
        configs.extraction.tagger = TaggerKind::Heuristic;
        configs.extraction.min_frequency = 2;
        configs.extraction.max_n = 1;
        configs.bagging = BaggingConfig {
            n_estimators: 3,
            parallel: false,
            ..BaggingConfig::default()
        };
        configs
    }

    #[test]
    fn runs_all_stages() {
        let dir = tempdir().unwrap();
        let configs = prepare(dir.path());
        let pipeline = Pipeline::new(configs.clone());
        let run = pipeline.run();
        assert!(run.is_success(), "{:?}", run.error);
        assert_eq!(4, run.reports.len());
        assert!(run.reports.iter().all(StageReport::is_success));

        let assemble = &run.reports[0];
        assert_eq!(6, assemble.processed);
        // one empty and one beyond the horizon of the rate series
        assert_eq!(2, assemble.dropped);
        assert_eq!(1, assemble.errors);

        let paths = &configs.paths;
        for path in [
            paths.file_corpus(), paths.file_sentence_corpus(), paths.file_sentence_stats(),
            paths.file_sentence_ngrams(), paths.file_vocabulary(), paths.file_extraction_stats(),
            paths.file_ensemble(), paths.file_polarity(), paths.file_hawkish_ngrams(),
            paths.file_dovish_ngrams(), paths.file_model_stats(), paths.file_pr_curve(),
        ] {
            assert!(path.exists(), "{path} is missing");
        }

        let hawkish = fs::read_to_string(paths.file_hawkish_ngrams()).unwrap();
        assert!(hawkish.lines().any(|line| line == "인상"));
        let dovish = fs::read_to_string(paths.file_dovish_ngrams()).unwrap();
        assert!(dovish.lines().any(|line| line == "인하"));

        let artifact: EnsembleArtifact = read_bincode(paths.file_ensemble()).unwrap();
        assert_eq!(3, artifact.ensemble.len());
        assert!(artifact.ensemble.predict_proba(&["인상"]) > 0.5);
        assert!(artifact.ensemble.predict_proba(&["인하"]) < 0.5);
    }

    #[test]
    fn stages_run_on_materialized_outputs() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(prepare(dir.path()));
        for stage in [Stage::Assemble, Stage::Split, Stage::Extract, Stage::Train] {
            let report = pipeline.run_stage(stage).unwrap();
            assert_eq!(stage, report.stage);
            assert!(report.is_success());
        }
    }

    #[test]
    fn sentences_without_ngrams_are_dropped_before_training() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(prepare(dir.path()));
        for stage in [Stage::Assemble, Stage::Split, Stage::Extract] {
            pipeline.run_stage(stage).unwrap();
        }
        let mut sentences: Vec<SentenceNgrams> = read_json(pipeline.configs.paths.file_sentence_ngrams()).unwrap();
        let processed = sentences.len() + 1;
        let mut empty = sentences[0].clone();
        empty.ngrams.clear();
        sentences.push(empty);

        let (outcome, report) = pipeline.train(&sentences).unwrap();
        assert_eq!(processed, report.processed);
        assert_eq!(1, report.dropped);
        assert_eq!(0, report.errors);
        assert_eq!(processed - 1, outcome.stats.total_sentences);
    }

    #[test]
    fn a_missing_predecessor_output_fails_the_stage() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(prepare(dir.path()));
        assert!(matches!(pipeline.run_stage(Stage::Train), Err(PipelineError::Artifact(_))));
    }

    #[test]
    fn failures_stop_the_run() {
        let dir = tempdir().unwrap();
        let mut configs = prepare(dir.path());
        configs.paths.rates = None;
        let run = Pipeline::new(configs).run();
        assert!(matches!(run.error, Some(PipelineError::MissingRates)));
        assert_eq!(1, run.reports.len());
        assert_eq!(StageStatus::Failed, run.reports[0].status);
        assert!(run.reports[0].message.is_some());
    }

    #[test]
    fn default_config_can_be_read_back() {
        let dir = tempdir().unwrap();
        let path = write_default_config(dir.path()).unwrap();
        let loaded = Configs::load_from(dir.path()).unwrap();
        assert!(path.exists());
        assert_eq!(Configs::default().bagging, loaded.bagging);
        assert_eq!(Configs::default().extraction, loaded.extraction);
    }
}
