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

use std::num::NonZeroUsize;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mpb_stance::application::Stage;
use mpb_stance::core::config::Configs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Mines hawkish and dovish n-grams from Korean monetary policy texts.
pub struct StanceArgs {
    /// The folder containing the configs.
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,
    /// Overrides the log level from the config.
    #[arg(long)]
    pub log_level: Option<log::LevelFilter>,
    /// Log to file
    #[arg(long)]
    pub log_to_file: bool,
    /// The number of threads used for bagging.
    #[arg(short, long)]
    pub threads: Option<NonZeroUsize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Writes the default config as mpb_stance.json to the folder.
    Init {
        #[arg(default_value = ".")]
        folder: Utf8PathBuf,
    },
    /// Labels the documents by the rate movement and writes the corpus.
    Assemble,
    /// Splits the corpus into sentences.
    Split,
    /// Extracts the pos filtered n-grams of the sentences.
    Extract,
    /// Trains the bagged naive bayes and writes the polarity lexicon.
    Train,
    /// Runs all stages in order.
    Run,
}

#[derive(Debug)]
pub enum ConsumedArgs {
    Init(Utf8PathBuf),
    /// Runs the stage or all stages if none is set.
    RunConfig(Option<Stage>, Configs),
}

/// Consumes the args and returns everything necessary to execute the pipeline
pub(crate) fn consume_args(args: StanceArgs) -> Result<ConsumedArgs, config::ConfigError> {
    let stage = match args.command {
        Command::Init { folder } => return Ok(ConsumedArgs::Init(folder)),
        Command::Assemble => Some(Stage::Assemble),
        Command::Split => Some(Stage::Split),
        Command::Extract => Some(Stage::Extract),
        Command::Train => Some(Stage::Train),
        Command::Run => None,
    };

    let mut configs = match args.config {
        None => Configs::discover_or_default()?,
        Some(folder) => Configs::load_from(folder)?,
    };

    if let Some(log_level) = args.log_level {
        configs.system.log_level = log_level;
    }
    if args.log_to_file {
        configs.system.log_to_file = true;
    }
    if args.threads.is_some() {
        configs.system.threads = args.threads;
    }

    Ok(ConsumedArgs::RunConfig(stage, configs))
}
