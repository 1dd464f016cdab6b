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

use anyhow::Context;
use clap::Parser;
use log::info;
use mpb_stance::application::{write_default_config, Pipeline, Stage};
use mpb_stance::core::config::Configs;
use mpb_stance::core::logging::configure_logging;
use crate::args::{consume_args, ConsumedArgs, StanceArgs};

mod args;

fn main() -> anyhow::Result<()> {
    exec_args(StanceArgs::parse())
}

fn exec_args(args: StanceArgs) -> anyhow::Result<()> {
    match consume_args(args).context("Failed to load the configs")? {
        ConsumedArgs::Init(folder) => {
            let path = write_default_config(&folder)
                .with_context(|| format!("Failed to write the default config to {folder}"))?;
            println!("Wrote the default config to {path}");
            Ok(())
        }
        ConsumedArgs::RunConfig(stage, configs) => exec(stage, configs),
    }
}

/// Execute a single stage or the whole pipeline
fn exec(stage: Option<Stage>, configs: Configs) -> anyhow::Result<()> {
    configure_logging(&configs).context("Failed to configure the logging")?;
    let pipeline = Pipeline::new(configs);
    let result = match stage {
        Some(stage) => {
            match pipeline.run_stage(stage) {
                Ok(report) => {
                    println!("{report}");
                    Ok(())
                }
                Err(err) => Err(anyhow::Error::from(err).context(format!("The stage {stage} failed"))),
            }
        }
        None => {
            let run = pipeline.run();
            for report in &run.reports {
                println!("{report}");
            }
            match run.error {
                None => Ok(()),
                Some(err) => Err(anyhow::Error::from(err).context("The pipeline failed")),
            }
        }
    };
    match result {
        Ok(()) => {
            println!("Status: SUCCEEDED");
            info!("Exit application.");
            Ok(())
        }
        Err(err) => {
            println!("Status: FAILED");
            Err(err)
        }
    }
}
