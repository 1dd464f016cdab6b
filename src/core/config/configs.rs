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

use camino::Utf8Path;
use config::Config;
use serde::{Deserialize, Serialize};
use crate::core::config::paths::PathsConfig;
use crate::core::config::pipeline::{BaggingConfig, ExtractionConfig, LabelingConfig, SplittingConfig};
use crate::core::config::SystemConfig;

/// A collection of all config used in a pipeline run.
/// Can be shared across threads
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename(serialize = "Config"))]
pub struct Configs {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub labeling: LabelingConfig,
    #[serde(default)]
    pub splitting: SplittingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub bagging: BaggingConfig,
}

impl Configs {
    pub fn load_from<P: AsRef<Utf8Path>>(folder: P) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("./config").required(false))
            .add_source(config::File::with_name("./mpb_stance").required(false))
            .add_source(config::File::with_name(
                folder.as_ref().join("mpb_stance").as_str(),
            ).required(false))
            .add_source(config::File::with_name(
                folder.as_ref().join("config").as_str(),
            ).required(false))
            .add_source(config::Environment::with_prefix("MPB_STANCE").separator("."))
            .build()?
            .try_deserialize()
    }

    pub fn discover_or_default() -> Result<Self, config::ConfigError> {
        match Config::builder()
            .add_source(config::File::with_name("./mpb_stance").required(false))
            .add_source(config::File::with_name("./mpb_stance_data/mpb_stance").required(false))
            .add_source(config::File::with_name("./config").required(false))
            .add_source(config::File::with_name("./mpb_stance_data/config").required(false))
            .add_source(config::Environment::with_prefix("MPB_STANCE").separator("."))
            .build()
        {
            Ok(value) => value.try_deserialize(),
            Err(_) => Ok(Default::default()),
        }
    }
}
