use std::path::Path;

use crate::EngineResult;
use crate::commands::common::{ConfigPaths, load_engine_config};
use crate::config::mapping::ProviderCategoryMap;
use crate::config::scoring::ScoringConfig;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ConfigShowData, ConfigValidateData};

#[derive(Debug, Default)]
pub struct ConfigRunOptions<'a> {
    pub config: ConfigPaths<'a>,
}

pub fn show(options: ConfigRunOptions<'_>) -> EngineResult<SuccessEnvelope> {
    let config = load_engine_config(options.config)?;
    let data = ConfigShowData {
        config: config.scoring().clone(),
        scoring_source: config.scoring_source().clone(),
        mapping_source: config.mapping_source().cloned(),
        mapping_entries: config.mapping().map_or(0, ProviderCategoryMap::len),
        rule_groups: config.rules().groups().len(),
        fuzzy_available: config.matcher().fuzzy_available(),
    };
    success("config show", data)
}

/// Loads and validates a scoring document without installing it.
pub fn validate(path: &Path) -> EngineResult<SuccessEnvelope> {
    let scoring = ScoringConfig::load_from_path(path)?;
    let data = ConfigValidateData {
        valid: true,
        version: scoring.version,
        source: path.display().to_string(),
    };
    success("config validate", data)
}
