pub mod bands;
pub mod location;
pub mod mapping;
pub mod scoring;

use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::categorize::fuzzy::{FuzzyBackend, default_backend};
use crate::categorize::matcher::{MatcherSettings, PatternMatcher};
use crate::categorize::rules::RuleBook;
use crate::config::location::{default_mapping_path, default_scoring_path, resolve_config_home};
use crate::config::mapping::ProviderCategoryMap;
use crate::config::scoring::ScoringConfig;
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOrigin {
    Builtin,
    DefaultFile,
    ExplicitFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ConfigSource {
    pub fn builtin() -> Self {
        Self {
            origin: ConfigOrigin::Builtin,
            path: None,
        }
    }

    fn file(origin: ConfigOrigin, path: &Path) -> Self {
        Self {
            origin,
            path: Some(path.display().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoadOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub mapping_path: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

/// Immutable snapshot of everything a scoring run reads: the validated policy, the compiled
/// rule book, the optional provider mapping and the pattern matcher built from them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    scoring: ScoringConfig,
    rules: RuleBook,
    mapping: Option<ProviderCategoryMap>,
    matcher: PatternMatcher,
    scoring_source: ConfigSource,
    mapping_source: Option<ConfigSource>,
}

impl EngineConfig {
    pub fn builtin() -> EngineResult<Self> {
        Self::new(ScoringConfig::default(), None)
    }

    pub fn new(scoring: ScoringConfig, mapping: Option<ProviderCategoryMap>) -> EngineResult<Self> {
        scoring.validate()?;
        let rules = RuleBook::builtin()?;
        let matcher = PatternMatcher::new(matcher_settings(&scoring), default_backend());
        let mapping_source = mapping.as_ref().map(|_| ConfigSource::builtin());
        Ok(Self {
            scoring,
            rules,
            mapping,
            matcher,
            scoring_source: ConfigSource::builtin(),
            mapping_source,
        })
    }

    /// Replaces the fuzzy backend. `None` disables the fuzzy matching stage.
    pub fn with_fuzzy_backend(mut self, backend: Option<Arc<dyn FuzzyBackend>>) -> Self {
        self.matcher = PatternMatcher::new(matcher_settings(&self.scoring), backend);
        self
    }

    pub fn load(options: &ConfigLoadOptions<'_>) -> EngineResult<Self> {
        let home = resolve_config_home(options.home_override);

        let (scoring, scoring_source) = match options.config_path {
            Some(path) => (
                logged_load(path, ScoringConfig::load_from_path)?,
                ConfigSource::file(ConfigOrigin::ExplicitFile, path),
            ),
            None => match home.as_deref().map(default_scoring_path) {
                Some(path) if path.is_file() => (
                    logged_load(&path, ScoringConfig::load_from_path)?,
                    ConfigSource::file(ConfigOrigin::DefaultFile, &path),
                ),
                _ => (ScoringConfig::default(), ConfigSource::builtin()),
            },
        };

        let (mapping, mapping_source) = match options.mapping_path {
            Some(path) => (
                Some(logged_load(path, ProviderCategoryMap::load_from_path)?),
                Some(ConfigSource::file(ConfigOrigin::ExplicitFile, path)),
            ),
            None => match home.as_deref().map(default_mapping_path) {
                Some(path) if path.is_file() => (
                    Some(logged_load(&path, ProviderCategoryMap::load_from_path)?),
                    Some(ConfigSource::file(ConfigOrigin::DefaultFile, &path)),
                ),
                _ => (None, None),
            },
        };

        let mut config = Self::new(scoring, mapping)?;
        config.scoring_source = scoring_source;
        config.mapping_source = mapping_source;
        debug!(
            version = %config.scoring.version,
            mapping_entries = config.mapping.as_ref().map_or(0, ProviderCategoryMap::len),
            fuzzy = config.matcher.fuzzy_available(),
            "engine configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.scoring.validate()
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn mapping(&self) -> Option<&ProviderCategoryMap> {
        self.mapping.as_ref()
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn scoring_source(&self) -> &ConfigSource {
        &self.scoring_source
    }

    pub fn mapping_source(&self) -> Option<&ConfigSource> {
        self.mapping_source.as_ref()
    }
}

/// Shared, swappable configuration. Readers take an `Arc` snapshot and keep it for the whole
/// run; `publish` validates the candidate before swapping it in.
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<EngineConfig>>,
}

impl ConfigHandle {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> EngineResult<Arc<EngineConfig>> {
        let guard = self
            .current
            .read()
            .map_err(|_| EngineError::internal_config_lock())?;
        Ok(Arc::clone(&guard))
    }

    pub fn publish(&self, candidate: EngineConfig) -> EngineResult<Arc<EngineConfig>> {
        if let Err(error) = candidate.validate() {
            warn!(code = %error.code, "rejected configuration publish");
            return Err(error);
        }
        let next = Arc::new(candidate);
        let mut guard = self
            .current
            .write()
            .map_err(|_| EngineError::internal_config_lock())?;
        *guard = Arc::clone(&next);
        debug!(version = %next.scoring.version, "published configuration snapshot");
        Ok(next)
    }
}

fn matcher_settings(scoring: &ScoringConfig) -> MatcherSettings {
    MatcherSettings {
        fuzzy_threshold: scoring.categorization.fuzzy_threshold,
        fuzzy_min_keyword_len: scoring.categorization.fuzzy_min_keyword_len,
    }
}

fn logged_load<T>(path: &Path, load: impl FnOnce(&Path) -> EngineResult<T>) -> EngineResult<T> {
    load(path).inspect_err(|error| {
        warn!(path = %path.display(), code = %error.code, "rejected configuration file");
    })
}
