use std::path::Path;
use std::sync::Arc;

use crate::EngineResult;
use crate::config::{ConfigLoadOptions, EngineConfig};
use crate::contracts::types::InputSource;
use crate::input::parse_transactions;
use crate::input::source::resolve_source;
use crate::transaction::RawTransaction;

/// Settings shared by every command that needs an engine configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigPaths<'a> {
    pub config_path: Option<&'a Path>,
    pub mapping_path: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

pub(crate) fn load_engine_config(paths: ConfigPaths<'_>) -> EngineResult<Arc<EngineConfig>> {
    EngineConfig::load(&ConfigLoadOptions {
        config_path: paths.config_path,
        mapping_path: paths.mapping_path,
        home_override: paths.home_override,
    })
    .map(Arc::new)
}

pub(crate) fn read_transactions(
    path: Option<String>,
    stdin_override: Option<String>,
) -> EngineResult<(Vec<RawTransaction>, InputSource)> {
    let source = resolve_source(path, stdin_override)?;
    let rows = parse_transactions(&source.content)?;
    Ok((
        rows,
        InputSource {
            kind: source.kind.as_str().to_string(),
            reference: source.reference,
        },
    ))
}
