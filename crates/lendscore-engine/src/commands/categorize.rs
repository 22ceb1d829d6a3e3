use crate::EngineResult;
use crate::commands::common::{ConfigPaths, load_engine_config, read_transactions};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CategorizeData;
use crate::pipeline::ScoringPipeline;

#[derive(Debug, Default)]
pub struct CategorizeRunOptions<'a> {
    pub path: Option<String>,
    pub months_of_data: Option<u32>,
    pub config: ConfigPaths<'a>,
    pub stdin_override: Option<String>,
}

pub fn run(options: CategorizeRunOptions<'_>) -> EngineResult<SuccessEnvelope> {
    let config = load_engine_config(options.config)?;
    let (transactions, source) = read_transactions(options.path, options.stdin_override)?;
    let outcome = ScoringPipeline::new(config).categorize(&transactions, options.months_of_data)?;
    let categorization = outcome.categorization;

    let data = CategorizeData {
        months_of_data: outcome.months_of_data,
        window: categorization.window,
        matches: categorization.matches,
        summary: categorization.summary,
        issues: categorization.issues,
        notes: categorization.notes,
        input: outcome.input,
        source,
    };
    success("categorize", data)
}
