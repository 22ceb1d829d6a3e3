use crate::EngineResult;
use crate::commands::common::{ConfigPaths, load_engine_config, read_transactions};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ScoreData;
use crate::pipeline::{ScoreRequest, ScoringPipeline};

#[derive(Debug, Default)]
pub struct ScoreRunOptions<'a> {
    pub path: Option<String>,
    pub loan_amount: f64,
    pub loan_term: u32,
    pub months_of_data: Option<u32>,
    pub application_ref: Option<String>,
    pub config: ConfigPaths<'a>,
    pub stdin_override: Option<String>,
}

pub fn run(options: ScoreRunOptions<'_>) -> EngineResult<SuccessEnvelope> {
    let config = load_engine_config(options.config)?;
    let (transactions, source) = read_transactions(options.path, options.stdin_override)?;
    let config_source = config.scoring_source().clone();
    let outcome = ScoringPipeline::new(config).run(ScoreRequest {
        transactions,
        loan_amount: options.loan_amount,
        loan_term: options.loan_term,
        months_of_data: options.months_of_data,
        application_ref: options.application_ref,
    })?;

    let data = ScoreData {
        result: outcome.result,
        metrics: outcome.metrics,
        category_summary: outcome.categorization.summary,
        issues: outcome.categorization.issues,
        input: outcome.input,
        source,
        config_source,
    };
    success("score", data)
}
