//! Market resolution: pair a grading formula with a match result and the
//! group's market legs to produce `(leg id, outcome)` pairs.

use crate::expr;
use bookie_core::naming::{format_num, market_vars, substitute};
use bookie_core::types::{DynamicParams, GradingSpec, MatchResult, ObjectId};
use bookie_core::{Error, Result};
use tracing::debug;

/// Everything a grading formula may reference: the raw result plus the
/// group's parameterization.
#[derive(Debug, Clone)]
pub struct GradingContext {
    pub result: MatchResult,
    pub teams: [String; 2],
    pub dynamic: Option<DynamicParams>,
}

impl GradingContext {
    fn vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = market_vars(&self.teams, self.dynamic.as_ref());
        vars.push(("result.hometeam", format_num(self.result.home())));
        vars.push(("result.awayteam", format_num(self.result.away())));
        vars.push(("result.home", format_num(self.result.home())));
        vars.push(("result.away", format_num(self.result.away())));
        vars.push(("result.total", format_num(self.result.total())));
        vars
    }
}

/// Evaluate the rule's metric for this result.
pub fn metric(spec: &GradingSpec, ctx: &GradingContext) -> Result<f64> {
    let source = substitute(&spec.metric, &ctx.vars())?;
    expr::evaluate_number(&source)
}

/// Grade every leg of a market group.
///
/// Outcome groups pair with legs positionally, so a count mismatch between
/// the rule and the group is a rule-authoring defect. Within each group,
/// exactly one outcome must hold; zero or several matching outcomes abort
/// the whole resolution rather than guess.
pub fn resolve(
    spec: &GradingSpec,
    ctx: &GradingContext,
    legs: &[ObjectId],
) -> Result<Vec<(ObjectId, String)>> {
    if legs.len() != spec.resolutions.len() {
        return Err(Error::MalformedRule(format!(
            "rule grades {} markets but the group has {}",
            spec.resolutions.len(),
            legs.len()
        )));
    }
    let metric_value = metric(spec, ctx)?;
    let mut vars = ctx.vars();
    vars.push(("metric", format_num(metric_value)));
    debug!(metric = metric_value, legs = legs.len(), "grading group");

    let mut graded = Vec::with_capacity(legs.len());
    for (leg, outcomes) in legs.iter().zip(&spec.resolutions) {
        let mut winner: Option<&str> = None;
        for (label, template) in outcomes {
            let source = substitute(template, &vars)?;
            if !expr::evaluate_bool(&source)? {
                continue;
            }
            if let Some(previous) = winner {
                return Err(Error::MalformedRule(format!(
                    "market {leg} resolves to both '{previous}' and '{label}'"
                )));
            }
            winner = Some(label);
        }
        let label = winner.ok_or_else(|| {
            Error::MalformedRule(format!("no outcome holds for market {leg}"))
        })?;
        graded.push((leg.clone(), label.to_string()));
    }
    Ok(graded)
}
