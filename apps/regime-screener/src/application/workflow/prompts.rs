//! Prompt builders for the two LLM stages.

use std::fmt::Write as _;

use crate::application::ports::AgentTool;
use crate::domain::screening::{
    CriteriaRow, MetricSet, OutlierBound, OutlierFlag, OutlierKind, Regime, render_criteria,
    render_outlier_table,
};

fn metrics_json(metrics: &MetricSet) -> String {
    serde_json::to_string_pretty(metrics).unwrap_or_else(|_| "{}".to_string())
}

fn describe_flag(flag: &OutlierFlag) -> String {
    let position = match flag.kind {
        OutlierKind::BelowLower => "below the extreme lower bound",
        OutlierKind::AboveUpper => "above the extreme upper bound",
        OutlierKind::NonFinite => "not a finite number",
    };
    format!("- {}: {} is {position}", flag.metric, flag.value)
}

/// Prompt for the data validation agent.
#[must_use]
pub fn validation_prompt(
    metrics: &MetricSet,
    table: &[OutlierBound],
    flags: &[OutlierFlag],
    tools: &[AgentTool],
) -> String {
    let mut prompt = String::new();
    let _ = write!(
        prompt,
        "Evaluate the following financial metrics for accuracy, completeness, and nuance.\n\n{}\n\n",
        metrics_json(metrics)
    );
    let _ = write!(
        prompt,
        "Outlier table (interquartile ranges and extreme bounds):\n\n{}\n\n",
        render_outlier_table(table)
    );
    if flags.is_empty() {
        prompt.push_str("No metric falls outside the extreme bounds.\n\n");
    } else {
        prompt.push_str("Metrics outside the extreme bounds:\n");
        for flag in flags {
            prompt.push_str(&describe_flag(flag));
            prompt.push('\n');
        }
        prompt.push('\n');
    }
    prompt.push_str(
        "Comment on every metric in the extreme upper or lower bounds by reading the input \
         statements through your tools. Decide whether each value is reasonable given the \
         statements, or whether odd or missing line items distort the calculation. Finally, \
         describe any nuance that matters for interpreting these metrics; for example, margin \
         volatility driven mostly by upside moves should be called out as such.\n\n",
    );
    prompt.push_str("Available tools:\n");
    for tool in tools {
        let _ = writeln!(prompt, "- {}: {}", tool.name, tool.description);
    }
    prompt.push_str("\nList the tools you have access to and call at least one of them.");
    prompt
}

/// Prompt for the structured regime-fit evaluation.
#[must_use]
pub fn evaluation_prompt(
    regime: Regime,
    metrics: &MetricSet,
    criteria: &[CriteriaRow],
    commentary: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "You are a seasoned portfolio manager evaluating potential investments by how well \
         their financial metrics align with the favorability bands for an economic regime. ",
    );
    let _ = write!(
        prompt,
        "Evaluate the following financial metrics against the criteria for the {regime} regime:\n\n{}\n\n",
        metrics_json(metrics)
    );
    let _ = write!(prompt, "Criteria:\n{}\n\n", render_criteria(criteria));
    prompt.push_str(
        "Use the data validation commentary to judge whether the data is accurate and \
         complete, and to pick up nuance for your evaluation.\n",
    );
    let _ = write!(
        prompt,
        "Data Validation Commentary:\n{}\n\n",
        commentary.unwrap_or("(none available)")
    );
    prompt.push_str(
        "Add nuance but ground heavily on the bands in the criteria and on the metrics. \
         Provide an explanation and a score from 0 to 100, where 0 is poor fitness for the \
         regime and 100 is excellent. Respond as JSON: {\"explanation\": string, \"score\": integer}.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::STATEMENT_TOOLS;
    use crate::domain::screening::{SectorClass, criteria_for, labels, outlier_table};

    #[test]
    fn validation_prompt_lists_flags_and_tools() {
        let metrics = MetricSet::empty().with_metric(labels::REVENUE_GROWTH, 0.9);
        let flags = vec![OutlierFlag {
            metric: labels::REVENUE_GROWTH.to_string(),
            value: 0.9,
            kind: OutlierKind::AboveUpper,
        }];
        let prompt = validation_prompt(
            &metrics,
            outlier_table(SectorClass::NonFinancial),
            &flags,
            &STATEMENT_TOOLS,
        );
        assert!(prompt.contains("Revenue Growth (YoY): 0.9 is above the extreme upper bound"));
        assert!(prompt.contains("get_quarterly_balance_data"));
        assert!(prompt.contains("call at least one"));
    }

    #[test]
    fn evaluation_prompt_includes_criteria_and_placeholder_commentary() {
        let metrics = MetricSet::empty().with_metric(labels::ROE, 0.12);
        let prompt = evaluation_prompt(
            Regime::Recession,
            &metrics,
            criteria_for(Regime::Recession, SectorClass::Financial),
            None,
        );
        assert!(prompt.contains("Recession regime"));
        assert!(prompt.contains("| Metric | Favorable |"));
        assert!(prompt.contains("(none available)"));
        assert!(prompt.contains("\"ROE\": 0.12"));
    }
}
