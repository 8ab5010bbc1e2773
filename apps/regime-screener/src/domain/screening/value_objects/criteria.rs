//! Favorable / neutral / unfavorable bands per regime and sector class.

use std::fmt::Write as _;

use super::regime::Regime;
use super::sector::SectorClass;

/// One row of a regime criteria table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriteriaRow {
    /// Metric name as shown to the evaluator.
    pub metric: &'static str,
    /// Favorable band.
    pub favorable: &'static str,
    /// Neutral band.
    pub neutral: &'static str,
    /// Unfavorable band.
    pub unfavorable: &'static str,
    /// Why the metric matters in this regime.
    pub rationale: &'static str,
}

const fn row(
    metric: &'static str,
    favorable: &'static str,
    neutral: &'static str,
    unfavorable: &'static str,
    rationale: &'static str,
) -> CriteriaRow {
    CriteriaRow {
        metric,
        favorable,
        neutral,
        unfavorable,
        rationale,
    }
}

const EXPANSION: [CriteriaRow; 3] = [
    row("Revenue Growth (YoY)", "> 8%", "5% – 8%", "< 5%", "Strong top-line growth captures upside in expansion without inflation drag."),
    row("EBITDA Margin", "> 20%", "15% – 20%", "< 15%", "Healthy margins indicate efficient scaling and operating leverage."),
    row("Net Debt / EBITDA", "< 1.5x", "1.5x–3.0x", "> 3.0x", "Some leverage is fine in growth phases, but excess adds downside risk."),
];

const INFLATION: [CriteriaRow; 3] = [
    row("Gross Margin Trend (YoY, bps)", "> +100", "0 to +100", "< 0", "Sustained gross margin expansion signals pricing power vs. rising inputs."),
    row("Inventory Turnover (x)", "> 8x", "5x – 8x", "< 5x", "Faster turns reduce exposure to rapidly rising input costs."),
    row("Interest Coverage (EBIT / IntExp)", "> 6x", "3x – 6x", "< 3x", "Rising rates + inflation stress weak coverage; resilient firms stay >6x."),
];

const STAGFLATION: [CriteriaRow; 3] = [
    row("EBITDA Margin Volatility (stdev)", "< 4%", "4% – 6%", "> 6%", "Operational stability matters when growth slows and costs rise."),
    row("Gross Margin Trend (YoY, bps)", "> +50", "0 to +50", "< 0", "Ability to hold or expand gross margin indicates pricing power."),
    row("Net Debt / EBITDA", "< 1.0x", "1.0x–2.0x", "> 2.0x", "Low leverage mitigates refinancing and spread-widening risk."),
];

const RECESSION: [CriteriaRow; 3] = [
    row("Cash & ST Inv. / Total Debt", "> 50%", "20%–50%", "< 20%", "A strong cash cushion supports liquidity when prices and demand fall."),
    row("Interest Coverage (EBIT / IntExp)", "> 8x", "4x – 8x", "< 4x", "High coverage protects in credit-tight, revenue-weak environments."),
    row("DSO Change (Days Sales Outstanding, YoY change, days)", "< +5", "+5 to +15", "> +15", "Rising DSO signals collection stress and customer weakness."),
];

const EXPANSION_FINANCIALS: [CriteriaRow; 3] = [
    row("PPNR Growth (YoY)", "> 8%", "3% – 8%", "< 3%", "Core earnings momentum critical in expansion."),
    row("Efficiency Ratio", "< 55%", "55% – 65%", "> 65%", "Leaner cost structure scales better in growth phases."),
    row("ROE", "> 12%", "8% – 12%", "< 8%", "Strong profitability relative to equity capital."),
];

const INFLATION_FINANCIALS: [CriteriaRow; 3] = [
    row("NII Growth (YoY)", "> 10%", "3% – 10%", "< 3%", "Rising rates should boost NII in inflationary regimes."),
    row("Efficiency Ratio Δ", "≤ -200bps", "-200 to +200", "> +200bps", "Cost control is critical as wage/tech inflation pressures rise."),
    row("Equity / Assets", "> 10%", "7% – 10%", "< 7%", "Strong capital buffers mitigate volatility in higher rate environments."),
];

const STAGFLATION_FINANCIALS: [CriteriaRow; 3] = [
    row("PPNR Growth Volatility (quarterly)", "< 5%", "5% – 8%", "> 8%", "Stable growth in core earnings is vital when growth is weak and costs rise."),
    row("ROA", "> 1.0%", "0.6% – 1.0%", "< 0.6%", "Asset efficiency matters in sluggish macro conditions."),
    row("Equity / Assets", "> 10%", "7% – 10%", "< 7%", "Stronger capital adequacy helps offset market/credit shocks."),
];

const RECESSION_FINANCIALS: [CriteriaRow; 3] = [
    row("Equity / Assets", "> 10%", "7% – 10%", "< 7%", "Thick capital cushion protects against credit losses in downturns."),
    row("Efficiency Ratio", "< 60%", "60% – 70%", "> 70%", "Cost discipline becomes critical as revenues weaken."),
    row("PPNR / Assets", "> 1.2%", "0.8% – 1.2%", "< 0.8%", "Strong pre-provision earnings relative to assets = resilience in stress."),
];

/// Criteria rows for a regime and sector class.
#[must_use]
pub const fn criteria_for(regime: Regime, class: SectorClass) -> &'static [CriteriaRow] {
    match (class, regime) {
        (SectorClass::NonFinancial, Regime::Expansion) => &EXPANSION,
        (SectorClass::NonFinancial, Regime::Inflation) => &INFLATION,
        (SectorClass::NonFinancial, Regime::Stagflation) => &STAGFLATION,
        (SectorClass::NonFinancial, Regime::Recession) => &RECESSION,
        (SectorClass::Financial, Regime::Expansion) => &EXPANSION_FINANCIALS,
        (SectorClass::Financial, Regime::Inflation) => &INFLATION_FINANCIALS,
        (SectorClass::Financial, Regime::Stagflation) => &STAGFLATION_FINANCIALS,
        (SectorClass::Financial, Regime::Recession) => &RECESSION_FINANCIALS,
    }
}

/// Render criteria rows as a markdown table.
#[must_use]
pub fn render_criteria(rows: &[CriteriaRow]) -> String {
    let mut out = String::from(
        "| Metric | Favorable | Neutral | Unfavorable | Rationale |\n|---|---|---|---|---|",
    );
    for r in rows {
        let _ = write!(
            out,
            "\n| {} | {} | {} | {} | {} |",
            r.metric, r.favorable, r.neutral, r.unfavorable, r.rationale
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_regime_and_class_has_three_rows() {
        for regime in Regime::ALL {
            for class in [SectorClass::Financial, SectorClass::NonFinancial] {
                assert_eq!(criteria_for(regime, class).len(), 3, "{regime} {class}");
            }
        }
    }

    #[test]
    fn financial_tables_are_bank_specific() {
        let rows = criteria_for(Regime::Expansion, SectorClass::Financial);
        assert!(rows.iter().any(|r| r.metric == "PPNR Growth (YoY)"));
        let rows = criteria_for(Regime::Expansion, SectorClass::NonFinancial);
        assert!(rows.iter().all(|r| !r.metric.contains("PPNR")));
    }

    #[test]
    fn renders_markdown_rows() {
        let table = render_criteria(criteria_for(Regime::Recession, SectorClass::NonFinancial));
        assert!(table.starts_with("| Metric | Favorable"));
        assert!(table.contains("| Cash & ST Inv. / Total Debt | > 50% | 20%–50% | < 20% |"));
        assert_eq!(table.lines().count(), 5);
    }
}
