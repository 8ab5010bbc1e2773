//! Bank metrics built around pre-provision net revenue (PPNR).

use super::MetricBreakdown;
use super::common::{growth, growth_rates, ratio, sample_std};
use super::line_items as li;
use crate::domain::screening::value_objects::{
    Financials, MetricSet, Regime, Series, Statement, labels,
};

/// Revenue split used by every bank metric.
struct BankIncome {
    net_interest_income: Series,
    non_interest_expense: Series,
    ppnr: Series,
    efficiency: Series,
}

impl BankIncome {
    fn from_statement(statement: &Statement) -> Self {
        let nii = statement.line(li::NET_INTEREST_INCOME);
        let revenue = statement.line(li::TOTAL_REVENUE);
        let non_interest_income = revenue.combine(&nii, |r, n| r - n);
        let non_interest_expense = statement
            .line(li::SGA)
            .combine(&statement.line(li::OTHER_NON_INTEREST_EXPENSE), |a, b| a + b);
        let core_revenue = nii.combine(&non_interest_income, |n, o| n + o);
        let ppnr = core_revenue.combine(&non_interest_expense, |r, e| r - e);
        let efficiency = non_interest_expense.combine(&core_revenue, ratio);
        Self {
            net_interest_income: nii,
            non_interest_expense,
            ppnr,
            efficiency,
        }
    }
}

/// Annual PPNR and its year-over-year growth.
#[must_use]
pub fn ppnr(ann_inc: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(ann_inc);
    MetricBreakdown::new(growth(bank.ppnr.get(0), bank.ppnr.get(1)))
        .detail("PPNR (series)", &bank.ppnr)
        .detail("PPNR (Latest)", bank.ppnr.latest())
}

/// Latest non-interest expense over total revenue.
#[must_use]
pub fn efficiency_ratio(ann_inc: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(ann_inc);
    MetricBreakdown::new(bank.efficiency.latest())
        .detail("Efficiency Ratio (series)", &bank.efficiency)
        .detail("Non-Interest Expense (series)", &bank.non_interest_expense)
        .detail("Efficiency Ratio Δ YoY (bps) Latest", efficiency_delta_bps(&bank))
}

/// Year-over-year change of the efficiency ratio, in basis points.
#[must_use]
pub fn efficiency_ratio_delta(ann_inc: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(ann_inc);
    MetricBreakdown::new(efficiency_delta_bps(&bank))
        .detail("Efficiency Ratio (series)", &bank.efficiency)
        .detail("Efficiency Ratio (Latest)", bank.efficiency.latest())
}

fn efficiency_delta_bps(bank: &BankIncome) -> f64 {
    (bank.efficiency.get(0) - bank.efficiency.get(1)) * 10_000.0
}

/// Annual net interest income growth.
#[must_use]
pub fn nii_growth_yoy(ann_inc: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(ann_inc);
    let nii = &bank.net_interest_income;
    MetricBreakdown::new(growth(nii.get(0), nii.get(1))).detail("Net Interest Income (series)", nii)
}

/// Sample standard deviation of quarter-over-quarter PPNR growth.
#[must_use]
pub fn ppnr_growth_volatility_qtr(qtr_inc: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(qtr_inc);
    let chronological: Vec<f64> = bank.ppnr.chronological().iter().map(|p| p.1).collect();
    let rates = growth_rates(&chronological);
    let latest_rate = rates.last().copied().unwrap_or(f64::NAN);
    MetricBreakdown::new(sample_std(rates))
        .detail("Quarterly PPNR", &bank.ppnr)
        .detail("Quarterly PPNR Growth (Latest)", latest_rate)
}

/// Latest ROE; ROA and both series travel in the breakdown.
#[must_use]
pub fn roe_roa(ann_inc: &Statement, ann_bs: &Statement) -> (MetricBreakdown, MetricBreakdown) {
    let net_income = ann_inc.line(li::NET_INCOME);
    let roe = net_income.combine(&ann_bs.line(li::TOTAL_EQUITY), ratio);
    let roa = net_income.combine(&ann_bs.line(li::TOTAL_ASSETS), ratio);
    let roe_breakdown = MetricBreakdown::new(roe.latest())
        .detail("ROE (series)", &roe)
        .detail("ROA (series)", &roa)
        .detail("ROA (Latest)", roa.latest());
    let roa_breakdown = MetricBreakdown::new(roa.latest())
        .detail("ROA (series)", &roa)
        .detail("ROE (series)", &roe)
        .detail("ROE (Latest)", roe.latest());
    (roe_breakdown, roa_breakdown)
}

/// Latest total equity over total assets.
#[must_use]
pub fn equity_to_assets(ann_bs: &Statement) -> MetricBreakdown {
    let series = ann_bs
        .line(li::TOTAL_EQUITY)
        .combine(&ann_bs.line(li::TOTAL_ASSETS), ratio);
    MetricBreakdown::new(series.latest()).detail("Equity / Assets (series)", &series)
}

/// Latest annual PPNR over total assets.
#[must_use]
pub fn ppnr_to_assets(ann_inc: &Statement, ann_bs: &Statement) -> MetricBreakdown {
    let bank = BankIncome::from_statement(ann_inc);
    let series = bank.ppnr.combine(&ann_bs.line(li::TOTAL_ASSETS), ratio);
    MetricBreakdown::new(series.latest()).detail("PPNR / Assets (series)", &series)
}

fn push(set: MetricSet, label: &str, group: &str, breakdown: MetricBreakdown) -> MetricSet {
    set.with_metric(label, breakdown.value)
        .with_supplemental(group, breakdown.details)
}

/// Bank metrics for a regime.
#[must_use]
pub fn financial_metrics(regime: Regime, fin: &Financials) -> MetricSet {
    let ann_inc = &fin.annual_income;
    let ann_bs = &fin.annual_balance_sheet;
    let set = MetricSet::empty();
    match regime {
        Regime::Expansion => {
            let (roe, _) = roe_roa(ann_inc, ann_bs);
            let set = push(set, labels::PPNR_GROWTH, "PPNR", ppnr(ann_inc));
            let set = push(
                set,
                labels::EFFICIENCY_RATIO,
                "Efficiency Ratio",
                efficiency_ratio(ann_inc),
            );
            push(set, labels::ROE, "ROE/ROA", roe)
        }
        Regime::Inflation => {
            let set = push(set, labels::NII_GROWTH, "NII", nii_growth_yoy(ann_inc));
            let set = push(
                set,
                labels::EFFICIENCY_RATIO_DELTA,
                "Efficiency Ratio",
                efficiency_ratio_delta(ann_inc),
            );
            push(
                set,
                labels::EQUITY_TO_ASSETS,
                "Equity / Assets",
                equity_to_assets(ann_bs),
            )
        }
        Regime::Stagflation => {
            let (_, roa) = roe_roa(ann_inc, ann_bs);
            let set = push(
                set,
                labels::PPNR_GROWTH_VOLATILITY,
                "PPNR Growth",
                ppnr_growth_volatility_qtr(&fin.quarterly_income),
            );
            let set = push(set, labels::ROA, "ROE/ROA", roa);
            push(
                set,
                labels::EQUITY_TO_ASSETS,
                "Equity / Assets",
                equity_to_assets(ann_bs),
            )
        }
        Regime::Recession => {
            let set = push(
                set,
                labels::EQUITY_TO_ASSETS,
                "Equity / Assets",
                equity_to_assets(ann_bs),
            );
            let set = push(
                set,
                labels::EFFICIENCY_RATIO,
                "Efficiency Ratio",
                efficiency_ratio(ann_inc),
            );
            push(
                set,
                labels::PPNR_TO_ASSETS,
                "PPNR / Assets",
                ppnr_to_assets(ann_inc, ann_bs),
            )
        }
    }
}
