//! Operating-company metrics for the four regimes.

use super::MetricBreakdown;
use super::common::{coverage, diffs, growth, mean, ratio, sample_std};
use super::line_items as li;
use crate::domain::screening::value_objects::{
    Financials, MetricSet, Series, Statement, labels,
};

fn margin(numerator: &Series, revenue: &Series) -> Series {
    numerator.combine(revenue, ratio)
}

fn gross_margin(statement: &Statement) -> Series {
    let revenue = statement.line(li::TOTAL_REVENUE);
    let cogs = statement.line(li::COST_OF_REVENUE);
    revenue.combine(&cogs, |r, c| ratio(r - c, r))
}

/// Average chronological change of a margin series, in basis points.
fn trend_bps(margin: &Series) -> f64 {
    let chronological: Vec<f64> = margin.chronological().iter().map(|p| p.1).collect();
    mean(diffs(&chronological)) * 10_000.0
}

/// Annual revenue growth `(rev[0] - rev[1]) / rev[1]`.
#[must_use]
pub fn revenue_growth(ann_inc: &Statement, qtr_inc: &Statement) -> MetricBreakdown {
    let ann_rev = ann_inc.line(li::TOTAL_REVENUE);
    let qtr_rev = qtr_inc.line(li::TOTAL_REVENUE);
    let annual = growth(ann_rev.get(0), ann_rev.get(1));
    let quarterly = growth(qtr_rev.get(0), qtr_rev.get(1));
    MetricBreakdown::new(annual)
        .detail("Annual Revenue", &ann_rev)
        .detail("Quarter Revenue", &qtr_rev)
        .detail("Quarter Revenue Growth", quarterly)
}

/// Latest annual EBITDA / revenue.
#[must_use]
pub fn ebitda_margin(ann_inc: &Statement, qtr_inc: &Statement) -> MetricBreakdown {
    let ann_rev = ann_inc.line(li::TOTAL_REVENUE);
    let ann_ebitda = ann_inc.line(li::EBITDA);
    let qtr_rev = qtr_inc.line(li::TOTAL_REVENUE);
    let qtr_ebitda = qtr_inc.line(li::EBITDA);
    let ann_margin = margin(&ann_ebitda, &ann_rev);
    let qtr_margin = margin(&qtr_ebitda, &qtr_rev);
    MetricBreakdown::new(ann_margin.latest())
        .detail("Annual EBITDA", &ann_ebitda)
        .detail("Annual Revenue", &ann_rev)
        .detail("Annual EBITDA Margin", &ann_margin)
        .detail("Quarter EBITDA", &qtr_ebitda)
        .detail("Quarter Revenue", &qtr_rev)
        .detail("Quarter EBITDA Margin", &qtr_margin)
        .detail("Quarter EBITDA Margin (Latest)", qtr_margin.latest())
}

/// Latest annual net debt / EBITDA.
#[must_use]
pub fn net_debt_to_ebitda(ann_inc: &Statement, ann_bs: &Statement) -> MetricBreakdown {
    let net_debt = ann_bs.line(li::NET_DEBT);
    let ebitda = ann_inc.line(li::EBITDA);
    let series = net_debt.combine(&ebitda, ratio);
    MetricBreakdown::new(ratio(net_debt.latest(), ebitda.latest()))
        .detail("Annual Net Debt", &net_debt)
        .detail("Annual EBITDA", &ebitda)
        .detail("Annual Net Debt / EBITDA (series)", &series)
}

/// Sample standard deviation of the annual EBITDA margin.
#[must_use]
pub fn ebitda_margin_volatility(ann_inc: &Statement) -> MetricBreakdown {
    let ann_margin = margin(&ann_inc.line(li::EBITDA), &ann_inc.line(li::TOTAL_REVENUE));
    let volatility = sample_std(ann_margin.points().iter().map(|p| p.1));
    MetricBreakdown::new(volatility).detail("Annual EBITDA Margin (series)", &ann_margin)
}

/// Mean year-over-year change of gross margin, in basis points.
#[must_use]
pub fn gross_margin_trend_bps(ann_inc: &Statement, qtr_inc: &Statement) -> MetricBreakdown {
    let ann_gm = gross_margin(ann_inc);
    let qtr_gm = gross_margin(qtr_inc);
    MetricBreakdown::new(trend_bps(&ann_gm))
        .detail("Annual Gross Margin (series)", &ann_gm)
        .detail("Quarter Gross Margin (series)", &qtr_gm)
        .detail("Quarter GM Trend Avg (bps)", trend_bps(&qtr_gm))
}

/// Latest COGS over the average of the latest two inventory balances.
///
/// Falls back to the latest inventory balance when fewer than two are reported.
#[must_use]
pub fn inventory_turnover(ann_inc: &Statement, ann_bs: &Statement) -> MetricBreakdown {
    let cogs = ann_inc.line(li::COST_OF_REVENUE);
    let inventory = ann_bs.line(li::INVENTORY);
    let avg_inventory = if inventory.observed().len() >= 2 {
        mean([inventory.get(0), inventory.get(1)])
    } else {
        inventory.get(0)
    };
    MetricBreakdown::new(ratio(cogs.latest(), avg_inventory))
        .detail("Annual COGS", &cogs)
        .detail("Annual Inventory", &inventory)
        .detail("Average Inventory (latest two)", avg_inventory)
}

/// Latest EBIT / |interest expense|; +∞ when interest expense is zero.
#[must_use]
pub fn interest_coverage(ann_inc: &Statement) -> MetricBreakdown {
    let ebit = ann_inc.line(li::EBIT);
    let interest = ann_inc.line(li::INTEREST_EXPENSE);
    let series = ebit.combine(&interest, |e, i| coverage(e, i.abs()));
    MetricBreakdown::new(coverage(ebit.latest(), interest.latest().abs()))
        .detail("Annual EBIT", &ebit)
        .detail("Annual Interest Expense", &interest)
        .detail("Interest Coverage (series)", &series)
}

/// Latest (cash + short-term investments) / total debt; +∞ with no debt.
#[must_use]
pub fn cash_to_debt(ann_bs: &Statement) -> MetricBreakdown {
    let cash = ann_bs.line(li::CASH);
    let sti = ann_bs.line(li::SHORT_TERM_INVESTMENTS);
    let debt = ann_bs.line(li::TOTAL_DEBT);
    let liquid = cash.combine(&sti, |c, s| c + s);
    let series = liquid.combine(&debt, ratio);
    MetricBreakdown::new(coverage(liquid.latest(), debt.latest()))
        .detail("Annual Cash", &cash)
        .detail("Annual Short Term Investments", &sti)
        .detail("Annual Total Debt", &debt)
        .detail("Cash+STI / Total Debt (series)", &series)
}

/// Change in days sales outstanding between the latest two years.
///
/// Years with zero or missing revenue are dropped before differencing.
#[must_use]
pub fn dso_change_yoy(ann_inc: &Statement, ann_bs: &Statement) -> MetricBreakdown {
    const DAYS: f64 = 365.0;
    let receivables = ann_bs.line(li::ACCOUNTS_RECEIVABLE);
    let revenue = ann_inc.line(li::TOTAL_REVENUE);
    let dso = receivables
        .combine(&revenue, |ar, rev| ratio(ar, rev) * DAYS)
        .observed();
    let delta = if dso.len() < 2 {
        f64::NAN
    } else {
        dso.get(0) - dso.get(1)
    };
    MetricBreakdown::new(delta)
        .detail("Annual Accounts Receivable", &receivables)
        .detail("Annual Revenue", &revenue)
        .detail("DSO (series, days)", &dso)
}

fn push(set: MetricSet, label: &str, group: &str, breakdown: MetricBreakdown) -> MetricSet {
    set.with_metric(label, breakdown.value)
        .with_supplemental(group, breakdown.details)
}

/// Expansion: revenue growth, EBITDA margin, net debt / EBITDA.
#[must_use]
pub fn expansion_metrics(fin: &Financials) -> MetricSet {
    let set = push(
        MetricSet::empty(),
        labels::REVENUE_GROWTH,
        "Revenue Growth",
        revenue_growth(&fin.annual_income, &fin.quarterly_income),
    );
    let set = push(
        set,
        labels::EBITDA_MARGIN,
        "EBITDA Margin",
        ebitda_margin(&fin.annual_income, &fin.quarterly_income),
    );
    push(
        set,
        labels::NET_DEBT_TO_EBITDA,
        "Net Debt / EBITDA",
        net_debt_to_ebitda(&fin.annual_income, &fin.annual_balance_sheet),
    )
}

/// Inflation: gross margin trend, inventory turnover, interest coverage.
#[must_use]
pub fn inflation_metrics(fin: &Financials) -> MetricSet {
    let set = push(
        MetricSet::empty(),
        labels::GROSS_MARGIN_TREND,
        "Gross Margin Trend",
        gross_margin_trend_bps(&fin.annual_income, &fin.quarterly_income),
    );
    let set = push(
        set,
        labels::INVENTORY_TURNOVER,
        labels::INVENTORY_TURNOVER,
        inventory_turnover(&fin.annual_income, &fin.annual_balance_sheet),
    );
    push(
        set,
        labels::INTEREST_COVERAGE,
        labels::INTEREST_COVERAGE,
        interest_coverage(&fin.annual_income),
    )
}

/// Stagflation: EBITDA margin volatility, gross margin trend, net debt / EBITDA.
#[must_use]
pub fn stagflation_metrics(fin: &Financials) -> MetricSet {
    let set = push(
        MetricSet::empty(),
        labels::EBITDA_MARGIN_VOLATILITY,
        labels::EBITDA_MARGIN_VOLATILITY,
        ebitda_margin_volatility(&fin.annual_income),
    );
    let set = push(
        set,
        labels::GROSS_MARGIN_TREND,
        "Gross Margin Trend",
        gross_margin_trend_bps(&fin.annual_income, &fin.quarterly_income),
    );
    push(
        set,
        labels::NET_DEBT_TO_EBITDA,
        labels::NET_DEBT_TO_EBITDA,
        net_debt_to_ebitda(&fin.annual_income, &fin.annual_balance_sheet),
    )
}

/// Recession: cash / debt, interest coverage, DSO change.
#[must_use]
pub fn recession_metrics(fin: &Financials) -> MetricSet {
    let set = push(
        MetricSet::empty(),
        labels::CASH_TO_DEBT,
        labels::CASH_TO_DEBT,
        cash_to_debt(&fin.annual_balance_sheet),
    );
    let set = push(
        set,
        labels::INTEREST_COVERAGE,
        labels::INTEREST_COVERAGE,
        interest_coverage(&fin.annual_income),
    );
    push(
        set,
        labels::DSO_CHANGE,
        labels::DSO_CHANGE,
        dso_change_yoy(&fin.annual_income, &fin.annual_balance_sheet),
    )
}
