//! Headline metric labels.
//!
//! These strings are the keys of every metric set and of the outlier tables.

/// Annual revenue growth, fraction.
pub const REVENUE_GROWTH: &str = "Revenue Growth (YoY)";
/// Latest annual EBITDA margin, fraction.
pub const EBITDA_MARGIN: &str = "EBITDA Margin";
/// Latest net debt over EBITDA, multiple.
pub const NET_DEBT_TO_EBITDA: &str = "Net Debt / EBITDA";
/// Average annual gross margin change, basis points.
pub const GROSS_MARGIN_TREND: &str = "Gross Margin Trend (YoY, bps)";
/// Latest inventory turnover, multiple.
pub const INVENTORY_TURNOVER: &str = "Inventory Turnover (x)";
/// Latest EBIT over interest expense, multiple.
pub const INTEREST_COVERAGE: &str = "Interest Coverage (EBIT/InterestExpense)";
/// Sample stdev of annual EBITDA margin, fraction.
pub const EBITDA_MARGIN_VOLATILITY: &str = "EBITDA Margin Volatility";
/// Latest cash and short-term investments over total debt, multiple.
pub const CASH_TO_DEBT: &str = "Cash & ST Inv. / Total Debt";
/// Change in days sales outstanding, days.
pub const DSO_CHANGE: &str = "DSO Change (YoY, days)";

/// Annual PPNR growth, fraction.
pub const PPNR_GROWTH: &str = "PPNR Growth (YoY)";
/// Latest efficiency ratio, fraction.
pub const EFFICIENCY_RATIO: &str = "Efficiency Ratio";
/// Change in efficiency ratio, basis points.
pub const EFFICIENCY_RATIO_DELTA: &str = "Efficiency Ratio Δ (YoY, bps)";
/// Latest return on equity, fraction.
pub const ROE: &str = "ROE";
/// Latest return on assets, fraction.
pub const ROA: &str = "ROA";
/// Annual net interest income growth, fraction.
pub const NII_GROWTH: &str = "NII Growth (YoY)";
/// Latest equity over assets, fraction.
pub const EQUITY_TO_ASSETS: &str = "Equity / Assets";
/// Sample stdev of quarterly PPNR growth, fraction.
pub const PPNR_GROWTH_VOLATILITY: &str = "PPNR Growth Volatility (stdev, quarterly)";
/// Latest PPNR over total assets, fraction.
pub const PPNR_TO_ASSETS: &str = "PPNR / Assets";
