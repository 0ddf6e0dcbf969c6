pub mod assistance_matcher;
pub mod bill_analyzer;
pub mod cost_estimator;
pub mod insurance_analyzer;
pub mod navigation_engine;
pub mod payment_planner;

pub use assistance_matcher::AssistanceMatcher;
pub use bill_analyzer::BillAnalyzer;
pub use cost_estimator::CostEstimator;
pub use insurance_analyzer::InsuranceAnalyzer;
pub use navigation_engine::NavigationEngine;
pub use payment_planner::PaymentPlanner;

/// 2024 联邦贫困线 (FPL), 按家庭人数; 超过 8 人按每人 5260 外推
pub(crate) fn federal_poverty_level(household_size: u32) -> f64 {
    match household_size {
        1 => 15180.0,
        2 => 20440.0,
        3 => 25700.0,
        4 => 30960.0,
        5 => 36220.0,
        6 => 41480.0,
        7 => 46740.0,
        8 => 52000.0,
        n => 52000.0 + (n as f64 - 8.0) * 5260.0,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 千分位美元格式, 如 12345.6 -> "12,345.60"
pub(crate) fn format_usd(amount: f64) -> String {
    let text = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fpl_table_and_extrapolation() {
        assert_eq!(federal_poverty_level(1), 15180.0);
        assert_eq!(federal_poverty_level(8), 52000.0);
        assert_eq!(federal_poverty_level(10), 52000.0 + 2.0 * 5260.0);
    }

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(999.5), "999.50");
        assert_eq!(format_usd(1234567.891), "1,234,567.89");
        assert_eq!(format_usd(-2500.0), "-2,500.00");
    }
}
