use serde::{Deserialize, Serialize};

/// 还款方案候选, recommendation_score 在评分阶段填充 (0-100)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPlanOption {
    pub plan_type: String,
    pub monthly_payment: f64,
    pub total_repayment: f64,
    pub term_months: u32,
    pub interest_rate: f64, // 年化百分比
    pub total_interest: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub eligibility_criteria: Vec<String>,
    pub recommendation_score: f64,
}
