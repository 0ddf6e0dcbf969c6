use serde::{Deserialize, Serialize};

use super::insurance::InsuranceCoverageGap;

/// 债务风险等级 (low < medium < high < critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// 经济困难等级 (none < mild < moderate < severe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialHardshipLevel {
    None,
    Mild,
    Moderate,
    Severe,
}

impl FinancialHardshipLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FinancialHardshipLevel::None => "none",
            FinancialHardshipLevel::Mild => "mild",
            FinancialHardshipLevel::Moderate => "moderate",
            FinancialHardshipLevel::Severe => "severe",
        }
    }
}

/// 行动计划单项, priority 从 1 起, 越小越紧急
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: u32,
    pub action: String,
    pub category: String,
    pub estimated_savings: Option<f64>,
    pub estimated_timeframe: Option<String>,
    pub description: String,
}

/// 导航计划: 一次咨询的聚合输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationPlan {
    pub risk_level: RiskLevel,
    pub hardship_level: FinancialHardshipLevel,
    pub total_medical_debt: f64,
    pub debt_to_income_ratio: f64,
    pub coverage_gaps: Vec<InsuranceCoverageGap>,
    pub action_plan: Vec<ActionItem>,
    pub estimated_total_savings: f64,
    pub recommended_timeline: String,
    pub summary: String,
}

/// 轻量版分析: 只给分级与固定建议, 不含金额化行动计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SituationAnalysis {
    pub risk_level: RiskLevel,
    pub hardship_level: FinancialHardshipLevel,
    pub total_medical_debt: f64,
    pub debt_to_income_ratio: f64,
    pub monthly_income: f64,
    pub household_size: u32,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}
