use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 医疗账单 (调用方提供, 不落库)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalBill {
    pub provider_name: String,
    #[serde(default)]
    pub service_date: Option<DateTime<Utc>>,
    pub total_amount: f64,
    pub patient_responsibility: f64,
    #[serde(default)]
    pub insurance_paid: f64,
    #[serde(default)]
    pub insurance_adjustments: f64,
    #[serde(default)]
    pub service_codes: Vec<String>, // 保序, 重复计费有意义
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_itemized: bool,
}

/// 问题严重度, 排序优先级 high < medium < low
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    High,
    Medium,
    Low,
}

impl IssueSeverity {
    pub fn rank(self) -> u8 {
        match self {
            IssueSeverity::High => 0,
            IssueSeverity::Medium => 1,
            IssueSeverity::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueSeverity::High => "high",
            IssueSeverity::Medium => "medium",
            IssueSeverity::Low => "low",
        }
    }
}

/// 账单审查发现的单个问题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillAnalysisIssue {
    pub issue_type: String,
    pub severity: IssueSeverity,
    pub description: String,
    pub potential_savings: f64,
    pub recommendation: String,
}

/// 按问题类型汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTypeSummary {
    pub count: usize,
    pub total_savings: f64,
    pub average_savings: f64,
}

/// 节省机会汇总 (issues_by_type 按首次出现顺序)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOpportunities {
    pub total_issues: usize,
    pub total_potential_savings: f64,
    pub issues_by_type: IndexMap<String, IssueTypeSummary>,
    pub high_priority_issues: Vec<BillAnalysisIssue>,
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub date: String,
    pub account_number: String,
}

/// 明细账单索取函 (模板生成, 供患者寄送)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemizationRequest {
    pub request_type: String,
    pub patient_contact_info: String,
    pub provider_info: ProviderInfo,
    pub request_text: String,
    pub additional_notes: Vec<String>,
}
