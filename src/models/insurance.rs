use serde::{Deserialize, Serialize};

/// 保险类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceType {
    Private,
    Medicare,
    Medicaid,
    Va,
    Tricare,
    Uninsured,
}

impl InsuranceType {
    pub fn as_str(self) -> &'static str {
        match self {
            InsuranceType::Private => "private",
            InsuranceType::Medicare => "medicare",
            InsuranceType::Medicaid => "medicaid",
            InsuranceType::Va => "va",
            InsuranceType::Tricare => "tricare",
            InsuranceType::Uninsured => "uninsured",
        }
    }
}

/// 保险条款 (调用方提供; met 金额与年度上限的一致性由边界层保证)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub insurance_type: InsuranceType,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub annual_deductible: f64,
    #[serde(default)]
    pub deductible_met: f64,
    #[serde(default)]
    pub annual_out_of_pocket_max: f64,
    #[serde(default)]
    pub out_of_pocket_met: f64,
    #[serde(default)]
    pub copay_amount: f64,
    #[serde(default)]
    pub coinsurance_rate: f64, // 0-1
    #[serde(default)]
    pub coverage_percentage: f64, // 0-1
}

/// 检出的单个保障缺口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceCoverageGap {
    pub gap_type: String,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductibleStatus {
    pub annual: f64,
    pub met: f64,
    pub remaining: f64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutOfPocketStatus {
    pub annual_max: f64,
    pub met: f64,
    pub remaining: f64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSharing {
    pub copay: f64,
    pub coinsurance_rate: f64,     // 百分比
    pub coverage_percentage: f64,  // 百分比
}

/// 当前保障状态: excellent / developing / nearly_maxed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageStatus {
    pub status: String,
    pub deductible: DeductibleStatus,
    pub out_of_pocket: OutOfPocketStatus,
    pub cost_sharing: CostSharing,
}

/// 已交账单的利用度汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utilization {
    pub total_services: usize,
    pub total_billed: f64,
    pub insurance_paid: f64,
    pub patient_responsibility: f64,
    pub coverage_rate: f64, // 百分比
    pub out_of_network_charges: usize,
    pub out_of_network_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub category: String,
    pub priority: String,
    pub action: String,
    pub description: String,
}

/// 保险分析结果聚合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceAnalysis {
    pub coverage_status: CoverageStatus,
    pub utilization: Utilization,
    pub coverage_gaps: Vec<InsuranceCoverageGap>,
    pub optimization_recommendations: Vec<OptimizationRecommendation>,
    pub summary: String,
}

/// 保险类别说明 (静态目录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceTypeProfile {
    #[serde(rename = "type")]
    pub insurance_type: InsuranceType,
    pub name: String,
    pub description: String,
    pub typical_features: Vec<String>,
}
