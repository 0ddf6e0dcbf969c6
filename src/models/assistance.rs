use serde::{Deserialize, Serialize};

/// 救助项目 (静态目录条目, income_threshold 为 FPL 倍数)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceProgram {
    pub program_name: String,
    pub provider_type: String,
    pub eligibility_requirements: Vec<String>,
    pub coverage_type: String,
    pub max_benefit: Option<f64>,
    pub application_process: String,
    pub documentation_required: Vec<String>,
    pub contact_info: String,
    pub approval_timeframe: String,
    pub income_threshold: f64,
}

/// 匹配结果: 符合条件的项目按 (priority, score) 排序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceMatch {
    pub programs: Vec<AssistanceProgram>,
    pub total_potential_savings: f64,
    pub recommended_programs: Vec<String>,
    pub application_priority_order: Vec<String>,
    pub additional_notes: Vec<String>,
}

/// 项目速览行 (列表接口用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub program_name: String,
    pub provider_type: String,
    pub coverage_type: String,
    pub income_threshold: f64,
    pub approval_timeframe: String,
    pub key_requirements: Vec<String>,
}
