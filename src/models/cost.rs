use serde::{Deserialize, Serialize};

/// 服务目录条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    pub code: String,
    pub name: String,
    pub category: String,
    pub base_cost: f64,
    pub description: String,
}

/// 更低价的替代服务 (目录手工维护)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAlternative {
    #[serde(rename = "type")]
    pub alternative_type: String,
    pub estimated_cost: f64,
    pub description: String,
    pub savings: String,
}

/// 费用估算结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    pub service_name: String,
    pub base_cost: f64,
    pub estimated_range: (f64, f64),
    pub location_multiplier: f64,
    pub with_insurance: f64,
    pub out_of_pocket: f64,
    pub alternatives: Vec<ServiceAlternative>,
}

/// 可估算服务列表行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListing {
    pub code: String,
    pub name: String,
    pub category: String,
    pub base_cost: f64,
    pub description: String,
}
