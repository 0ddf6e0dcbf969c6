use crate::models::{
    AssistanceMatch, BillAnalysisIssue, CostEstimate, FinancialHardshipLevel, InsuranceAnalysis,
    InsuranceInfo, InsuranceTypeProfile, ItemizationRequest, MedicalBill, NavigationPlan,
    PaymentPlanOption, ProgramSummary, SavingsOpportunities, ServiceListing, SituationAnalysis,
};
use crate::service::{
    bill_analyzer, AssistanceMatcher, BillAnalyzer, CostEstimator, InsuranceAnalyzer,
    NavigationEngine, PaymentPlanner,
};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 出错响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 请求体: 咨询输入 (账单 + 保险 + 收入/家庭规模)
#[derive(Debug, Deserialize)]
pub struct NavigationPlanRequest {
    pub bills: Vec<MedicalBill>,
    pub insurance: InsuranceInfo,
    pub monthly_income: f64,
    pub household_size: u32,
}

/// 导航计划接口
pub async fn create_navigation_plan(
    State(engine): State<Arc<NavigationEngine>>,
    Json(req): Json<NavigationPlanRequest>,
) -> Json<NavigationPlan> {
    Json(engine.create_navigation_plan(
        &req.bills,
        &req.insurance,
        req.monthly_income,
        req.household_size,
    ))
}

/// 轻量版情况分析接口
pub async fn analyze_situation(
    State(engine): State<Arc<NavigationEngine>>,
    Json(req): Json<NavigationPlanRequest>,
) -> Json<SituationAnalysis> {
    Json(engine.analyze_situation(
        &req.bills,
        &req.insurance,
        req.monthly_income,
        req.household_size,
    ))
}

/// 请求体: 保险分析 (账单可选)
#[derive(Debug, Deserialize)]
pub struct InsuranceAnalysisRequest {
    pub insurance: InsuranceInfo,
    #[serde(default)]
    pub bills: Vec<MedicalBill>,
}

/// 保险分析接口
pub async fn analyze_insurance(
    State(analyzer): State<Arc<InsuranceAnalyzer>>,
    Json(req): Json<InsuranceAnalysisRequest>,
) -> Json<InsuranceAnalysis> {
    Json(analyzer.analyze_insurance(&req.insurance, &req.bills))
}

#[derive(Debug, Serialize)]
pub struct InsuranceTypesResponse {
    pub insurance_types: Vec<InsuranceTypeProfile>,
}

/// 保险类别目录接口
pub async fn get_insurance_types(
    State(analyzer): State<Arc<InsuranceAnalyzer>>,
) -> Json<InsuranceTypesResponse> {
    Json(InsuranceTypesResponse {
        insurance_types: analyzer.insurance_types(),
    })
}

/// 请求体: 账单列表
#[derive(Debug, Deserialize)]
pub struct BillAnalysisRequest {
    pub bills: Vec<MedicalBill>,
}

#[derive(Debug, Serialize)]
pub struct BillAnalysisResponse {
    pub issues: Vec<BillAnalysisIssue>,
}

/// 账单审查接口
pub async fn analyze_bills(
    State(analyzer): State<Arc<BillAnalyzer>>,
    Json(req): Json<BillAnalysisRequest>,
) -> Json<BillAnalysisResponse> {
    Json(BillAnalysisResponse {
        issues: analyzer.analyze_bills(&req.bills),
    })
}

/// 节省机会汇总接口
pub async fn calculate_savings(
    State(analyzer): State<Arc<BillAnalyzer>>,
    Json(req): Json<BillAnalysisRequest>,
) -> Json<SavingsOpportunities> {
    Json(analyzer.calculate_savings_opportunities(&req.bills))
}

/// 请求体: 单张账单
#[derive(Debug, Deserialize)]
pub struct ItemizationRequestBody {
    pub bill: MedicalBill,
}

/// 明细账单索取函接口
pub async fn generate_itemization_request(
    State(analyzer): State<Arc<BillAnalyzer>>,
    Json(req): Json<ItemizationRequestBody>,
) -> Json<ItemizationRequest> {
    Json(analyzer.generate_itemization_request(&req.bill))
}

/// 审查结果 CSV 导出接口
pub async fn export_bill_issues(
    State(analyzer): State<Arc<BillAnalyzer>>,
    Json(req): Json<BillAnalysisRequest>,
) -> Response {
    let issues = analyzer.analyze_bills(&req.bills);

    match bill_analyzer::export_issues_csv(&issues) {
        Ok(csv_text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv_text,
        )
            .into_response(),
        Err(e) => {
            let response = ErrorResponse {
                success: false,
                message: format!("Error: {}", e),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

fn default_location() -> String {
    "midwest".to_string()
}

fn default_true() -> bool {
    true
}

/// 请求体: 费用估算
#[derive(Debug, Deserialize)]
pub struct CostEstimateRequest {
    pub service_code: String,
    pub insurance: InsuranceInfo,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default = "default_true")]
    pub in_network: bool,
}

/// 费用估算接口
pub async fn estimate_cost(
    State(estimator): State<Arc<CostEstimator>>,
    Json(req): Json<CostEstimateRequest>,
) -> Json<CostEstimate> {
    Json(estimator.estimate_cost(
        &req.service_code,
        &req.insurance,
        &req.location,
        req.is_emergency,
        req.in_network,
    ))
}

#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub services: Vec<ServiceListing>,
}

/// 可估算服务目录接口
pub async fn get_available_services(
    State(estimator): State<Arc<CostEstimator>>,
) -> Json<ServicesResponse> {
    Json(ServicesResponse {
        services: estimator.available_services(),
    })
}

/// 请求体: 救助匹配; diagnoses 仅为兼容保留, 当前规则不参与评分
#[derive(Debug, Deserialize)]
pub struct AssistanceMatchRequest {
    pub insurance: InsuranceInfo,
    pub monthly_income: f64,
    pub household_size: u32,
    #[serde(default)]
    pub bills: Vec<MedicalBill>,
    #[serde(default)]
    pub hardship_level: Option<FinancialHardshipLevel>,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub prescriptions: Vec<String>,
}

/// 救助项目匹配接口
pub async fn match_assistance(
    State(matcher): State<Arc<AssistanceMatcher>>,
    Json(req): Json<AssistanceMatchRequest>,
) -> Json<AssistanceMatch> {
    Json(matcher.match_assistance(
        &req.insurance,
        req.monthly_income,
        req.household_size,
        &req.bills,
        req.hardship_level,
        &req.prescriptions,
    ))
}

#[derive(Debug, Serialize)]
pub struct ProgramsResponse {
    pub programs: Vec<ProgramSummary>,
}

/// 救助项目目录接口
pub async fn get_assistance_programs(
    State(matcher): State<Arc<AssistanceMatcher>>,
) -> Json<ProgramsResponse> {
    Json(ProgramsResponse {
        programs: matcher.programs_catalog(),
    })
}

/// 请求体: 还款方案
#[derive(Debug, Deserialize)]
pub struct PaymentPlanRequest {
    pub total_debt: f64,
    pub monthly_income: f64,
    #[serde(default)]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub debt_to_income_ratio: f64,
    #[serde(default)]
    pub hardship: bool,
}

#[derive(Debug, Serialize)]
pub struct PaymentPlansResponse {
    pub plans: Vec<PaymentPlanOption>,
}

/// 还款方案列表接口
pub async fn generate_payment_plans(
    State(planner): State<Arc<PaymentPlanner>>,
    Json(req): Json<PaymentPlanRequest>,
) -> Json<PaymentPlansResponse> {
    Json(PaymentPlansResponse {
        plans: planner.generate_payment_plans(
            req.total_debt,
            req.monthly_income,
            req.credit_score,
            req.debt_to_income_ratio,
            req.hardship,
        ),
    })
}

/// 最优还款方案接口
pub async fn recommend_best_plan(
    State(planner): State<Arc<PaymentPlanner>>,
    Json(req): Json<PaymentPlanRequest>,
) -> Json<PaymentPlanOption> {
    Json(planner.recommend_best_plan(
        req.total_debt,
        req.monthly_income,
        req.credit_score,
        req.debt_to_income_ratio,
        req.hardship,
    ))
}
