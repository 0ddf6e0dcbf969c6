use axum::{
    routing::{get, post},
    Router,
};
use medfin_rust::{
    api, AppConfig, AssistanceMatcher, BillAnalyzer, CostEstimator, InsuranceAnalyzer,
    NavigationEngine, PaymentPlanner,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 各服务均为无状态纯计算, 静态表在构造时加载一次
    let navigation_engine = Arc::new(NavigationEngine::new());
    let insurance_analyzer = Arc::new(InsuranceAnalyzer::new());
    let bill_analyzer = Arc::new(BillAnalyzer::new());
    let cost_estimator = Arc::new(CostEstimator::new());
    let assistance_matcher = Arc::new(AssistanceMatcher::new());
    let payment_planner = Arc::new(PaymentPlanner::new());

    // 构建路由, 按服务分组
    let navigation_routes = Router::new()
        .route("/api/navigation/plan", post(api::create_navigation_plan))
        .route("/api/navigation/analyze", post(api::analyze_situation))
        .with_state(navigation_engine);

    let insurance_routes = Router::new()
        .route("/api/insurance/analyze", post(api::analyze_insurance))
        .route("/api/insurance/types", get(api::get_insurance_types))
        .with_state(insurance_analyzer);

    let bill_routes = Router::new()
        .route("/api/bills/analyze", post(api::analyze_bills))
        .route("/api/bills/savings", post(api::calculate_savings))
        .route(
            "/api/bills/itemization-request",
            post(api::generate_itemization_request),
        )
        .route("/api/bills/export", post(api::export_bill_issues))
        .with_state(bill_analyzer);

    let cost_routes = Router::new()
        .route("/api/costs/estimate", post(api::estimate_cost))
        .route("/api/costs/services", get(api::get_available_services))
        .with_state(cost_estimator);

    let assistance_routes = Router::new()
        .route("/api/assistance/match", post(api::match_assistance))
        .route("/api/assistance/programs", get(api::get_assistance_programs))
        .with_state(assistance_matcher);

    let payment_routes = Router::new()
        .route(
            "/api/payment-plans/generate",
            post(api::generate_payment_plans),
        )
        .route(
            "/api/payment-plans/recommend",
            post(api::recommend_best_plan),
        )
        .with_state(payment_planner);

    // 合并路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(navigation_routes)
        .merge(insurance_routes)
        .merge(bill_routes)
        .merge(cost_routes)
        .merge(assistance_routes)
        .merge(payment_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/navigation/plan          - Full navigation plan");
    info!("  POST /api/navigation/analyze       - Situation analysis");
    info!("  POST /api/insurance/analyze        - Insurance analysis");
    info!("  POST /api/bills/analyze            - Bill error detection");
    info!("  POST /api/costs/estimate           - Cost estimation");
    info!("  POST /api/assistance/match         - Assistance matching");
    info!("  POST /api/payment-plans/recommend  - Payment plan recommendation");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
