pub mod api;
pub mod config;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use service::{
    AssistanceMatcher, BillAnalyzer, CostEstimator, InsuranceAnalyzer, NavigationEngine,
    PaymentPlanner,
};
