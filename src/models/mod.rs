pub mod assistance;
pub mod bill;
pub mod cost;
pub mod insurance;
pub mod navigation;
pub mod payment;

pub use assistance::{AssistanceMatch, AssistanceProgram, ProgramSummary};
pub use bill::{
    BillAnalysisIssue, IssueSeverity, IssueTypeSummary, ItemizationRequest, MedicalBill,
    ProviderInfo, SavingsOpportunities,
};
pub use cost::{CostEstimate, ServiceAlternative, ServiceListing, ServiceType};
pub use insurance::{
    CostSharing, CoverageStatus, DeductibleStatus, InsuranceAnalysis, InsuranceCoverageGap,
    InsuranceInfo, InsuranceType, InsuranceTypeProfile, OptimizationRecommendation,
    OutOfPocketStatus, Utilization,
};
pub use navigation::{
    ActionItem, FinancialHardshipLevel, NavigationPlan, RiskLevel, SituationAnalysis,
};
pub use payment::PaymentPlanOption;
