use medfin_rust::models::{
    FinancialHardshipLevel, InsuranceInfo, InsuranceType, IssueSeverity, MedicalBill, RiskLevel,
};
use medfin_rust::{
    AssistanceMatcher, BillAnalyzer, CostEstimator, NavigationEngine, PaymentPlanner,
};

fn ppo_insurance() -> InsuranceInfo {
    InsuranceInfo {
        insurance_type: InsuranceType::Private,
        provider_name: Some("Blue Cross".to_string()),
        plan_type: Some("PPO".to_string()),
        annual_deductible: 2000.0,
        deductible_met: 500.0,
        annual_out_of_pocket_max: 6000.0,
        out_of_pocket_met: 1200.0,
        copay_amount: 30.0,
        coinsurance_rate: 0.2,
        coverage_percentage: 0.8,
    }
}

fn hospital_bill() -> MedicalBill {
    MedicalBill {
        provider_name: "Hospital ABC".to_string(),
        service_date: None,
        total_amount: 5000.0,
        patient_responsibility: 2000.0,
        insurance_paid: 2500.0,
        insurance_adjustments: 500.0,
        service_codes: vec![
            "99213".to_string(),
            "99213".to_string(),
            "80053".to_string(),
        ],
        description: "Office visit and lab work".to_string(),
        is_itemized: true,
    }
}

#[test]
fn consult_pipeline_end_to_end() {
    let bills = vec![hospital_bill()];
    let insurance = ppo_insurance();

    // 账单审查必须报出 99213 的重复计费
    let analyzer = BillAnalyzer::new();
    let issues = analyzer.analyze_bills(&bills);
    let duplicate = issues
        .iter()
        .find(|i| i.issue_type == "duplicate_charge")
        .expect("duplicate charge detected");
    assert!(duplicate.description.contains("99213"));
    assert_eq!(duplicate.severity, IssueSeverity::High);
    // 99213 低端价 100, 出现 2 次
    assert_eq!(duplicate.potential_savings, 100.0);

    // 导航计划: 债务 2000, 比率 2000/60000 -> low
    let engine = NavigationEngine::new();
    let plan = engine.create_navigation_plan(&bills, &insurance, 5000.0, 1);
    assert_eq!(plan.total_medical_debt, 2000.0);
    assert_eq!(plan.debt_to_income_ratio, 0.0333);
    assert_eq!(plan.risk_level, RiskLevel::Low);
    assert!(!plan.action_plan.is_empty());
    assert!(!plan.summary.is_empty());

    // 救助匹配与还款推荐接在分级结果之后
    let matcher = AssistanceMatcher::new();
    let assistance = matcher.match_assistance(
        &insurance,
        5000.0,
        1,
        &bills,
        Some(plan.hardship_level),
        &[],
    );
    assert!(assistance.recommended_programs.len() <= 3);
    assert_eq!(
        assistance.application_priority_order.len(),
        assistance.programs.len()
    );

    let planner = PaymentPlanner::new();
    let best = planner.recommend_best_plan(
        plan.total_medical_debt,
        5000.0,
        Some(700),
        plan.debt_to_income_ratio,
        plan.hardship_level != FinancialHardshipLevel::None,
    );
    assert!(best.recommendation_score >= 0.0);
    assert!(best.recommendation_score <= 100.0);
    assert!(best.term_months > 0);
}

#[test]
fn estimate_is_consistent_with_coverage_split() {
    let estimator = CostEstimator::new();
    let insurance = ppo_insurance();

    for code in ["office_visit", "mri_scan", "colonoscopy", "unknown_code"] {
        for location in ["northeast", "west", "midwest", "south", "elsewhere"] {
            let estimate = estimator.estimate_cost(code, &insurance, location, false, true);
            // 患者 + 保险 = 调整后费用 (允许 1 分钱舍入误差)
            assert!(
                (estimate.with_insurance
                    - (estimate.base_cost * estimate.location_multiplier))
                    .abs()
                    < 0.01,
                "split mismatch for {} in {}",
                code,
                location
            );
            assert!(estimate.estimated_range.0 <= estimate.estimated_range.1);
        }
    }
}

#[test]
fn components_are_idempotent() {
    let bills = vec![hospital_bill()];
    let insurance = ppo_insurance();

    let analyzer = BillAnalyzer::new();
    let first = serde_json::to_string(&analyzer.analyze_bills(&bills)).expect("serialize");
    let second = serde_json::to_string(&analyzer.analyze_bills(&bills)).expect("serialize");
    assert_eq!(first, second);

    let matcher = AssistanceMatcher::new();
    let a = matcher.match_assistance(&insurance, 2000.0, 2, &bills, None, &[]);
    let b = matcher.match_assistance(&insurance, 2000.0, 2, &bills, None, &[]);
    assert_eq!(
        serde_json::to_string(&a).expect("serialize"),
        serde_json::to_string(&b).expect("serialize")
    );
}
