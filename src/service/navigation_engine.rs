use crate::models::{
    ActionItem, FinancialHardshipLevel, InsuranceCoverageGap, InsuranceInfo, InsuranceType,
    MedicalBill, NavigationPlan, RiskLevel, SituationAnalysis,
};

use super::{federal_poverty_level, format_usd, round4};

/// 债务/年收入比的分级阈值 (下限含)
struct RiskThresholds {
    medium: f64,
    high: f64,
    critical: f64,
}

/// 收入/FPL 比的困难分级阈值 (上限含)
struct HardshipThresholds {
    severe: f64,
    moderate: f64,
    mild: f64,
}

/// 导航引擎: 单次咨询的总入口, 串联风险分级 -> 缺口 -> 行动计划
pub struct NavigationEngine {
    risk_thresholds: RiskThresholds,
    hardship_thresholds: HardshipThresholds,
}

impl NavigationEngine {
    pub fn new() -> Self {
        Self {
            risk_thresholds: RiskThresholds {
                medium: 0.15,
                high: 0.30,
                critical: 0.50,
            },
            hardship_thresholds: HardshipThresholds {
                severe: 1.5,
                moderate: 2.5,
                mild: 4.0,
            },
        }
    }

    pub fn create_navigation_plan(
        &self,
        bills: &[MedicalBill],
        insurance: &InsuranceInfo,
        monthly_income: f64,
        household_size: u32,
    ) -> NavigationPlan {
        let total_debt = total_medical_debt(bills);
        let debt_to_income = self.debt_to_income_ratio(total_debt, monthly_income);

        let risk_level = self.assess_risk_level(debt_to_income);
        let hardship_level = self.assess_hardship_level(monthly_income, household_size);

        let coverage_gaps = self.identify_coverage_gaps(insurance, bills);
        let action_plan = self.generate_action_plan(risk_level, hardship_level, total_debt);

        let estimated_savings: f64 = action_plan
            .iter()
            .map(|item| item.estimated_savings.unwrap_or(0.0))
            .sum();

        tracing::info!(
            "Navigation plan: debt {:.2}, ratio {}, risk {:?}, hardship {:?}",
            total_debt,
            debt_to_income,
            risk_level,
            hardship_level
        );

        NavigationPlan {
            risk_level,
            hardship_level,
            total_medical_debt: total_debt,
            debt_to_income_ratio: debt_to_income,
            coverage_gaps,
            estimated_total_savings: estimated_savings,
            recommended_timeline: self.determine_timeline(risk_level),
            summary: self.generate_summary(risk_level, hardship_level, total_debt, estimated_savings),
            action_plan,
        }
    }

    /// 轻量版: 只做分级并给固定建议
    pub fn analyze_situation(
        &self,
        bills: &[MedicalBill],
        _insurance: &InsuranceInfo,
        monthly_income: f64,
        household_size: u32,
    ) -> SituationAnalysis {
        let total_debt = total_medical_debt(bills);
        let debt_to_income = self.debt_to_income_ratio(total_debt, monthly_income);
        let risk_level = self.assess_risk_level(debt_to_income);
        let hardship_level = self.assess_hardship_level(monthly_income, household_size);

        SituationAnalysis {
            risk_level,
            hardship_level,
            total_medical_debt: total_debt,
            debt_to_income_ratio: debt_to_income,
            monthly_income,
            household_size,
            recommendations: self.immediate_recommendations(risk_level, hardship_level),
            next_steps: self.next_steps(risk_level),
        }
    }

    /// 债务/年收入比, 保留 4 位小数; 无收入时按最大风险记 1.0
    pub fn debt_to_income_ratio(&self, debt: f64, monthly_income: f64) -> f64 {
        if monthly_income == 0.0 {
            return 1.0;
        }
        round4(debt / (monthly_income * 12.0))
    }

    pub fn assess_risk_level(&self, debt_to_income: f64) -> RiskLevel {
        if debt_to_income >= self.risk_thresholds.critical {
            RiskLevel::Critical
        } else if debt_to_income >= self.risk_thresholds.high {
            RiskLevel::High
        } else if debt_to_income >= self.risk_thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn assess_hardship_level(
        &self,
        monthly_income: f64,
        household_size: u32,
    ) -> FinancialHardshipLevel {
        let annual_income = monthly_income * 12.0;
        let fpl = federal_poverty_level(household_size);
        let income_ratio = if fpl > 0.0 { annual_income / fpl } else { 0.0 };

        if income_ratio <= self.hardship_thresholds.severe {
            FinancialHardshipLevel::Severe
        } else if income_ratio <= self.hardship_thresholds.moderate {
            FinancialHardshipLevel::Moderate
        } else if income_ratio <= self.hardship_thresholds.mild {
            FinancialHardshipLevel::Mild
        } else {
            FinancialHardshipLevel::None
        }
    }

    /// 缺口检测: 与保险分析服务的规则形状相同但阈值独立, 按本次账单集评估
    fn identify_coverage_gaps(
        &self,
        insurance: &InsuranceInfo,
        bills: &[MedicalBill],
    ) -> Vec<InsuranceCoverageGap> {
        let mut gaps = Vec::new();

        let remaining_deductible = insurance.annual_deductible - insurance.deductible_met;
        if remaining_deductible > 0.0 {
            gaps.push(InsuranceCoverageGap {
                gap_type: "deductible_not_met".to_string(),
                description: format!("Deductible not met: ${:.2} remaining", remaining_deductible),
                impact: "Full charges apply until deductible is met".to_string(),
                recommendation:
                    "Consider deferring non-urgent care until deductible is met or explore payment assistance"
                        .to_string(),
            });
        }

        let remaining_oop = insurance.annual_out_of_pocket_max - insurance.out_of_pocket_met;
        if remaining_oop > 0.0 && insurance.out_of_pocket_met > 0.0 {
            let progress_percent =
                insurance.out_of_pocket_met / insurance.annual_out_of_pocket_max * 100.0;
            if progress_percent > 80.0 {
                gaps.push(InsuranceCoverageGap {
                    gap_type: "near_out_of_pocket_max".to_string(),
                    description: format!(
                        "Out-of-pocket max nearly reached: ${:.2} remaining",
                        remaining_oop
                    ),
                    impact: "Most services will be covered after reaching max".to_string(),
                    recommendation: "Schedule necessary procedures now to maximize coverage"
                        .to_string(),
                });
            }
        }

        let uninsured_bills = bills
            .iter()
            .filter(|b| b.insurance_paid == 0.0 && b.insurance_adjustments == 0.0)
            .count();
        if uninsured_bills > 0 && insurance.insurance_type != InsuranceType::Uninsured {
            gaps.push(InsuranceCoverageGap {
                gap_type: "potential_uncovered_charges".to_string(),
                description: format!(
                    "{} bill(s) with no insurance payment recorded",
                    uninsured_bills
                ),
                impact: "May indicate out-of-network services or coverage issues".to_string(),
                recommendation: "Review bills for out-of-network charges and verify coverage"
                    .to_string(),
            });
        }

        gaps
    }

    /// 行动计划: 固定顺序; 账单顾问一项只在 high/critical 时出现
    fn generate_action_plan(
        &self,
        risk_level: RiskLevel,
        hardship_level: FinancialHardshipLevel,
        total_debt: f64,
    ) -> Vec<ActionItem> {
        let mut actions = Vec::new();
        let mut priority = 1;

        actions.push(ActionItem {
            priority,
            action: "Request itemized bills for all charges".to_string(),
            category: "bill_review".to_string(),
            estimated_savings: Some(total_debt * 0.05),
            estimated_timeframe: Some("1-2 weeks".to_string()),
            description: "Itemized bills reveal errors and overcharges that can be disputed"
                .to_string(),
        });
        priority += 1;

        actions.push(ActionItem {
            priority,
            action: "Apply for hospital charity care or financial assistance".to_string(),
            category: "assistance".to_string(),
            estimated_savings: Some(if hardship_level != FinancialHardshipLevel::None {
                total_debt * 0.40
            } else {
                0.0
            }),
            estimated_timeframe: Some("2-4 weeks".to_string()),
            description: "Hospitals are required to offer financial assistance programs"
                .to_string(),
        });
        priority += 1;

        actions.push(ActionItem {
            priority,
            action: "Review insurance coverage for all bills".to_string(),
            category: "insurance".to_string(),
            estimated_savings: Some(total_debt * 0.15),
            estimated_timeframe: Some("2-3 weeks".to_string()),
            description: "Check for out-of-network charges and coverage denials that can be appealed"
                .to_string(),
        });
        priority += 1;

        actions.push(ActionItem {
            priority,
            action: "Negotiate payment plan with providers".to_string(),
            category: "payment_planning".to_string(),
            estimated_savings: Some(total_debt * 0.10),
            estimated_timeframe: Some("1-2 weeks".to_string()),
            description: "Many providers offer interest-free payment plans with flexible terms"
                .to_string(),
        });
        priority += 1;

        if matches!(risk_level, RiskLevel::High | RiskLevel::Critical) {
            actions.push(ActionItem {
                priority,
                action: "Consult with medical billing advocate".to_string(),
                category: "professional_help".to_string(),
                estimated_savings: Some(total_debt * 0.20),
                estimated_timeframe: Some("2-4 weeks".to_string()),
                description: "Professional advocates can negotiate significant reductions"
                    .to_string(),
            });
            priority += 1;
        }

        actions.push(ActionItem {
            priority,
            action: "Explore government assistance programs".to_string(),
            category: "assistance".to_string(),
            estimated_savings: Some(if hardship_level == FinancialHardshipLevel::Severe {
                total_debt * 0.25
            } else {
                0.0
            }),
            estimated_timeframe: Some("4-8 weeks".to_string()),
            description: "Medicaid, CHIP, and other programs may cover past medical expenses"
                .to_string(),
        });

        actions
    }

    fn determine_timeline(&self, risk_level: RiskLevel) -> String {
        match risk_level {
            RiskLevel::Critical => "Immediate action required within 30 days".to_string(),
            RiskLevel::High => {
                "High-priority actions within 60 days, remainder within 90 days".to_string()
            }
            RiskLevel::Medium => "Complete within 3-6 months".to_string(),
            RiskLevel::Low => "Complete within 6-12 months".to_string(),
        }
    }

    fn generate_summary(
        &self,
        risk_level: RiskLevel,
        hardship_level: FinancialHardshipLevel,
        total_debt: f64,
        estimated_savings: f64,
    ) -> String {
        let risk_verb = match risk_level {
            RiskLevel::Low => "manageable",
            RiskLevel::Medium => "requires attention",
            RiskLevel::High => "serious concern",
            RiskLevel::Critical => "urgent action needed",
        };

        format!(
            "Your medical debt situation is {} with a total of ${} in debt. \
             Based on your hardship level ({}), you may be eligible for assistance programs \
             that could save an estimated ${}. Follow the action plan to reduce your \
             financial burden systematically.",
            risk_verb,
            format_usd(total_debt),
            hardship_level.as_str(),
            format_usd(estimated_savings)
        )
    }

    fn immediate_recommendations(
        &self,
        risk_level: RiskLevel,
        hardship_level: FinancialHardshipLevel,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if matches!(risk_level, RiskLevel::High | RiskLevel::Critical) {
            recommendations
                .push("Contact providers immediately to pause collection efforts".to_string());
            recommendations.push("Apply for hospital financial assistance programs".to_string());
        }

        if matches!(
            hardship_level,
            FinancialHardshipLevel::Moderate | FinancialHardshipLevel::Severe
        ) {
            recommendations.push("You likely qualify for charity care programs".to_string());
            recommendations.push("Consider Medicaid enrollment if eligible".to_string());
        }

        recommendations.push("Request itemized bills for all charges".to_string());

        recommendations
    }

    fn next_steps(&self, risk_level: RiskLevel) -> Vec<String> {
        match risk_level {
            RiskLevel::Critical => vec![
                "1. Contact hospital billing department immediately".to_string(),
                "2. Request charity care application".to_string(),
                "3. Provide income documentation".to_string(),
                "4. Review all bills for errors".to_string(),
                "5. Negotiate payment terms".to_string(),
            ],
            RiskLevel::High => vec![
                "1. Gather all medical bills".to_string(),
                "2. Request itemized statements".to_string(),
                "3. Apply for financial assistance".to_string(),
                "4. Review insurance coverage".to_string(),
                "5. Set up payment plans".to_string(),
            ],
            _ => vec![
                "1. Review your current medical expenses".to_string(),
                "2. Check insurance benefits".to_string(),
                "3. Look for savings opportunities".to_string(),
                "4. Plan for future healthcare costs".to_string(),
            ],
        }
    }
}

impl Default for NavigationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn total_medical_debt(bills: &[MedicalBill]) -> f64 {
    bills.iter().map(|b| b.patient_responsibility).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_insurance() -> InsuranceInfo {
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

    fn sample_bills() -> Vec<MedicalBill> {
        vec![
            MedicalBill {
                provider_name: "Hospital ABC".to_string(),
                service_date: None,
                total_amount: 5000.0,
                patient_responsibility: 2000.0,
                insurance_paid: 2500.0,
                insurance_adjustments: 500.0,
                service_codes: vec!["99213".to_string(), "80053".to_string()],
                description: "Office visit and lab work".to_string(),
                is_itemized: true,
            },
            MedicalBill {
                provider_name: "Clinic XYZ".to_string(),
                service_date: None,
                total_amount: 1000.0,
                patient_responsibility: 500.0,
                insurance_paid: 400.0,
                insurance_adjustments: 100.0,
                service_codes: vec!["99214".to_string()],
                description: "Specialist visit".to_string(),
                is_itemized: false,
            },
        ]
    }

    #[test]
    fn debt_to_income_rounds_to_four_decimals() {
        let engine = NavigationEngine::new();
        // 2500 / 60000 = 0.041666...
        assert_eq!(engine.debt_to_income_ratio(2500.0, 5000.0), 0.0417);
    }

    #[test]
    fn zero_income_pins_ratio_to_one() {
        let engine = NavigationEngine::new();
        assert_eq!(engine.debt_to_income_ratio(2500.0, 0.0), 1.0);
        assert_eq!(engine.assess_risk_level(1.0), RiskLevel::Critical);
    }

    #[test]
    fn risk_thresholds_are_inclusive_lower_bounds() {
        let engine = NavigationEngine::new();
        assert_eq!(engine.assess_risk_level(0.30), RiskLevel::High);
        assert_eq!(engine.assess_risk_level(0.2999), RiskLevel::Medium);
        assert_eq!(engine.assess_risk_level(0.15), RiskLevel::Medium);
        assert_eq!(engine.assess_risk_level(0.1499), RiskLevel::Low);
        assert_eq!(engine.assess_risk_level(0.50), RiskLevel::Critical);
    }

    #[test]
    fn hardship_classification_boundaries() {
        let engine = NavigationEngine::new();
        assert_eq!(
            engine.assess_hardship_level(50_000.0, 1),
            FinancialHardshipLevel::None
        );
        assert_eq!(
            engine.assess_hardship_level(4000.0, 1),
            FinancialHardshipLevel::Mild
        );
        assert_eq!(
            engine.assess_hardship_level(2000.0, 1),
            FinancialHardshipLevel::Moderate
        );
        assert_eq!(
            engine.assess_hardship_level(1000.0, 1),
            FinancialHardshipLevel::Severe
        );
    }

    #[test]
    fn plan_totals_and_classification() {
        let engine = NavigationEngine::new();
        let plan = engine.create_navigation_plan(&sample_bills(), &sample_insurance(), 5000.0, 1);

        assert_eq!(plan.total_medical_debt, 2500.0);
        assert_eq!(plan.debt_to_income_ratio, 0.0417);
        assert_eq!(plan.risk_level, RiskLevel::Low);
        assert!(plan.estimated_total_savings >= 0.0);
        // 非 high/critical 风险: 顾问一项不出现, 共 5 项
        assert_eq!(plan.action_plan.len(), 5);
        for (index, item) in plan.action_plan.iter().enumerate() {
            assert_eq!(item.priority, index as u32 + 1);
        }
    }

    #[test]
    fn advocate_step_appears_for_high_risk() {
        let engine = NavigationEngine::new();
        // 债务 30000 / 年收入 60000 = 0.5 -> critical
        let mut bills = sample_bills();
        bills[0].patient_responsibility = 30_000.0;
        bills.truncate(1);

        let plan = engine.create_navigation_plan(&bills, &sample_insurance(), 5000.0, 1);
        assert_eq!(plan.risk_level, RiskLevel::Critical);
        assert_eq!(plan.action_plan.len(), 6);
        assert!(plan
            .action_plan
            .iter()
            .any(|a| a.category == "professional_help"));
        assert!(plan.recommended_timeline.contains("30 days"));
    }

    #[test]
    fn savings_sum_matches_action_items() {
        let engine = NavigationEngine::new();
        let plan = engine.create_navigation_plan(&sample_bills(), &sample_insurance(), 5000.0, 1);

        let expected: f64 = plan
            .action_plan
            .iter()
            .map(|a| a.estimated_savings.unwrap_or(0.0))
            .sum();
        assert_eq!(plan.estimated_total_savings, expected);
    }

    #[test]
    fn navigation_gap_rules_use_their_own_thresholds() {
        let engine = NavigationEngine::new();
        // 剩余免赔额 600: 保险分析服务不报, 导航规则报 deductible_not_met
        let mut insurance = sample_insurance();
        insurance.annual_deductible = 1100.0;
        insurance.deductible_met = 500.0;

        let plan = engine.create_navigation_plan(&sample_bills(), &insurance, 5000.0, 1);
        assert!(plan
            .coverage_gaps
            .iter()
            .any(|g| g.gap_type == "deductible_not_met"));
    }

    #[test]
    fn summary_formats_currency_with_thousands_separator() {
        let engine = NavigationEngine::new();
        let mut bills = sample_bills();
        bills[0].patient_responsibility = 12_000.0;

        let plan = engine.create_navigation_plan(&bills, &sample_insurance(), 5000.0, 1);
        assert!(plan.summary.contains("$12,500.00"));
    }

    #[test]
    fn analyze_situation_returns_classification_and_steps() {
        let engine = NavigationEngine::new();
        let analysis = engine.analyze_situation(&sample_bills(), &sample_insurance(), 5000.0, 1);

        assert_eq!(analysis.total_medical_debt, 2500.0);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.household_size, 1);
        assert!(!analysis.recommendations.is_empty());
        assert_eq!(analysis.next_steps.len(), 4);
        assert_eq!(
            analysis.recommendations.last(),
            Some(&"Request itemized bills for all charges".to_string())
        );
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let engine = NavigationEngine::new();
        let first = engine.create_navigation_plan(&sample_bills(), &sample_insurance(), 5000.0, 1);
        let second = engine.create_navigation_plan(&sample_bills(), &sample_insurance(), 5000.0, 1);

        let a = serde_json::to_string(&first).expect("serialize");
        let b = serde_json::to_string(&second).expect("serialize");
        assert_eq!(a, b);
    }
}
