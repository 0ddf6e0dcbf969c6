use crate::models::{
    CostSharing, CoverageStatus, DeductibleStatus, InsuranceAnalysis, InsuranceCoverageGap,
    InsuranceInfo, InsuranceType, InsuranceTypeProfile, MedicalBill, OptimizationRecommendation,
    OutOfPocketStatus, Utilization,
};

use super::{round1, round2};

/// 保险分析服务: 保障进度 + 利用度 + 缺口检测 + 优化建议
pub struct InsuranceAnalyzer;

impl InsuranceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_insurance(
        &self,
        insurance: &InsuranceInfo,
        bills: &[MedicalBill],
    ) -> InsuranceAnalysis {
        let coverage_status = self.assess_coverage_status(insurance);
        let utilization = self.calculate_utilization(insurance, bills);
        let coverage_gaps = self.identify_gaps(insurance, bills);
        let optimization_recommendations =
            self.optimization_recommendations(insurance, &coverage_gaps);
        let summary = self.insurance_summary(&coverage_status, &coverage_gaps);

        tracing::info!(
            "Insurance analysis: status {}, {} bill(s), {} gap(s)",
            coverage_status.status,
            bills.len(),
            coverage_gaps.len()
        );

        InsuranceAnalysis {
            coverage_status,
            utilization,
            coverage_gaps,
            optimization_recommendations,
            summary,
        }
    }

    fn assess_coverage_status(&self, insurance: &InsuranceInfo) -> CoverageStatus {
        // 年度额为 0 时取哨兵值: 免赔额按已满 (100), 自付上限按未动 (0)
        let deductible_progress = if insurance.annual_deductible > 0.0 {
            insurance.deductible_met / insurance.annual_deductible
        } else {
            100.0
        };
        let oop_progress = if insurance.annual_out_of_pocket_max > 0.0 {
            insurance.out_of_pocket_met / insurance.annual_out_of_pocket_max
        } else {
            0.0
        };

        let remaining_deductible = insurance.annual_deductible - insurance.deductible_met;
        let remaining_oop = insurance.annual_out_of_pocket_max - insurance.out_of_pocket_met;

        // 判定顺序固定: nearly_maxed 覆盖 developing
        let mut status = "excellent";
        if remaining_deductible > 0.0 {
            status = "developing";
        }
        if remaining_oop < 1000.0 && remaining_oop > 0.0 {
            status = "nearly_maxed";
        }

        CoverageStatus {
            status: status.to_string(),
            deductible: DeductibleStatus {
                annual: insurance.annual_deductible,
                met: insurance.deductible_met,
                remaining: remaining_deductible,
                progress_percent: round1(deductible_progress),
            },
            out_of_pocket: OutOfPocketStatus {
                annual_max: insurance.annual_out_of_pocket_max,
                met: insurance.out_of_pocket_met,
                remaining: remaining_oop,
                progress_percent: round1(oop_progress),
            },
            cost_sharing: CostSharing {
                copay: insurance.copay_amount,
                coinsurance_rate: insurance.coinsurance_rate * 100.0,
                coverage_percentage: insurance.coverage_percentage * 100.0,
            },
        }
    }

    fn calculate_utilization(
        &self,
        insurance: &InsuranceInfo,
        bills: &[MedicalBill],
    ) -> Utilization {
        let total_billed: f64 = bills.iter().map(|b| b.total_amount).sum();
        let total_insurance_paid: f64 = bills.iter().map(|b| b.insurance_paid).sum();
        let total_patient_responsibility: f64 =
            bills.iter().map(|b| b.patient_responsibility).sum();

        let coverage_rate = if total_billed > 0.0 {
            total_insurance_paid / total_billed
        } else {
            0.0
        };

        let out_of_network: Vec<&MedicalBill> = bills
            .iter()
            .filter(|b| {
                b.insurance_paid == 0.0
                    && b.insurance_adjustments == 0.0
                    && insurance.insurance_type != InsuranceType::Uninsured
            })
            .collect();

        Utilization {
            total_services: bills.len(),
            total_billed: round2(total_billed),
            insurance_paid: round2(total_insurance_paid),
            patient_responsibility: round2(total_patient_responsibility),
            coverage_rate: round1(coverage_rate * 100.0),
            out_of_network_charges: out_of_network.len(),
            out_of_network_amount: out_of_network
                .iter()
                .map(|b| b.patient_responsibility)
                .sum(),
        }
    }

    /// 缺口规则彼此独立, 逐条评估, 可同时命中
    fn identify_gaps(
        &self,
        insurance: &InsuranceInfo,
        bills: &[MedicalBill],
    ) -> Vec<InsuranceCoverageGap> {
        let mut gaps = Vec::new();

        let remaining_deductible = insurance.annual_deductible - insurance.deductible_met;
        if remaining_deductible > 1000.0 {
            gaps.push(InsuranceCoverageGap {
                gap_type: "high_deductible".to_string(),
                description: format!("High deductible remaining: ${:.2}", remaining_deductible),
                impact: "Full charges apply until deductible is met".to_string(),
                recommendation:
                    "Consider health savings account (HSA) contributions and defer non-urgent care"
                        .to_string(),
            });
        }

        let remaining_oop = insurance.annual_out_of_pocket_max - insurance.out_of_pocket_met;
        if remaining_oop > 0.0 && insurance.out_of_pocket_met > 0.0 {
            let oop_percent =
                insurance.out_of_pocket_met / insurance.annual_out_of_pocket_max * 100.0;
            if oop_percent > 80.0 {
                gaps.push(InsuranceCoverageGap {
                    gap_type: "near_max_out_of_pocket".to_string(),
                    description: format!(
                        "Out-of-pocket max nearly reached: ${:.2} remaining",
                        remaining_oop
                    ),
                    impact: "Most services will be covered after reaching max".to_string(),
                    recommendation: "Schedule necessary procedures now to maximize coverage benefits"
                        .to_string(),
                });
            }
        }

        if insurance.coinsurance_rate > 0.30 {
            gaps.push(InsuranceCoverageGap {
                gap_type: "high_coinsurance".to_string(),
                description: format!(
                    "High coinsurance rate: {:.0}%",
                    insurance.coinsurance_rate * 100.0
                ),
                impact: "You pay a large percentage of costs after deductible".to_string(),
                recommendation: "Review plan options and consider supplemental insurance"
                    .to_string(),
            });
        }

        let out_of_network_issues = self.detect_out_of_network_issues(insurance, bills);
        if !out_of_network_issues.is_empty() {
            gaps.push(InsuranceCoverageGap {
                gap_type: "out_of_network_usage".to_string(),
                description: format!(
                    "{} potential out-of-network charges detected",
                    out_of_network_issues.len()
                ),
                impact: "Higher costs due to out-of-network penalties".to_string(),
                recommendation:
                    "Verify network status of all providers and request in-network alternatives"
                        .to_string(),
            });
        }

        if insurance.coverage_percentage < 0.70 {
            gaps.push(InsuranceCoverageGap {
                gap_type: "low_coverage_rate".to_string(),
                description: format!(
                    "Low overall coverage: {:.0}%",
                    insurance.coverage_percentage * 100.0
                ),
                impact: "You may have significant out-of-pocket costs".to_string(),
                recommendation: "Consider plan changes during next enrollment period".to_string(),
            });
        }

        gaps
    }

    fn detect_out_of_network_issues<'a>(
        &self,
        insurance: &InsuranceInfo,
        bills: &'a [MedicalBill],
    ) -> Vec<&'a MedicalBill> {
        if insurance.insurance_type == InsuranceType::Uninsured {
            return Vec::new();
        }

        bills
            .iter()
            .filter(|b| {
                b.insurance_paid == 0.0
                    && b.insurance_adjustments == 0.0
                    && b.total_amount > 0.0
                    && b.patient_responsibility == b.total_amount
            })
            .collect()
    }

    fn optimization_recommendations(
        &self,
        insurance: &InsuranceInfo,
        gaps: &[InsuranceCoverageGap],
    ) -> Vec<OptimizationRecommendation> {
        let mut recommendations = Vec::new();

        let remaining_deductible = insurance.annual_deductible - insurance.deductible_met;
        if remaining_deductible < 500.0 && remaining_deductible > 0.0 {
            recommendations.push(OptimizationRecommendation {
                category: "timing".to_string(),
                priority: "high".to_string(),
                action: "Schedule necessary services soon".to_string(),
                description: format!(
                    "Only ${:.2} remaining on deductible. Schedule needed procedures before year-end to maximize coverage.",
                    remaining_deductible
                ),
            });
        }

        let remaining_oop = insurance.annual_out_of_pocket_max - insurance.out_of_pocket_met;
        if remaining_oop < 2000.0 && remaining_oop > 0.0 {
            recommendations.push(OptimizationRecommendation {
                category: "timing".to_string(),
                priority: "high".to_string(),
                action: "Maximize benefits before year-end".to_string(),
                description: format!(
                    "Out-of-pocket max nearly reached (${:.2} remaining). Schedule major procedures now.",
                    remaining_oop
                ),
            });
        }

        if remaining_deductible > 2000.0 {
            recommendations.push(OptimizationRecommendation {
                category: "planning".to_string(),
                priority: "medium".to_string(),
                action: "Defer non-urgent care".to_string(),
                description:
                    "Consider deferring elective procedures until deductible is met or new plan year begins."
                        .to_string(),
            });
        }

        if insurance.insurance_type != InsuranceType::Uninsured
            && insurance.coinsurance_rate > 0.25
        {
            recommendations.push(OptimizationRecommendation {
                category: "coverage".to_string(),
                priority: "medium".to_string(),
                action: "Review plan options".to_string(),
                description:
                    "High coinsurance rates may indicate you could benefit from a plan with lower cost-sharing."
                        .to_string(),
            });
        }

        for gap in gaps {
            if gap.gap_type == "out_of_network_usage" {
                recommendations.push(OptimizationRecommendation {
                    category: "network".to_string(),
                    priority: "high".to_string(),
                    action: "Verify provider network status".to_string(),
                    description:
                        "Check if out-of-network charges can be appealed or if in-network alternatives exist."
                            .to_string(),
                });
            }
        }

        // 常驻建议
        recommendations.push(OptimizationRecommendation {
            category: "general".to_string(),
            priority: "low".to_string(),
            action: "Track all medical expenses".to_string(),
            description:
                "Maintain records for tax deductions and to monitor benefit utilization.".to_string(),
        });

        recommendations
    }

    fn insurance_summary(
        &self,
        coverage_status: &CoverageStatus,
        gaps: &[InsuranceCoverageGap],
    ) -> String {
        let mut summary = format!(
            "Your insurance coverage status is {}. ",
            coverage_status.status
        );

        if coverage_status.deductible.remaining > 0.0 {
            summary.push_str(&format!(
                "You have ${:.2} remaining on your deductible. ",
                coverage_status.deductible.remaining
            ));
        } else {
            summary.push_str("Your deductible has been met. ");
        }

        if coverage_status.out_of_pocket.remaining > 0.0 {
            summary.push_str(&format!(
                "${:.2} remains until reaching your out-of-pocket maximum. ",
                coverage_status.out_of_pocket.remaining
            ));
        } else {
            summary.push_str("You've reached your out-of-pocket maximum for the year. ");
        }

        if !gaps.is_empty() {
            summary.push_str(&format!(
                "{} coverage gap(s) identified that could be optimized.",
                gaps.len()
            ));
        } else {
            summary.push_str("Your coverage appears well-optimized.");
        }

        summary
    }

    /// 保险类别静态目录
    pub fn insurance_types(&self) -> Vec<InsuranceTypeProfile> {
        let profiles = [
            (
                InsuranceType::Private,
                "Private Health Insurance",
                "Employer-sponsored or individually purchased coverage",
                [
                    "Deductibles and co-payments",
                    "Provider networks",
                    "Out-of-pocket maximums",
                    "Preventive care coverage",
                ],
            ),
            (
                InsuranceType::Medicare,
                "Medicare",
                "Federal health insurance for seniors and disabled",
                [
                    "Part A: Hospital insurance",
                    "Part B: Medical insurance",
                    "Part C: Medicare Advantage",
                    "Part D: Prescription drug coverage",
                ],
            ),
            (
                InsuranceType::Medicaid,
                "Medicaid",
                "Federal-state program for low-income individuals",
                [
                    "Income-based eligibility",
                    "Low or no cost-sharing",
                    "Comprehensive coverage",
                    "State-specific benefits",
                ],
            ),
            (
                InsuranceType::Va,
                "VA Health Care",
                "Healthcare for eligible veterans",
                [
                    "Service connection requirements",
                    "Priority groups",
                    "VA facility network",
                    "Low or no cost",
                ],
            ),
            (
                InsuranceType::Tricare,
                "TRICARE",
                "Health coverage for military personnel and families",
                [
                    "Uniformed services sponsorship",
                    "Multiple plan options",
                    "Network and non-network care",
                    "Family coverage options",
                ],
            ),
            (
                InsuranceType::Uninsured,
                "Uninsured",
                "No health insurance coverage",
                [
                    "Full financial responsibility",
                    "Negotiation opportunities",
                    "Charity care eligibility",
                    "Payment plan options",
                ],
            ),
        ];

        profiles
            .into_iter()
            .map(|(insurance_type, name, description, features)| InsuranceTypeProfile {
                insurance_type,
                name: name.to_string(),
                description: description.to_string(),
                typical_features: features.iter().map(|f| f.to_string()).collect(),
            })
            .collect()
    }
}

impl Default for InsuranceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insurance(deductible: f64, met: f64, oop_max: f64, oop_met: f64) -> InsuranceInfo {
        InsuranceInfo {
            insurance_type: InsuranceType::Private,
            provider_name: None,
            plan_type: None,
            annual_deductible: deductible,
            deductible_met: met,
            annual_out_of_pocket_max: oop_max,
            out_of_pocket_met: oop_met,
            copay_amount: 30.0,
            coinsurance_rate: 0.2,
            coverage_percentage: 0.8,
        }
    }

    fn bill(total: f64, patient: f64, paid: f64, adjustments: f64) -> MedicalBill {
        MedicalBill {
            provider_name: "Hospital ABC".to_string(),
            service_date: None,
            total_amount: total,
            patient_responsibility: patient,
            insurance_paid: paid,
            insurance_adjustments: adjustments,
            service_codes: vec![],
            description: String::new(),
            is_itemized: false,
        }
    }

    #[test]
    fn status_nearly_maxed_overrides_developing() {
        let analyzer = InsuranceAnalyzer::new();
        let analysis = analyzer.analyze_insurance(&insurance(2000.0, 500.0, 6000.0, 5500.0), &[]);
        assert_eq!(analysis.coverage_status.status, "nearly_maxed");
    }

    #[test]
    fn status_developing_when_deductible_unmet() {
        let analyzer = InsuranceAnalyzer::new();
        let analysis = analyzer.analyze_insurance(&insurance(2000.0, 500.0, 6000.0, 1200.0), &[]);
        assert_eq!(analysis.coverage_status.status, "developing");
    }

    #[test]
    fn zero_annual_amounts_use_sentinels() {
        let analyzer = InsuranceAnalyzer::new();
        let analysis = analyzer.analyze_insurance(&insurance(0.0, 0.0, 0.0, 0.0), &[]);
        assert_eq!(analysis.coverage_status.deductible.progress_percent, 100.0);
        assert_eq!(analysis.coverage_status.out_of_pocket.progress_percent, 0.0);
        assert_eq!(analysis.coverage_status.status, "excellent");
    }

    #[test]
    fn utilization_totals_and_coverage_rate() {
        let analyzer = InsuranceAnalyzer::new();
        let bills = vec![
            bill(5000.0, 2000.0, 2500.0, 500.0),
            bill(1000.0, 500.0, 400.0, 100.0),
        ];
        let analysis = analyzer.analyze_insurance(&insurance(2000.0, 500.0, 6000.0, 1200.0), &bills);

        assert_eq!(analysis.utilization.total_services, 2);
        assert_eq!(analysis.utilization.total_billed, 6000.0);
        assert_eq!(analysis.utilization.insurance_paid, 2900.0);
        assert_eq!(analysis.utilization.patient_responsibility, 2500.0);
        // 2900/6000 = 48.333 -> 48.3%
        assert_eq!(analysis.utilization.coverage_rate, 48.3);
        assert_eq!(analysis.utilization.out_of_network_charges, 0);
    }

    #[test]
    fn coverage_rate_zero_when_nothing_billed() {
        let analyzer = InsuranceAnalyzer::new();
        let analysis = analyzer.analyze_insurance(&insurance(2000.0, 500.0, 6000.0, 1200.0), &[]);
        assert_eq!(analysis.utilization.coverage_rate, 0.0);
    }

    #[test]
    fn gap_rules_fire_independently() {
        let analyzer = InsuranceAnalyzer::new();
        let mut info = insurance(5000.0, 500.0, 6000.0, 5000.0);
        info.coinsurance_rate = 0.4;
        info.coverage_percentage = 0.5;
        let bills = vec![bill(800.0, 800.0, 0.0, 0.0)];

        let analysis = analyzer.analyze_insurance(&info, &bills);
        let types: Vec<&str> = analysis
            .coverage_gaps
            .iter()
            .map(|g| g.gap_type.as_str())
            .collect();
        assert_eq!(
            types,
            vec![
                "high_deductible",
                "near_max_out_of_pocket",
                "high_coinsurance",
                "out_of_network_usage",
                "low_coverage_rate",
            ]
        );
    }

    #[test]
    fn uninsured_bills_not_flagged_out_of_network() {
        let analyzer = InsuranceAnalyzer::new();
        let mut info = insurance(2000.0, 500.0, 6000.0, 1200.0);
        info.insurance_type = InsuranceType::Uninsured;
        let bills = vec![bill(800.0, 800.0, 0.0, 0.0)];

        let analysis = analyzer.analyze_insurance(&info, &bills);
        assert_eq!(analysis.utilization.out_of_network_charges, 0);
        assert!(analysis
            .coverage_gaps
            .iter()
            .all(|g| g.gap_type != "out_of_network_usage"));
    }

    #[test]
    fn recommendations_always_include_expense_tracking() {
        let analyzer = InsuranceAnalyzer::new();
        let analysis = analyzer.analyze_insurance(&insurance(0.0, 0.0, 6000.0, 0.0), &[]);
        let last = analysis
            .optimization_recommendations
            .last()
            .map(|r| r.action.clone());
        assert_eq!(last, Some("Track all medical expenses".to_string()));
    }

    #[test]
    fn insurance_type_catalog_has_six_entries() {
        let analyzer = InsuranceAnalyzer::new();
        assert_eq!(analyzer.insurance_types().len(), 6);
    }
}
