use crate::models::{
    AssistanceMatch, AssistanceProgram, FinancialHardshipLevel, InsuranceInfo, InsuranceType,
    MedicalBill, ProgramSummary,
};

use super::{federal_poverty_level, round2};

/// 单个项目的评估结果
struct Eligibility {
    eligible: bool,
    score: i32,
    priority: i32,
}

struct ScoredProgram {
    program: AssistanceProgram,
    score: i32,
    priority: i32,
}

/// 救助项目匹配服务: 对静态项目目录做加分制资格评估
pub struct AssistanceMatcher {
    programs: Vec<AssistanceProgram>,
}

impl AssistanceMatcher {
    pub fn new() -> Self {
        Self {
            programs: load_assistance_programs(),
        }
    }

    pub fn match_assistance(
        &self,
        insurance: &InsuranceInfo,
        monthly_income: f64,
        household_size: u32,
        medical_bills: &[MedicalBill],
        hardship_level: Option<FinancialHardshipLevel>,
        prescriptions: &[String],
    ) -> AssistanceMatch {
        let mut scored: Vec<ScoredProgram> = Vec::new();

        for program in &self.programs {
            let eligibility = self.check_program_eligibility(
                program,
                insurance,
                monthly_income,
                household_size,
                medical_bills,
                hardship_level,
                prescriptions,
            );

            if eligibility.eligible {
                scored.push(ScoredProgram {
                    program: program.clone(),
                    score: eligibility.score,
                    priority: eligibility.priority,
                });
            }
        }

        // priority 升序, 同级按得分降序
        scored.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.score.cmp(&a.score))
        });

        tracing::info!(
            "Assistance matching: {} of {} programs eligible",
            scored.len(),
            self.programs.len()
        );

        let programs: Vec<AssistanceProgram> =
            scored.iter().map(|s| s.program.clone()).collect();
        let total_savings = estimate_total_savings(&programs, medical_bills);

        let recommended_programs = scored
            .iter()
            .take(3)
            .map(|s| s.program.program_name.clone())
            .collect();
        let application_priority_order = scored
            .iter()
            .map(|s| s.program.program_name.clone())
            .collect();

        let additional_notes = self.assistance_notes(&scored, insurance, hardship_level);

        AssistanceMatch {
            programs,
            total_potential_savings: round2(total_savings),
            recommended_programs,
            application_priority_order,
            additional_notes,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_program_eligibility(
        &self,
        program: &AssistanceProgram,
        insurance: &InsuranceInfo,
        monthly_income: f64,
        household_size: u32,
        medical_bills: &[MedicalBill],
        hardship_level: Option<FinancialHardshipLevel>,
        prescriptions: &[String],
    ) -> Eligibility {
        let mut score = 0;
        let mut priority = 3;

        let annual_income = monthly_income * 12.0;
        let fpl = federal_poverty_level(household_size);
        let income_ratio = if fpl > 0.0 { annual_income / fpl } else { 0.0 };

        if income_ratio <= program.income_threshold {
            score += 50;
        }

        // 困难等级放宽/收紧后的门槛再核一次
        if let Some(level) = hardship_level {
            if income_ratio <= hardship_adjusted_threshold(level) {
                score += 30;
            }
        }

        if insurance.insurance_type == InsuranceType::Uninsured
            && program.provider_type == "hospital"
        {
            score += 40;
            priority = 1;
        } else if insurance.insurance_type == InsuranceType::Uninsured
            && program.provider_type == "government"
        {
            score += 35;
            priority = 1;
        } else if insurance.insurance_type == InsuranceType::Medicare
            && program.provider_type == "pharmaceutical"
        {
            score += 30;
            priority = 2;
        }

        if !prescriptions.is_empty() && program.provider_type == "pharmaceutical" {
            score += 25;
            priority = 2;
        }

        if !medical_bills.is_empty() {
            let total_debt: f64 = medical_bills.iter().map(|b| b.patient_responsibility).sum();
            if total_debt > 1000.0 {
                score += 20;
            }
        }

        // 收入比只会把 priority 向 1 收紧, 不会放松
        if (program.provider_type == "hospital" || program.provider_type == "nonprofit")
            && income_ratio <= 2.0
        {
            priority = priority.min(1);
        } else if (program.provider_type == "hospital" || program.provider_type == "nonprofit")
            && income_ratio <= 3.0
        {
            priority = priority.min(2);
        }

        Eligibility {
            eligible: score >= 40,
            score,
            priority,
        }
    }

    fn assistance_notes(
        &self,
        scored: &[ScoredProgram],
        insurance: &InsuranceInfo,
        hardship_level: Option<FinancialHardshipLevel>,
    ) -> Vec<String> {
        let mut notes = Vec::new();

        if scored.is_empty() {
            notes.push(
                "No programs matched current criteria. Consider exploring alternative assistance options."
                    .to_string(),
            );
        } else {
            notes.push(format!(
                "Found {} potential assistance program(s).",
                scored.len()
            ));
        }

        if insurance.insurance_type == InsuranceType::Uninsured {
            notes.push(
                "Uninsured status qualifies for many hospital and government programs.".to_string(),
            );
        }

        if matches!(
            hardship_level,
            Some(FinancialHardshipLevel::Moderate) | Some(FinancialHardshipLevel::Severe)
        ) {
            notes.push(
                "Financial hardship level increases eligibility for charity care programs."
                    .to_string(),
            );
        }

        let hospital_count = scored
            .iter()
            .filter(|s| s.program.provider_type == "hospital")
            .count();
        if hospital_count > 0 {
            notes.push(format!(
                "Apply to {} hospital program(s) first for fastest processing.",
                hospital_count
            ));
        }

        let government_count = scored
            .iter()
            .filter(|s| s.program.provider_type == "government")
            .count();
        if government_count > 0 {
            notes.push(
                "Government programs may take longer but offer comprehensive coverage.".to_string(),
            );
        }

        notes.push(
            "Gather all required documentation before applying to streamline the process."
                .to_string(),
        );

        notes
    }

    /// 项目速览列表 (每项带前三条资格要求)
    pub fn programs_catalog(&self) -> Vec<ProgramSummary> {
        self.programs
            .iter()
            .map(|program| ProgramSummary {
                program_name: program.program_name.clone(),
                provider_type: program.provider_type.clone(),
                coverage_type: program.coverage_type.clone(),
                income_threshold: program.income_threshold,
                approval_timeframe: program.approval_timeframe.clone(),
                key_requirements: program
                    .eligibility_requirements
                    .iter()
                    .take(3)
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}

impl Default for AssistanceMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// 困难等级对应的收入门槛 (FPL 倍数)
fn hardship_adjusted_threshold(level: FinancialHardshipLevel) -> f64 {
    match level {
        FinancialHardshipLevel::None => 4.0,
        FinancialHardshipLevel::Mild => 3.5,
        FinancialHardshipLevel::Moderate => 2.5,
        FinancialHardshipLevel::Severe => 1.5,
    }
}

/// 预估总节省: 医院项目 50% + 政府项目 40% 叠加, 非营利项目按最高补助的 50% 计入,
/// 最终不超过总债务
fn estimate_total_savings(programs: &[AssistanceProgram], medical_bills: &[MedicalBill]) -> f64 {
    if medical_bills.is_empty() {
        return 0.0;
    }

    let total_debt: f64 = medical_bills.iter().map(|b| b.patient_responsibility).sum();
    let mut estimated_savings = 0.0;

    if programs.iter().any(|p| p.provider_type == "hospital") {
        estimated_savings += total_debt * 0.50;
    }

    if programs.iter().any(|p| p.provider_type == "government") {
        estimated_savings += total_debt * 0.40;
    }

    for program in programs.iter().filter(|p| p.provider_type == "nonprofit") {
        if let Some(max_benefit) = program.max_benefit {
            estimated_savings += max_benefit * 0.50;
        }
    }

    estimated_savings.min(total_debt)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn load_assistance_programs() -> Vec<AssistanceProgram> {
    vec![
        AssistanceProgram {
            program_name: "Hospital Charity Care".to_string(),
            provider_type: "hospital".to_string(),
            eligibility_requirements: strings(&[
                "Income below 300% FPL",
                "Uninsured or underinsured",
                "Medical debt burden",
                "Resident in hospital service area",
            ]),
            coverage_type: "full_or_partial_discount".to_string(),
            max_benefit: None,
            application_process:
                "Complete charity care application at hospital financial assistance office"
                    .to_string(),
            documentation_required: strings(&[
                "Proof of income (tax returns, pay stubs)",
                "Household size documentation",
                "Proof of residency",
                "Medical bills",
            ]),
            contact_info: "Hospital billing department".to_string(),
            approval_timeframe: "2-6 weeks".to_string(),
            income_threshold: 3.0,
        },
        AssistanceProgram {
            program_name: "Medicaid".to_string(),
            provider_type: "government".to_string(),
            eligibility_requirements: strings(&[
                "Income below state threshold (varies)",
                "US citizen or qualified immigrant",
                "State residency",
                "Categorical eligibility (pregnancy, disability, etc.)",
            ]),
            coverage_type: "comprehensive_health_coverage".to_string(),
            max_benefit: None,
            application_process: "Apply through state Medicaid agency or Healthcare.gov"
                .to_string(),
            documentation_required: strings(&[
                "Proof of citizenship/immigration status",
                "Income verification",
                "Social security numbers",
                "Household information",
            ]),
            contact_info: "State Medicaid agency".to_string(),
            approval_timeframe: "45-90 days".to_string(),
            income_threshold: 1.38,
        },
        AssistanceProgram {
            program_name: "CHIP (Children's Health Insurance Program)".to_string(),
            provider_type: "government".to_string(),
            eligibility_requirements: strings(&[
                "Children under 19",
                "Income above Medicaid eligibility but below state threshold",
                "US citizen or qualified immigrant",
                "Uninsured",
            ]),
            coverage_type: "comprehensive_pediatric_coverage".to_string(),
            max_benefit: None,
            application_process: "Apply through state CHIP agency or Healthcare.gov".to_string(),
            documentation_required: strings(&[
                "Proof of income",
                "Child's birth certificate",
                "Social security numbers",
                "Proof of residency",
            ]),
            contact_info: "State CHIP agency".to_string(),
            approval_timeframe: "30-45 days".to_string(),
            income_threshold: 2.5,
        },
        AssistanceProgram {
            program_name: "Hospital Financial Assistance Program".to_string(),
            provider_type: "hospital".to_string(),
            eligibility_requirements: strings(&[
                "Income below 400% FPL",
                "Demonstrated financial hardship",
                "Medical debt with hospital",
                "Unable to pay full amount",
            ]),
            coverage_type: "payment_reduction".to_string(),
            max_benefit: None,
            application_process:
                "Contact hospital billing department to request financial assistance application"
                    .to_string(),
            documentation_required: strings(&[
                "Recent tax returns",
                "Current pay stubs",
                "Bank statements",
                "Medical bills",
            ]),
            contact_info: "Hospital financial assistance office".to_string(),
            approval_timeframe: "2-4 weeks".to_string(),
            income_threshold: 4.0,
        },
        AssistanceProgram {
            program_name: "Prescription Assistance Programs".to_string(),
            provider_type: "pharmaceutical".to_string(),
            eligibility_requirements: strings(&[
                "No prescription drug coverage",
                "Income below program threshold (varies)",
                "US resident",
                "Taking qualifying medications",
            ]),
            coverage_type: "free_or_discounted_medications".to_string(),
            max_benefit: None,
            application_process: "Apply through drug manufacturer assistance program".to_string(),
            documentation_required: strings(&[
                "Proof of income",
                "Prescription information",
                "Physician verification",
                "No insurance coverage letter",
            ]),
            contact_info: "Individual drug manufacturers".to_string(),
            approval_timeframe: "2-4 weeks".to_string(),
            income_threshold: 3.0,
        },
        AssistanceProgram {
            program_name: "State High-Risk Pool".to_string(),
            provider_type: "government".to_string(),
            eligibility_requirements: strings(&[
                "Pre-existing condition",
                "Unable to obtain private insurance",
                "State residency",
                "Meet income requirements",
            ]),
            coverage_type: "comprehensive_health_coverage".to_string(),
            max_benefit: None,
            application_process: "Apply through state high-risk pool program".to_string(),
            documentation_required: strings(&[
                "Proof of pre-existing condition",
                "Insurance denial letters",
                "Income documentation",
                "Proof of residency",
            ]),
            contact_info: "State insurance department".to_string(),
            approval_timeframe: "4-8 weeks".to_string(),
            income_threshold: 4.0,
        },
        AssistanceProgram {
            program_name: "Medical Debt Relief Charities".to_string(),
            provider_type: "nonprofit".to_string(),
            eligibility_requirements: strings(&[
                "Significant medical debt",
                "Income below threshold",
                "Hardship circumstances",
                "US resident",
            ]),
            coverage_type: "debt_assistance".to_string(),
            max_benefit: Some(10_000.0),
            application_process: "Submit application to charity organization".to_string(),
            documentation_required: strings(&[
                "Medical debt statements",
                "Income verification",
                "Hardship explanation",
                "Household information",
            ]),
            contact_info: "Individual charity organizations".to_string(),
            approval_timeframe: "4-12 weeks".to_string(),
            income_threshold: 2.5,
        },
        AssistanceProgram {
            program_name: "Community Health Centers".to_string(),
            provider_type: "clinic".to_string(),
            eligibility_requirements: strings(&[
                "No geographic barriers",
                "Willingness to use sliding fee scale",
                "Household income verification",
            ]),
            coverage_type: "discounted_medical_services".to_string(),
            max_benefit: None,
            application_process: "Register at community health center".to_string(),
            documentation_required: strings(&[
                "Proof of income",
                "Proof of residency",
                "Identification",
                "Household information",
            ]),
            contact_info: "Local community health centers".to_string(),
            approval_timeframe: "1-2 weeks".to_string(),
            income_threshold: 2.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insurance(insurance_type: InsuranceType) -> InsuranceInfo {
        InsuranceInfo {
            insurance_type,
            provider_name: None,
            plan_type: None,
            annual_deductible: 0.0,
            deductible_met: 0.0,
            annual_out_of_pocket_max: 0.0,
            out_of_pocket_met: 0.0,
            copay_amount: 0.0,
            coinsurance_rate: 0.0,
            coverage_percentage: 0.0,
        }
    }

    fn bill(patient: f64) -> MedicalBill {
        MedicalBill {
            provider_name: "Hospital ABC".to_string(),
            service_date: None,
            total_amount: patient * 2.0,
            patient_responsibility: patient,
            insurance_paid: 0.0,
            insurance_adjustments: 0.0,
            service_codes: vec![],
            description: String::new(),
            is_itemized: false,
        }
    }

    #[test]
    fn uninsured_low_income_matches_hospital_programs_first() {
        let matcher = AssistanceMatcher::new();
        // 月收入 1500, 单人户 -> 年收入 18000, FPL 比 1.19
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Uninsured),
            1500.0,
            1,
            &[bill(5000.0)],
            Some(FinancialHardshipLevel::Severe),
            &[],
        );

        assert!(!result.programs.is_empty());
        assert_eq!(result.programs[0].provider_type, "hospital");
        assert_eq!(result.recommended_programs.len(), 3);
        assert_eq!(
            result.application_priority_order.len(),
            result.programs.len()
        );
    }

    #[test]
    fn high_income_matches_nothing() {
        let matcher = AssistanceMatcher::new();
        // 月收入 50000 -> FPL 比约 39.5, 任何加分项都凑不到 40
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Private),
            50_000.0,
            1,
            &[],
            None,
            &[],
        );

        assert!(result.programs.is_empty());
        assert_eq!(result.total_potential_savings, 0.0);
        assert!(result.additional_notes[0].starts_with("No programs matched"));
    }

    #[test]
    fn savings_stack_is_capped_at_total_debt() {
        let matcher = AssistanceMatcher::new();
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Uninsured),
            1000.0,
            2,
            &[bill(2000.0)],
            Some(FinancialHardshipLevel::Severe),
            &[],
        );

        // 医院 50% + 政府 40% + 非营利补助, 封顶在 2000
        assert_eq!(result.total_potential_savings, 2000.0);
    }

    #[test]
    fn medicare_with_prescriptions_matches_pharmaceutical() {
        let matcher = AssistanceMatcher::new();
        let prescriptions = vec!["atorvastatin".to_string()];
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Medicare),
            2500.0,
            1,
            &[],
            None,
            &prescriptions,
        );

        assert!(result
            .programs
            .iter()
            .any(|p| p.provider_type == "pharmaceutical"));
    }

    #[test]
    fn score_threshold_excludes_income_only_matches_below_40() {
        let matcher = AssistanceMatcher::new();
        // 月收入 4800, 单人户 -> FPL 比约 3.79: 只有门槛 4.0 的项目拿到 50 分
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Private),
            4800.0,
            1,
            &[],
            None,
            &[],
        );

        for program in &result.programs {
            assert!(program.income_threshold >= 3.79);
        }
    }

    #[test]
    fn notes_mention_hospital_fast_track_when_matched() {
        let matcher = AssistanceMatcher::new();
        let result = matcher.match_assistance(
            &insurance(InsuranceType::Uninsured),
            1500.0,
            1,
            &[bill(5000.0)],
            Some(FinancialHardshipLevel::Moderate),
            &[],
        );

        assert!(result
            .additional_notes
            .iter()
            .any(|n| n.contains("hospital program(s) first")));
        assert!(result
            .additional_notes
            .iter()
            .any(|n| n.contains("charity care programs")));
    }

    #[test]
    fn program_catalog_lists_all_entries() {
        let matcher = AssistanceMatcher::new();
        let catalog = matcher.programs_catalog();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.iter().all(|p| p.key_requirements.len() <= 3));
    }
}
