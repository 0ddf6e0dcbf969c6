use std::collections::HashSet;

use indexmap::IndexMap;

use crate::models::{
    BillAnalysisIssue, IssueSeverity, IssueTypeSummary, ItemizationRequest, MedicalBill,
    ProviderInfo, SavingsOpportunities,
};

use super::round2;

/// CPT 参考表行: 常见价格区间 (低, 高)
struct CptCode {
    #[allow(dead_code)]
    name: &'static str,
    #[allow(dead_code)]
    category: &'static str,
    typical_cost_range: (f64, f64),
}

/// 账单审查服务: 对明细账单跑固定的检查序列
pub struct BillAnalyzer {
    cpt_database: IndexMap<&'static str, CptCode>,
}

impl BillAnalyzer {
    pub fn new() -> Self {
        Self {
            cpt_database: load_cpt_database(),
        }
    }

    /// 全量审查: 逐单检查后按 (严重度, 节省额降序) 排列
    pub fn analyze_bills(&self, bills: &[MedicalBill]) -> Vec<BillAnalysisIssue> {
        let mut all_issues = Vec::new();

        for bill in bills {
            all_issues.extend(self.analyze_single_bill(bill));
        }

        prioritize_issues(all_issues)
    }

    fn analyze_single_bill(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        // 非明细账单无法逐项核查, 只提示索取明细
        if !bill.is_itemized {
            return vec![BillAnalysisIssue {
                issue_type: "not_itemized".to_string(),
                severity: IssueSeverity::Medium,
                description: "Bill is not itemized, preventing detailed analysis".to_string(),
                potential_savings: bill.patient_responsibility * 0.10,
                recommendation: "Request an itemized bill to review charges in detail".to_string(),
            }];
        }

        // 检查序列固定, 逐项执行
        let mut issues = Vec::new();
        issues.extend(self.check_duplicates(bill));
        issues.extend(self.check_coding_consistency(bill));
        issues.extend(self.check_insurance_adjustments(bill));
        issues.extend(self.check_upcoding(bill));
        issues.extend(self.check_unbundling(bill));
        issues.extend(self.check_pricing_anomalies(bill));
        issues
    }

    fn check_duplicates(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        // 按首次出现顺序计数
        let mut code_counts: IndexMap<&str, usize> = IndexMap::new();
        for code in &bill.service_codes {
            *code_counts.entry(code.as_str()).or_insert(0) += 1;
        }

        for (code, count) in &code_counts {
            if *count > 1 {
                let typical_low = self
                    .cpt_database
                    .get(*code)
                    .map(|c| c.typical_cost_range.0)
                    .unwrap_or(0.0);

                issues.push(BillAnalysisIssue {
                    issue_type: "duplicate_charge".to_string(),
                    severity: IssueSeverity::High,
                    description: format!(
                        "CPT code {} appears {} times on the same bill",
                        code, count
                    ),
                    potential_savings: typical_low * (*count as f64 - 1.0),
                    recommendation:
                        "Verify that the service was actually performed multiple times. Contact the provider to dispute duplicate charges."
                            .to_string(),
                });
            }
        }

        issues
    }

    fn check_coding_consistency(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        if bill.description.to_lowercase().contains("office visit")
            && !bill.service_codes.iter().any(|c| c.starts_with("992"))
        {
            issues.push(BillAnalysisIssue {
                issue_type: "coding_inconsistency".to_string(),
                severity: IssueSeverity::Medium,
                description:
                    "Bill description mentions office visit but no evaluation codes (992xx) found"
                        .to_string(),
                potential_savings: bill.patient_responsibility * 0.15,
                recommendation:
                    "Request clarification on the codes used and verify they match the services provided"
                        .to_string(),
            });
        }

        for code in &bill.service_codes {
            if !self.cpt_database.contains_key(code.as_str()) {
                issues.push(BillAnalysisIssue {
                    issue_type: "unknown_code".to_string(),
                    severity: IssueSeverity::Low,
                    description: format!("CPT code {} not found in standard database", code),
                    potential_savings: 0.0,
                    recommendation: "Verify this code with your provider".to_string(),
                });
            }
        }

        issues
    }

    fn check_insurance_adjustments(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        if bill.insurance_adjustments == 0.0
            && bill.insurance_paid == 0.0
            && bill.total_amount > bill.patient_responsibility
        {
            issues.push(BillAnalysisIssue {
                issue_type: "no_insurance_applied".to_string(),
                severity: IssueSeverity::High,
                description: "No insurance payment or adjustment recorded on bill".to_string(),
                potential_savings: bill.total_amount - bill.patient_responsibility,
                recommendation: "Contact insurance to verify coverage was applied correctly"
                    .to_string(),
            });
        }

        if bill.insurance_adjustments > bill.total_amount {
            issues.push(BillAnalysisIssue {
                issue_type: "excessive_adjustment".to_string(),
                severity: IssueSeverity::Medium,
                description: format!(
                    "Insurance adjustment (${:.2}) exceeds total bill (${:.2})",
                    bill.insurance_adjustments, bill.total_amount
                ),
                potential_savings: 0.0,
                recommendation: "Contact provider billing department for clarification".to_string(),
            });
        }

        issues
    }

    fn check_upcoding(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        for code in &bill.service_codes {
            if code.starts_with("992")
                && self.cpt_database.contains_key(code.as_str())
                && bill.description.chars().count() < 50
            {
                issues.push(BillAnalysisIssue {
                    issue_type: "potential_upcoding".to_string(),
                    severity: IssueSeverity::Medium,
                    description: format!(
                        "Evaluation code {} may be upcoded if description doesn't support complexity level",
                        code
                    ),
                    potential_savings: bill.patient_responsibility * 0.20,
                    recommendation:
                        "Compare services received to code description and discuss with provider if discrepancy exists"
                            .to_string(),
                });
            }
        }

        issues
    }

    fn check_unbundling(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        let distinct_codes: HashSet<&str> =
            bill.service_codes.iter().map(|c| c.as_str()).collect();

        if distinct_codes.len() > 5 {
            issues.push(BillAnalysisIssue {
                issue_type: "potential_unbundling".to_string(),
                severity: IssueSeverity::Medium,
                description: format!(
                    "Bill contains {} separate codes which may indicate unbundling",
                    distinct_codes.len()
                ),
                potential_savings: bill.patient_responsibility * 0.15,
                recommendation: "Ask if services could have been billed as a single bundled procedure"
                    .to_string(),
            });
        }

        issues
    }

    fn check_pricing_anomalies(&self, bill: &MedicalBill) -> Vec<BillAnalysisIssue> {
        let mut issues = Vec::new();

        for code in &bill.service_codes {
            let Some(code_info) = self.cpt_database.get(code.as_str()) else {
                continue;
            };
            let (typical_min, typical_max) = code_info.typical_cost_range;

            let charge_per_service = bill.total_amount / bill.service_codes.len() as f64;

            if charge_per_service > typical_max * 1.5 {
                issues.push(BillAnalysisIssue {
                    issue_type: "pricing_anomaly".to_string(),
                    severity: IssueSeverity::High,
                    description: format!(
                        "Charge for code {} (${:.2}) significantly exceeds typical range (${}-{})",
                        code, charge_per_service, typical_min, typical_max
                    ),
                    potential_savings: charge_per_service - typical_max,
                    recommendation: "Request pricing justification or negotiate with provider"
                        .to_string(),
                });
            }
        }

        issues
    }

    /// 审查结果聚合: 按类型统计 + 高严重度子集 + 固定建议
    pub fn calculate_savings_opportunities(&self, bills: &[MedicalBill]) -> SavingsOpportunities {
        let issues = self.analyze_bills(bills);

        let total_potential_savings: f64 = issues.iter().map(|i| i.potential_savings).sum();

        let mut issues_by_type: IndexMap<String, Vec<&BillAnalysisIssue>> = IndexMap::new();
        for issue in &issues {
            issues_by_type
                .entry(issue.issue_type.clone())
                .or_default()
                .push(issue);
        }

        let summary: IndexMap<String, IssueTypeSummary> = issues_by_type
            .into_iter()
            .map(|(issue_type, list)| {
                let total_savings: f64 = list.iter().map(|i| i.potential_savings).sum();
                (
                    issue_type,
                    IssueTypeSummary {
                        count: list.len(),
                        total_savings,
                        average_savings: total_savings / list.len() as f64,
                    },
                )
            })
            .collect();

        let high_priority_issues = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::High)
            .cloned()
            .collect();

        SavingsOpportunities {
            total_issues: issues.len(),
            total_potential_savings: round2(total_potential_savings),
            issues_by_type: summary,
            high_priority_issues,
            recommended_actions: vec![
                "Address high-severity issues first".to_string(),
                "Request itemized bills for all charges".to_string(),
                "Contact providers to dispute errors".to_string(),
                "Review insurance EOB for all claims".to_string(),
            ],
        }
    }

    /// 生成明细账单索取函模板
    pub fn generate_itemization_request(&self, bill: &MedicalBill) -> ItemizationRequest {
        let date_text = bill
            .service_date
            .map(|d| d.format("%Y-%m-%d").to_string());

        ItemizationRequest {
            request_type: "itemized_bill".to_string(),
            patient_contact_info: "Your contact information".to_string(),
            provider_info: ProviderInfo {
                name: bill.provider_name.clone(),
                date: date_text.clone().unwrap_or_else(|| "Unknown".to_string()),
                account_number: "Your account number".to_string(),
            },
            request_text: format!(
                "Please provide a fully itemized bill for services rendered on {}. \
                 The itemized bill should include:\n\
                 - Date of each service\n\
                 - Description of each service\n\
                 - CPT/HCPCS code for each service\n\
                 - Charge for each service\n\
                 - Any adjustments or write-offs\n\
                 - Insurance payments and patient responsibility\n\n\
                 Please send to [your address] or [your email].",
                date_text.unwrap_or_else(|| "the relevant date".to_string())
            ),
            additional_notes: vec![
                "Include NPI number of each provider".to_string(),
                "Request proof of medical necessity if applicable".to_string(),
                "Ask for charge master rates used".to_string(),
            ],
        }
    }
}

impl Default for BillAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// 严重度升序, 同级按节省额降序; 排序稳定
fn prioritize_issues(mut issues: Vec<BillAnalysisIssue>) -> Vec<BillAnalysisIssue> {
    issues.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| b.potential_savings.total_cmp(&a.potential_savings))
    });
    issues
}

/// 审查结果导出为 CSV 文本
pub fn export_issues_csv(
    issues: &[BillAnalysisIssue],
) -> Result<String, Box<dyn std::error::Error>> {
    use csv::Writer;

    let mut writer = Writer::from_writer(vec![]);

    writer.write_record([
        "issue_type",
        "severity",
        "description",
        "potential_savings",
        "recommendation",
    ])?;

    for issue in issues {
        let savings = format!("{:.2}", issue.potential_savings);
        writer.write_record([
            issue.issue_type.as_str(),
            issue.severity.as_str(),
            issue.description.as_str(),
            savings.as_str(),
            issue.recommendation.as_str(),
        ])?;
    }

    let data = writer.into_inner()?;
    Ok(String::from_utf8(data)?)
}

fn load_cpt_database() -> IndexMap<&'static str, CptCode> {
    let entries = [
        ("99213", "Office Visit - Level 3", "evaluation", (100.0, 200.0)),
        ("99214", "Office Visit - Level 4", "evaluation", (200.0, 300.0)),
        ("99281", "Emergency Room Visit - Level 1", "emergency", (400.0, 600.0)),
        ("70551", "MRI Brain without Contrast", "imaging", (1000.0, 1500.0)),
        ("71250", "CT Scan Chest", "imaging", (600.0, 900.0)),
        ("80053", "Comprehensive Metabolic Panel", "laboratory", (30.0, 60.0)),
        ("45378", "Colonoscopy with Biopsy", "procedure", (2000.0, 3000.0)),
    ];

    entries
        .into_iter()
        .map(|(code, name, category, typical_cost_range)| {
            (
                code,
                CptCode {
                    name,
                    category,
                    typical_cost_range,
                },
            )
        })
        .collect()
}
