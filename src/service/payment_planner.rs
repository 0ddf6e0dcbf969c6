use indexmap::IndexMap;

use crate::models::PaymentPlanOption;

use super::round2;

/// 策略族静态参数
struct PaymentStrategy {
    typical_interest_rate: f64,
    promotional_period: Option<u32>,
}

/// 还款方案服务: 按策略族生成候选并打分排序
pub struct PaymentPlanner {
    strategies: IndexMap<&'static str, PaymentStrategy>,
}

impl PaymentPlanner {
    pub fn new() -> Self {
        Self {
            strategies: load_payment_strategies(),
        }
    }

    pub fn generate_payment_plans(
        &self,
        total_debt: f64,
        monthly_income: f64,
        credit_score: Option<u32>,
        debt_to_income_ratio: f64,
        hardship: bool,
    ) -> Vec<PaymentPlanOption> {
        let mut plans = Vec::new();

        plans.extend(self.provider_plans(total_debt, monthly_income, hardship));
        plans.extend(self.medical_credit_card_plans(total_debt, credit_score));
        plans.extend(self.personal_loan_plans(
            total_debt,
            monthly_income,
            debt_to_income_ratio,
            credit_score,
        ));
        plans.extend(self.home_equity_plans(total_debt, monthly_income, credit_score));

        if hardship {
            plans.extend(self.hardship_plans(total_debt, monthly_income));
        }

        for plan in &mut plans {
            plan.recommendation_score = recommendation_score(
                plan,
                monthly_income,
                debt_to_income_ratio,
                hardship,
                credit_score,
            );
        }

        plans.sort_by(|a, b| b.recommendation_score.total_cmp(&a.recommendation_score));

        tracing::info!(
            "Payment planning: {} candidate plan(s) for debt {:.2}",
            plans.len(),
            total_debt
        );

        plans
    }

    /// 只取最优方案; 全部不合格时返回零值占位方案而不是空结果
    pub fn recommend_best_plan(
        &self,
        total_debt: f64,
        monthly_income: f64,
        credit_score: Option<u32>,
        debt_to_income_ratio: f64,
        hardship: bool,
    ) -> PaymentPlanOption {
        self.generate_payment_plans(
            total_debt,
            monthly_income,
            credit_score,
            debt_to_income_ratio,
            hardship,
        )
        .into_iter()
        .next()
        .unwrap_or_else(placeholder_plan)
    }

    fn provider_plans(
        &self,
        total_debt: f64,
        monthly_income: f64,
        hardship: bool,
    ) -> Vec<PaymentPlanOption> {
        let mut plans = Vec::new();

        for term in [6u32, 12, 18, 24, 36] {
            let mut monthly_payment = total_debt / term as f64;
            let mut total_repayment = total_debt;

            // 负担上限按未折扣月供判断
            if monthly_payment <= monthly_income * 0.20 {
                let discount = if hardship { 0.10 } else { 0.0 };
                if discount > 0.0 {
                    total_repayment = total_debt * (1.0 - discount);
                    monthly_payment = total_repayment / term as f64;
                }

                plans.push(PaymentPlanOption {
                    plan_type: format!("Provider Payment Plan ({} months)", term),
                    monthly_payment: round2(monthly_payment),
                    total_repayment: round2(total_repayment),
                    term_months: term,
                    interest_rate: 0.0,
                    total_interest: 0.0,
                    pros: vec![
                        "No interest charges".to_string(),
                        "No credit check required".to_string(),
                        "Flexible terms negotiated directly with provider".to_string(),
                        "Payments reported to credit bureaus".to_string(),
                    ],
                    cons: vec![
                        "May require down payment".to_string(),
                        "Limited to specific providers".to_string(),
                        "Late fees may apply".to_string(),
                        "Terms vary by provider".to_string(),
                    ],
                    eligibility_criteria: vec![
                        "Contact provider billing department".to_string(),
                        "Demonstrate ability to pay".to_string(),
                        "Agree to automatic payments (may offer discount)".to_string(),
                    ],
                    recommendation_score: 0.0,
                });
            }
        }

        plans
    }

    fn medical_credit_card_plans(
        &self,
        total_debt: f64,
        credit_score: Option<u32>,
    ) -> Vec<PaymentPlanOption> {
        if let Some(score) = credit_score {
            if score < 640 {
                return Vec::new();
            }
        }

        let promotional_period = self.strategies["medical_credit_card"]
            .promotional_period
            .unwrap_or(12);

        let mut plans = Vec::new();
        for term in [promotional_period, 24] {
            let monthly_payment = total_debt / term as f64;

            plans.push(PaymentPlanOption {
                plan_type: format!("Medical Credit Card - 0% APR ({} months)", term),
                monthly_payment: round2(monthly_payment),
                total_repayment: round2(total_debt),
                term_months: term,
                interest_rate: 0.0,
                total_interest: 0.0,
                pros: vec![
                    format!("0% APR for first {} months", promotional_period),
                    "Can be used at multiple providers".to_string(),
                    "May offer welcome bonuses".to_string(),
                    "Fast application process".to_string(),
                ],
                cons: vec![
                    format!(
                        "Interest charges apply after {} months if not paid",
                        promotional_period
                    ),
                    "Deferred interest on full balance if not paid in full".to_string(),
                    "Requires good credit".to_string(),
                    "Limited network of participating providers".to_string(),
                ],
                eligibility_criteria: vec![
                    "Credit score 640+ recommended".to_string(),
                    "Application through participating provider or issuer".to_string(),
                    "Proof of income may be required".to_string(),
                ],
                recommendation_score: 0.0,
            });
        }

        plans
    }

    fn personal_loan_plans(
        &self,
        total_debt: f64,
        monthly_income: f64,
        debt_to_income_ratio: f64,
        credit_score: Option<u32>,
    ) -> Vec<PaymentPlanOption> {
        if let Some(score) = credit_score {
            if score < 600 {
                return Vec::new();
            }
        }
        if debt_to_income_ratio > 0.43 {
            return Vec::new();
        }

        let mut interest_rate = self.strategies["personal_loan"].typical_interest_rate;
        if let Some(score) = credit_score {
            if score >= 740 {
                interest_rate = 0.05;
            } else if score >= 670 {
                interest_rate = 0.07;
            } else if score >= 600 {
                interest_rate = 0.12;
            }
        }

        let mut plans = Vec::new();
        for term in [24u32, 36, 48, 60] {
            let total_interest = total_interest(total_debt, interest_rate, term);
            let total_repayment = total_debt + total_interest;
            let monthly_payment = monthly_payment(total_debt, interest_rate, term);

            if monthly_payment <= monthly_income * 0.15 {
                plans.push(PaymentPlanOption {
                    plan_type: format!("Personal Loan ({} months)", term),
                    monthly_payment: round2(monthly_payment),
                    total_repayment: round2(total_repayment),
                    term_months: term,
                    interest_rate: round2(interest_rate * 100.0),
                    total_interest: round2(total_interest),
                    pros: vec![
                        "Fixed interest rate and monthly payment".to_string(),
                        "Consolidates multiple bills into single payment".to_string(),
                        "Lump-sum payment can provide leverage for discounts".to_string(),
                        "Can improve credit mix if managed responsibly".to_string(),
                    ],
                    cons: vec![
                        format!("Interest charges apply ({:.1}% APR)", interest_rate * 100.0),
                        "Requires good credit for best rates".to_string(),
                        "Origination fees may apply".to_string(),
                        "May have prepayment penalties".to_string(),
                    ],
                    eligibility_criteria: vec![
                        "Credit score 600+ required".to_string(),
                        "Debt-to-income ratio below 43%".to_string(),
                        "Proof of income and employment".to_string(),
                        "Valid bank account".to_string(),
                    ],
                    recommendation_score: 0.0,
                });
            }
        }

        plans
    }

    fn home_equity_plans(
        &self,
        total_debt: f64,
        monthly_income: f64,
        credit_score: Option<u32>,
    ) -> Vec<PaymentPlanOption> {
        if let Some(score) = credit_score {
            if score < 620 {
                return Vec::new();
            }
        }

        let mut interest_rate = self.strategies["home_equity_loan"].typical_interest_rate;
        if matches!(credit_score, Some(score) if score >= 740) {
            interest_rate = 0.04;
        }

        let mut plans = Vec::new();
        for term in [60u32, 120, 180] {
            let total_interest = total_interest(total_debt, interest_rate, term);
            let total_repayment = total_debt + total_interest;
            let monthly_payment = monthly_payment(total_debt, interest_rate, term);

            if monthly_payment <= monthly_income * 0.25 {
                plans.push(PaymentPlanOption {
                    plan_type: format!("Home Equity Loan ({} months)", term),
                    monthly_payment: round2(monthly_payment),
                    total_repayment: round2(total_repayment),
                    term_months: term,
                    interest_rate: round2(interest_rate * 100.0),
                    total_interest: round2(total_interest),
                    pros: vec![
                        format!("Low interest rate ({:.1}% APR)", interest_rate * 100.0),
                        "Interest may be tax deductible".to_string(),
                        "Long repayment terms keep payments low".to_string(),
                        "Large borrowing capacity".to_string(),
                    ],
                    cons: vec![
                        "Home used as collateral".to_string(),
                        "Closing costs and fees".to_string(),
                        "Longer loan term means more total interest".to_string(),
                        "Risk of foreclosure if payments are missed".to_string(),
                    ],
                    eligibility_criteria: vec![
                        "Credit score 620+ required".to_string(),
                        "Sufficient home equity".to_string(),
                        "Debt-to-income ratio below 43%".to_string(),
                        "Home appraisal required".to_string(),
                    ],
                    recommendation_score: 0.0,
                });
            }
        }

        plans
    }

    fn hardship_plans(&self, total_debt: f64, monthly_income: f64) -> Vec<PaymentPlanOption> {
        let term = 60u32;
        let discount = 0.30;
        let total_repayment = total_debt * (1.0 - discount);
        let monthly_payment = total_repayment / term as f64;

        if monthly_payment > monthly_income * 0.10 {
            return Vec::new();
        }

        vec![PaymentPlanOption {
            plan_type: format!("Hardship Payment Plan ({} months)", term),
            monthly_payment: round2(monthly_payment),
            total_repayment: round2(total_repayment),
            term_months: term,
            interest_rate: 0.0,
            total_interest: 0.0,
            pros: vec![
                "30% principal reduction".to_string(),
                "No interest charges".to_string(),
                "Extended repayment terms".to_string(),
                "Protects credit score from collections".to_string(),
            ],
            cons: vec![
                "Requires proof of financial hardship".to_string(),
                "Limited availability".to_string(),
                "May require down payment".to_string(),
                "Provider must approve hardship status".to_string(),
            ],
            eligibility_criteria: vec![
                "Documented financial hardship".to_string(),
                "Income below 300% FPL".to_string(),
                "Medical debt burden".to_string(),
                "Provider approval required".to_string(),
            ],
            recommendation_score: 0.0,
        }]
    }
}

impl Default for PaymentPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// 等额本息月供: P*r(1+r)^n / ((1+r)^n - 1); 零利率直接均摊
fn monthly_payment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if annual_rate == 0.0 {
        return principal / months as f64;
    }

    let monthly_rate = annual_rate / 12.0;
    let factor = (1.0 + monthly_rate).powi(months as i32);
    principal * (monthly_rate * factor) / (factor - 1.0)
}

fn total_interest(principal: f64, annual_rate: f64, months: u32) -> f64 {
    monthly_payment(principal, annual_rate, months) * months as f64 - principal
}

/// 推荐分: 基础 50, 按月供收入比/利率档位/方案类型/信用档位/负债率加减,
/// 最终限制在 [0, 100] 并保留 1 位小数
fn recommendation_score(
    plan: &PaymentPlanOption,
    monthly_income: f64,
    debt_to_income_ratio: f64,
    hardship: bool,
    credit_score: Option<u32>,
) -> f64 {
    let mut score: f64 = 50.0;

    let payment_ratio = if monthly_income > 0.0 {
        plan.monthly_payment / monthly_income
    } else {
        1.0
    };

    if payment_ratio <= 0.10 {
        score += 30.0;
    } else if payment_ratio <= 0.15 {
        score += 20.0;
    } else if payment_ratio <= 0.20 {
        score += 10.0;
    }

    if plan.interest_rate == 0.0 {
        score += 20.0;
    } else if plan.interest_rate <= 5.0 {
        score += 15.0;
    } else if plan.interest_rate <= 10.0 {
        score += 5.0;
    }

    if hardship && plan.plan_type.contains("Hardship") {
        score += 25.0;
    }

    if plan.plan_type.contains("Provider Payment Plan") {
        score += 15.0;
        if hardship {
            score += 10.0;
        }
    }

    if let Some(credit) = credit_score {
        if credit >= 700 {
            if plan.plan_type.contains("Personal Loan") {
                score += 10.0;
            }
            if plan.plan_type.contains("Home Equity") {
                score += 10.0;
            }
            if plan.plan_type.contains("Medical Credit Card") {
                score += 5.0;
            }
        } else if credit < 650 {
            if plan.plan_type.contains("Provider Payment Plan") {
                score += 20.0;
            }
            if plan.plan_type.contains("Hardship") {
                score += 25.0;
            }
        }
    }

    if debt_to_income_ratio > 0.35 {
        if plan.plan_type.contains("Provider Payment Plan")
            || plan.plan_type.contains("Hardship")
        {
            score += 15.0;
        }
        if plan.plan_type.contains("Personal Loan") || plan.plan_type.contains("Home Equity") {
            score -= 20.0;
        }
    }

    (score.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

fn placeholder_plan() -> PaymentPlanOption {
    PaymentPlanOption {
        plan_type: "custom".to_string(),
        monthly_payment: 0.0,
        total_repayment: 0.0,
        term_months: 0,
        interest_rate: 0.0,
        total_interest: 0.0,
        pros: vec![],
        cons: vec![],
        eligibility_criteria: vec![],
        recommendation_score: 0.0,
    }
}

fn load_payment_strategies() -> IndexMap<&'static str, PaymentStrategy> {
    let entries = [
        (
            "provider_payment_plan",
            PaymentStrategy {
                typical_interest_rate: 0.0,
                promotional_period: None,
            },
        ),
        (
            "medical_credit_card",
            PaymentStrategy {
                typical_interest_rate: 0.0,
                promotional_period: Some(12),
            },
        ),
        (
            "personal_loan",
            PaymentStrategy {
                typical_interest_rate: 0.08,
                promotional_period: None,
            },
        ),
        (
            "home_equity_loan",
            PaymentStrategy {
                typical_interest_rate: 0.06,
                promotional_period: None,
            },
        ),
    ];

    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amortized_payment_matches_standard_formula() {
        // 10000 @ 12%, 24 期 -> 约 470.73/月
        let payment = monthly_payment(10_000.0, 0.12, 24);
        assert!((payment - 470.73).abs() < 0.01);

        let interest = total_interest(10_000.0, 0.12, 24);
        assert!((interest - (payment * 24.0 - 10_000.0)).abs() < 1e-9);

        // 零利率直接均摊
        assert_eq!(monthly_payment(1200.0, 0.0, 12), 100.0);
    }

    #[test]
    fn scores_stay_within_bounds() {
        let planner = PaymentPlanner::new();
        let plans = planner.generate_payment_plans(5000.0, 4000.0, Some(760), 0.1, true);

        assert!(!plans.is_empty());
        for plan in &plans {
            assert!(plan.recommendation_score >= 0.0);
            assert!(plan.recommendation_score <= 100.0);
        }
        for pair in plans.windows(2) {
            assert!(pair[0].recommendation_score >= pair[1].recommendation_score);
        }
    }

    #[test]
    fn low_credit_excludes_card_and_loan_families() {
        let planner = PaymentPlanner::new();
        let plans = planner.generate_payment_plans(5000.0, 4000.0, Some(580), 0.1, false);

        assert!(plans
            .iter()
            .all(|p| !p.plan_type.contains("Medical Credit Card")));
        assert!(plans.iter().all(|p| !p.plan_type.contains("Personal Loan")));
        assert!(plans.iter().all(|p| !p.plan_type.contains("Home Equity")));
        assert!(plans
            .iter()
            .any(|p| p.plan_type.contains("Provider Payment Plan")));
    }

    #[test]
    fn high_debt_to_income_excludes_personal_loans() {
        let planner = PaymentPlanner::new();
        let plans = planner.generate_payment_plans(5000.0, 4000.0, Some(720), 0.5, false);
        assert!(plans.iter().all(|p| !p.plan_type.contains("Personal Loan")));
    }

    #[test]
    fn hardship_unlocks_discounted_plan() {
        let planner = PaymentPlanner::new();

        let without = planner.generate_payment_plans(6000.0, 3000.0, None, 0.1, false);
        assert!(without.iter().all(|p| !p.plan_type.contains("Hardship")));

        let with = planner.generate_payment_plans(6000.0, 3000.0, None, 0.1, true);
        let hardship_plan = with
            .iter()
            .find(|p| p.plan_type.contains("Hardship"))
            .expect("hardship plan present");
        // 6000 * 0.7 / 60 = 70/月
        assert_eq!(hardship_plan.monthly_payment, 70.0);
        assert_eq!(hardship_plan.total_repayment, 4200.0);
    }

    #[test]
    fn provider_discount_applied_after_affordability_gate() {
        let planner = PaymentPlanner::new();
        let plans = planner.generate_payment_plans(1200.0, 1000.0, None, 0.0, true);

        let provider_12 = plans
            .iter()
            .find(|p| p.plan_type == "Provider Payment Plan (12 months)")
            .expect("12-month provider plan");
        // 困难折扣 10%: 1080 / 12 = 90
        assert_eq!(provider_12.monthly_payment, 90.0);
        assert_eq!(provider_12.total_repayment, 1080.0);
    }

    #[test]
    fn personal_loan_rate_tiers_follow_credit_score() {
        let planner = PaymentPlanner::new();

        let excellent = planner.generate_payment_plans(5000.0, 10_000.0, Some(750), 0.1, false);
        let loan = excellent
            .iter()
            .find(|p| p.plan_type.contains("Personal Loan"))
            .expect("loan present");
        assert_eq!(loan.interest_rate, 5.0);

        let fair = planner.generate_payment_plans(5000.0, 10_000.0, Some(610), 0.1, false);
        let loan = fair
            .iter()
            .find(|p| p.plan_type.contains("Personal Loan"))
            .expect("loan present");
        assert_eq!(loan.interest_rate, 12.0);
    }

    #[test]
    fn no_eligible_plan_returns_zeroed_placeholder() {
        let planner = PaymentPlanner::new();
        // 低收入 + 低信用: provider/loan/equity 全被负担率或信用档排除,
        // 信用 580 也排除了信用卡方案
        let best = planner.recommend_best_plan(100_000.0, 100.0, Some(580), 0.5, false);

        assert_eq!(best.plan_type, "custom");
        assert_eq!(best.monthly_payment, 0.0);
        assert_eq!(best.term_months, 0);
        assert_eq!(best.recommendation_score, 0.0);
    }

    #[test]
    fn zero_debt_zero_income_still_recommends() {
        let planner = PaymentPlanner::new();
        let best = planner.recommend_best_plan(0.0, 0.0, None, 0.0, false);
        // 0 月供满足 0 收入的负担上限, 供应商方案仍然成立
        assert!(best.plan_type.contains("Provider Payment Plan") || best.plan_type == "custom");
        assert!(best.recommendation_score >= 0.0);
    }
}
