use indexmap::IndexMap;

use crate::models::{CostEstimate, InsuranceInfo, ServiceAlternative, ServiceListing, ServiceType};

use super::round2;

/// 目录兜底条目: 未知服务代码一律按普通门诊估算
const DEFAULT_SERVICE: &str = "office_visit";

/// 费用估算服务: 静态服务目录 + 地区系数 + 保险分摊
pub struct CostEstimator {
    service_costs: IndexMap<&'static str, ServiceType>,
}

struct CoverageSplit {
    patient_responsibility: f64,
    insurance_paid: f64,
}

impl CostEstimator {
    pub fn new() -> Self {
        Self {
            service_costs: load_service_costs(),
        }
    }

    /// 估算单项服务费用并拆分患者/保险负担
    pub fn estimate_cost(
        &self,
        service_code: &str,
        insurance: &InsuranceInfo,
        location: &str,
        is_emergency: bool,
        in_network: bool,
    ) -> CostEstimate {
        let service = match self.service_costs.get(service_code) {
            Some(s) => s,
            // 目录构造时写入 office_visit, 兜底必命中
            None => &self.service_costs[DEFAULT_SERVICE],
        };

        let base_cost = service.base_cost;
        let location_multiplier = location_multiplier(location);
        let mut adjusted_cost = base_cost * location_multiplier;

        // 非急诊类服务走急诊通道按两倍计费
        if is_emergency && service.category != "emergency" {
            adjusted_cost *= 2.0;
        }

        if !in_network {
            adjusted_cost *= 1.5;
        }

        let estimated_range = (round2(adjusted_cost * 0.85), round2(adjusted_cost * 1.15));

        let split = insurance_coverage(adjusted_cost, insurance);
        let with_insurance = split.patient_responsibility + split.insurance_paid;

        CostEstimate {
            service_name: service.name.clone(),
            base_cost: round2(base_cost),
            estimated_range,
            location_multiplier,
            with_insurance: round2(with_insurance),
            out_of_pocket: round2(split.patient_responsibility),
            alternatives: self.find_alternatives(service_code),
        }
    }

    /// 可估算的服务目录 (按编目顺序)
    pub fn available_services(&self) -> Vec<ServiceListing> {
        self.service_costs
            .iter()
            .map(|(code, service)| ServiceListing {
                code: code.to_string(),
                name: service.name.clone(),
                category: service.category.clone(),
                base_cost: service.base_cost,
                description: service.description.clone(),
            })
            .collect()
    }

    /// 手工维护的低价替代方案, 无则返回空列表
    fn find_alternatives(&self, service_code: &str) -> Vec<ServiceAlternative> {
        let mut alternatives = Vec::new();

        if service_code == "emergency_room" {
            alternatives.push(ServiceAlternative {
                alternative_type: "Urgent Care".to_string(),
                estimated_cost: self.service_costs[DEFAULT_SERVICE].base_cost * 1.5,
                description: "Consider urgent care for non-life-threatening issues".to_string(),
                savings: "60-80%".to_string(),
            });
        }

        if service_code == "mri_scan" {
            alternatives.push(ServiceAlternative {
                alternative_type: "CT Scan".to_string(),
                estimated_cost: self.service_costs["ct_scan"].base_cost,
                description: "Ask if CT scan could be sufficient for diagnosis".to_string(),
                savings: "40-50%".to_string(),
            });
        }

        if service_code == "colonoscopy" {
            alternatives.push(ServiceAlternative {
                alternative_type: "At-home Screening".to_string(),
                estimated_cost: 150.00,
                description: "Cologuard or FIT test for routine screening".to_string(),
                savings: "90-95%".to_string(),
            });
        }

        alternatives
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

fn location_multiplier(location: &str) -> f64 {
    match location.to_lowercase().as_str() {
        "northeast" => 1.25,
        "west" => 1.20,
        "midwest" => 0.95,
        "south" => 0.90,
        _ => 1.0,
    }
}

/// 保险分摊: 先扣免赔额, 再按共保比例, 共保部分封顶在剩余自付上限内.
/// 每次调用独立计算, 不跨调用累计 met 金额.
fn insurance_coverage(charge: f64, insurance: &InsuranceInfo) -> CoverageSplit {
    let remaining_deductible = insurance.annual_deductible - insurance.deductible_met;
    let remaining_oop = insurance.annual_out_of_pocket_max - insurance.out_of_pocket_met;

    let mut cost = charge;
    let mut patient_responsibility = 0.0;

    if remaining_deductible > 0.0 {
        let deductible_amount = cost.min(remaining_deductible);
        patient_responsibility += deductible_amount;
        cost -= deductible_amount;
    }

    if cost > 0.0 && insurance.coinsurance_rate > 0.0 {
        let coinsurance_amount = cost * insurance.coinsurance_rate;
        let max_coinsurance = (remaining_oop - patient_responsibility).max(0.0);
        let coinsurance_to_pay = coinsurance_amount.min(max_coinsurance);
        patient_responsibility += coinsurance_to_pay;
        cost -= coinsurance_to_pay;
    }

    CoverageSplit {
        patient_responsibility,
        insurance_paid: cost,
    }
}

fn load_service_costs() -> IndexMap<&'static str, ServiceType> {
    let entries = [
        (
            "office_visit",
            "99213",
            "Office Visit - Level 3",
            "primary_care",
            150.00,
            "Standard office visit for established patient",
        ),
        (
            "emergency_room",
            "99281",
            "Emergency Room Visit - Level 1",
            "emergency",
            500.00,
            "Emergency department visit for minor issues",
        ),
        (
            "mri_scan",
            "70551",
            "MRI Brain without Contrast",
            "imaging",
            1200.00,
            "Magnetic resonance imaging of brain",
        ),
        (
            "ct_scan",
            "71250",
            "CT Scan Chest without Contrast",
            "imaging",
            700.00,
            "Computed tomography of chest",
        ),
        (
            "lab_work",
            "80053",
            "Comprehensive Metabolic Panel",
            "laboratory",
            45.00,
            "Blood panel covering 14 tests",
        ),
        (
            "surgery_minor",
            "12001",
            "Simple Repair of Skin Wounds",
            "surgery",
            400.00,
            "Minor surgical procedure",
        ),
        (
            "colonoscopy",
            "45378",
            "Colonoscopy with Biopsy",
            "procedure",
            2500.00,
            "Diagnostic colonoscopy procedure",
        ),
        (
            "physical_therapy",
            "97110",
            "Therapeutic Exercise",
            "therapy",
            85.00,
            "Physical therapy session",
        ),
        (
            "specialist_visit",
            "99214",
            "Specialist Visit - Level 4",
            "specialist",
            250.00,
            "Visit with medical specialist",
        ),
        (
            "prescription_generic",
            "N/A",
            "Generic Prescription Medication",
            "pharmacy",
            30.00,
            "Standard generic medication",
        ),
    ];

    entries
        .into_iter()
        .map(|(key, code, name, category, base_cost, description)| {
            (
                key,
                ServiceType {
                    code: code.to_string(),
                    name: name.to_string(),
                    category: category.to_string(),
                    base_cost,
                    description: description.to_string(),
                },
            )
        })
        .collect()
}
