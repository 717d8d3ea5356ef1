use serde::Serialize;
use tracing::{debug, warn};

use crate::quantity::{QuantityKind, EPSILON};

use super::error::PhaseError;
use super::resolver::resolve;
use super::sample::{Parameter, SampleInput, SampleOutput};

/// 평균 변동계수가 이 값[%]을 넘으면 변동성이 큰 것으로 본다.
pub const HIGH_VARIABILITY_CV: f64 = 15.0;
/// 평균 변동계수가 이 값[%]을 넘으면 중간 수준의 변동으로 본다.
pub const MODERATE_VARIABILITY_CV: f64 = 10.0;

/// 한 항목의 시료 간 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterStats {
    pub mean: f64,
    /// 표본 표준편차 (n − 1)
    pub std_dev: f64,
    /// 변동계수 [%]. 평균이 0에 가까우면 `None`.
    pub coefficient_of_variation: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// 통계를 내는 일곱 항목. 유효값이 2개 미만인 항목은 비어 있다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleStatistics {
    pub natural_unit_weight: Option<ParameterStats>,
    pub dry_unit_weight: Option<ParameterStats>,
    pub saturated_unit_weight: Option<ParameterStats>,
    pub water_content: Option<ParameterStats>,
    pub void_ratio: Option<ParameterStats>,
    pub porosity: Option<ParameterStats>,
    pub saturation: Option<ParameterStats>,
}

impl SampleStatistics {
    pub fn get(&self, parameter: Parameter) -> Option<&ParameterStats> {
        self.slot(parameter).as_ref()
    }

    fn slot(&self, parameter: Parameter) -> &Option<ParameterStats> {
        match parameter {
            Parameter::NaturalUnitWeight => &self.natural_unit_weight,
            Parameter::DryUnitWeight => &self.dry_unit_weight,
            Parameter::SaturatedUnitWeight => &self.saturated_unit_weight,
            Parameter::WaterContent => &self.water_content,
            Parameter::VoidRatio => &self.void_ratio,
            Parameter::Porosity => &self.porosity,
            Parameter::Saturation => &self.saturation,
            _ => &None,
        }
    }

    fn set(&mut self, parameter: Parameter, stats: Option<ParameterStats>) {
        let slot = match parameter {
            Parameter::NaturalUnitWeight => &mut self.natural_unit_weight,
            Parameter::DryUnitWeight => &mut self.dry_unit_weight,
            Parameter::SaturatedUnitWeight => &mut self.saturated_unit_weight,
            Parameter::WaterContent => &mut self.water_content,
            Parameter::VoidRatio => &mut self.void_ratio,
            Parameter::Porosity => &mut self.porosity,
            Parameter::Saturation => &mut self.saturation,
            _ => return,
        };
        *slot = stats;
    }

    /// 통계가 있는 항목을 [`Parameter::AGGREGATED`] 순서로 돌려준다.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ParameterStats)> + '_ {
        Parameter::AGGREGATED
            .into_iter()
            .filter_map(|p| self.get(p).map(|s| (p, s)))
    }
}

/// 다중 시료 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedOutput {
    pub sample_count: usize,
    /// 존재하는 변동계수들의 평균 [%]
    pub mean_coefficient_of_variation: Option<f64>,
    /// 평균값으로 채운 대표 결과. 통계가 없는 항목은 첫 시료 값을 쓴다.
    pub result: SampleOutput,
    /// 시료가 하나면 `None`.
    pub statistics: Option<SampleStatistics>,
    /// 입력 순서와 같은 순서의 시료별 결과
    pub samples: Vec<SampleOutput>,
}

/// 여러 시료를 각각 계산하고 시료 간 통계를 낸다.
///
/// 한 시료라도 실패하면 첫 번째 실패를 그대로 돌려준다.
pub fn aggregate(samples: &[SampleInput]) -> Result<AggregatedOutput, PhaseError> {
    if samples.is_empty() {
        return Err(PhaseError::EmptyBatch);
    }

    let results = samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            resolve(sample).inspect_err(|e| debug!(sample = i + 1, error = %e, "시료 계산 실패"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if results.len() == 1 {
        return Ok(AggregatedOutput {
            sample_count: 1,
            result: results[0].clone(),
            statistics: None,
            mean_coefficient_of_variation: None,
            samples: results,
        });
    }

    let mut statistics = SampleStatistics::default();
    for parameter in Parameter::AGGREGATED {
        let values: Vec<Option<f64>> = results.iter().map(|r| r.value(parameter)).collect();
        statistics.set(parameter, parameter_stats(&values, parameter.kind()));
    }

    // 통계가 없는 항목(Gs, γsub, 분류, 절대 체적·질량 등)은 첫 시료 값을 유지한다.
    let mut result = results[0].clone();
    result.advisory = None;
    for (parameter, stats) in statistics.iter() {
        result.set_value(parameter, stats.mean);
    }

    let cvs: Vec<f64> = statistics
        .iter()
        .filter_map(|(_, s)| s.coefficient_of_variation)
        .collect();
    let mean_cv = if cvs.is_empty() {
        None
    } else {
        Some(cvs.iter().sum::<f64>() / cvs.len() as f64)
    };
    if let Some(cv) = mean_cv {
        result.advisory = variability_advisory(cv);
        if let Some(msg) = &result.advisory {
            warn!(mean_cv = cv, "{msg}");
        }
    }
    debug!(samples = results.len(), ?mean_cv, "다중 시료 통계 계산 완료");

    Ok(AggregatedOutput {
        sample_count: results.len(),
        result,
        statistics: Some(statistics),
        mean_coefficient_of_variation: mean_cv.map(|cv| QuantityKind::Percent.round(cv)),
        samples: results,
    })
}

/// 평균 변동계수에 따른 안내 문구. 10% 이하이면 `None`.
pub fn variability_advisory(mean_cv: f64) -> Option<String> {
    if mean_cv > HIGH_VARIABILITY_CV {
        Some(format!(
            "⚠️ 시료 간 변동성이 큽니다 (평균 CV = {mean_cv:.1}%). 시험을 다시 검토하세요."
        ))
    } else if mean_cv > MODERATE_VARIABILITY_CV {
        Some(format!(
            "⚠️ 시료 간 변동이 중간 수준입니다 (평균 CV = {mean_cv:.1}%). 결과는 허용 가능합니다."
        ))
    } else {
        None
    }
}

/// 유효값(누락·NaN 제외)이 2개 이상일 때만 통계를 낸다.
pub fn parameter_stats(values: &[Option<f64>], kind: QuantityKind) -> Option<ParameterStats> {
    let valid: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    if valid.len() < 2 {
        return None;
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    let coefficient_of_variation = if mean.abs() > EPSILON {
        Some(QuantityKind::Percent.round(std_dev / mean * 100.0))
    } else {
        None
    };
    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(ParameterStats {
        mean: kind.round(mean),
        std_dev: kind.round(std_dev),
        coefficient_of_variation,
        min: kind.round(min),
        max: kind.round(max),
    })
}
