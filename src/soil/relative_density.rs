use crate::quantity::EPSILON;

use super::sample::{DensityClass, Magnitude};

/// 상대밀도 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeDensity {
    /// Dr [%]. e가 범위를 벗어나면 `None`.
    pub dr_percent: Option<f64>,
    pub class: DensityClass,
}

/// Dr = 100·(emax − e)/(emax − emin) 를 계산하고 조밀도를 판정한다.
///
/// e가 [emin, emax]를 허용오차 이상 벗어나면 Dr 없이 `OutOfRange`를 돌려준다.
/// 상한 없는 e는 항상 범위 밖이다.
pub fn relative_density(e: Magnitude, e_max: f64, e_min: f64) -> RelativeDensity {
    let out_of_range = RelativeDensity {
        dr_percent: None,
        class: DensityClass::OutOfRange,
    };
    let Some(e) = e.finite() else {
        return out_of_range;
    };
    if e < e_min - EPSILON || e > e_max + EPSILON {
        return out_of_range;
    }
    let dr = (100.0 * (e_max - e) / (e_max - e_min)).clamp(0.0, 100.0);
    RelativeDensity {
        dr_percent: Some(dr),
        class: classify(dr),
    }
}

/// Dr[%] 구간별 조밀도.
pub fn classify(dr_percent: f64) -> DensityClass {
    if dr_percent <= 15.0 {
        DensityClass::VeryLoose
    } else if dr_percent <= 35.0 {
        DensityClass::Loose
    } else if dr_percent <= 65.0 {
        DensityClass::Medium
    } else if dr_percent <= 85.0 {
        DensityClass::Dense
    } else {
        DensityClass::VeryDense
    }
}
