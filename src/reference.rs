//! 흙 물리지수의 대표적인 값 범위 테이블.
//! 값은 교육용 참고치이며 설계 판단에는 실제 시험값을 사용해야 한다.

use crate::soil::Parameter;

#[derive(Debug)]
pub struct TypicalRange {
    pub parameter: Parameter,
    pub low: f64,
    pub high: f64,
    pub notes: &'static str,
}

/// 참고 범위 대비 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    Below,
    Within,
    Above,
}

pub fn typical_range(parameter: Parameter) -> Option<&'static TypicalRange> {
    TYPICAL_RANGES.iter().find(|r| r.parameter == parameter)
}

/// 값이 참고 범위의 어디에 있는지 판정한다. 테이블에 없는 항목은 `None`.
pub fn check(parameter: Parameter, value: f64) -> Option<RangeCheck> {
    let range = typical_range(parameter)?;
    Some(if value < range.low {
        RangeCheck::Below
    } else if value > range.high {
        RangeCheck::Above
    } else {
        RangeCheck::Within
    })
}

const TYPICAL_RANGES: &[TypicalRange] = &[
    TypicalRange {
        parameter: Parameter::WaterContent,
        low: 10.0,
        high: 40.0,
        notes: "대체로 10~40%이나 흙에 따라 편차가 크다.",
    },
    TypicalRange {
        parameter: Parameter::NaturalUnitWeight,
        low: 16.0,
        high: 21.0,
        notes: "일반적으로 16~21 kN/m³, 연약 유기질토는 15 kN/m³ 미만.",
    },
    TypicalRange {
        parameter: Parameter::SolidsUnitWeight,
        low: 25.0,
        high: 28.0,
        notes: "광물 조성에 따라 25~28 kN/m³.",
    },
    TypicalRange {
        parameter: Parameter::SpecificGravity,
        low: 2.6,
        high: 2.8,
        notes: "무기질토 2.6~2.8, 유기질토 2.5 미만, 철분이 많으면 2.9 초과.",
    },
    TypicalRange {
        parameter: Parameter::VoidRatio,
        low: 0.3,
        high: 1.5,
        notes: "모래 0.4~1.0, 점토 0.3~1.5 이상.",
    },
    TypicalRange {
        parameter: Parameter::Porosity,
        low: 20.0,
        high: 70.0,
        notes: "대체로 20~70%.",
    },
    TypicalRange {
        parameter: Parameter::Saturation,
        low: 0.0,
        high: 100.0,
        notes: "0%(건조) ~ 100%(포화).",
    },
];
