//! 수치 허용오차와 출력 자릿수 처리.

/// 모든 0 나눗셈/범위 가드에 쓰이는 절대 허용오차.
pub const EPSILON: f64 = 1e-9;

/// 출력 반올림 자릿수를 결정하는 물리량 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    /// 단위중량(kN/m³)
    UnitWeight,
    /// 무차원 지수(e, Gs)
    Index,
    /// 백분율(w, n, S, Dr)
    Percent,
    /// 체적(cm³)
    Volume,
    /// 질량(g)
    Mass,
}

impl QuantityKind {
    /// 소수점 이하 자릿수.
    pub const fn decimals(self) -> i32 {
        match self {
            QuantityKind::UnitWeight => 3,
            QuantityKind::Index => 4,
            QuantityKind::Percent => 2,
            QuantityKind::Volume => 3,
            QuantityKind::Mass => 2,
        }
    }

    pub fn round(self, value: f64) -> f64 {
        round_to(value, self.decimals())
    }
}

/// 지정 자릿수로 반올림한다(0.5는 0에서 먼 쪽으로).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // -0.0 출력 방지
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
