use super::sample::{DensityClass, Magnitude, SampleInput};

/// 계산 도중의 "알려진 값" 기록.
///
/// 비율 항목(w, n, S)은 내부에서 0~1 소수로 다룬다. 각 슬롯은 한 번 채워지면
/// 이후 규칙이 덮어쓰지 않는다.
#[derive(Debug, Clone, Default)]
pub(crate) struct PhaseState {
    pub w: Option<Magnitude>,
    pub n: Option<f64>,
    pub s: Option<f64>,
    pub e: Option<Magnitude>,
    pub gs: Option<f64>,
    pub gamma_s: Option<f64>,
    pub gamma_nat: Option<f64>,
    pub gamma_d: Option<f64>,
    pub gamma_sat: Option<f64>,
    pub gamma_sub: Option<f64>,

    /// γw [kN/m³]
    pub gamma_w: f64,
    /// 물의 밀도 [g/cm³]
    pub rho_w: f64,

    pub total_mass: Option<f64>,
    pub solids_mass: Option<f64>,
    pub water_mass: Option<f64>,
    pub total_volume: Option<f64>,
    pub solids_volume: Option<f64>,
    pub void_volume: Option<f64>,
    pub water_volume: Option<f64>,
    pub air_volume: Option<f64>,

    pub e_max: Option<f64>,
    pub e_min: Option<f64>,
    pub relative_density: Option<f64>,
    pub density_class: Option<DensityClass>,
}

impl PhaseState {
    pub fn from_input(input: &SampleInput) -> Self {
        let gamma_w = input.gamma_w();
        Self {
            w: input.water_content.map(|v| Magnitude::Finite(v / 100.0)),
            n: input.porosity.map(|v| v / 100.0),
            s: input.saturation.map(|v| v / 100.0),
            e: input.void_ratio.map(Magnitude::Finite),
            gs: input.specific_gravity,
            gamma_s: input.solids_unit_weight,
            gamma_nat: input.natural_unit_weight,
            gamma_d: input.dry_unit_weight,
            gamma_w,
            rho_w: water_density(gamma_w),
            total_mass: input.total_mass,
            solids_mass: input.solids_mass,
            total_volume: input.total_volume,
            e_max: input.max_void_ratio,
            e_min: input.min_void_ratio,
            ..Self::default()
        }
    }

    /// 산술에 쓸 수 있는 간극비.
    pub fn e_value(&self) -> Option<f64> {
        self.e.and_then(Magnitude::finite)
    }

    /// 산술에 쓸 수 있는 함수비(소수).
    pub fn w_value(&self) -> Option<f64> {
        self.w.and_then(Magnitude::finite)
    }

    /// 단위중량 [kN/m³] → 밀도 [g/cm³]
    pub fn to_density(&self, unit_weight: f64) -> f64 {
        unit_weight * self.rho_w / self.gamma_w
    }

    /// 밀도 [g/cm³] → 단위중량 [kN/m³]
    pub fn to_unit_weight(&self, density: f64) -> f64 {
        density * self.gamma_w / self.rho_w
    }
}

/// γw에 대응하는 물의 밀도 [g/cm³].
///
/// γw ≈ 10 이면 1 g/cm³로 보고, 그 외에는 g = 9.81 로 환산한다.
pub(crate) fn water_density(gamma_w: f64) -> f64 {
    if (gamma_w - 10.0).abs() < 0.5 {
        1.0
    } else {
        gamma_w / 9.81
    }
}
