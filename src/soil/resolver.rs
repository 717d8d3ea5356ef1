use tracing::{debug, warn};

use crate::quantity::{QuantityKind, EPSILON};

use super::error::PhaseError;
use super::rules::RULES;
use super::sample::{SampleInput, SampleOutput};
use super::state::PhaseState;

/// 질량·체적만으로 부분 계산했을 때의 안내 문구.
pub const PARTIAL_CALCULATION_ADVISORY: &str = "⚠️ 부분 계산만 수행했습니다. 습윤 질량, 건조 질량, 체적만으로는 \
함수비(w), 자연 단위중량(γnat), 건조 단위중량(γd)만 구할 수 있습니다. \
나머지 지수(e, n, S, Gs, γsat, γsub)를 모두 구하려면 흙 입자 비중(Gs)이 필요합니다. \
대표값: 모래 2.65, 점토 2.70~2.75.";

/// 한 시료의 물리지수를 가능한 만큼 모두 유도한다.
///
/// 입력이 부족하면 구할 수 있는 값만 채워 돌려주고, 분모가 0에 가깝거나 중복
/// 입력이 서로 맞지 않으면 [`PhaseError`]를 반환한다.
pub fn resolve(input: &SampleInput) -> Result<SampleOutput, PhaseError> {
    validate(input)?;

    let mut state = PhaseState::from_input(input);
    for rule in RULES {
        if (rule.applies)(&state) {
            debug!(rule = rule.name, "유도 규칙 적용");
            (rule.apply)(&mut state)?;
        }
    }

    let mut output = build_output(&state);
    if needs_partial_advisory(input, &state) {
        warn!("Gs 없이 질량/체적만 주어져 부분 계산으로 끝남");
        output.advisory = Some(PARTIAL_CALCULATION_ADVISORY.to_string());
    }
    Ok(output)
}

/// 입력 범위를 검사한다.
fn validate(input: &SampleInput) -> Result<(), PhaseError> {
    let gamma_w = input.gamma_w();
    if !gamma_w.is_finite() || gamma_w <= EPSILON {
        return Err(PhaseError::invalid_input(format!(
            "물의 단위중량(γw = {gamma_w})은 0보다 커야 합니다."
        )));
    }

    let non_negative = [
        ("함수비(w)", input.water_content),
        ("간극비(e)", input.void_ratio),
        ("Gs", input.specific_gravity),
        ("흙 입자 단위중량(γs)", input.solids_unit_weight),
        ("자연 단위중량(γnat)", input.natural_unit_weight),
        ("건조 단위중량(γd)", input.dry_unit_weight),
        ("습윤 질량(Mt)", input.total_mass),
        ("건조 질량(Ms)", input.solids_mass),
        ("전체 체적(V)", input.total_volume),
        ("최소 간극비(emin)", input.min_void_ratio),
    ];
    for (label, value) in non_negative {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(PhaseError::invalid_input(format!(
                    "{label}는 0 이상의 유한한 값이어야 합니다 (입력값 {v})."
                )));
            }
        }
    }

    for (label, value) in [("포화도(S)", input.saturation), ("간극률(n)", input.porosity)] {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                return Err(PhaseError::invalid_input(format!(
                    "{label}는 0~100% 범위여야 합니다 (입력값 {v})."
                )));
            }
        }
    }

    if let Some(e_max) = input.max_void_ratio {
        if !e_max.is_finite() || e_max <= 0.0 {
            return Err(PhaseError::invalid_input(format!(
                "최대 간극비(emax = {e_max})는 0보다 커야 합니다."
            )));
        }
        if let Some(e_min) = input.min_void_ratio {
            if e_min >= e_max - EPSILON {
                return Err(PhaseError::invalid_input(format!(
                    "최소 간극비(emin = {e_min})는 최대 간극비(emax = {e_max})보다 작아야 합니다."
                )));
            }
        }
    }
    Ok(())
}

/// Mt, Ms, V만 주어지고 Gs 계열 정보가 하나도 없을 때.
fn needs_partial_advisory(input: &SampleInput, state: &PhaseState) -> bool {
    input.total_mass.is_some()
        && input.solids_mass.is_some()
        && input.total_volume.is_some()
        && input.void_ratio.is_none()
        && state.gs.is_none()
        && state.e.is_none()
        && state.n.is_none()
        && state.s.is_none()
        && state.gamma_s.is_none()
}

/// 흙 입자 체적을 1로 둔 상도(phase diagram) 값.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NormalizedPhases {
    pub solids_weight: Option<f64>,
    pub water_volume: Option<f64>,
    pub water_weight: Option<f64>,
    pub air_volume: Option<f64>,
}

/// Gs, e, S, w 만으로 계산하며 다른 단계의 상태에는 영향을 주지 않는다.
pub(crate) fn normalized_phases(state: &PhaseState) -> NormalizedPhases {
    let mut phases = NormalizedPhases {
        solids_weight: state.gs.map(|gs| gs * state.rho_w),
        ..NormalizedPhases::default()
    };
    let Some(void_volume) = state.e_value() else {
        return phases;
    };
    if let Some(sat) = state.s {
        let water_volume = sat * void_volume;
        phases.water_volume = Some(water_volume);
        phases.air_volume = Some((void_volume - water_volume).max(0.0));
        phases.water_weight = Some(water_volume * state.rho_w);
    } else if let (Some(w), Some(solids_weight)) = (state.w_value(), phases.solids_weight) {
        let water_weight = w * solids_weight;
        phases.water_weight = Some(water_weight);
        if state.rho_w > EPSILON {
            let water_volume = water_weight / state.rho_w;
            phases.water_volume = Some(water_volume);
            phases.air_volume = Some((void_volume - water_volume).max(0.0));
        }
    }
    phases
}

fn rounded(kind: QuantityKind, value: Option<f64>) -> Option<f64> {
    value.map(|v| kind.round(v))
}

fn percent(value: Option<f64>) -> Option<f64> {
    value.map(|v| QuantityKind::Percent.round(v * 100.0))
}

/// 상태를 출력 레코드로 옮기며 자릿수를 맞춘다.
fn build_output(state: &PhaseState) -> SampleOutput {
    let unit_weight = |v: Option<f64>| rounded(QuantityKind::UnitWeight, v);
    let volume = |v: Option<f64>| rounded(QuantityKind::Volume, v);
    let mass = |v: Option<f64>| rounded(QuantityKind::Mass, v);
    let index = QuantityKind::Index;
    let phases = normalized_phases(state);

    SampleOutput {
        natural_unit_weight: unit_weight(state.gamma_nat),
        dry_unit_weight: unit_weight(state.gamma_d),
        saturated_unit_weight: unit_weight(state.gamma_sat),
        submerged_unit_weight: unit_weight(state.gamma_sub),
        solids_unit_weight: unit_weight(state.gamma_s),
        specific_gravity: rounded(index, state.gs),
        void_ratio: state.e.map(|e| e.map(|v| index.round(v))),
        porosity: percent(state.n),
        saturation: percent(state.s),
        water_content: state
            .w
            .map(|w| w.map(|v| QuantityKind::Percent.round(v * 100.0))),
        solids_volume_norm: 1.0,
        water_volume_norm: rounded(index, phases.water_volume),
        air_volume_norm: rounded(index, phases.air_volume),
        solids_weight_norm: mass(phases.solids_weight),
        water_weight_norm: mass(phases.water_weight),
        relative_density: rounded(QuantityKind::Percent, state.relative_density),
        density_class: state.density_class,
        total_volume: volume(state.total_volume),
        solids_volume: volume(state.solids_volume),
        water_volume: volume(state.water_volume),
        air_volume: volume(state.air_volume),
        total_mass: mass(state.total_mass),
        solids_mass: mass(state.solids_mass),
        water_mass: mass(state.water_mass),
        advisory: None,
    }
}
