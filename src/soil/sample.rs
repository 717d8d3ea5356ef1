use serde::{Deserialize, Serialize, Serializer};

use crate::quantity::QuantityKind;

/// 물의 단위중량 기본값 [kN/m³]. 9.81도 그대로 받아들인다.
pub const DEFAULT_WATER_UNIT_WEIGHT: f64 = 10.0;

/// 한 시료에 대해 측정했거나 가정한 값들.
///
/// 모든 항목은 선택 사항이며 백분율 항목(w, n, S)은 % 단위로 받는다.
/// 질량은 g, 체적은 cm³, 단위중량은 kN/m³ 기준이다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleInput {
    /// 함수비 w [%]
    pub water_content: Option<f64>,
    /// 간극률 n [%]
    pub porosity: Option<f64>,
    /// 포화도 S [%]
    pub saturation: Option<f64>,
    /// 간극비 e
    pub void_ratio: Option<f64>,
    /// 흙 입자 비중 Gs
    pub specific_gravity: Option<f64>,
    /// 흙 입자 단위중량 γs
    pub solids_unit_weight: Option<f64>,
    /// 자연(습윤) 단위중량 γnat
    pub natural_unit_weight: Option<f64>,
    /// 건조 단위중량 γd
    pub dry_unit_weight: Option<f64>,
    /// 물의 단위중량 γw. `None`이면 [`DEFAULT_WATER_UNIT_WEIGHT`].
    pub water_unit_weight: Option<f64>,
    /// 습윤 질량 Mt [g]
    pub total_mass: Option<f64>,
    /// 건조 질량 Ms [g]
    pub solids_mass: Option<f64>,
    /// 전체 체적 V [cm³]
    pub total_volume: Option<f64>,
    /// 최대 간극비 emax
    pub max_void_ratio: Option<f64>,
    /// 최소 간극비 emin
    pub min_void_ratio: Option<f64>,
}

impl SampleInput {
    /// 계산에 실제로 쓰이는 γw.
    pub fn gamma_w(&self) -> f64 {
        self.water_unit_weight.unwrap_or(DEFAULT_WATER_UNIT_WEIGHT)
    }
}

/// 유한값 또는 상한 없음(+∞)을 명시적으로 구분한다.
///
/// γd ≈ 0 일 때의 간극비처럼 수학적으로 발산하는 값을 부동소수 무한대 대신
/// 이 태그로 들고 다닌다. `Unbounded`는 산술에 투입되지 않는다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    Finite(f64),
    Unbounded,
}

impl Magnitude {
    pub fn finite(self) -> Option<f64> {
        match self {
            Magnitude::Finite(v) => Some(v),
            Magnitude::Unbounded => None,
        }
    }

    pub(crate) fn map(self, f: impl FnOnce(f64) -> f64) -> Magnitude {
        match self {
            Magnitude::Finite(v) => Magnitude::Finite(f(v)),
            Magnitude::Unbounded => Magnitude::Unbounded,
        }
    }
}

impl Serialize for Magnitude {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Magnitude::Finite(v) => serializer.serialize_f64(*v),
            Magnitude::Unbounded => serializer.serialize_str("∞"),
        }
    }
}

impl std::fmt::Display for Magnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Magnitude::Finite(v) => write!(f, "{v}"),
            Magnitude::Unbounded => write!(f, "∞"),
        }
    }
}

/// 상대밀도(Dr)에 따른 조밀도 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityClass {
    #[serde(rename = "Muito Fofa")]
    VeryLoose,
    #[serde(rename = "Fofa")]
    Loose,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Compacta")]
    Dense,
    #[serde(rename = "Muito Compacta")]
    VeryDense,
    /// e가 [emin, emax] 범위를 벗어나 Dr을 정의할 수 없음
    #[serde(rename = "Fora da faixa [emin, emax]")]
    OutOfRange,
}

impl DensityClass {
    pub fn label(self) -> &'static str {
        match self {
            DensityClass::VeryLoose => "Muito Fofa",
            DensityClass::Loose => "Fofa",
            DensityClass::Medium => "Média",
            DensityClass::Dense => "Compacta",
            DensityClass::VeryDense => "Muito Compacta",
            DensityClass::OutOfRange => "Fora da faixa [emin, emax]",
        }
    }
}

impl std::fmt::Display for DensityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 결과 레코드에서 이름으로 다루는 물리지수.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    NaturalUnitWeight,
    DryUnitWeight,
    SaturatedUnitWeight,
    SubmergedUnitWeight,
    SolidsUnitWeight,
    SpecificGravity,
    VoidRatio,
    Porosity,
    Saturation,
    WaterContent,
    RelativeDensity,
}

impl Parameter {
    /// 다중 시료 통계를 내는 일곱 항목.
    pub const AGGREGATED: [Parameter; 7] = [
        Parameter::NaturalUnitWeight,
        Parameter::DryUnitWeight,
        Parameter::SaturatedUnitWeight,
        Parameter::WaterContent,
        Parameter::VoidRatio,
        Parameter::Porosity,
        Parameter::Saturation,
    ];

    pub const ALL: [Parameter; 11] = [
        Parameter::NaturalUnitWeight,
        Parameter::DryUnitWeight,
        Parameter::SaturatedUnitWeight,
        Parameter::SubmergedUnitWeight,
        Parameter::SolidsUnitWeight,
        Parameter::SpecificGravity,
        Parameter::VoidRatio,
        Parameter::Porosity,
        Parameter::Saturation,
        Parameter::WaterContent,
        Parameter::RelativeDensity,
    ];

    pub fn kind(self) -> QuantityKind {
        match self {
            Parameter::NaturalUnitWeight
            | Parameter::DryUnitWeight
            | Parameter::SaturatedUnitWeight
            | Parameter::SubmergedUnitWeight
            | Parameter::SolidsUnitWeight => QuantityKind::UnitWeight,
            Parameter::SpecificGravity | Parameter::VoidRatio => QuantityKind::Index,
            Parameter::Porosity
            | Parameter::Saturation
            | Parameter::WaterContent
            | Parameter::RelativeDensity => QuantityKind::Percent,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Parameter::NaturalUnitWeight => "γnat",
            Parameter::DryUnitWeight => "γd",
            Parameter::SaturatedUnitWeight => "γsat",
            Parameter::SubmergedUnitWeight => "γsub",
            Parameter::SolidsUnitWeight => "γs",
            Parameter::SpecificGravity => "Gs",
            Parameter::VoidRatio => "e",
            Parameter::Porosity => "n",
            Parameter::Saturation => "S",
            Parameter::WaterContent => "w",
            Parameter::RelativeDensity => "Dr",
        }
    }

    pub fn unit(self) -> &'static str {
        match self.kind() {
            QuantityKind::UnitWeight => "kN/m³",
            QuantityKind::Percent => "%",
            QuantityKind::Volume => "cm³",
            QuantityKind::Mass => "g",
            QuantityKind::Index => "",
        }
    }
}

/// 한 시료의 계산 결과. 모든 수치는 출력 자릿수로 반올림되어 있다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleOutput {
    pub natural_unit_weight: Option<f64>,
    pub dry_unit_weight: Option<f64>,
    pub saturated_unit_weight: Option<f64>,
    pub submerged_unit_weight: Option<f64>,
    pub solids_unit_weight: Option<f64>,
    pub specific_gravity: Option<f64>,
    pub void_ratio: Option<Magnitude>,
    /// [%]
    pub porosity: Option<f64>,
    /// [%]
    pub saturation: Option<f64>,
    /// [%]
    pub water_content: Option<Magnitude>,

    /// 흙 입자 체적을 1로 둔 상대 체적/중량 (상도용)
    pub solids_volume_norm: f64,
    pub water_volume_norm: Option<f64>,
    pub air_volume_norm: Option<f64>,
    pub solids_weight_norm: Option<f64>,
    pub water_weight_norm: Option<f64>,

    /// 상대밀도 Dr [%]
    pub relative_density: Option<f64>,
    pub density_class: Option<DensityClass>,

    /// 재구성한 절대 체적 [cm³]
    pub total_volume: Option<f64>,
    pub solids_volume: Option<f64>,
    pub water_volume: Option<f64>,
    pub air_volume: Option<f64>,
    /// 재구성한 절대 질량 [g]
    pub total_mass: Option<f64>,
    pub solids_mass: Option<f64>,
    pub water_mass: Option<f64>,

    /// 결과를 막지 않는 안내 메시지
    pub advisory: Option<String>,
}

impl SampleOutput {
    /// 이름으로 유한한 수치를 읽는다. `Unbounded`는 `None`으로 본다.
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::NaturalUnitWeight => self.natural_unit_weight,
            Parameter::DryUnitWeight => self.dry_unit_weight,
            Parameter::SaturatedUnitWeight => self.saturated_unit_weight,
            Parameter::SubmergedUnitWeight => self.submerged_unit_weight,
            Parameter::SolidsUnitWeight => self.solids_unit_weight,
            Parameter::SpecificGravity => self.specific_gravity,
            Parameter::VoidRatio => self.void_ratio.and_then(Magnitude::finite),
            Parameter::Porosity => self.porosity,
            Parameter::Saturation => self.saturation,
            Parameter::WaterContent => self.water_content.and_then(Magnitude::finite),
            Parameter::RelativeDensity => self.relative_density,
        }
    }

    pub fn set_value(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::NaturalUnitWeight => self.natural_unit_weight = Some(value),
            Parameter::DryUnitWeight => self.dry_unit_weight = Some(value),
            Parameter::SaturatedUnitWeight => self.saturated_unit_weight = Some(value),
            Parameter::SubmergedUnitWeight => self.submerged_unit_weight = Some(value),
            Parameter::SolidsUnitWeight => self.solids_unit_weight = Some(value),
            Parameter::SpecificGravity => self.specific_gravity = Some(value),
            Parameter::VoidRatio => self.void_ratio = Some(Magnitude::Finite(value)),
            Parameter::Porosity => self.porosity = Some(value),
            Parameter::Saturation => self.saturation = Some(value),
            Parameter::WaterContent => self.water_content = Some(Magnitude::Finite(value)),
            Parameter::RelativeDensity => self.relative_density = Some(value),
        }
    }
}
