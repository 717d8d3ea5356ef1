use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::AppError;
use crate::config::{ReportFormat, DEFAULT_CONFIG_PATH};
use crate::quantity::QuantityKind;
use crate::reference::{self, RangeCheck};
use crate::soil::{AggregatedOutput, Magnitude, Parameter, SampleInput, SampleOutput};

/// 명령행 인자.
#[derive(Debug, Parser)]
#[command(name = "soil_index_toolbox", version, about = "흙의 물리지수(상 관계) 계산기")]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// 출력 형식 (설정값보다 우선)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    /// 시료와 시트에 γw가 없을 때 쓸 물의 단위중량 [kN/m³]
    #[arg(long)]
    pub water_unit_weight: Option<f64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 시트의 각 시료를 개별 계산한다
    Resolve { file: PathBuf },
    /// 시트의 시료들을 통계와 함께 통합 계산한다
    Batch { file: PathBuf },
    /// 한 시료를 대화형으로 입력받아 계산한다
    Interactive,
}

/// 한 시료 결과를 지정 형식의 문자열로 만든다.
pub fn render_sample(title: &str, out: &SampleOutput, format: ReportFormat) -> Result<String, AppError> {
    match format {
        ReportFormat::Toml => Ok(toml::to_string_pretty(out)?),
        ReportFormat::Text => Ok(render_sample_text(title, out)),
    }
}

/// 통합 결과를 지정 형식의 문자열로 만든다.
pub fn render_aggregate(agg: &AggregatedOutput, format: ReportFormat) -> Result<String, AppError> {
    if format == ReportFormat::Toml {
        return Ok(toml::to_string_pretty(agg)?);
    }
    let mut text = render_sample_text(
        &format!("대표 결과 (시료 {}개)", agg.sample_count),
        &agg.result,
    );
    if let Some(stats) = &agg.statistics {
        text.push_str("\n-- 시료 간 통계 --\n");
        text.push_str(&format!(
            "{:<6} {:>10} {:>10} {:>8} {:>10} {:>10}\n",
            "항목", "평균", "표준편차", "CV[%]", "최소", "최대"
        ));
        for (parameter, s) in stats.iter() {
            let d = parameter.kind().decimals() as usize;
            let cv = s
                .coefficient_of_variation
                .map(|cv| format!("{cv:.2}"))
                .unwrap_or_else(|| "-".to_string());
            text.push_str(&format!(
                "{:<6} {:>10.d$} {:>10.d$} {:>8} {:>10.d$} {:>10.d$}\n",
                parameter.symbol(),
                s.mean,
                s.std_dev,
                cv,
                s.min,
                s.max,
            ));
        }
        if let Some(cv) = agg.mean_coefficient_of_variation {
            text.push_str(&format!("평균 CV: {cv:.2}%\n"));
        }
    }
    Ok(text)
}

fn render_sample_text(title: &str, out: &SampleOutput) -> String {
    let mut text = format!("=== {title} ===\n");
    for parameter in Parameter::ALL {
        let value = match parameter {
            Parameter::VoidRatio => out.void_ratio,
            Parameter::WaterContent => out.water_content,
            _ => out.value(parameter).map(Magnitude::Finite),
        };
        let Some(value) = value else { continue };
        text.push_str(&format!(
            "{:<6} {:>12} {:<6}{}\n",
            parameter.symbol(),
            format_magnitude(value, parameter.kind()),
            parameter.unit(),
            range_note(parameter, value)
        ));
    }
    if let Some(class) = out.density_class {
        text.push_str(&format!("조밀도: {class}\n"));
    }

    let phases = [
        ("Vw/Vs", out.water_volume_norm),
        ("Va/Vs", out.air_volume_norm),
        ("Ws/Vs", out.solids_weight_norm),
        ("Ww/Vs", out.water_weight_norm),
    ];
    if phases.iter().any(|(_, v)| v.is_some()) {
        text.push_str("-- 상도 (Vs = 1) --\n");
        for (label, value) in phases {
            if let Some(v) = value {
                text.push_str(&format!("{label:<6} {v:>12}\n"));
            }
        }
    }

    let absolutes = [
        ("V", out.total_volume, QuantityKind::Volume),
        ("Vs", out.solids_volume, QuantityKind::Volume),
        ("Vw", out.water_volume, QuantityKind::Volume),
        ("Va", out.air_volume, QuantityKind::Volume),
        ("Mt", out.total_mass, QuantityKind::Mass),
        ("Ms", out.solids_mass, QuantityKind::Mass),
        ("Mw", out.water_mass, QuantityKind::Mass),
    ];
    if absolutes.iter().any(|(_, v, _)| v.is_some()) {
        text.push_str("-- 체적/질량 --\n");
        for (label, value, kind) in absolutes {
            if let Some(v) = value {
                let unit = if kind == QuantityKind::Volume { "cm³" } else { "g" };
                text.push_str(&format!(
                    "{label:<6} {:>12} {unit}\n",
                    format_magnitude(Magnitude::Finite(v), kind)
                ));
            }
        }
    }

    if let Some(advisory) = &out.advisory {
        text.push_str(advisory);
        text.push('\n');
    }
    text
}

fn format_magnitude(value: Magnitude, kind: QuantityKind) -> String {
    match value {
        Magnitude::Finite(v) => format!("{:.prec$}", v, prec = kind.decimals() as usize),
        Magnitude::Unbounded => "∞".to_string(),
    }
}

fn range_note(parameter: Parameter, value: Magnitude) -> String {
    let Some(v) = value.finite() else {
        return String::new();
    };
    match (reference::check(parameter, v), reference::typical_range(parameter)) {
        (Some(RangeCheck::Below), Some(r)) => {
            format!("  (참고 범위 {}~{} 미만: {})", r.low, r.high, r.notes)
        }
        (Some(RangeCheck::Above), Some(r)) => {
            format!("  (참고 범위 {}~{} 초과: {})", r.low, r.high, r.notes)
        }
        _ => String::new(),
    }
}

/// 한 시료를 대화형으로 입력받는다. 빈 입력은 미지값으로 둔다.
pub fn prompt_sample() -> Result<SampleInput, AppError> {
    println!("\n-- 물리지수 입력 (모르는 값은 엔터) --");
    Ok(SampleInput {
        total_mass: read_optional_f64("습윤 질량 Mt [g]: ")?,
        solids_mass: read_optional_f64("건조 질량 Ms [g]: ")?,
        total_volume: read_optional_f64("전체 체적 V [cm³]: ")?,
        specific_gravity: read_optional_f64("흙 입자 비중 Gs: ")?,
        solids_unit_weight: read_optional_f64("흙 입자 단위중량 γs [kN/m³]: ")?,
        natural_unit_weight: read_optional_f64("자연 단위중량 γnat [kN/m³]: ")?,
        dry_unit_weight: read_optional_f64("건조 단위중량 γd [kN/m³]: ")?,
        water_content: read_optional_f64("함수비 w [%]: ")?,
        void_ratio: read_optional_f64("간극비 e: ")?,
        porosity: read_optional_f64("간극률 n [%]: ")?,
        saturation: read_optional_f64("포화도 S [%]: ")?,
        max_void_ratio: read_optional_f64("최대 간극비 emax: ")?,
        min_void_ratio: read_optional_f64("최소 간극비 emin: ")?,
        water_unit_weight: read_optional_f64("물의 단위중량 γw [kN/m³]: ")?,
    })
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

fn read_optional_f64(prompt: &str) -> Result<Option<f64>, AppError> {
    loop {
        let s = read_line(prompt)?;
        match parse_optional(&s) {
            Ok(v) => return Ok(v),
            Err(_) => println!("숫자를 입력하거나 비워 두세요."),
        }
    }
}

/// 빈 문자열은 `None`, 소수점 쉼표도 받아들인다.
fn parse_optional(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.replace(',', ".").parse::<f64>().map(Some)
}
