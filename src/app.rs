use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::soil::{self, PhaseError, SampleInput};
use crate::ui_cli::{self, Cli, Command};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 시료 시트 파싱 오류
    #[error("시료 시트 파싱 오류: {0}")]
    Sheet(#[from] toml::de::Error),
    /// 결과 직렬화 오류
    #[error("결과 직렬화 오류: {0}")]
    Render(#[from] toml::ser::Error),
    /// 물리지수 계산 오류
    #[error("계산 오류: {0}")]
    Phase(#[from] PhaseError),
}

/// 시료 시트(TOML).
///
/// ```toml
/// water_unit_weight = 10.0
///
/// [[sample]]
/// total_mass = 150.5
/// solids_mass = 130.2
/// total_volume = 100.0
/// specific_gravity = 2.70
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleSheet {
    /// 시료에 γw가 없을 때 쓰는 값
    pub water_unit_weight: Option<f64>,
    #[serde(default, rename = "sample")]
    pub samples: Vec<SampleInput>,
}

impl SampleSheet {
    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// γw 우선순위(시료 → 시트 → `fallback`)를 적용한 시료 목록.
    pub fn into_samples(self, fallback_water_unit_weight: f64) -> Vec<SampleInput> {
        let sheet_gamma_w = self.water_unit_weight.unwrap_or(fallback_water_unit_weight);
        self.samples
            .into_iter()
            .map(|mut sample| {
                sample.water_unit_weight.get_or_insert(sheet_gamma_w);
                sample
            })
            .collect()
    }
}

/// 명령 하나를 실행한다.
pub fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let fallback = cli
        .water_unit_weight
        .unwrap_or_else(|| config.water_unit_weight.value());
    let format = cli.format.unwrap_or(config.report_format);

    match &cli.command {
        Command::Resolve { file } => {
            let samples = SampleSheet::load(file)?.into_samples(fallback);
            if samples.is_empty() {
                return Err(PhaseError::EmptyBatch.into());
            }
            info!(count = samples.len(), file = %file.display(), "시료 개별 계산");
            for (i, sample) in samples.iter().enumerate() {
                let title = format!("시료 {}", i + 1);
                match soil::resolve(sample) {
                    Ok(out) => println!("{}", ui_cli::render_sample(&title, &out, format)?),
                    Err(err) => {
                        warn!(sample = i + 1, error = %err, "시료 계산 실패");
                        println!("# {title}: {err}\n");
                    }
                }
            }
        }
        Command::Batch { file } => {
            let samples = SampleSheet::load(file)?.into_samples(fallback);
            info!(count = samples.len(), file = %file.display(), "시료 통합 계산");
            let agg = soil::aggregate(&samples)?;
            println!("{}", ui_cli::render_aggregate(&agg, format)?);
        }
        Command::Interactive => {
            let mut sample = ui_cli::prompt_sample()?;
            sample.water_unit_weight.get_or_insert(fallback);
            let out = soil::resolve(&sample)?;
            println!("{}", ui_cli::render_sample("입력 시료", &out, format)?);
        }
    }
    Ok(())
}
