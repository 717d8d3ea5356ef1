use thiserror::Error;

/// 물리지수 계산 중 발생 가능한 오류.
///
/// 입력이 부족한 것은 오류가 아니다. 그 경우 계산 가능한 값만 채운 결과와
/// 안내 메시지를 반환한다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseError {
    /// 0에 가까운 값으로 나누어야 하는 경우
    #[error("분모 오류: {0}")]
    InvalidDivisor(String),
    /// 중복 입력끼리 맞지 않거나 물리적으로 불가능한 부호가 나온 경우
    #[error("입력 불일치: {0}")]
    Inconsistent(String),
    /// 유도된 값이 허용오차를 넘어 유효 범위를 벗어난 경우
    #[error("범위 오류: {0}")]
    OutOfRange(String),
    /// 입력값 자체가 유효 범위를 벗어난 경우
    #[error("입력 오류: {0}")]
    InvalidInput(String),
    /// 시료 목록이 비어 있음
    #[error("시료가 하나도 없습니다.")]
    EmptyBatch,
}

impl PhaseError {
    pub(crate) fn divisor(msg: impl Into<String>) -> Self {
        PhaseError::InvalidDivisor(msg.into())
    }

    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        PhaseError::Inconsistent(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        PhaseError::OutOfRange(msg.into())
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        PhaseError::InvalidInput(msg.into())
    }
}
