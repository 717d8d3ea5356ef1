//! 흙의 상 관계(물리지수) 계산 모듈 모음.

pub mod aggregate;
pub mod error;
pub mod relative_density;
pub mod resolver;
mod rules;
pub mod sample;
mod state;

pub use aggregate::*;
pub use error::PhaseError;
pub use resolver::*;
pub use sample::*;
