//! 运行时错误.

use thiserror::Error;

/// 参数校验错误.
///
/// 参数校验通过后, 空掩码等数值上的退化情形只会体现为 `NaN` 或 `+inf`,
/// 不会再产生该错误.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// 真值掩码和预测掩码形状不一致.
    #[error("shape mismatch: gt {gt:?} vs pred {pred:?}")]
    ShapeMismatch {
        /// 真值掩码形状.
        gt: Vec<usize>,

        /// 预测掩码形状.
        pred: Vec<usize>,
    },

    /// 体素间距存在非正 (或非有限) 分量, 或分量个数与掩码维数不符.
    #[error("invalid spacing {0:?}: every component must be finite and > 0")]
    InvalidSpacing(Vec<f64>),

    /// 参数越界.
    #[error("invalid argument `{arg}`: {reason}")]
    InvalidArgument {
        /// 参数名.
        arg: &'static str,

        /// 越界原因.
        reason: String,
    },
}

/// 表面距离 / 评估指标计算的运行时结果.
pub type MetricResult<T> = Result<T, MetricError>;
