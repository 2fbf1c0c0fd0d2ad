use crate::consts::{DEFAULT_PERCENT, DEFAULT_TOLERANCE_MM, PERCENT_RANGE};
use crate::{MetricError, MetricResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 检查百分位是否落在 `[0, 100]` 内. `NaN` 视为非法.
pub(crate) fn check_percent(percent: f64) -> MetricResult<()> {
    if PERCENT_RANGE.contains(&percent) {
        Ok(())
    } else {
        Err(MetricError::InvalidArgument {
            arg: "percent",
            reason: format!("{percent} is not in [0, 100]"),
        })
    }
}

/// 检查容差是否非负. `NaN` 视为非法.
pub(crate) fn check_tolerance(tolerance_mm: f64) -> MetricResult<()> {
    if tolerance_mm >= 0.0 {
        Ok(())
    } else {
        Err(MetricError::InvalidArgument {
            arg: "tolerance_mm",
            reason: format!("{tolerance_mm} is negative or NaN"),
        })
    }
}

/// 评估规则. 一次性计算全部表面指标时所需的输入参数.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvalSpec {
    /// 鲁棒 Hausdorff 距离的百分位.
    percent: f64,

    /// 表面重叠率与表面 Dice 的容差 (单位: 毫米).
    tolerance_mm: f64,
}

impl EvalSpec {
    /// 以百分位 `percent` 和容差 `tolerance_mm` 构建评估规则.
    ///
    /// 如果存在非法参数, 则返回 `Err(MetricError::InvalidArgument)`.
    pub fn new(percent: f64, tolerance_mm: f64) -> MetricResult<Self> {
        check_percent(percent)?;
        check_tolerance(tolerance_mm)?;
        Ok(Self {
            percent,
            tolerance_mm,
        })
    }

    /// 百分位.
    #[inline]
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// 容差 (单位: 毫米).
    #[inline]
    pub fn tolerance_mm(&self) -> f64 {
        self.tolerance_mm
    }
}

impl Default for EvalSpec {
    /// 95% Hausdorff 距离, 1 毫米容差.
    fn default() -> Self {
        Self {
            percent: DEFAULT_PERCENT,
            tolerance_mm: DEFAULT_TOLERANCE_MM,
        }
    }
}

/// 全部表面指标的汇总.
///
/// 各字段可能为 `NaN` 或 `+inf`, 含义与对应的单项计算一致.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceMetrics {
    /// 平均表面距离, `(gt -> pred, pred -> gt)`.
    pub average_surface_distance: (f64, f64),

    /// 鲁棒 Hausdorff 距离.
    pub robust_hausdorff: f64,

    /// 表面重叠率, `(gt, pred)`.
    pub surface_overlap: (f64, f64),

    /// 表面 Dice.
    pub surface_dice: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_spec() {
        let spec = EvalSpec::default();
        assert_eq!(spec.percent(), 95.0);
        assert_eq!(spec.tolerance_mm(), 1.0);

        assert!(EvalSpec::new(0.0, 0.0).is_ok());
        assert!(EvalSpec::new(100.0, 2.5).is_ok());
        for (percent, tol) in [
            (-0.1, 1.0),
            (100.5, 1.0),
            (f64::NAN, 1.0),
            (50.0, -1.0),
            (50.0, f64::NAN),
        ] {
            assert!(matches!(
                EvalSpec::new(percent, tol),
                Err(MetricError::InvalidArgument { .. })
            ));
        }
    }
}
