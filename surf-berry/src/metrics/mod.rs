//! 基于表面距离的评估指标, 以及体积 Dice 系数.
//!
//! 参数校验失败时返回 [`MetricError`](crate::MetricError); 校验通过后,
//! 空掩码等退化情形只会体现为 `NaN` 或 `+inf`.

use ndarray::{ArrayView, Dimension, Zip};

use crate::data::check_same_shape;
use crate::distance::{sum_areas, BorderSample, SurfaceDistances};
use crate::MetricResult;

mod config;

pub use config::{EvalSpec, SurfaceMetrics};

use config::{check_percent, check_tolerance};

/// 面积加权平均距离. 总面积为 0 时为 `NaN`.
fn weighted_mean(samples: &[BorderSample], total_area: f64) -> f64 {
    if total_area == 0.0 {
        return f64::NAN;
    }
    samples
        .iter()
        .fold(0.0, |acc, s| acc + s.distance * s.area)
        / total_area
}

/// 面积加权百分位. 采样必须已按距离升序排列.
///
/// 返回第一个累计面积占比达到 `percent / 100` 的采样距离, 若不存在则取最后一个;
/// 没有采样时为 `+inf`.
fn weighted_percentile(samples: &[BorderSample], percent: f64) -> f64 {
    let Some(last) = samples.last() else {
        return f64::INFINITY;
    };
    let total = sum_areas(samples);
    let threshold = percent / 100.0;

    let mut cumulative = 0.0;
    for s in samples {
        cumulative += s.area;
        if cumulative / total >= threshold {
            return s.distance;
        }
    }
    last.distance
}

/// 距离不超过 `tolerance_mm` 的面元面积之和. 采样必须已按距离升序排列.
///
/// 结果是总面积累加过程的一个前缀, 所以不会超过总面积; 没有采样时为 `+0.0`.
fn area_within(samples: &[BorderSample], tolerance_mm: f64) -> f64 {
    sum_areas(samples.iter().take_while(|s| s.distance <= tolerance_mm))
}

#[inline]
fn ratio_or_nan(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        f64::NAN
    } else {
        part / total
    }
}

/// 表面指标实现块.
impl SurfaceDistances {
    /// 平均表面距离 `(gt -> pred, pred -> gt)`.
    ///
    /// 某一侧表面总面积为 0 时, 该分量为 `NaN`; 另一侧没有表面时,
    /// 所有距离均为 `+inf`, 该分量为 `+inf`.
    pub fn average_surface_distance(&self) -> (f64, f64) {
        (
            weighted_mean(self.gt_to_pred(), self.area_gt()),
            weighted_mean(self.pred_to_gt(), self.area_pred()),
        )
    }

    /// 鲁棒 Hausdorff 距离: 两个方向面积加权 `percent` 百分位的较大者.
    ///
    /// 任一方向没有采样时结果为 `+inf`.
    /// `percent` 不在 `[0, 100]` 内时返回 `Err(MetricError::InvalidArgument)`.
    pub fn robust_hausdorff(&self, percent: f64) -> MetricResult<f64> {
        check_percent(percent)?;
        Ok(self.robust_hausdorff_unchecked(percent))
    }

    fn robust_hausdorff_unchecked(&self, percent: f64) -> f64 {
        let g = weighted_percentile(self.gt_to_pred(), percent);
        let p = weighted_percentile(self.pred_to_gt(), percent);
        g.max(p)
    }

    /// 给定容差下的表面重叠率 `(gt, pred)`: 距离另一表面不超过 `tolerance_mm`
    /// 的面积占自身表面总面积的比例. 自身表面总面积为 0 时为 `NaN`.
    ///
    /// `tolerance_mm` 为负时返回 `Err(MetricError::InvalidArgument)`.
    pub fn surface_overlap_at_tolerance(&self, tolerance_mm: f64) -> MetricResult<(f64, f64)> {
        check_tolerance(tolerance_mm)?;
        Ok(self.surface_overlap_unchecked(tolerance_mm))
    }

    fn surface_overlap_unchecked(&self, tolerance_mm: f64) -> (f64, f64) {
        (
            ratio_or_nan(area_within(self.gt_to_pred(), tolerance_mm), self.area_gt()),
            ratio_or_nan(area_within(self.pred_to_gt(), tolerance_mm), self.area_pred()),
        )
    }

    /// 给定容差下的表面 Dice. 双方表面总面积均为 0 时为 `NaN`.
    ///
    /// `tolerance_mm` 为负时返回 `Err(MetricError::InvalidArgument)`.
    pub fn surface_dice_at_tolerance(&self, tolerance_mm: f64) -> MetricResult<f64> {
        check_tolerance(tolerance_mm)?;
        Ok(self.surface_dice_unchecked(tolerance_mm))
    }

    fn surface_dice_unchecked(&self, tolerance_mm: f64) -> f64 {
        let overlap = area_within(self.gt_to_pred(), tolerance_mm)
            + area_within(self.pred_to_gt(), tolerance_mm);
        ratio_or_nan(overlap, self.area_gt() + self.area_pred())
    }

    /// 按 `spec` 一次性计算全部表面指标.
    pub fn evaluate(&self, spec: &EvalSpec) -> SurfaceMetrics {
        SurfaceMetrics {
            average_surface_distance: self.average_surface_distance(),
            robust_hausdorff: self.robust_hausdorff_unchecked(spec.percent()),
            surface_overlap: self.surface_overlap_unchecked(spec.tolerance_mm()),
            surface_dice: self.surface_dice_unchecked(spec.tolerance_mm()),
        }
    }
}

/// 见 [`SurfaceDistances::average_surface_distance`].
#[inline]
pub fn compute_average_surface_distance(sd: &SurfaceDistances) -> (f64, f64) {
    sd.average_surface_distance()
}

/// 见 [`SurfaceDistances::robust_hausdorff`].
#[inline]
pub fn compute_robust_hausdorff(sd: &SurfaceDistances, percent: f64) -> MetricResult<f64> {
    sd.robust_hausdorff(percent)
}

/// 见 [`SurfaceDistances::surface_overlap_at_tolerance`].
#[inline]
pub fn compute_surface_overlap_at_tolerance(
    sd: &SurfaceDistances,
    tolerance_mm: f64,
) -> MetricResult<(f64, f64)> {
    sd.surface_overlap_at_tolerance(tolerance_mm)
}

/// 见 [`SurfaceDistances::surface_dice_at_tolerance`].
#[inline]
pub fn compute_surface_dice_at_tolerance(
    sd: &SurfaceDistances,
    tolerance_mm: f64,
) -> MetricResult<f64> {
    sd.surface_dice_at_tolerance(tolerance_mm)
}

/// 体积 Dice 系数 `2 |gt ∩ pred| / (|gt| + |pred|)`.
///
/// 两个掩码都为空时为 `NaN`, 恰有一个为空时为 0.
/// 形状不一致时返回 `Err(MetricError::ShapeMismatch)`.
pub fn compute_dice_coefficient<D: Dimension>(
    mask_gt: ArrayView<bool, D>,
    mask_pred: ArrayView<bool, D>,
) -> MetricResult<f64> {
    check_same_shape(&mask_gt, &mask_pred)?;

    let mut intersection = 0usize;
    let mut volume_sum = 0usize;
    Zip::from(&mask_gt).and(&mask_pred).for_each(|&g, &p| {
        intersection += (g && p) as usize;
        volume_sum += g as usize + p as usize;
    });

    Ok(ratio_or_nan(2.0 * intersection as f64, volume_sum as f64))
}
