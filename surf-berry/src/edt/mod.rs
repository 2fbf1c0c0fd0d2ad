//! 各向异性精确欧氏距离变换.
//!
//! 逐轴可分离: 每个轴上对每一条 lane 求一维平方距离的抛物线下包络,
//! 依次作用于所有轴后开平方. 坐标以毫米计, 第 `k` 轴相邻元素相距 `spacing[k]`.

use log::trace;
use ndarray::{Array, ArrayView, ArrayViewMut1, Axis, Dimension, Zip};

use crate::data::check_spacing;
use crate::MetricResult;

/// 一维平方距离变换的抛物线下包络.
///
/// `v` 中保存构成包络的抛物线顶点 `(x, f(x))`, `z[i]` 为第 `i` 条抛物线
/// 在包络中起作用的左端点.
struct Envelope {
    v: Vec<(f64, f64)>,
    z: Vec<f64>,
}

impl Envelope {
    fn with_capacity(n: usize) -> Self {
        Self {
            v: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
        }
    }

    /// 加入顶点为 `(x, fx)` 的抛物线. `x` 必须严格递增, `fx` 必须有限.
    fn push(&mut self, x: f64, fx: f64) {
        loop {
            let Some(&(xp, fp)) = self.v.last() else {
                break;
            };
            let s = ((fx + x * x) - (fp + xp * xp)) / (2.0 * (x - xp));
            match self.z.last() {
                Some(&zp) if s <= zp => {
                    self.v.pop();
                    self.z.pop();
                }
                _ => {
                    self.v.push((x, fx));
                    self.z.push(s);
                    return;
                }
            }
        }
        self.v.push((x, fx));
        self.z.push(f64::NEG_INFINITY);
    }

    /// 用包络覆盖 `lane`. 包络为空时 `lane` 保持不变 (全为 `+inf`).
    fn write_to(&self, lane: &mut ArrayViewMut1<f64>, step: f64) {
        if self.v.is_empty() {
            return;
        }
        let mut k = 0;
        for (q, out) in lane.iter_mut().enumerate() {
            let x = q as f64 * step;
            while k + 1 < self.v.len() && self.z[k + 1] < x {
                k += 1;
            }
            let (xp, fp) = self.v[k];
            *out = (x - xp) * (x - xp) + fp;
        }
    }
}

/// 对一条 lane 做一维平方距离变换, 相邻元素相距 `step`.
fn transform_lane(mut lane: ArrayViewMut1<f64>, step: f64) {
    let mut envelope = Envelope::with_capacity(lane.len());
    for (q, &fq) in lane.iter().enumerate() {
        if fq.is_finite() {
            envelope.push(q as f64 * step, fq);
        }
    }
    envelope.write_to(&mut lane, step);
}

/// 调用者需保证 `spacing` 合法且分量个数等于 `mask` 的维数.
pub(crate) fn squared_distance_transform_unchecked<D: Dimension>(
    mask: ArrayView<bool, D>,
    spacing: &[f64],
) -> Array<f64, D> {
    let mut field = mask.mapv(|fg| if fg { 0.0 } else { f64::INFINITY });
    if field.is_empty() {
        return field;
    }

    for (k, &step) in spacing.iter().enumerate() {
        let axis = Axis(k);
        trace!(
            "edt pass on axis {k}: {} lanes of length {}, step {step} mm",
            field.len() / field.len_of(axis),
            field.len_of(axis),
        );
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                Zip::from(field.lanes_mut(axis)).par_for_each(|lane| transform_lane(lane, step));
            } else {
                Zip::from(field.lanes_mut(axis)).for_each(|lane| transform_lane(lane, step));
            }
        }
    }
    field
}

/// 调用者需保证 `spacing` 合法且分量个数等于 `mask` 的维数.
pub(crate) fn distance_transform_edt_unchecked<D: Dimension>(
    mask: ArrayView<bool, D>,
    spacing: &[f64],
) -> Array<f64, D> {
    let mut field = squared_distance_transform_unchecked(mask, spacing);
    field.mapv_inplace(f64::sqrt);
    field
}

/// 计算每个元素到最近前景 (`true`) 元素的平方欧氏距离, 单位为 (mm)^2.
///
/// 间距分量个数与维数不符, 或存在非正分量时, 返回 `Err(MetricError::InvalidSpacing)`.
pub fn squared_distance_transform<D: Dimension>(
    mask: ArrayView<bool, D>,
    spacing: &[f64],
) -> MetricResult<Array<f64, D>> {
    check_spacing(spacing, mask.ndim())?;
    Ok(squared_distance_transform_unchecked(mask, spacing))
}

/// 计算每个元素到最近前景 (`true`) 元素的欧氏距离, 单位为 mm.
///
/// 结果是精确的. 掩码不含前景时全为 `+inf`; 掩码全为前景时全为 0.
///
/// 间距分量个数与维数不符, 或存在非正分量时, 返回 `Err(MetricError::InvalidSpacing)`.
pub fn distance_transform_edt<D: Dimension>(
    mask: ArrayView<bool, D>,
    spacing: &[f64],
) -> MetricResult<Array<f64, D>> {
    check_spacing(spacing, mask.ndim())?;
    Ok(distance_transform_edt_unchecked(mask, spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricError;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2, Array3};

    /// 暴力求解, 仅用于对照.
    fn brute_force(mask: &Array3<bool>, spacing: [f64; 3]) -> Array3<f64> {
        let fg: Vec<_> = mask
            .indexed_iter()
            .filter(|(_, v)| **v)
            .map(|(p, _)| p)
            .collect();
        Array3::from_shape_fn(mask.raw_dim(), |(a, b, c)| {
            fg.iter()
                .map(|&(x, y, z)| {
                    let d0 = (a as f64 - x as f64) * spacing[0];
                    let d1 = (b as f64 - y as f64) * spacing[1];
                    let d2 = (c as f64 - z as f64) * spacing[2];
                    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    #[test]
    fn test_against_brute_force() {
        let spacing = [2.5, 1.0, 0.7];
        let mut mask = Array3::from_elem((7, 9, 6), false);
        for pos in [(0, 0, 0), (3, 4, 2), (6, 8, 5), (5, 1, 3), (1, 7, 4)] {
            mask[pos] = true;
        }

        let fast = distance_transform_edt(mask.view(), &spacing).unwrap();
        let slow = brute_force(&mask, spacing);
        Zip::from(&fast).and(&slow).for_each(|&a, &b| {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        });
    }

    #[test]
    fn test_empty_and_full() {
        let empty = Array3::from_elem((3, 4, 5), false);
        let field = distance_transform_edt(empty.view(), &[1.0, 2.0, 3.0]).unwrap();
        assert!(field.iter().all(|d| *d == f64::INFINITY));

        let full = Array3::from_elem((3, 4, 5), true);
        let field = distance_transform_edt(full.view(), &[1.0, 2.0, 3.0]).unwrap();
        assert!(field.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_one_dimensional() {
        let mask = Array1::from_vec(vec![false, false, true, false, false, false, true]);
        let field = squared_distance_transform(mask.view(), &[0.5]).unwrap();
        let expected = [1.0, 0.25, 0.0, 0.25, 1.0, 0.25, 0.0];
        for (a, b) in field.iter().zip(expected) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_anisotropic_plane() {
        let mut mask = Array2::from_elem((4, 3), false);
        mask[(0, 1)] = true;
        let field = distance_transform_edt(mask.view(), &[3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(field[(1, 0)], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(field[(3, 1)], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_spacing() {
        let mask = Array2::from_elem((2, 2), true);
        assert_eq!(
            distance_transform_edt(mask.view(), &[1.0]).unwrap_err(),
            MetricError::InvalidSpacing(vec![1.0])
        );
        assert!(distance_transform_edt(mask.view(), &[1.0, 0.0]).is_err());
    }
}
