//! 表面 (面元) 提取.
//!
//! 掩码四周先补一层背景, 再在体素角点格上滑动 2x2x2 (二维为 2x2) 窗口.
//! 角点格在每个轴上比掩码多 1 个点, 相对体素中心偏移半个体素.
//! 窗口编码是真正交界的角点即为表面点, 其面元面积由查找表给出.

use ndarray::{Array, ArrayView, Dimension, Slice, Zip};

use crate::consts::code::{is_transition_2d, is_transition_3d};
use crate::distance::BorderSample;
use crate::edt::distance_transform_edt_unchecked;

/// 掩码在角点格上的表面.
#[derive(Clone, Debug, PartialEq)]
pub struct Borders<D: Dimension> {
    border: Array<bool, D>,
    areas: Array<f64, D>,
    len: usize,
    area: f64,
}

/// 将 `mask` 放入四周补一层背景的新数组中.
fn pad_background<D: Dimension>(mask: &ArrayView<bool, D>) -> Array<bool, D> {
    let mut dim = mask.raw_dim();
    for len in dim.slice_mut() {
        *len += 2;
    }
    let mut padded = Array::from_elem(dim, false);
    padded
        .slice_each_axis_mut(|ax| Slice::from(1..ax.len - 1))
        .assign(mask);
    padded
}

impl<D: Dimension> Borders<D> {
    /// 提取 `mask` 的表面. `table` 下标为邻域编码, 值为面元面积.
    ///
    /// 只支持二维和三维掩码, `table` 长度需分别为 16 和 256. crate 外部应通过
    /// [`VoxelGrid::borders`](crate::VoxelGrid::borders) 或
    /// [`PixelGrid::borders`](crate::PixelGrid::borders) 获取表面, 它们保证了维数与查找表匹配.
    pub(crate) fn extract(mask: ArrayView<bool, D>, table: &[f64]) -> Self {
        let ndim = mask.ndim();
        debug_assert!(ndim == 2 || ndim == 3);
        debug_assert_eq!(table.len(), 1 << (1 << ndim));

        let padded = pad_background(&mask);
        let mut lattice = mask.raw_dim();
        for len in lattice.slice_mut() {
            *len += 1;
        }

        // 角点偏移 `(d0, d1, d2)` 恰好对应编码的第 `corner` 位.
        let mut codes = Array::<u8, D>::zeros(lattice);
        for corner in 0..(1usize << ndim) {
            let shifted = padded.slice_each_axis(|ax| {
                let d = (corner >> ax.axis.index()) & 1;
                Slice::from(d..d + ax.len - 1)
            });
            Zip::from(&mut codes).and(&shifted).for_each(|code, &fg| {
                if fg {
                    *code |= 1 << corner;
                }
            });
        }

        let is_transition: fn(u8) -> bool = if ndim == 3 {
            is_transition_3d
        } else {
            is_transition_2d
        };
        let border = codes.mapv(is_transition);
        let areas = Zip::from(&codes)
            .and(&border)
            .map_collect(|&code, &b| if b { table[code as usize] } else { 0.0 });

        let len = border.iter().filter(|b| **b).count();
        let area = areas.sum();
        Self {
            border,
            areas,
            len,
            area,
        }
    }

    /// 表面点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否没有任何表面点?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 表面总面积 (二维为总长度).
    #[inline]
    pub fn total_area(&self) -> f64 {
        self.area
    }

    /// 角点格上的表面点掩码.
    #[inline]
    pub fn border(&self) -> ArrayView<bool, D> {
        self.border.view()
    }

    /// 遍历所有表面点的角点格坐标及其面元面积.
    pub fn surfels(&self) -> impl Iterator<Item = (D::Pattern, f64)> + '_ {
        self.border
            .indexed_iter()
            .zip(self.areas.iter())
            .filter(|((_, b), _)| **b)
            .map(|((pos, _), a)| (pos, *a))
    }

    /// 计算自身每个表面点到 `other` 表面的距离.
    ///
    /// 两者必须来自同一裁剪区域. 距离场在返回前释放.
    pub(crate) fn samples_toward(&self, other: &Self, spacing: &[f64]) -> Vec<BorderSample> {
        debug_assert_eq!(self.border.shape(), other.border.shape());

        let field = distance_transform_edt_unchecked(other.border.view(), spacing);
        let mut samples = Vec::with_capacity(self.len);
        Zip::from(&self.border)
            .and(&self.areas)
            .and(&field)
            .for_each(|&b, &area, &distance| {
                if b {
                    samples.push(BorderSample { distance, area });
                }
            });
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Idx2d, Idx3d, PixelGrid, VoxelGrid};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_single_voxel() {
        let mut mask = Array3::from_elem((3, 3, 3), false);
        mask[(1, 1, 1)] = true;
        let borders = VoxelGrid::new(mask.view(), [1.0; 3]).unwrap().borders();

        assert_eq!(borders.border().shape(), &[4, 4, 4]);
        assert_eq!(borders.len(), 8);
        assert_abs_diff_eq!(borders.total_area(), 3f64.sqrt(), epsilon = 1e-12);

        let mut corners: Vec<Idx3d> = borders.surfels().map(|(pos, _)| pos).collect();
        corners.sort_unstable();
        assert_eq!(corners.first(), Some(&(1, 1, 1)));
        assert_eq!(corners.last(), Some(&(2, 2, 2)));
    }

    #[test]
    fn test_empty_mask() {
        let mask = Array3::from_elem((2, 3, 4), false);
        let borders = VoxelGrid::new(mask.view(), [1.0; 3]).unwrap().borders();
        assert!(borders.is_empty());
        assert_eq!(borders.total_area(), 0.0);
        assert_eq!(borders.surfels().count(), 0);
    }

    #[test]
    fn test_saturated_mask_has_surface() {
        // 数组之外视为背景, 所以全前景的掩码表面落在数组边界上.
        let mask = Array3::from_elem((2, 2, 2), true);
        let borders = VoxelGrid::new(mask.view(), [1.0; 3]).unwrap().borders();

        // 8 个顶点, 12 条棱中点, 6 个面中心.
        assert_eq!(borders.len(), 26);
        let expected = 3f64.sqrt() + 12.0 * 0.5f64.sqrt() + 6.0;
        assert_abs_diff_eq!(borders.total_area(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_single_pixel_contour() {
        let mut mask = Array2::from_elem((4, 4), false);
        mask[(2, 1)] = true;
        let borders = PixelGrid::new(mask.view(), [3.0, 4.0]).unwrap().borders();

        assert_eq!(borders.len(), 4);
        assert_abs_diff_eq!(borders.total_area(), 4.0 * 2.5, epsilon = 1e-12);

        let corners: Vec<Idx2d> = borders.surfels().map(|(pos, _)| pos).collect();
        assert_eq!(corners, vec![(2, 1), (2, 2), (3, 1), (3, 2)]);
    }
}
