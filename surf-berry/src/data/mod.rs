use ndarray::{ArrayView, ArrayView2, ArrayView3, Dimension, Ix2, Ix3};

use crate::border::Borders;
use crate::lookup::{ContourLengthTable, SurfaceAreaTable};
use crate::{MetricError, MetricResult};

mod bbox;

pub(crate) use bbox::BoundingBox;

/// 检查间距: 分量个数必须为 `ndim`, 且每个分量都是有限正数.
pub(crate) fn check_spacing(spacing: &[f64], ndim: usize) -> MetricResult<()> {
    if spacing.len() == ndim && spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
        Ok(())
    } else {
        Err(MetricError::InvalidSpacing(spacing.to_vec()))
    }
}

/// 检查两个掩码形状是否一致.
pub(crate) fn check_same_shape<D: Dimension>(
    gt: &ArrayView<bool, D>,
    pred: &ArrayView<bool, D>,
) -> MetricResult<()> {
    if gt.shape() == pred.shape() {
        Ok(())
    } else {
        Err(MetricError::ShapeMismatch {
            gt: gt.shape().to_vec(),
            pred: pred.shape().to_vec(),
        })
    }
}

/// 三维二值掩码 + 各向异性体素间距.
///
/// 间距以毫米为单位, 第 `i` 个分量对应数组的第 `i` 个轴.
/// 该结构是只读的. 若要修改掩码或间距, 你应该创建新的实例.
#[derive(Clone, Debug)]
pub struct VoxelGrid<'a> {
    mask: ArrayView3<'a, bool>,
    spacing: [f64; 3],
}

/// 二维二值掩码 + 各向异性像素间距.
///
/// 间距以毫米为单位, 第 `i` 个分量对应数组的第 `i` 个轴.
/// 该结构是只读的. 若要修改掩码或间距, 你应该创建新的实例.
#[derive(Clone, Debug)]
pub struct PixelGrid<'a> {
    mask: ArrayView2<'a, bool>,
    spacing: [f64; 2],
}

macro_rules! impl_grid {
    ($grid: ident, $view: ident, $dim: ty, $n: expr, $table: ident) => {
        impl<'a> $grid<'a> {
            /// 构建网格. 若间距存在非正 (或非有限) 分量, 则返回
            /// `Err(MetricError::InvalidSpacing)`.
            pub fn new(mask: $view<'a, bool>, spacing: [f64; $n]) -> MetricResult<Self> {
                check_spacing(&spacing, $n)?;
                Ok(Self { mask, spacing })
            }

            /// 以同一间距构建一对 (真值, 预测) 网格.
            ///
            /// 除了间距检查外, 两个掩码形状不一致时返回 `Err(MetricError::ShapeMismatch)`.
            pub fn pair(
                gt: $view<'a, bool>,
                pred: $view<'a, bool>,
                spacing: [f64; $n],
            ) -> MetricResult<(Self, Self)> {
                check_same_shape(&gt, &pred)?;
                Ok((Self::new(gt, spacing)?, Self::new(pred, spacing)?))
            }

            /// 获得掩码的一份不可变 shallow copy.
            #[inline]
            pub fn mask(&self) -> $view<'a, bool> {
                self.mask.clone()
            }

            /// 获取间距, 以毫米为单位.
            #[inline]
            pub fn spacing(&self) -> [f64; $n] {
                self.spacing
            }

            /// 获取数据形状大小.
            #[inline]
            pub fn shape(&self) -> &[usize] {
                self.mask.shape()
            }

            /// 获取前景 (`true`) 元素个数.
            #[inline]
            pub fn count(&self) -> usize {
                self.mask.iter().filter(|p| **p).count()
            }

            /// 掩码是否不含任何前景?
            #[inline]
            pub fn is_empty(&self) -> bool {
                !self.mask.iter().any(|p| *p)
            }

            /// 获取单个元素的实际体积 (三维为立方毫米, 二维为平方毫米).
            #[inline]
            pub fn voxel_volume(&self) -> f64 {
                self.spacing.iter().product()
            }

            /// 获取前景的实际体积 (三维为立方毫米, 二维为平方毫米).
            #[inline]
            pub fn volume_mm3(&self) -> f64 {
                self.count() as f64 * self.voxel_volume()
            }

            /// 按自身间距构建查找表.
            #[inline]
            pub fn area_table(&self) -> $table {
                $table::from_checked(self.spacing)
            }

            /// 提取自身的表面 (面元).
            ///
            /// 返回值定义在角点格上, 形状比掩码在每个轴上多 1.
            pub fn borders(&self) -> Borders<$dim> {
                Borders::extract(self.mask.clone(), self.area_table().as_slice())
            }
        }
    };
}

impl_grid!(VoxelGrid, ArrayView3, Ix3, 3, SurfaceAreaTable);
impl_grid!(PixelGrid, ArrayView2, Ix2, 2, ContourLengthTable);
