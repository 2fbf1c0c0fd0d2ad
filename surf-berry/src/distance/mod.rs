use log::debug;
use ndarray::{ArrayView, ArrayView2, ArrayView3, Dimension};
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::border::Borders;
use crate::data::BoundingBox;
use crate::lookup::{ContourLengthTable, SurfaceAreaTable};
use crate::{MetricResult, PixelGrid, VoxelGrid};


cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::join;
    } else {
        #[inline]
        fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
        where
            A: FnOnce() -> RA,
            B: FnOnce() -> RB,
        {
            (a(), b())
        }
    }
}

/// 单个表面点的采样: 到另一掩码表面的距离 (mm), 以及自身面元面积 (mm^2).
///
/// 二维情形下, `area` 为轮廓长度 (mm).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BorderSample {
    /// 到另一掩码表面的距离. 另一掩码没有表面时为 `+inf`.
    pub distance: f64,

    /// 面元面积.
    pub area: f64,
}

/// 双向表面距离.
///
/// 两个方向的采样均按距离升序排列, 双方表面总面积为各自采样面积按该顺序的累加.
/// 构建后不可修改, 所有评估指标都以它为输入.
///
/// 反序列化同样经过 [`SurfaceDistances::from_samples`], 只读取两个方向的采样.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawSurfaceDistances"))]
pub struct SurfaceDistances {
    gt_to_pred: Vec<BorderSample>,
    pred_to_gt: Vec<BorderSample>,
    area_gt: f64,
    area_pred: f64,
}

/// 反序列化的中间形式.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawSurfaceDistances {
    gt_to_pred: Vec<BorderSample>,
    pred_to_gt: Vec<BorderSample>,
}

#[cfg(feature = "serde")]
impl From<RawSurfaceDistances> for SurfaceDistances {
    fn from(raw: RawSurfaceDistances) -> Self {
        Self::from_samples(raw.gt_to_pred, raw.pred_to_gt)
    }
}

/// 按顺序累加面元面积. 空序列为 `+0.0`.
#[inline]
pub(crate) fn sum_areas<'a>(samples: impl IntoIterator<Item = &'a BorderSample>) -> f64 {
    samples.into_iter().fold(0.0, |acc, s| acc + s.area)
}

impl SurfaceDistances {
    /// 由两个方向的采样构建, 内部按距离升序重排.
    ///
    /// 双方表面总面积由排序后的采样累加得到. 指标中的部分面积按同一顺序累加前缀,
    /// 因此重叠率和表面 Dice 不会因舍入超过 1.
    pub fn from_samples(
        mut gt_to_pred: Vec<BorderSample>,
        mut pred_to_gt: Vec<BorderSample>,
    ) -> Self {
        gt_to_pred.sort_by_key(|s| OrderedFloat(s.distance));
        pred_to_gt.sort_by_key(|s| OrderedFloat(s.distance));
        let area_gt = sum_areas(&gt_to_pred);
        let area_pred = sum_areas(&pred_to_gt);
        Self {
            gt_to_pred,
            pred_to_gt,
            area_gt,
            area_pred,
        }
    }

    /// 交换真值和预测.
    pub fn swapped(&self) -> Self {
        Self {
            gt_to_pred: self.pred_to_gt.clone(),
            pred_to_gt: self.gt_to_pred.clone(),
            area_gt: self.area_pred,
            area_pred: self.area_gt,
        }
    }

    /// 真值表面点到预测表面的采样, 按距离升序.
    #[inline]
    pub fn gt_to_pred(&self) -> &[BorderSample] {
        &self.gt_to_pred
    }

    /// 预测表面点到真值表面的采样, 按距离升序.
    #[inline]
    pub fn pred_to_gt(&self) -> &[BorderSample] {
        &self.pred_to_gt
    }

    /// 真值表面总面积.
    #[inline]
    pub fn area_gt(&self) -> f64 {
        self.area_gt
    }

    /// 预测表面总面积.
    #[inline]
    pub fn area_pred(&self) -> f64 {
        self.area_pred
    }

    /// 两个方向都没有任何采样?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gt_to_pred.is_empty() && self.pred_to_gt.is_empty()
    }
}

/// 逐采样访问.
impl SurfaceDistances {
    /// 真值方向的距离序列.
    pub fn distances_gt_to_pred(&self) -> impl Iterator<Item = f64> + '_ {
        self.gt_to_pred.iter().map(|s| s.distance)
    }

    /// 预测方向的距离序列.
    pub fn distances_pred_to_gt(&self) -> impl Iterator<Item = f64> + '_ {
        self.pred_to_gt.iter().map(|s| s.distance)
    }

    /// 真值方向的面元面积序列, 与 [`Self::distances_gt_to_pred`] 一一对应.
    pub fn surfel_areas_gt(&self) -> impl Iterator<Item = f64> + '_ {
        self.gt_to_pred.iter().map(|s| s.area)
    }

    /// 预测方向的面元面积序列, 与 [`Self::distances_pred_to_gt`] 一一对应.
    pub fn surfel_areas_pred(&self) -> impl Iterator<Item = f64> + '_ {
        self.pred_to_gt.iter().map(|s| s.area)
    }
}

/// 裁剪到并集包围盒, 提取双方表面, 再互相求距离.
///
/// 调用者需保证形状一致, 且 `spacing`, `table` 与维数匹配.
fn surface_distances_with<D: Dimension + Copy>(
    gt: ArrayView<bool, D>,
    pred: ArrayView<bool, D>,
    spacing: &[f64],
    table: &[f64],
) -> SurfaceDistances {
    let Some(bbox) = BoundingBox::of_union(&gt, &pred) else {
        debug!("both masks are empty, no surface to compare");
        return SurfaceDistances::default();
    };
    debug!("cropping {:?} to bounding box {:?}", gt.shape(), bbox.extent());

    let gt = bbox.crop(&gt);
    let pred = bbox.crop(&pred);

    let (borders_gt, borders_pred) = join(
        || Borders::extract(gt, table),
        || Borders::extract(pred, table),
    );
    debug!(
        "border points: gt {} ({:.3}), pred {} ({:.3})",
        borders_gt.len(),
        borders_gt.total_area(),
        borders_pred.len(),
        borders_pred.total_area(),
    );

    let (gt_to_pred, pred_to_gt) = join(
        || borders_gt.samples_toward(&borders_pred, spacing),
        || borders_pred.samples_toward(&borders_gt, spacing),
    );

    SurfaceDistances::from_samples(gt_to_pred, pred_to_gt)
}

/// 计算三维真值掩码与预测掩码之间的双向表面距离.
///
/// `spacing` 为各轴体素间距, 以毫米为单位.
///
/// # 错误
///
/// 1. 两个掩码形状不一致时返回 `Err(MetricError::ShapeMismatch)`;
/// 2. 间距存在非正分量时返回 `Err(MetricError::InvalidSpacing)`.
pub fn compute_surface_distances<'a>(
    mask_gt: ArrayView3<'a, bool>,
    mask_pred: ArrayView3<'a, bool>,
    spacing: [f64; 3],
) -> MetricResult<SurfaceDistances> {
    let (gt, pred) = VoxelGrid::pair(mask_gt, mask_pred, spacing)?;
    let table = SurfaceAreaTable::from_checked(spacing);
    Ok(surface_distances_with(
        gt.mask(),
        pred.mask(),
        &spacing,
        table.as_slice(),
    ))
}

/// 计算二维真值掩码与预测掩码之间的双向轮廓距离.
///
/// 结果中的 "面积" 均为轮廓长度 (mm), 所有评估指标可以直接使用.
///
/// # 错误
///
/// 同 [`compute_surface_distances`].
pub fn compute_surface_distances_2d<'a>(
    mask_gt: ArrayView2<'a, bool>,
    mask_pred: ArrayView2<'a, bool>,
    spacing: [f64; 2],
) -> MetricResult<SurfaceDistances> {
    let (gt, pred) = PixelGrid::pair(mask_gt, mask_pred, spacing)?;
    let table = ContourLengthTable::from_checked(spacing);
    Ok(surface_distances_with(
        gt.mask(),
        pred.mask(),
        &spacing,
        table.as_slice(),
    ))
}
