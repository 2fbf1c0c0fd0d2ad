#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 计算两个二值分割掩码 (真值 `gt` 与预测 `pred`) 之间基于表面的相似性指标,
//! 用于评估医学图像分割 (如 LiTS 肝脏 / 肿瘤标签) 的质量.
//!
//! 该 crate 目前仅提供 `safe` 接口, 且所有计算均为纯函数: 不修改输入, 不做 I/O.
//!
//! # 注意
//!
//! 1. 所有掩码都是内存中的 `bool` 数组. 加载 nifti / npz 文件等工作由调用者完成.
//! 2. 参数非法 (形状不一致, 间距非正, 百分位越界等) 时返回 [`MetricError`].
//!   参数合法后, 所有数值上的退化情形 (空掩码等) 都以 `NaN` / `+inf` 返回,
//!   调用者不应将它们视为错误.
//!
//! # 开发计划
//!
//! ### 邻域编码到面元面积的查找表 ✅
//!
//! 2x2x2 邻域的 256 种编码由 marching cubes 三角化得到单位间距下的面积向量,
//! 进程内只构建一次; 实际面积在查询时结合各向异性间距求得.
//! 二维情形使用 16 种编码的轮廓长度表.
//!
//! 实现位于 `surf-berry/src/lookup`.
//!
//! ### 表面 (面元) 提取 ✅
//!
//! 在体素角点格上滑动 2x2x2 窗口, 四周补一层背景.
//!
//! 实现位于 `surf-berry/src/border`.
//!
//! ### 各向异性精确欧氏距离变换 ✅
//!
//! 逐轴可分离的抛物线下包络算法.
//!
//! 实现位于 `surf-berry/src/edt`.
//!
//! ### 双向表面距离 ✅
//!
//! 先裁剪到两个掩码并集的包围盒, 然后对每个表面点求到另一掩码表面的距离.
//! 开启 `rayon` feature 时两个方向并行计算.
//!
//! 实现位于 `surf-berry/src/distance`.
//!
//! ### 评估指标 ✅
//!
//! 1. 平均表面距离;
//! 2. 鲁棒 (百分位) Hausdorff 距离;
//! 3. 给定容差下的表面重叠率;
//! 4. 给定容差下的表面 Dice;
//! 5. 体积 Dice 系数.
//!
//! 实现位于 `surf-berry/src/metrics`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

/// 带物理间距的二值掩码.
mod data;

pub use data::{PixelGrid, VoxelGrid};

mod error;

pub use error::{MetricError, MetricResult};

pub mod lookup;

pub mod border;

pub mod edt;

mod distance;

pub use distance::{
    compute_surface_distances, compute_surface_distances_2d, BorderSample, SurfaceDistances,
};

pub mod metrics;

pub use metrics::{
    compute_average_surface_distance, compute_dice_coefficient, compute_robust_hausdorff,
    compute_surface_dice_at_tolerance, compute_surface_overlap_at_tolerance, EvalSpec,
    SurfaceMetrics,
};

pub mod prelude;

#[cfg(test)]
mod test_util;
