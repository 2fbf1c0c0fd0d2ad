//! 通用常量.

use std::ops::RangeInclusive;

/// 邻域编码.
///
/// 窗口内偏移为 `(d0, d1, d2)` (每个分量为 0 或 1) 的角点对应编码的第
/// `d0 + 2 * d1 + 4 * d2` 位. 二维情形只有前 4 位.
pub mod code {
    /// 窗口内全是背景.
    pub const EMPTY_NEIGHBOURS: u8 = 0b_0000_0000;

    /// 2x2x2 窗口内全是前景.
    pub const FULL_NEIGHBOURS_3D: u8 = 0b_1111_1111;

    /// 2x2 窗口内全是前景.
    pub const FULL_NEIGHBOURS_2D: u8 = 0b_0000_1111;

    /// 三维窗口的角点个数.
    pub const CUBE_CORNERS: usize = 8;

    /// 二维窗口的角点个数.
    pub const SQUARE_CORNERS: usize = 4;

    /// 三维编码是否代表真正的前景/背景交界?
    #[inline]
    pub const fn is_transition_3d(code: u8) -> bool {
        !matches!(code, EMPTY_NEIGHBOURS | FULL_NEIGHBOURS_3D)
    }

    /// 二维编码是否代表真正的前景/背景交界?
    #[inline]
    pub const fn is_transition_2d(code: u8) -> bool {
        !matches!(code & FULL_NEIGHBOURS_2D, EMPTY_NEIGHBOURS | FULL_NEIGHBOURS_2D)
    }
}

/// 鲁棒 Hausdorff 距离百分位的合法范围.
pub const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// 默认百分位. 与常见的 "95% Hausdorff 距离" 一致.
pub const DEFAULT_PERCENT: f64 = 95.0;

/// 默认表面容差, 以毫米为单位.
pub const DEFAULT_TOLERANCE_MM: f64 = 1.0;
