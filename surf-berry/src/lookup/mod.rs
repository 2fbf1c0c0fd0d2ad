//! 邻域编码到面元面积 (二维为轮廓长度) 的查找表.
//!
//! 三维情形下, 单位间距的 marching cubes 三角形面积向量在进程内只构建一次,
//! 之后每个 [`SurfaceAreaTable`] 仅需结合实际间距做一次 256 项的缩放.

use crate::consts::code::{CUBE_CORNERS, FULL_NEIGHBOURS_2D, FULL_NEIGHBOURS_3D, SQUARE_CORNERS};
use crate::data::check_spacing;
use crate::MetricResult;
use once_cell::sync::Lazy;

mod mc_tris;

use mc_tris::MC_TRIS;

/// 三维邻域编码个数.
pub const CUBE_CODES: usize = 1 << CUBE_CORNERS;

/// 二维邻域编码个数.
pub const SQUARE_CODES: usize = 1 << SQUARE_CORNERS;

/// 12 条棱的中点, 单位立方体坐标.
const EDGE_MIDPOINTS: [[f64; 3]; 12] = [
    [0.5, 0.0, 0.0],
    [0.5, 1.0, 0.0],
    [0.5, 0.0, 1.0],
    [0.5, 1.0, 1.0],
    [0.0, 0.5, 0.0],
    [1.0, 0.5, 0.0],
    [0.0, 0.5, 1.0],
    [1.0, 0.5, 1.0],
    [0.0, 0.0, 0.5],
    [1.0, 0.0, 0.5],
    [0.0, 1.0, 0.5],
    [1.0, 1.0, 0.5],
];

/// 单位间距下, 每种编码的三角形面积向量 (法向量乘以面积).
static CANONICAL_SURFELS: Lazy<[Vec<[f64; 3]>; CUBE_CODES]> =
    Lazy::new(|| std::array::from_fn(|code| area_vectors(MC_TRIS[code])));

/// 解出一个打包三角化条目中所有三角形的面积向量.
fn area_vectors(packed: u64) -> Vec<[f64; 3]> {
    let n_triangles = (packed & 0xF) as usize;
    let edge = |k: usize| EDGE_MIDPOINTS[((packed >> (4 + 4 * k)) & 0xF) as usize];

    (0..n_triangles)
        .map(|t| {
            let [a, b, c] = [edge(3 * t), edge(3 * t + 1), edge(3 * t + 2)];
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            [
                0.5 * (u[1] * v[2] - u[2] * v[1]),
                0.5 * (u[2] * v[0] - u[0] * v[2]),
                0.5 * (u[0] * v[1] - u[1] * v[0]),
            ]
        })
        .collect()
}

/// 将单位间距的面积向量缩放到实际间距后取模.
///
/// 第 `i` 个分量垂直于第 `i` 轴, 因此按另外两个轴的间距之积缩放.
#[inline]
fn scaled_area(n: &[f64; 3], [s0, s1, s2]: [f64; 3]) -> f64 {
    let x = n[0] * s1 * s2;
    let y = n[1] * s0 * s2;
    let z = n[2] * s0 * s1;
    (x * x + y * y + z * z).sqrt()
}

/// 2x2x2 邻域编码到面元面积 (平方毫米) 的查找表.
///
/// 编码规则见 [`crate::consts::code`]. 全背景和全前景编码的面积均为 0.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceAreaTable {
    areas: [f64; CUBE_CODES],
    spacing: [f64; 3],
}

impl SurfaceAreaTable {
    /// 按给定间距构建查找表. 间距非法时返回 `Err(MetricError::InvalidSpacing)`.
    pub fn new(spacing: [f64; 3]) -> MetricResult<Self> {
        check_spacing(&spacing, 3)?;
        Ok(Self::from_checked(spacing))
    }

    /// 调用者需保证间距已经校验过.
    pub(crate) fn from_checked(spacing: [f64; 3]) -> Self {
        let areas = std::array::from_fn(|code| {
            CANONICAL_SURFELS[code]
                .iter()
                .map(|n| scaled_area(n, spacing))
                .sum()
        });
        Self { areas, spacing }
    }

    /// 查询编码对应的面元面积.
    #[inline]
    pub fn area(&self, code: u8) -> f64 {
        self.areas[code as usize]
    }

    /// 构建时使用的间距.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 以切片形式查看整张表, 下标即编码.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.areas
    }
}

/// 2x2 邻域编码到轮廓长度 (毫米) 的查找表 (marching squares).
#[derive(Clone, Debug, PartialEq)]
pub struct ContourLengthTable {
    lengths: [f64; SQUARE_CODES],
    spacing: [f64; 2],
}

impl ContourLengthTable {
    /// 按给定间距构建查找表. 间距非法时返回 `Err(MetricError::InvalidSpacing)`.
    pub fn new(spacing: [f64; 2]) -> MetricResult<Self> {
        check_spacing(&spacing, 2)?;
        Ok(Self::from_checked(spacing))
    }

    /// 调用者需保证间距已经校验过.
    pub(crate) fn from_checked(spacing: [f64; 2]) -> Self {
        let [s0, s1] = spacing;
        let half_diag = 0.5 * s0.hypot(s1);

        let lengths = std::array::from_fn(|code| match (code as u8).count_ones() {
            1 | 3 => half_diag,
            2 => match code as u8 {
                // 同一 d0 的两个角点: 轮廓沿第 1 轴.
                0b_0101 | 0b_1010 => s1,
                // 同一 d1 的两个角点: 轮廓沿第 0 轴.
                0b_0011 | 0b_1100 => s0,
                // 对角 (鞍点), 两段.
                _ => 2.0 * half_diag,
            },
            _ => 0.0,
        });
        debug_assert_eq!(lengths[FULL_NEIGHBOURS_2D as usize], 0.0);

        Self { lengths, spacing }
    }

    /// 查询编码对应的轮廓长度.
    #[inline]
    pub fn area(&self, code: u8) -> f64 {
        self.lengths[(code & FULL_NEIGHBOURS_2D) as usize]
    }

    /// 构建时使用的间距.
    #[inline]
    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    /// 以切片形式查看整张表, 下标即编码.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.lengths
    }
}

/// 单位间距下的三维查找表. 仅用于检查和调试.
pub fn unit_surface_areas() -> [f64; CUBE_CODES] {
    let table = SurfaceAreaTable::from_checked([1.0; 3]);
    debug_assert_eq!(table.area(FULL_NEIGHBOURS_3D), 0.0);
    table.areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::code::{is_transition_3d, EMPTY_NEIGHBOURS};
    use crate::MetricError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flat_faces() {
        let table = SurfaceAreaTable::new([3.0, 2.0, 1.0]).unwrap();

        // 垂直于第 2 轴的平面.
        assert_abs_diff_eq!(table.area(0x0F), 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0xF0), 6.0, epsilon = 1e-12);
        // 垂直于第 0 轴的平面.
        assert_abs_diff_eq!(table.area(0x55), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0xAA), 2.0, epsilon = 1e-12);
        // 垂直于第 1 轴的平面.
        assert_abs_diff_eq!(table.area(0x33), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0xCC), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_and_edge() {
        let unit = unit_surface_areas();
        assert_abs_diff_eq!(unit[0x01], 3f64.sqrt() / 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(unit[0x80], 3f64.sqrt() / 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(unit[0x03], 0.5f64.sqrt(), epsilon = 1e-12);

        // 沿第 0 轴的棱: 法向量落在第 1, 2 轴平面内.
        let table = SurfaceAreaTable::new([3.0, 2.0, 1.0]).unwrap();
        assert_abs_diff_eq!(table.area(0x03), (1.5f64.powi(2) + 9.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_transitions_have_area() {
        let table = SurfaceAreaTable::new([0.7, 1.3, 2.5]).unwrap();
        assert_eq!(table.area(EMPTY_NEIGHBOURS), 0.0);
        assert_eq!(table.area(FULL_NEIGHBOURS_3D), 0.0);
        for code in 0..=u8::MAX {
            if is_transition_3d(code) {
                assert!(table.area(code) > 0.0, "code {code:#04x}");
            }
        }
    }

    #[test]
    fn test_contour_lengths() {
        let table = ContourLengthTable::new([3.0, 4.0]).unwrap();
        assert_eq!(table.area(0b_0000), 0.0);
        assert_eq!(table.area(0b_1111), 0.0);
        assert_abs_diff_eq!(table.area(0b_0001), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0b_1110), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0b_0101), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0b_0011), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.area(0b_1001), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_spacing() {
        assert_eq!(
            SurfaceAreaTable::new([1.0, 0.0, 1.0]).unwrap_err(),
            MetricError::InvalidSpacing(vec![1.0, 0.0, 1.0])
        );
        assert!(ContourLengthTable::new([1.0, -1.0]).is_err());
    }
}
