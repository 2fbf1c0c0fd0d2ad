use ndarray::{ArrayView, Dimension, IntoDimension, Slice, Zip};

/// 掩码并集的轴对齐包围盒. 每个轴上的两端均为闭区间.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoundingBox<D: Dimension + Copy> {
    min: D,
    max: D,
}

impl<D: Dimension + Copy> BoundingBox<D> {
    /// 计算 `a | b` 的包围盒. 如果两者都不含前景, 则返回 `None`.
    ///
    /// 调用者需保证 `a`, `b` 形状一致.
    pub fn of_union(a: &ArrayView<bool, D>, b: &ArrayView<bool, D>) -> Option<Self> {
        debug_assert_eq!(a.shape(), b.shape());

        // `min` 以形状本身作为哨兵, 任何合法索引都比它小.
        let mut min = a.raw_dim();
        let mut max = D::zeros(a.ndim());
        let mut found = false;

        Zip::indexed(a).and(b).for_each(|pos, &x, &y| {
            if !(x || y) {
                return;
            }
            found = true;
            let pos = pos.into_dimension();
            for (axis, &i) in pos.slice().iter().enumerate() {
                min[axis] = min[axis].min(i);
                max[axis] = max[axis].max(i);
            }
        });

        found.then_some(Self { min, max })
    }

    /// 包围盒在每个轴上的长度.
    pub fn extent(&self) -> Vec<usize> {
        self.min
            .slice()
            .iter()
            .zip(self.max.slice())
            .map(|(lo, hi)| hi - lo + 1)
            .collect()
    }

    /// 将 `data` 裁剪到包围盒内. 不复制数据.
    pub fn crop<'a>(&self, data: &ArrayView<'a, bool, D>) -> ArrayView<'a, bool, D> {
        let mut view = data.clone();
        view.slice_each_axis_inplace(|ax| {
            let i = ax.axis.index();
            Slice::from(self.min[i]..=self.max[i])
        });
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Ix3};

    #[test]
    fn test_empty_union() {
        let a = Array3::from_elem((3, 4, 5), false);
        assert_eq!(BoundingBox::<Ix3>::of_union(&a.view(), &a.view()), None);
    }

    #[test]
    fn test_union_and_crop() {
        let mut a = Array3::from_elem((6, 6, 6), false);
        let mut b = Array3::from_elem((6, 6, 6), false);
        a[(1, 4, 2)] = true;
        b[(3, 2, 2)] = true;
        b[(2, 2, 5)] = true;

        let bbox = BoundingBox::of_union(&a.view(), &b.view()).unwrap();
        assert_eq!(bbox.extent(), vec![3, 3, 4]);

        let crop_a = bbox.crop(&a.view());
        let crop_b = bbox.crop(&b.view());
        assert_eq!(crop_a.shape(), &[3, 3, 4]);
        assert!(crop_a[(0, 2, 0)]);
        assert!(crop_b[(2, 0, 0)]);
        assert!(crop_b[(1, 0, 3)]);
        assert_eq!(crop_a.iter().filter(|p| **p).count(), 1);
        assert_eq!(crop_b.iter().filter(|p| **p).count(), 2);
    }
}
