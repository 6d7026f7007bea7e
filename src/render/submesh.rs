//! 子网格定义与划分

use crate::skeleton::BlendMode;
use crate::texture::TextureId;

use super::material::MaterialKey;

/// 子网格：索引缓冲中的一段连续区间
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub begin_index: u32,
    pub index_count: u32,
    /// 区间内第一个批次的纹理
    pub texture: TextureId,
    /// 区间内第一个批次的混合模式
    pub blend_mode: BlendMode,
}

impl SubMesh {
    pub fn new(begin_index: u32, index_count: u32, texture: TextureId, blend_mode: BlendMode) -> Self {
        Self { begin_index, index_count, texture, blend_mode }
    }

    pub fn end_index(&self) -> u32 {
        self.begin_index + self.index_count
    }

    pub fn material_key(&self) -> MaterialKey {
        MaterialKey::new(self.texture, self.blend_mode)
    }
}

/// 子网格划分器
///
/// 单独渲染的插槽各自成为一个子网格，其余批次合并为连续区间。
/// 输出顺序：全部单独子网格（按遇到顺序），然后全部合并区间（按关闭顺序）。
#[derive(Default)]
pub struct SubMeshPartitioner {
    separated: Vec<SubMesh>,
    merged: Vec<SubMesh>,
    run_start: u32,
    run_count: u32,
    run_binding: Option<(TextureId, BlendMode)>,
}

impl SubMeshPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.separated.clear();
        self.merged.clear();
        self.run_start = 0;
        self.run_count = 0;
        self.run_binding = None;
    }

    /// 记录一个刚追加的批次（索引区间 [begin_index, begin_index + index_count)）
    pub fn push(&mut self, begin_index: u32, index_count: u32, separate: bool, texture: TextureId, blend_mode: BlendMode) {
        if separate {
            self.close_run();
            self.separated.push(SubMesh::new(begin_index, index_count, texture, blend_mode));
            self.run_start = begin_index + index_count;
        } else {
            if self.run_count == 0 {
                self.run_binding = Some((texture, blend_mode));
            }
            self.run_count += index_count;
        }
    }

    /// 关闭未结束的合并区间，按输出顺序写入 out
    pub fn finish(&mut self, out: &mut Vec<SubMesh>) {
        self.close_run();
        out.clear();
        out.append(&mut self.separated);
        out.append(&mut self.merged);
    }

    fn close_run(&mut self) {
        if self.run_count > 0 {
            if let Some((texture, blend_mode)) = self.run_binding.take() {
                self.merged.push(SubMesh::new(self.run_start, self.run_count, texture, blend_mode));
            }
            self.run_count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: TextureId = TextureId(0);

    #[test]
    fn test_no_separation_yields_single_range() {
        let mut partitioner = SubMeshPartitioner::new();
        partitioner.push(0, 6, false, T, BlendMode::Normal);
        partitioner.push(6, 12, false, TextureId(1), BlendMode::Additive);
        let mut out = Vec::new();
        partitioner.finish(&mut out);
        assert_eq!(out, vec![SubMesh::new(0, 18, T, BlendMode::Normal)]);
    }

    #[test]
    fn test_separated_ranges_come_first() {
        // A, B(单独), C, D(单独), E
        let mut partitioner = SubMeshPartitioner::new();
        partitioner.push(0, 6, false, T, BlendMode::Normal);
        partitioner.push(6, 6, true, T, BlendMode::Normal);
        partitioner.push(12, 3, false, T, BlendMode::Normal);
        partitioner.push(15, 6, true, T, BlendMode::Normal);
        partitioner.push(21, 9, false, T, BlendMode::Normal);
        let mut out = Vec::new();
        partitioner.finish(&mut out);

        let ranges: Vec<(u32, u32)> = out.iter().map(|s| (s.begin_index, s.index_count)).collect();
        assert_eq!(ranges, vec![(6, 6), (15, 6), (0, 6), (12, 3), (21, 9)]);
    }

    #[test]
    fn test_leading_separated_slot_starts_run_after_it() {
        let mut partitioner = SubMeshPartitioner::new();
        partitioner.push(0, 6, true, T, BlendMode::Normal);
        partitioner.push(6, 6, false, T, BlendMode::Normal);
        let mut out = Vec::new();
        partitioner.finish(&mut out);
        assert_eq!(out[1].begin_index, 6);
        assert_eq!(out[1].end_index(), 12);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut partitioner = SubMeshPartitioner::new();
        partitioner.push(0, 6, false, T, BlendMode::Normal);
        partitioner.reset();
        let mut out = vec![SubMesh::new(0, 1, T, BlendMode::Normal)];
        partitioner.finish(&mut out);
        assert!(out.is_empty());
    }
}
