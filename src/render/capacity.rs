//! 缓冲区容量管理
//!
//! 工作缓冲在绑定骨架时按上界一次性分配，只增不减；遍历过程中容量固定。

use crate::attachment::Attachment;
use crate::skeleton::Skeleton;
use crate::{Result, SpineError};

use super::{MAX_VERTEX_COUNT, QUAD_TRIANGLES, VERTEX_SIZE, VERTEX_STRIDE};

/// 估算骨架当前附件所需的最大顶点数
///
/// 区域附件计 6 个索引，网格附件计三角形索引数（顶点数更多时取顶点数），
/// 总和乘 3 作为裁剪细分的余量。该上界是经验值，不是严格证明的界。
pub fn compute_max_vertex_count(skeleton: &Skeleton) -> usize {
    let mut count = 0;
    for &slot_index in skeleton.draw_order() {
        let Some(slot) = skeleton.slot(slot_index) else {
            continue;
        };
        if !skeleton.is_bone_active(slot.bone_index) {
            continue;
        }
        count += slot.attachment().map_or(0, batch_size);
    }
    count * 3
}

/// 按裁剪算法推导的顶点上界，用于分配缓冲
///
/// 裁剪中的三角形要与每个凸块分别裁剪。n 个顶点的多边形最多分出 n - 2 个凸块，
/// 凸块边数之和不超过 3(n - 2)；三角形对 k 边凸块裁剪最多得到 k + 3 个顶点、
/// 3(k + 1) 个索引。于是每个三角形最多产生 12(n - 2) 个索引、6(n - 2) 个顶点，
/// 裁剪中的批次按 4(n - 2) 倍计。未裁剪的批次与 compute_max_vertex_count 相同。
pub fn compute_clipped_vertex_count(skeleton: &Skeleton) -> usize {
    let mut count = 0;
    // (结束插槽, 裁剪多边形顶点数)
    let mut clip: Option<(Option<usize>, usize)> = None;
    for &slot_index in skeleton.draw_order() {
        let Some(slot) = skeleton.slot(slot_index) else {
            continue;
        };
        if skeleton.is_bone_active(slot.bone_index) {
            match (slot.attachment(), clip) {
                (Some(Attachment::Clipping(attachment)), None) => {
                    if attachment.vertex_count() >= 3 {
                        clip = Some((attachment.end_slot, attachment.vertex_count()));
                    }
                    continue;
                }
                (Some(attachment), Some((_, polygon))) => {
                    count += batch_size(attachment) * 4 * polygon.saturating_sub(2).max(1);
                }
                (Some(attachment), None) => count += batch_size(attachment) * 3,
                (None, _) => {}
            }
        }
        if matches!(clip, Some((Some(end), _)) if end == slot_index) {
            clip = None;
        }
    }
    count
}

fn batch_size(attachment: &Attachment) -> usize {
    match attachment {
        Attachment::Region(_) => QUAD_TRIANGLES.len(),
        Attachment::Mesh(mesh) => mesh.triangles.len().max(mesh.vertex_count()),
        Attachment::Clipping(_) => 0,
    }
}

/// 追加一个批次后的区间信息
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchRange {
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub first_index: usize,
    pub index_count: usize,
}

/// 网格工作缓冲
pub struct MeshBuffers {
    capacity: usize,
    /// 单个附件的原始顶点（步长 VERTEX_SIZE）
    scratch: Vec<f32>,
    /// 输出顶点（步长 VERTEX_STRIDE）
    vertices: Vec<f32>,
    indices: Vec<u16>,
    vertex_count: usize,
    index_count: usize,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self {
            capacity: 0,
            scratch: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// 可容纳的顶点数（索引数上限相同）
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 确保至少容纳 vertex_count 个顶点，返回是否重新分配
    pub fn reserve(&mut self, vertex_count: usize) -> Result<bool> {
        if vertex_count > MAX_VERTEX_COUNT {
            return Err(SpineError::IndexOverflow { vertex_count });
        }
        if vertex_count <= self.capacity {
            return Ok(false);
        }
        self.scratch.resize(vertex_count * VERTEX_SIZE, 0.0);
        self.vertices.resize(vertex_count * VERTEX_STRIDE, 0.0);
        self.indices.resize(vertex_count, 0);
        log::info!("网格缓冲扩容: {} -> {} 顶点", self.capacity, vertex_count);
        self.capacity = vertex_count;
        Ok(true)
    }

    /// 遍历开始时重置写游标
    pub fn reset_cursors(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// 已填充的顶点数据
    pub fn vertices(&self) -> &[f32] {
        &self.vertices[..self.vertex_count * VERTEX_STRIDE]
    }

    /// 已填充的索引数据
    pub fn indices(&self) -> &[u16] {
        &self.indices[..self.index_count]
    }

    /// 原始顶点暂存区的前 vertex_count 个顶点，容量不足时为 None
    pub fn scratch_mut(&mut self, vertex_count: usize) -> Option<&mut [f32]> {
        self.scratch.get_mut(..vertex_count * VERTEX_SIZE)
    }

    pub fn scratch(&self, vertex_count: usize) -> &[f32] {
        &self.scratch[..vertex_count * VERTEX_SIZE]
    }

    /// 追加暂存区中的批次（未裁剪路径）
    pub fn append_scratch(&mut self, vertex_count: usize, triangles: &[u16], z: f32) -> Option<BatchRange> {
        let Self { capacity, scratch, vertices, indices, vertex_count: vertex_cursor, index_count: index_cursor } = self;
        let source = scratch.get(..vertex_count * VERTEX_SIZE)?;
        write_batch(source, triangles, z, *capacity, vertices, indices, vertex_cursor, index_cursor)
    }

    /// 追加外部批次（裁剪器输出）
    pub fn append(&mut self, source: &[f32], triangles: &[u16], z: f32) -> Option<BatchRange> {
        write_batch(
            source,
            triangles,
            z,
            self.capacity,
            &mut self.vertices,
            &mut self.indices,
            &mut self.vertex_count,
            &mut self.index_count,
        )
    }
}

impl Default for MeshBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// 插入 z 坐标并追加顶点，索引按起始顶点重定位
///
/// 空批次或超出容量时不移动游标，返回 None。
#[allow(clippy::too_many_arguments)]
fn write_batch(
    source: &[f32],
    triangles: &[u16],
    z: f32,
    capacity: usize,
    vertices: &mut [f32],
    indices: &mut [u16],
    vertex_cursor: &mut usize,
    index_cursor: &mut usize,
) -> Option<BatchRange> {
    let vertex_count = source.len() / VERTEX_SIZE;
    if vertex_count == 0 || triangles.is_empty() {
        return None;
    }
    if *vertex_cursor + vertex_count > capacity || *index_cursor + triangles.len() > capacity {
        log::warn!(
            "批次超出缓冲容量，已丢弃: 顶点 {}+{}, 索引 {}+{}, 容量 {}",
            *vertex_cursor,
            vertex_count,
            *index_cursor,
            triangles.len(),
            capacity
        );
        return None;
    }

    let first_vertex = *vertex_cursor;
    let mut w = first_vertex * VERTEX_STRIDE;
    for vertex in source.chunks_exact(VERTEX_SIZE) {
        let out = &mut vertices[w..w + VERTEX_STRIDE];
        out[0] = vertex[0];
        out[1] = vertex[1];
        out[2] = z;
        out[3..].copy_from_slice(&vertex[2..]);
        w += VERTEX_STRIDE;
    }

    let first_index = *index_cursor;
    let base = first_vertex as u16;
    for (out, &index) in indices[first_index..first_index + triangles.len()].iter_mut().zip(triangles) {
        *out = index.wrapping_add(base);
    }

    *vertex_cursor += vertex_count;
    *index_cursor += triangles.len();
    Some(BatchRange {
        first_vertex,
        vertex_count,
        first_index,
        index_count: triangles.len(),
    })
}
