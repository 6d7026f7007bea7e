//! 裁剪附件

use super::MeshVertices;
use crate::skeleton::{Skeleton, Slot};

/// 裁剪附件：不参与绘制，定义裁剪多边形
#[derive(Clone, Debug)]
pub struct ClippingAttachment {
    pub name: String,
    pub vertices: MeshVertices,
    /// 处理完该插槽后结束裁剪；None 表示持续到本次遍历结束
    pub end_slot: Option<usize>,
}

impl ClippingAttachment {
    pub fn new(name: impl Into<String>, vertices: MeshVertices) -> Self {
        Self {
            name: name.into(),
            vertices,
            end_slot: None,
        }
    }

    pub fn with_end_slot(mut self, slot_index: usize) -> Self {
        self.end_slot = Some(slot_index);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.vertex_count()
    }

    /// 计算多边形世界坐标，out 被重置为 (x, y) 交错数组
    pub fn compute_world_vertices(&self, skeleton: &Skeleton, slot: &Slot, out: &mut Vec<f32>) {
        out.clear();
        out.resize(self.vertices.world_vertices_length(), 0.0);
        self.vertices.compute_world_vertices(skeleton, slot, out, 0, 2);
    }
}
