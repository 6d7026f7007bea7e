//! 网格生成管线
//!
//! 附件光栅化 → 颜色合成 → 裁剪（如有活动裁剪区域）→ 网格组装 → 子网格划分。
//! 缓冲容量在骨架数据变化时计算一次，而不是每帧。

mod capacity;
mod clipping;
mod color;
pub mod config;
mod generator;
mod material;
mod submesh;
mod triangulator;

pub use capacity::{compute_clipped_vertex_count, compute_max_vertex_count, BatchRange, MeshBuffers};
pub use clipping::{ClipState, SkeletonClipper};
pub use color::{apply_tint, composite};
pub use config::{get_config, reset_config, set_config, RenderSetting};
pub use generator::MeshGenerator;
pub use material::{MaterialCache, MaterialKey};
pub use submesh::{SubMesh, SubMeshPartitioner};
pub use triangulator::{decompose, triangulate};

use glam::Vec3;

/// 区域附件固定三角形
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];
/// 组装前的顶点浮点数：位置(2) + 颜色(4) + UV(2)
pub const VERTEX_SIZE: usize = 2 + 4 + 2;
/// 输出顶点浮点数：位置(3) + 颜色(4) + UV(2)
pub const VERTEX_STRIDE: usize = 9;
/// u16 索引可寻址的最大顶点数
pub const MAX_VERTEX_COUNT: usize = u16::MAX as usize + 1;

/// 轴对齐包围盒
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
