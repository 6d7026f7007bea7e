//! 附件：区域四边形、网格与裁剪多边形
//!
//! 附件种类固定，用封闭枚举表示，网格生成通过模式匹配分派。

mod clipping;
mod mesh;
mod region;

pub use clipping::ClippingAttachment;
pub use mesh::MeshAttachment;
pub use region::RegionAttachment;

use glam::{Vec2, Vec4};

use crate::skeleton::{Skeleton, Slot};
use crate::texture::TextureId;

/// 插槽上的附件
#[derive(Clone, Debug)]
pub enum Attachment {
    Region(RegionAttachment),
    Mesh(MeshAttachment),
    Clipping(ClippingAttachment),
}

impl Attachment {
    pub fn name(&self) -> &str {
        match self {
            Attachment::Region(a) => &a.name,
            Attachment::Mesh(a) => &a.name,
            Attachment::Clipping(a) => &a.name,
        }
    }

    /// 可绘制附件的纹理；裁剪附件或未绑定区域时为 None
    pub fn texture(&self) -> Option<TextureId> {
        match self {
            Attachment::Region(a) => a.texture(),
            Attachment::Mesh(a) => a.texture(),
            Attachment::Clipping(_) => None,
        }
    }
}

impl From<RegionAttachment> for Attachment {
    fn from(value: RegionAttachment) -> Self {
        Attachment::Region(value)
    }
}

impl From<MeshAttachment> for Attachment {
    fn from(value: MeshAttachment) -> Self {
        Attachment::Mesh(value)
    }
}

impl From<ClippingAttachment> for Attachment {
    fn from(value: ClippingAttachment) -> Self {
        Attachment::Clipping(value)
    }
}

/// 顶点上的单个骨骼权重
#[derive(Clone, Debug)]
pub struct BoneWeight {
    pub bone: usize,
    /// 该骨骼空间下的顶点位置
    pub position: Vec2,
    pub weight: f32,
}

impl BoneWeight {
    pub fn new(bone: usize, position: Vec2, weight: f32) -> Self {
        Self { bone, position, weight }
    }
}

/// 附件顶点（局部空间）
#[derive(Clone, Debug)]
pub enum MeshVertices {
    /// 绑定到插槽骨骼的顶点
    Unweighted(Vec<Vec2>),
    /// 每个顶点由多根骨骼加权
    Weighted(Vec<Vec<BoneWeight>>),
}

impl MeshVertices {
    pub fn vertex_count(&self) -> usize {
        match self {
            MeshVertices::Unweighted(v) => v.len(),
            MeshVertices::Weighted(v) => v.len(),
        }
    }

    /// 世界顶点数组长度（x, y 交错）
    pub fn world_vertices_length(&self) -> usize {
        self.vertex_count() * 2
    }

    /// 计算世界坐标，按 stride 写入 out[offset..]
    ///
    /// 插槽 deform 数据完整时才生效：未加权顶点直接替换为 deform 中的局部坐标
    /// （每顶点 2 个浮点），加权顶点把 deform 作为偏移叠加（每个权重项 2 个浮点）。
    /// out 必须容纳 vertex_count 个步长。
    pub fn compute_world_vertices(
        &self,
        skeleton: &Skeleton,
        slot: &Slot,
        out: &mut [f32],
        offset: usize,
        stride: usize,
    ) {
        let deform = slot.deform.as_slice();
        match self {
            MeshVertices::Unweighted(vertices) => {
                let Some(bone) = skeleton.bone(slot.bone_index) else {
                    return;
                };
                let use_deform = deform.len() >= vertices.len() * 2;
                for (i, local) in vertices.iter().enumerate() {
                    let local = if use_deform {
                        Vec2::new(deform[i * 2], deform[i * 2 + 1])
                    } else {
                        *local
                    };
                    let world = bone.local_to_world(local);
                    let w = offset + i * stride;
                    out[w] = world.x;
                    out[w + 1] = world.y;
                }
            }
            MeshVertices::Weighted(vertices) => {
                let weight_count: usize = vertices.iter().map(Vec::len).sum();
                let use_deform = deform.len() >= weight_count * 2;
                let mut f = 0;
                for (i, weights) in vertices.iter().enumerate() {
                    let mut world = Vec2::ZERO;
                    for weight in weights {
                        let mut local = weight.position;
                        if use_deform {
                            local += Vec2::new(deform[f], deform[f + 1]);
                        }
                        f += 2;
                        if let Some(bone) = skeleton.bone(weight.bone) {
                            world += bone.local_to_world(local) * weight.weight;
                        }
                    }
                    let w = offset + i * stride;
                    out[w] = world.x;
                    out[w + 1] = world.y;
                }
            }
        }
    }
}

/// 附件固有色默认值
pub(crate) const WHITE: Vec4 = Vec4::ONE;
