//! 网格生成器：绘制顺序遍历与网格组装
//!
//! 一个生成器实例只服务一个骨架实例。工作缓冲归生成器独占，
//! 对外只暴露本次遍历已填充部分的只读视图。

use glam::{Vec2, Vec3, Vec4};
use std::collections::HashSet;

use super::capacity::{compute_clipped_vertex_count, compute_max_vertex_count, BatchRange, MeshBuffers};
use super::clipping::SkeletonClipper;
use super::color;
use super::config::{get_config, RenderSetting};
use super::submesh::{SubMesh, SubMeshPartitioner};
use super::{Bounds, MAX_VERTEX_COUNT, QUAD_TRIANGLES, VERTEX_SIZE, VERTEX_STRIDE};
use crate::attachment::{Attachment, MeshAttachment, RegionAttachment};
use crate::skeleton::{Bone, Skeleton, Slot};
use crate::texture::TextureId;
use crate::{Result, SpineError};

/// 光栅化后的附件批次，世界坐标已写入暂存区
struct Batch<'a> {
    vertex_count: usize,
    triangles: &'a [u16],
    uvs: &'a [Vec2],
    color: Vec4,
    texture: TextureId,
}

/// 网格生成器
pub struct MeshGenerator {
    setting: RenderSetting,
    buffers: MeshBuffers,
    clipper: SkeletonClipper,
    partitioner: SubMeshPartitioner,
    separate_slots: HashSet<String>,
    sub_meshes: Vec<SubMesh>,
    bounds: Option<Bounds>,
}

impl MeshGenerator {
    /// 使用全局默认配置创建
    pub fn new() -> Self {
        Self::with_setting(get_config())
    }

    pub fn with_setting(setting: RenderSetting) -> Self {
        Self {
            setting,
            buffers: MeshBuffers::new(),
            clipper: SkeletonClipper::new(),
            partitioner: SubMeshPartitioner::new(),
            separate_slots: HashSet::new(),
            sub_meshes: Vec::new(),
            bounds: None,
        }
    }

    pub fn setting(&self) -> &RenderSetting {
        &self.setting
    }

    pub fn set_setting(&mut self, setting: RenderSetting) {
        self.setting = setting;
    }

    // ========== 缓冲容量 ==========

    /// 绑定骨架数据时调用，按骨架上界分配缓冲，返回所需顶点数
    pub fn initialize(&mut self, skeleton: &Skeleton) -> Result<usize> {
        self.ensure_capacity(skeleton)
    }

    /// 当前附件需要更多空间时扩容（只增不减）
    ///
    /// 分配量取裁剪感知的上界，超过 16 位索引范围的部分截断；
    /// 基础上界本身超出范围时返回 IndexOverflow。
    pub fn ensure_capacity(&mut self, skeleton: &Skeleton) -> Result<usize> {
        let required = compute_clipped_vertex_count(skeleton)
            .min(MAX_VERTEX_COUNT)
            .max(compute_max_vertex_count(skeleton));
        self.buffers.reserve(required)?;
        Ok(required)
    }

    pub fn capacity(&self) -> usize {
        self.buffers.capacity()
    }

    // ========== 单独渲染插槽 ==========

    /// 标记插槽单独成为子网格（幂等），只应在两次生成之间调用
    pub fn set_separate_slot(&mut self, slot_name: impl Into<String>) {
        self.separate_slots.insert(slot_name.into());
    }

    pub fn remove_separate_slot(&mut self, slot_name: &str) -> bool {
        self.separate_slots.remove(slot_name)
    }

    pub fn clear_separate_slots(&mut self) {
        self.separate_slots.clear();
    }

    pub fn is_separate_slot(&self, slot_name: &str) -> bool {
        self.separate_slots.contains(slot_name)
    }

    // ========== 生成 ==========

    /// 遍历绘制顺序，生成顶点、索引与子网格
    ///
    /// setting 为 Some 时替换已保存的配置，None 时沿用上一次的配置。
    /// 缓冲容量小于骨架所需上界时立即返回错误。
    pub fn generate(&mut self, skeleton: &Skeleton, setting: Option<&RenderSetting>) -> Result<()> {
        if let Some(setting) = setting {
            self.setting = *setting;
        }
        let required = compute_max_vertex_count(skeleton);
        if required > self.buffers.capacity() {
            return Err(SpineError::BufferNotSized {
                required,
                capacity: self.buffers.capacity(),
            });
        }
        let RenderSetting { use_clipping, z_spacing } = self.setting;

        self.clipper.clip_end();
        self.buffers.reset_cursors();
        self.partitioner.reset();
        self.bounds = None;

        for (draw_index, &slot_index) in skeleton.draw_order().iter().enumerate() {
            let Some(slot) = skeleton.slot(slot_index) else {
                continue;
            };
            let Some(bone) = skeleton.bone(slot.bone_index).filter(|b| b.active) else {
                self.clipper.clip_end_with_slot(slot_index);
                continue;
            };

            let batch = match slot.attachment() {
                Some(Attachment::Region(region)) => self.rasterize_region(bone, region),
                Some(Attachment::Mesh(mesh)) => self.rasterize_mesh(skeleton, slot, mesh),
                Some(Attachment::Clipping(clip)) => {
                    if use_clipping {
                        self.clipper.clip_start(skeleton, slot, clip);
                        continue;
                    }
                    None
                }
                None => None,
            };

            if let Some(batch) = batch {
                let tint = color::composite(skeleton.color, slot.color, batch.color);
                let z = z_spacing * draw_index as f32;
                self.assemble(slot, batch, tint, z);
            }

            self.clipper.clip_end_with_slot(slot_index);
        }

        self.clipper.clip_end();
        self.partitioner.finish(&mut self.sub_meshes);

        log::debug!(
            "网格生成完成: {} 顶点, {} 索引, {} 子网格",
            self.buffers.vertex_count(),
            self.buffers.index_count(),
            self.sub_meshes.len()
        );
        Ok(())
    }

    fn rasterize_region<'a>(&mut self, bone: &Bone, region: &'a RegionAttachment) -> Option<Batch<'a>> {
        let texture = region.texture()?;
        let Some(scratch) = self.buffers.scratch_mut(RegionAttachment::VERTEX_COUNT) else {
            log::warn!("区域附件 {} 超出暂存区容量，已跳过", region.name);
            return None;
        };
        region.compute_world_vertices(bone, scratch, 0, VERTEX_SIZE);
        Some(Batch {
            vertex_count: RegionAttachment::VERTEX_COUNT,
            triangles: &QUAD_TRIANGLES,
            uvs: region.uvs(),
            color: region.color,
            texture,
        })
    }

    fn rasterize_mesh<'a>(&mut self, skeleton: &Skeleton, slot: &Slot, mesh: &'a MeshAttachment) -> Option<Batch<'a>> {
        let texture = mesh.texture()?;
        let vertex_count = mesh.vertex_count();
        let Some(scratch) = self.buffers.scratch_mut(vertex_count) else {
            log::warn!("网格附件 {} 超出暂存区容量，已跳过", mesh.name);
            return None;
        };
        mesh.compute_world_vertices(skeleton, slot, scratch, 0, VERTEX_SIZE);
        Some(Batch {
            vertex_count,
            triangles: &mesh.triangles,
            uvs: mesh.uvs(),
            color: mesh.color,
            texture,
        })
    }

    fn assemble(&mut self, slot: &Slot, batch: Batch<'_>, tint: Vec4, z: f32) {
        let Some(scratch) = self.buffers.scratch_mut(batch.vertex_count) else {
            return;
        };
        color::apply_tint(scratch, tint, batch.uvs);

        let range = if self.clipper.is_clipping() {
            self.clipper
                .clip_triangles(self.buffers.scratch(batch.vertex_count), batch.triangles, tint);
            self.buffers
                .append(self.clipper.clipped_vertices(), self.clipper.clipped_triangles(), z)
        } else {
            self.buffers.append_scratch(batch.vertex_count, batch.triangles, z)
        };
        let Some(range) = range else {
            return;
        };

        self.extend_bounds(&range);
        let separate = self.separate_slots.contains(&slot.name);
        self.partitioner.push(
            range.first_index as u32,
            range.index_count as u32,
            separate,
            batch.texture,
            slot.blend_mode,
        );
    }

    fn extend_bounds(&mut self, range: &BatchRange) {
        let start = range.first_vertex * VERTEX_STRIDE;
        let end = start + range.vertex_count * VERTEX_STRIDE;
        for v in self.buffers.vertices()[start..end].chunks_exact(VERTEX_STRIDE) {
            let point = Vec3::new(v[0], v[1], v[2]);
            self.bounds.get_or_insert(Bounds::from_point(point)).extend(point);
        }
    }

    // ========== 输出 ==========

    /// 顶点数据（x, y, z, r, g, b, a, u, v）
    pub fn vertex_data(&self) -> &[f32] {
        self.buffers.vertices()
    }

    pub fn index_data(&self) -> &[u16] {
        self.buffers.indices()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.buffers.vertices())
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.buffers.indices())
    }

    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    pub fn index_count(&self) -> usize {
        self.buffers.index_count()
    }

    /// 子网格列表：单独渲染的插槽在前，合并区间在后
    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    /// 本次生成的包围盒，没有输出顶点时为 None
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn clipper(&self) -> &SkeletonClipper {
        &self.clipper
    }
}

impl Default for MeshGenerator {
    fn default() -> Self {
        Self::new()
    }
}
