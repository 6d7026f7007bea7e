//! 骨架实例：骨架数据 + 网格生成器
//!
//! 每帧调用 update：更新世界变换 → 必要时扩容 → 生成网格。

use crate::render::{MaterialCache, MaterialKey, MeshGenerator, RenderSetting};
use crate::skeleton::Skeleton;
use crate::texture::{collect_textures, TextureId};
use crate::Result;

/// 一个可渲染的骨架实例
pub struct SpineInstance {
    skeleton: Option<Skeleton>,
    generator: MeshGenerator,
    /// 每次 update 传给生成器的配置
    pub setting: RenderSetting,
}

impl SpineInstance {
    pub fn new() -> Self {
        let generator = MeshGenerator::new();
        let setting = *generator.setting();
        Self {
            skeleton: None,
            generator,
            setting,
        }
    }

    pub fn with_skeleton(skeleton: Skeleton) -> Result<Self> {
        let mut instance = Self::new();
        instance.set_skeleton(skeleton)?;
        Ok(instance)
    }

    /// 绑定骨架数据，按其附件上界分配缓冲
    pub fn set_skeleton(&mut self, mut skeleton: Skeleton) -> Result<()> {
        skeleton.update_world_transform();
        let required = self.generator.initialize(&skeleton)?;
        log::info!(
            "骨架绑定: {} 骨骼, {} 插槽, 缓冲 {} 顶点",
            skeleton.bone_count(),
            skeleton.slot_count(),
            required
        );
        self.skeleton = Some(skeleton);
        Ok(())
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.skeleton.as_mut()
    }

    pub fn generator(&self) -> &MeshGenerator {
        &self.generator
    }

    /// 标记插槽单独渲染，插槽不存在时返回 false
    pub fn add_separate_slot(&mut self, slot_name: &str) -> bool {
        let exists = self
            .skeleton
            .as_ref()
            .is_some_and(|s| s.find_slot_by_name(slot_name).is_some());
        if !exists {
            log::warn!("插槽不存在: {}", slot_name);
            return false;
        }
        self.generator.set_separate_slot(slot_name);
        true
    }

    pub fn remove_separate_slot(&mut self, slot_name: &str) -> bool {
        self.generator.remove_separate_slot(slot_name)
    }

    pub fn clear_separate_slots(&mut self) {
        self.generator.clear_separate_slots();
    }

    /// 更新世界变换并重新生成网格
    pub fn update(&mut self) -> Result<()> {
        let Some(skeleton) = self.skeleton.as_mut() else {
            log::debug!("未绑定骨架，跳过网格生成");
            return Ok(());
        };
        skeleton.update_world_transform();
        self.generator.ensure_capacity(skeleton)?;
        self.generator.generate(skeleton, Some(&self.setting))
    }

    /// 当前附件引用的纹理（按绘制顺序去重）
    pub fn textures(&self) -> Vec<TextureId> {
        self.skeleton.as_ref().map(collect_textures).unwrap_or_default()
    }

    /// 按子网格顺序取材质，缓存未命中时调用 create
    pub fn sub_mesh_materials<M: Clone>(
        &self,
        cache: &mut MaterialCache<M>,
        mut create: impl FnMut(MaterialKey) -> M,
    ) -> Vec<M> {
        self.generator
            .sub_meshes()
            .iter()
            .map(|sub_mesh| cache.get_or_insert_with(sub_mesh.material_key(), &mut create).clone())
            .collect()
    }
}

impl Default for SpineInstance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::RegionAttachment;
    use crate::skeleton::{BlendMode, Bone, Slot};
    use crate::texture::TextureRegion;
    use glam::Vec2;

    fn quad(texture: u32) -> RegionAttachment {
        RegionAttachment::new("quad", 1.0, 1.0).with_region(TextureRegion::full(TextureId(texture)))
    }

    fn skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_bone(Bone::new("root"));
        skeleton.add_slot(Slot::new("body", root).with_attachment(quad(1)));
        skeleton.add_slot(
            Slot::new("glow", root)
                .with_attachment(quad(2))
                .with_blend_mode(BlendMode::Additive),
        );
        skeleton
    }

    #[test]
    fn test_update_without_skeleton_is_noop() {
        let mut instance = SpineInstance::new();
        instance.update().unwrap();
        assert_eq!(instance.generator().vertex_count(), 0);
        assert!(instance.textures().is_empty());
    }

    #[test]
    fn test_update_generates_mesh() {
        let mut instance = SpineInstance::with_skeleton(skeleton()).unwrap();
        instance.update().unwrap();
        assert_eq!(instance.generator().vertex_count(), 8);
        // 未单独渲染的批次合并为一个区间，绑定第一个批次的材质
        let sub_meshes = instance.generator().sub_meshes();
        assert_eq!(sub_meshes.len(), 1);
        assert_eq!(sub_meshes[0].index_count, 12);
        assert_eq!(sub_meshes[0].material_key(), MaterialKey::new(TextureId(1), BlendMode::Normal));
        assert_eq!(instance.textures(), vec![TextureId(1), TextureId(2)]);
    }

    #[test]
    fn test_update_grows_buffers_for_new_attachments() {
        let mut instance = SpineInstance::with_skeleton(skeleton()).unwrap();
        let initial = instance.generator().capacity();
        {
            let skeleton = instance.skeleton_mut().unwrap();
            let root = skeleton.find_bone_by_name("root").unwrap();
            skeleton.add_slot(Slot::new("extra", root).with_attachment(quad(1)));
        }
        instance.update().unwrap();
        assert!(instance.generator().capacity() > initial);
        assert_eq!(instance.generator().vertex_count(), 12);
    }

    #[test]
    fn test_add_separate_slot_requires_existing_slot() {
        let mut instance = SpineInstance::with_skeleton(skeleton()).unwrap();
        assert!(!instance.add_separate_slot("missing"));
        assert!(instance.add_separate_slot("body"));
        assert!(instance.generator().is_separate_slot("body"));
    }

    #[test]
    fn test_materials_are_cached_per_key() {
        let mut instance = SpineInstance::with_skeleton(skeleton()).unwrap();
        assert!(instance.add_separate_slot("glow"));
        instance.update().unwrap();
        assert_eq!(instance.generator().sub_meshes().len(), 2);

        let mut cache = MaterialCache::new();
        let mut created = 0;
        let materials = instance.sub_mesh_materials(&mut cache, |key| {
            created += 1;
            (key.texture, key.blend_mode)
        });
        // 单独渲染的插槽在前
        assert_eq!(materials, vec![(TextureId(2), BlendMode::Additive), (TextureId(1), BlendMode::Normal)]);

        instance.sub_mesh_materials(&mut cache, |_| unreachable!());
        assert_eq!(created, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_moved_bone_moves_vertices() {
        let mut instance = SpineInstance::with_skeleton(skeleton()).unwrap();
        instance.skeleton_mut().unwrap().bone_mut(0).unwrap().local.translation = Vec2::new(10.0, 0.0);
        instance.update().unwrap();
        assert!((instance.generator().vertex_data()[0] - 9.5).abs() < 0.001);
    }
}
