//! 材质缓存
//!
//! 由调用方持有并传入，按（纹理, 混合模式）查找；插入与淘汰都是显式的。

use std::collections::HashMap;

use crate::skeleton::BlendMode;
use crate::texture::TextureId;

/// 材质键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub texture: TextureId,
    pub blend_mode: BlendMode,
}

impl MaterialKey {
    pub fn new(texture: TextureId, blend_mode: BlendMode) -> Self {
        Self { texture, blend_mode }
    }
}

/// 材质缓存，M 为宿主引擎的材质类型
pub struct MaterialCache<M> {
    entries: HashMap<MaterialKey, M>,
}

impl<M> MaterialCache<M> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get(&self, key: &MaterialKey) -> Option<&M> {
        self.entries.get(key)
    }

    /// 查找材质，不存在时用 create 创建并缓存
    pub fn get_or_insert_with(&mut self, key: MaterialKey, create: impl FnOnce(MaterialKey) -> M) -> &M {
        self.entries.entry(key).or_insert_with(|| create(key))
    }

    pub fn insert(&mut self, key: MaterialKey, material: M) -> Option<M> {
        self.entries.insert(key, material)
    }

    pub fn remove(&mut self, key: &MaterialKey) -> Option<M> {
        self.entries.remove(key)
    }

    /// 淘汰引用指定纹理的全部材质，返回淘汰数量
    pub fn evict_texture(&mut self, texture: TextureId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.texture != texture);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> Default for MaterialCache<M> {
    fn default() -> Self {
        Self::new()
    }
}
