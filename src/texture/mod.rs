//! 纹理句柄与图集区域
//!
//! 纹理的加载与上传由宿主负责，网格生成只需要一个可比较的句柄：
//! 判断批次是否可渲染，以及给子网格标记绑定的纹理。

use std::collections::HashSet;

use crate::attachment::Attachment;
use crate::skeleton::Skeleton;

/// 纹理句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// 图集区域（页纹理 + UV 矩形）
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRegion {
    pub texture: TextureId,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
    /// 区域在图集中旋转了 90 度
    pub rotated: bool,
}

impl TextureRegion {
    pub fn new(texture: TextureId, u: f32, v: f32, u2: f32, v2: f32) -> Self {
        Self { texture, u, v, u2, v2, rotated: false }
    }

    /// 覆盖整张纹理的区域
    pub fn full(texture: TextureId) -> Self {
        Self::new(texture, 0.0, 0.0, 1.0, 1.0)
    }

    pub fn with_rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    pub fn width(&self) -> f32 {
        self.u2 - self.u
    }

    pub fn height(&self) -> f32 {
        self.v2 - self.v
    }
}

/// 收集骨架当前附件引用的所有纹理（按绘制顺序首次出现排序，去重）
pub fn collect_textures(skeleton: &Skeleton) -> Vec<TextureId> {
    let mut seen = HashSet::new();
    let mut textures = Vec::new();
    for &slot_index in skeleton.draw_order() {
        let texture = skeleton
            .slot(slot_index)
            .and_then(|slot| slot.attachment())
            .and_then(Attachment::texture);
        if let Some(texture) = texture {
            if seen.insert(texture) {
                textures.push(texture);
            }
        }
    }
    textures
}
