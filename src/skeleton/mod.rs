//! 骨架数据：骨骼、插槽与绘制顺序
//!
//! 动画求值与约束求解在外部完成，这里只保留网格生成需要读取的部分：
//! 骨骼世界变换、骨骼激活状态、插槽颜色与当前附件。

mod bone;
mod manager;
mod slot;

pub use bone::Bone;
pub use manager::Skeleton;
pub use slot::{BlendMode, Slot};

use glam::{Affine2, Vec2};

/// 骨骼局部变换
#[derive(Clone, Debug)]
pub struct BoneTransform {
    pub translation: Vec2,
    /// 旋转角度（度）
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl BoneTransform {
    pub fn new(translation: Vec2, rotation: f32, scale: Vec2) -> Self {
        Self { translation, rotation, scale }
    }

    pub fn from_translation(translation: Vec2) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), self.translation)
    }
}
