//! 骨骼节点

use glam::{Affine2, Vec2};

use super::BoneTransform;

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent_index: i32,

    // 局部变换（姿态求解的输入）
    pub local: BoneTransform,
    // 世界变换（由 Skeleton::update_world_transform 或外部求解器写入）
    pub world: Affine2,

    /// 调用方开关，关闭后整条子树失活
    pub enabled: bool,
    /// 派生状态：自身及所有祖先均启用
    pub active: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_index: -1,
            local: BoneTransform::default(),
            world: Affine2::IDENTITY,
            enabled: true,
            active: true,
        }
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent_index = parent as i32;
        self
    }

    pub fn with_transform(mut self, local: BoneTransform) -> Self {
        self.local = local;
        self
    }

    /// 局部坐标变换到世界坐标
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.world.transform_point2(local)
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_to_world_applies_affine() {
        let mut bone = Bone::new("root");
        bone.world = BoneTransform::new(Vec2::new(10.0, 5.0), 90.0, Vec2::ONE).to_affine();
        let p = bone.local_to_world(Vec2::new(1.0, 0.0));
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.y - 6.0).abs() < 1e-5);
    }
}
