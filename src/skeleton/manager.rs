//! 骨架：骨骼、插槽与绘制顺序的所有者

use glam::{Affine2, Vec4};
use std::collections::HashMap;

use super::{Bone, Slot};
use crate::attachment::Attachment;
use crate::{Result, SpineError};

/// 骨架
pub struct Skeleton {
    bones: Vec<Bone>,
    slots: Vec<Slot>,
    draw_order: Vec<usize>,
    bone_names: HashMap<String, usize>,
    slot_names: HashMap<String, usize>,
    /// 骨架整体色调
    pub color: Vec4,
}

impl Skeleton {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            slots: Vec::new(),
            draw_order: Vec::new(),
            bone_names: HashMap::new(),
            slot_names: HashMap::new(),
            color: Vec4::ONE,
        }
    }

    /// 添加骨骼，父骨骼必须先于子骨骼添加
    pub fn add_bone(&mut self, mut bone: Bone) -> usize {
        let index = self.bones.len();
        if bone.parent_index >= index as i32 {
            log::warn!(
                "骨骼 {} 的父索引 {} 尚未添加，按根骨骼处理",
                bone.name,
                bone.parent_index
            );
            bone.parent_index = -1;
        }
        self.bone_names.insert(bone.name.clone(), index);
        self.bones.push(bone);
        index
    }

    /// 添加插槽，并追加到绘制顺序末尾
    pub fn add_slot(&mut self, slot: Slot) -> usize {
        let index = self.slots.len();
        self.slot_names.insert(slot.name.clone(), index);
        self.slots.push(slot);
        self.draw_order.push(index);
        index
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.bone_names.get(name).copied()
    }

    /// 通过名称查找插槽
    pub fn find_slot_by_name(&self, name: &str) -> Option<usize> {
        self.slot_names.get(name).copied()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// 绘制顺序（插槽索引序列）
    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    /// 设置绘制顺序，必须是全部插槽的一个排列
    pub fn set_draw_order(&mut self, order: Vec<usize>) -> Result<()> {
        if order.len() != self.slots.len() {
            return Err(SpineError::InvalidDrawOrder(format!(
                "expected {} slots, got {}",
                self.slots.len(),
                order.len()
            )));
        }
        let mut seen = vec![false; self.slots.len()];
        for &index in &order {
            match seen.get_mut(index) {
                Some(flag) if !*flag => *flag = true,
                Some(_) => {
                    return Err(SpineError::InvalidDrawOrder(format!("slot {} appears twice", index)))
                }
                None => {
                    return Err(SpineError::InvalidDrawOrder(format!("slot {} out of range", index)))
                }
            }
        }
        self.draw_order = order;
        Ok(())
    }

    /// 按插槽名称切换附件，同时清空该插槽的变形数据
    pub fn set_attachment(&mut self, slot_name: &str, attachment: Option<Attachment>) -> Result<()> {
        let index = self
            .find_slot_by_name(slot_name)
            .ok_or_else(|| SpineError::SlotNotFound(slot_name.to_string()))?;
        self.slots[index].set_attachment(attachment);
        Ok(())
    }

    /// 骨骼是否处于激活状态（越界视为未激活）
    pub fn is_bone_active(&self, index: usize) -> bool {
        self.bones.get(index).map(|b| b.active).unwrap_or(false)
    }

    /// 启用/禁用骨骼，下次 update_world_transform 时传播到子树
    pub fn set_bone_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.enabled = enabled;
        }
    }

    /// 按索引顺序更新世界变换与激活状态
    ///
    /// 父骨骼索引总是小于子骨骼；被改成指向自身或后方的父索引按根骨骼处理。
    pub fn update_world_transform(&mut self) {
        for index in 0..self.bones.len() {
            let (parent_world, parent_active) = match usize::try_from(self.bones[index].parent_index) {
                Ok(parent) if parent < index => (self.bones[parent].world, self.bones[parent].active),
                _ => (Affine2::IDENTITY, true),
            };
            let bone = &mut self.bones[index];
            bone.world = parent_world * bone.local.to_affine();
            bone.active = parent_active && bone.enabled;
        }
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BoneTransform;
    use glam::Vec2;

    fn two_bone_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_bone(
            Bone::new("root").with_transform(BoneTransform::from_translation(Vec2::new(10.0, 0.0))),
        );
        skeleton.add_bone(
            Bone::new("arm")
                .with_parent(root)
                .with_transform(BoneTransform::from_translation(Vec2::new(0.0, 5.0))),
        );
        skeleton
    }

    #[test]
    fn test_world_transform_composes_parent() {
        let mut skeleton = two_bone_skeleton();
        skeleton.update_world_transform();
        let arm = skeleton.bone(1).unwrap();
        let p = arm.local_to_world(Vec2::ZERO);
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_disabled_parent_deactivates_children() {
        let mut skeleton = two_bone_skeleton();
        skeleton.set_bone_enabled(0, false);
        skeleton.update_world_transform();
        assert!(!skeleton.is_bone_active(0));
        assert!(!skeleton.is_bone_active(1));

        skeleton.set_bone_enabled(0, true);
        skeleton.update_world_transform();
        assert!(skeleton.is_bone_active(1));
    }

    #[test]
    fn test_parent_cycle_does_not_hang() {
        let mut skeleton = two_bone_skeleton();
        // root -> arm -> root
        skeleton.bone_mut(0).unwrap().parent_index = 1;
        skeleton.update_world_transform();
        let root = skeleton.bone(0).unwrap().local_to_world(Vec2::ZERO);
        let arm = skeleton.bone(1).unwrap().local_to_world(Vec2::ZERO);
        assert!((root.x - 10.0).abs() < 1e-5);
        assert!((arm.x - 10.0).abs() < 1e-5);
        assert!((arm.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_parent_reference_becomes_root() {
        let mut skeleton = Skeleton::new();
        let index = skeleton.add_bone(Bone::new("orphan").with_parent(3));
        assert_eq!(skeleton.bone(index).unwrap().parent_index, -1);
    }

    #[test]
    fn test_set_draw_order_rejects_non_permutation() {
        let mut skeleton = two_bone_skeleton();
        skeleton.add_slot(Slot::new("a", 0));
        skeleton.add_slot(Slot::new("b", 1));
        assert!(skeleton.set_draw_order(vec![1, 1]).is_err());
        assert!(skeleton.set_draw_order(vec![0]).is_err());
        assert!(skeleton.set_draw_order(vec![0, 2]).is_err());
        skeleton.set_draw_order(vec![1, 0]).unwrap();
        assert_eq!(skeleton.draw_order(), &[1, 0]);
        assert_eq!(skeleton.find_slot_by_name("b"), Some(1));
    }

    #[test]
    fn test_set_attachment_by_name() {
        let mut skeleton = two_bone_skeleton();
        skeleton.add_slot(Slot::new("a", 0));
        skeleton.slot_mut(0).unwrap().deform = vec![1.0, 2.0];
        skeleton.set_attachment("a", None).unwrap();
        assert!(skeleton.slot(0).unwrap().deform.is_empty());
        assert!(matches!(
            skeleton.set_attachment("missing", None),
            Err(SpineError::SlotNotFound(name)) if name == "missing"
        ));
    }
}
