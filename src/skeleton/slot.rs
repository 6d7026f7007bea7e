//! 插槽定义

use glam::Vec4;

use crate::attachment::Attachment;

/// 插槽混合模式，决定渲染时使用的材质
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// 插槽：绘制顺序中的一个位置，持有当前可见附件与色调
#[derive(Clone, Debug)]
pub struct Slot {
    pub name: String,
    pub bone_index: usize,
    pub color: Vec4,
    pub blend_mode: BlendMode,
    pub attachment: Option<Attachment>,
    /// 动画写入的网格顶点偏移（局部空间），为空表示无变形
    pub deform: Vec<f32>,
}

impl Slot {
    pub fn new(name: impl Into<String>, bone_index: usize) -> Self {
        Self {
            name: name.into(),
            bone_index,
            color: Vec4::ONE,
            blend_mode: BlendMode::Normal,
            attachment: None,
            deform: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: impl Into<Attachment>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// 切换附件时清空变形数据（旧偏移与新附件顶点不对应）
    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.attachment = attachment;
        self.deform.clear();
    }
}
