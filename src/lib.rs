//! Spine Engine - Rust 实现的 2D 骨骼网格生成引擎
//!
//! 把带姿态的骨架转换为可直接提交给 GPU 的网格：
//! - 骨骼世界变换与激活状态
//! - 区域 / 网格 / 裁剪附件
//! - 多边形裁剪（凹多边形分解为凸块）
//! - 顶点组装与按材质划分子网格
//! - 缓冲容量预估

pub mod attachment;
pub mod instance;
pub mod render;
pub mod skeleton;
pub mod texture;

pub use attachment::{Attachment, BoneWeight, ClippingAttachment, MeshAttachment, MeshVertices, RegionAttachment};
pub use instance::SpineInstance;
pub use render::{MaterialCache, MaterialKey, MeshGenerator, RenderSetting, SubMesh};
pub use skeleton::{BlendMode, Bone, BoneTransform, Skeleton, Slot};
pub use texture::{TextureId, TextureRegion};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpineError {
    #[error("Mesh buffers not sized: required {required} vertices, capacity {capacity}")]
    BufferNotSized { required: usize, capacity: usize },

    #[error("Vertex count {vertex_count} exceeds 16-bit index range")]
    IndexOverflow { vertex_count: usize },

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Invalid draw order: {0}")]
    InvalidDrawOrder(String),
}

pub type Result<T> = std::result::Result<T, SpineError>;
