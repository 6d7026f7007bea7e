//! 颜色合成

use glam::{Vec2, Vec4};

use super::VERTEX_SIZE;

/// 骨架、插槽、附件三级色调逐分量相乘（直通 alpha）
pub fn composite(skeleton: Vec4, slot: Vec4, attachment: Vec4) -> Vec4 {
    skeleton * slot * attachment
}

/// 把色调与 UV 写入交错顶点
///
/// 顶点布局：位置(2) + 颜色(4) + UV(2)，颜色位于偏移 2，UV 位于偏移 6。
/// 缺失的 UV 写 0。
pub fn apply_tint(vertices: &mut [f32], tint: Vec4, uvs: &[Vec2]) {
    for (i, vertex) in vertices.chunks_exact_mut(VERTEX_SIZE).enumerate() {
        let uv = uvs.get(i).copied().unwrap_or(Vec2::ZERO);
        vertex[2] = tint.x;
        vertex[3] = tint.y;
        vertex[4] = tint.z;
        vertex[5] = tint.w;
        vertex[6] = uv.x;
        vertex[7] = uv.y;
    }
}
