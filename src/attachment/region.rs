//! 区域附件（四边形）

use glam::{Vec2, Vec4};

use super::WHITE;
use crate::skeleton::Bone;
use crate::texture::{TextureId, TextureRegion};

/// 区域附件：固定 4 个顶点、2 个三角形
#[derive(Clone, Debug)]
pub struct RegionAttachment {
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// 旋转角度（度）
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Vec4,
    pub region: Option<TextureRegion>,

    // 顺序：左下、左上、右上、右下
    offsets: [Vec2; 4],
    uvs: [Vec2; 4],
}

impl RegionAttachment {
    pub const VERTEX_COUNT: usize = 4;

    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        let mut attachment = Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width,
            height,
            color: WHITE,
            region: None,
            offsets: [Vec2::ZERO; 4],
            uvs: [Vec2::new(0.0, 1.0), Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ONE],
        };
        attachment.update_offsets();
        attachment
    }

    /// 设置附件在骨骼空间中的位置
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self.update_offsets();
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self.update_offsets();
        self
    }

    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.update_offsets();
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_region(mut self, region: TextureRegion) -> Self {
        self.region = Some(region);
        self.update_uvs();
        self
    }

    /// 根据位置、旋转、缩放与尺寸重新计算四个角的局部偏移
    pub fn update_offsets(&mut self) {
        let local_x = -self.width / 2.0 * self.scale_x;
        let local_y = -self.height / 2.0 * self.scale_y;
        let local_x2 = local_x + self.width * self.scale_x;
        let local_y2 = local_y + self.height * self.scale_y;

        let rotation = Vec2::from_angle(self.rotation.to_radians());
        let origin = Vec2::new(self.x, self.y);
        let corners = [
            Vec2::new(local_x, local_y),
            Vec2::new(local_x, local_y2),
            Vec2::new(local_x2, local_y2),
            Vec2::new(local_x2, local_y),
        ];
        for (offset, corner) in self.offsets.iter_mut().zip(corners) {
            *offset = origin + rotation.rotate(corner);
        }
    }

    /// 根据图集区域重新计算 UV
    pub fn update_uvs(&mut self) {
        let Some(region) = &self.region else {
            return;
        };
        let (u, v, u2, v2) = (region.u, region.v, region.u2, region.v2);
        self.uvs = if region.rotated {
            [Vec2::new(u2, v2), Vec2::new(u, v2), Vec2::new(u, v), Vec2::new(u2, v)]
        } else {
            [Vec2::new(u, v2), Vec2::new(u, v), Vec2::new(u2, v), Vec2::new(u2, v2)]
        };
    }

    pub fn offsets(&self) -> &[Vec2; 4] {
        &self.offsets
    }

    pub fn uvs(&self) -> &[Vec2; 4] {
        &self.uvs
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.region.as_ref().map(|r| r.texture)
    }

    /// 用骨骼世界变换计算四个角的世界坐标，按 stride 写入 out[offset..]
    pub fn compute_world_vertices(&self, bone: &Bone, out: &mut [f32], offset: usize, stride: usize) {
        for (i, local) in self.offsets.iter().enumerate() {
            let world = bone.local_to_world(*local);
            let w = offset + i * stride;
            out[w] = world.x;
            out[w + 1] = world.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BoneTransform;

    #[test]
    fn test_offsets_centered_on_position() {
        let region = RegionAttachment::new("quad", 4.0, 2.0).with_position(1.0, 1.0);
        let offsets = region.offsets();
        assert_eq!(offsets[0], Vec2::new(-1.0, 0.0));
        assert_eq!(offsets[1], Vec2::new(-1.0, 2.0));
        assert_eq!(offsets[2], Vec2::new(3.0, 2.0));
        assert_eq!(offsets[3], Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_rotated_region_uvs() {
        let region = RegionAttachment::new("quad", 1.0, 1.0)
            .with_region(TextureRegion::new(TextureId(0), 0.25, 0.5, 0.75, 1.0).with_rotated(true));
        let uvs = region.uvs();
        assert_eq!(uvs[0], Vec2::new(0.75, 1.0));
        assert_eq!(uvs[2], Vec2::new(0.25, 0.5));
    }

    #[test]
    fn test_world_vertices_follow_bone() {
        let region = RegionAttachment::new("quad", 2.0, 2.0);
        let mut bone = Bone::new("root");
        bone.world = BoneTransform::new(Vec2::new(5.0, 5.0), 0.0, Vec2::splat(2.0)).to_affine();
        let mut out = [0.0f32; 16];
        region.compute_world_vertices(&bone, &mut out, 0, 4);
        // 左下角 (-1, -1) * 2 + (5, 5)
        assert!((out[0] - 3.0).abs() < 1e-5);
        assert!((out[1] - 3.0).abs() < 1e-5);
        // 右上角 (1, 1) * 2 + (5, 5)
        assert!((out[8] - 7.0).abs() < 1e-5);
        assert!((out[9] - 7.0).abs() < 1e-5);
    }
}
