//! 网格附件

use glam::{Vec2, Vec4};

use super::{MeshVertices, WHITE};
use crate::skeleton::{Skeleton, Slot};
use crate::texture::{TextureId, TextureRegion};

/// 网格附件：任意三角化多边形
#[derive(Clone, Debug)]
pub struct MeshAttachment {
    pub name: String,
    pub vertices: MeshVertices,
    /// 区域内的归一化 UV（0..1），与顶点一一对应
    pub region_uvs: Vec<Vec2>,
    pub triangles: Vec<u16>,
    pub color: Vec4,
    pub region: Option<TextureRegion>,
    uvs: Vec<Vec2>,
}

impl MeshAttachment {
    pub fn new(name: impl Into<String>, vertices: MeshVertices, region_uvs: Vec<Vec2>, triangles: Vec<u16>) -> Self {
        let uvs = region_uvs.clone();
        Self {
            name: name.into(),
            vertices,
            region_uvs,
            triangles,
            color: WHITE,
            region: None,
            uvs,
        }
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

    /// 把区域内 UV 映射到图集 UV
    pub fn update_uvs(&mut self) {
        let Some(region) = &self.region else {
            self.uvs = self.region_uvs.clone();
            return;
        };
        let (width, height) = (region.width(), region.height());
        self.uvs = self
            .region_uvs
            .iter()
            .map(|uv| {
                if region.rotated {
                    Vec2::new(region.u + uv.y * width, region.v + height - uv.x * height)
                } else {
                    Vec2::new(region.u + uv.x * width, region.v + uv.y * height)
                }
            })
            .collect();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.vertex_count()
    }

    pub fn world_vertices_length(&self) -> usize {
        self.vertices.world_vertices_length()
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.region.as_ref().map(|r| r.texture)
    }

    pub fn compute_world_vertices(&self, skeleton: &Skeleton, slot: &Slot, out: &mut [f32], offset: usize, stride: usize) {
        self.vertices.compute_world_vertices(skeleton, slot, out, offset, stride);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_uvs_map_into_atlas() {
        let mesh = MeshAttachment::new(
            "mesh",
            MeshVertices::Unweighted(vec![Vec2::ZERO, Vec2::X, Vec2::Y]),
            vec![Vec2::ZERO, Vec2::X, Vec2::ONE],
            vec![0, 1, 2],
        )
        .with_region(TextureRegion::new(TextureId(1), 0.5, 0.0, 1.0, 0.5));

        assert_eq!(mesh.uvs()[0], Vec2::new(0.5, 0.0));
        assert_eq!(mesh.uvs()[1], Vec2::new(1.0, 0.0));
        assert_eq!(mesh.uvs()[2], Vec2::new(1.0, 0.5));
        assert_eq!(mesh.world_vertices_length(), 6);
    }

    #[test]
    fn test_without_region_uses_raw_uvs() {
        let mesh = MeshAttachment::new(
            "mesh",
            MeshVertices::Unweighted(vec![Vec2::ZERO]),
            vec![Vec2::new(0.3, 0.7)],
            vec![],
        );
        assert_eq!(mesh.uvs(), &[Vec2::new(0.3, 0.7)]);
        assert!(mesh.texture().is_none());
    }
}
