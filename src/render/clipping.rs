//! 裁剪区域跟踪
//!
//! 同一次遍历最多一个活动裁剪多边形。多边形先分解为凸块，
//! 每个三角形对每个凸块做 Sutherland–Hodgman 裁剪。

use glam::{Vec2, Vec4};

use super::triangulator;
use super::VERTEX_SIZE;
use crate::attachment::ClippingAttachment;
use crate::skeleton::{Skeleton, Slot};

/// 裁剪状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipState {
    Idle,
    Clipping {
        /// 处理完该插槽后回到 Idle
        end_slot: Option<usize>,
    },
}

/// 骨架裁剪器
pub struct SkeletonClipper {
    state: ClipState,
    polygon: Vec<f32>,
    pieces: Vec<Vec<Vec2>>,
    clipped_vertices: Vec<f32>,
    clipped_triangles: Vec<u16>,
    // Sutherland–Hodgman 往返缓冲
    clip_output: Vec<Vec2>,
    clip_scratch: Vec<Vec2>,
}

impl SkeletonClipper {
    pub fn new() -> Self {
        Self {
            state: ClipState::Idle,
            polygon: Vec::new(),
            pieces: Vec::new(),
            clipped_vertices: Vec::new(),
            clipped_triangles: Vec::new(),
            clip_output: Vec::new(),
            clip_scratch: Vec::new(),
        }
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    pub fn is_clipping(&self) -> bool {
        matches!(self.state, ClipState::Clipping { .. })
    }

    /// 当前裁剪区域的凸块
    pub fn convex_pieces(&self) -> &[Vec<Vec2>] {
        &self.pieces
    }

    /// 进入裁剪状态，返回凸块数量；已在裁剪中或多边形退化时返回 0
    pub fn clip_start(&mut self, skeleton: &Skeleton, slot: &Slot, clip: &ClippingAttachment) -> usize {
        if self.is_clipping() {
            return 0;
        }
        if clip.vertex_count() < 3 {
            return 0;
        }

        clip.compute_world_vertices(skeleton, slot, &mut self.polygon);
        let points: Vec<Vec2> = self
            .polygon
            .chunks_exact(2)
            .map(|p| Vec2::new(p[0], p[1]))
            .collect();
        self.pieces = triangulator::decompose(&points);
        if self.pieces.is_empty() {
            return 0;
        }

        self.state = ClipState::Clipping { end_slot: clip.end_slot };
        log::debug!("裁剪开始: {} (插槽 {}, {} 个凸块)", clip.name, slot.name, self.pieces.len());
        self.pieces.len()
    }

    /// 若 slot_index 是当前裁剪的结束插槽则结束裁剪
    pub fn clip_end_with_slot(&mut self, slot_index: usize) {
        if let ClipState::Clipping { end_slot: Some(end) } = self.state {
            if end == slot_index {
                self.clip_end();
            }
        }
    }

    /// 无条件回到 Idle
    pub fn clip_end(&mut self) {
        if self.is_clipping() {
            log::debug!("裁剪结束");
        }
        self.state = ClipState::Idle;
        self.pieces.clear();
        self.clipped_vertices.clear();
        self.clipped_triangles.clear();
    }

    pub fn clipped_vertices(&self) -> &[f32] {
        &self.clipped_vertices
    }

    pub fn clipped_triangles(&self) -> &[u16] {
        &self.clipped_triangles
    }

    /// 用活动裁剪区域裁剪一批三角形
    ///
    /// vertices 为交错布局（位置 2 + 颜色 4 + UV 2），颜色与 UV 已写入。
    /// 结果写入 clipped_vertices / clipped_triangles；完全在区域外时两者为空。
    pub fn clip_triangles(&mut self, vertices: &[f32], triangles: &[u16], tint: Vec4) {
        self.clipped_vertices.clear();
        self.clipped_triangles.clear();
        if !self.is_clipping() {
            return;
        }

        let vertex_count = vertices.len() / VERTEX_SIZE;
        let position = |i: usize| Vec2::new(vertices[i * VERTEX_SIZE], vertices[i * VERTEX_SIZE + 1]);
        let uv = |i: usize| Vec2::new(vertices[i * VERTEX_SIZE + 6], vertices[i * VERTEX_SIZE + 7]);

        // 整批落在同一个凸块内：原样通过
        let whole_batch_inside = self
            .pieces
            .iter()
            .any(|piece| (0..vertex_count).all(|i| contains(piece, position(i))));
        if whole_batch_inside {
            self.clipped_vertices.extend_from_slice(&vertices[..vertex_count * VERTEX_SIZE]);
            self.clipped_triangles.extend_from_slice(triangles);
            return;
        }

        for triangle in triangles.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }
            let (p0, p1, p2) = (position(i0), position(i1), position(i2));
            let (uv0, uv1, uv2) = (uv(i0), uv(i1), uv(i2));

            let denom = (p1 - p2).perp_dot(p0 - p2);
            if denom.abs() <= f32::EPSILON {
                continue;
            }

            for p in 0..self.pieces.len() {
                let piece = &self.pieces[p];
                if contains(piece, p0) && contains(piece, p1) && contains(piece, p2) {
                    // 三角形完全在凸块内，凸块内部互不重叠，无需再测试其它凸块
                    let base = self.clipped_vertices.len() / VERTEX_SIZE;
                    for (point, uv) in [(p0, uv0), (p1, uv1), (p2, uv2)] {
                        push_vertex(&mut self.clipped_vertices, point, tint, uv);
                    }
                    self.clipped_triangles
                        .extend_from_slice(&[base as u16, base as u16 + 1, base as u16 + 2]);
                    break;
                }

                clip_polygon(&[p0, p1, p2], piece, &mut self.clip_output, &mut self.clip_scratch);
                if self.clip_output.len() < 3 {
                    continue;
                }

                let base = self.clipped_vertices.len() / VERTEX_SIZE;
                for &point in &self.clip_output {
                    // 重心坐标插值 UV
                    let a = (p1 - p2).perp_dot(point - p2) / denom;
                    let b = (p2 - p0).perp_dot(point - p0) / denom;
                    let c = 1.0 - a - b;
                    let uv = uv0 * a + uv1 * b + uv2 * c;
                    push_vertex(&mut self.clipped_vertices, point, tint, uv);
                }
                for k in 1..self.clip_output.len() - 1 {
                    self.clipped_triangles.extend_from_slice(&[
                        base as u16,
                        (base + k) as u16,
                        (base + k + 1) as u16,
                    ]);
                }
            }
        }
    }
}

impl Default for SkeletonClipper {
    fn default() -> Self {
        Self::new()
    }
}

fn push_vertex(out: &mut Vec<f32>, position: Vec2, tint: Vec4, uv: Vec2) {
    out.extend_from_slice(&[position.x, position.y, tint.x, tint.y, tint.z, tint.w, uv.x, uv.y]);
}

/// 点是否在逆时针凸多边形内（含边界）
fn contains(piece: &[Vec2], point: Vec2) -> bool {
    let n = piece.len();
    (0..n).all(|i| {
        let a = piece[i];
        let b = piece[(i + 1) % n];
        (b - a).perp_dot(point - a) >= 0.0
    })
}

/// Sutherland–Hodgman：subject 依次被凸多边形 clip 的每条边裁剪，结果写入 output
fn clip_polygon(subject: &[Vec2], clip: &[Vec2], output: &mut Vec<Vec2>, scratch: &mut Vec<Vec2>) {
    output.clear();
    output.extend_from_slice(subject);

    let n = clip.len();
    for i in 0..n {
        let a = clip[i];
        let b = clip[(i + 1) % n];
        let edge = b - a;
        if edge.length_squared() <= f32::EPSILON {
            continue;
        }

        std::mem::swap(output, scratch);
        output.clear();
        let m = scratch.len();
        if m == 0 {
            break;
        }
        for j in 0..m {
            let current = scratch[j];
            let previous = scratch[(j + m - 1) % m];
            let current_inside = edge.perp_dot(current - a) >= 0.0;
            let previous_inside = edge.perp_dot(previous - a) >= 0.0;
            if current_inside != previous_inside {
                let d = current - previous;
                let t = edge.perp_dot(a - previous) / edge.perp_dot(d);
                output.push(previous + d * t);
            }
            if current_inside {
                output.push(current);
            }
        }
    }

    // 去掉相邻重复点，避免扇形三角化产生零面积三角形
    output.dedup_by(|a, b| a.distance_squared(*b) <= 1e-12);
    while output.len() > 1 && output[0].distance_squared(output[output.len() - 1]) <= 1e-12 {
        output.pop();
    }
}
