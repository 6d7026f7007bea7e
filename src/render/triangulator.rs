//! 裁剪多边形分解：耳切三角化 + 贪心合并为凸多边形

use glam::Vec2;

/// 多边形有向面积（逆时针为正）
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        area += points[i].perp_dot(points[(i + 1) % n]);
    }
    area * 0.5
}

/// 耳切三角化，返回逆时针三角形的顶点索引
///
/// 顺时针输入会先反转。找不到耳朵（退化多边形）时强制切掉第一个顶点，保证终止。
pub fn triangulate(points: &[Vec2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    if signed_area(points) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);
    while remaining.len() > 3 {
        let m = remaining.len();
        let mut ear = 0;
        for i in 0..m {
            let (prev, cur, next) = (remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]);
            let (a, b, c) = (points[prev], points[cur], points[next]);
            if (b - a).perp_dot(c - b) <= 0.0 {
                continue;
            }
            let blocked = remaining
                .iter()
                .any(|&k| k != prev && k != cur && k != next && point_in_triangle(points[k], a, b, c));
            if !blocked {
                ear = i;
                break;
            }
        }
        triangles.push([remaining[(ear + m - 1) % m], remaining[ear], remaining[(ear + 1) % m]]);
        remaining.remove(ear);
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

/// 把多边形分解为若干逆时针凸多边形
pub fn decompose(points: &[Vec2]) -> Vec<Vec<Vec2>> {
    let triangles = triangulate(points);
    let mut used = vec![false; triangles.len()];
    let mut polygons = Vec::new();

    for start in 0..triangles.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut polygon = triangles[start].to_vec();

        let mut merged = true;
        while merged {
            merged = false;
            for (t, triangle) in triangles.iter().enumerate() {
                if used[t] {
                    continue;
                }
                let Some(candidate) = merge_triangle(&polygon, triangle) else {
                    continue;
                };
                if is_convex(points, &candidate) {
                    polygon = candidate;
                    used[t] = true;
                    merged = true;
                }
            }
        }
        polygons.push(polygon.iter().map(|&i| points[i]).collect());
    }
    polygons
}

/// 三角形与多边形共享一条反向边时，把第三个顶点插入该边
fn merge_triangle(polygon: &[usize], triangle: &[usize; 3]) -> Option<Vec<usize>> {
    let n = polygon.len();
    for i in 0..n {
        let (p, q) = (polygon[i], polygon[(i + 1) % n]);
        for e in 0..3 {
            if triangle[e] != q || triangle[(e + 1) % 3] != p {
                continue;
            }
            let r = triangle[(e + 2) % 3];
            if polygon.contains(&r) {
                return None;
            }
            let mut merged = Vec::with_capacity(n + 1);
            merged.extend_from_slice(&polygon[..=i]);
            merged.push(r);
            merged.extend_from_slice(&polygon[i + 1..]);
            return Some(merged);
        }
    }
    None
}

fn is_convex(points: &[Vec2], polygon: &[usize]) -> bool {
    let n = polygon.len();
    (0..n).all(|i| {
        let a = points[polygon[i]];
        let b = points[polygon[(i + 1) % n]];
        let c = points[polygon[(i + 2) % n]];
        (b - a).perp_dot(c - b) >= -1e-6
    })
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    (b - a).perp_dot(p - a) >= 0.0 && (c - b).perp_dot(p - b) >= 0.0 && (a - c).perp_dot(p - c) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_square_decomposes_into_one_piece() {
        let pieces = decompose(&square());
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 4);
        assert!(signed_area(&pieces[0]) > 0.0);
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let mut points = square();
        points.reverse();
        let pieces = decompose(&points);
        assert_eq!(pieces.len(), 1);
        assert!((signed_area(&pieces[0]) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_concave_polygon_splits_and_preserves_area() {
        // L 形
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(5.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        let triangles = triangulate(&points);
        assert_eq!(triangles.len(), 4);

        let pieces = decompose(&points);
        assert!(pieces.len() >= 2);
        let total: f32 = pieces.iter().map(|p| signed_area(p)).sum();
        assert!((total - 75.0).abs() < 1e-3);
        for piece in &pieces {
            let n = piece.len();
            for i in 0..n {
                let turn = (piece[(i + 1) % n] - piece[i]).perp_dot(piece[(i + 2) % n] - piece[(i + 1) % n]);
                assert!(turn >= -1e-6);
            }
        }
    }

    #[test]
    fn test_degenerate_input() {
        assert!(triangulate(&[Vec2::ZERO, Vec2::ONE]).is_empty());
        assert!(decompose(&[]).is_empty());
    }
}
