//! # 三角化
//!
//! 1. 单条带：折线上每段沿水平面内的法向左右各扩展半个线宽，得到四边形并拆成两个三角形
//! 2. 车道面：左右两条折线按弧长重采样到相同点数后逐段连成三角带
//!
//! 输出的三角形面积都大于 `MIN_TRIANGLE_AREA`，重复点和竖直段不会产生退化三角形

use itertools::Itertools;
use nalgebra as na;

use crate::data::output::{Color, Pose, TriangleListPrimitive};
use crate::geometry::to_vector3;

/// 水平距离小于它的相邻点视为重复点
const POINT_EPSILON: f64 = 1e-6;
const MIN_TRIANGLE_AREA: f64 = 1e-9;
/// 虚线实段的最短长度，更短的设置按它处理
const MIN_DASH_LENGTH: f64 = 0.1;
/// 箭头长度、半宽与线宽之比
const ARROW_LENGTH_RATIO: f64 = 4f64;
const ARROW_HALF_WIDTH_RATIO: f64 = 1.5;
const MIN_ARROW_LENGTH: f64 = 0.5;
const HIGHLIGHT_BLEND: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RibbonPoint {
    pub position: na::Vector3<f64>,
    pub width: f64,
}
impl RibbonPoint {
    pub fn new(position: na::Vector3<f64>, width: f64) -> Self {
        Self { position, width }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RibbonOptions {
    pub dashed: bool,
    /// 虚线实段长度，不大于 0 时按实线处理
    pub dash_length: f64,
    pub arrows: bool,
    pub invert_arrows: bool,
    pub highlighted: bool,
}

struct Mesh {
    points: Vec<na::Vector3<f64>>,
}
impl Mesh {
    fn new() -> Self {
        Self { points: Vec::new() }
    }

    fn push_triangle(&mut self, a: na::Vector3<f64>, b: na::Vector3<f64>, c: na::Vector3<f64>) {
        if (b - a).cross(&(c - a)).norm() * 0.5 > MIN_TRIANGLE_AREA {
            self.points.extend([a, b, c]);
        }
    }

    fn into_primitive(self, color: Color) -> TriangleListPrimitive {
        TriangleListPrimitive {
            pose: Pose::default(),
            points: self.points.iter().map(to_vector3).collect(),
            color,
            indices: Vec::new(),
        }
    }
}

fn horizontal_distance(a: &na::Vector3<f64>, b: &na::Vector3<f64>) -> f64 {
    (b.xy() - a.xy()).norm()
}

/// 水平面内垂直于 a->b、指向左侧的单位向量
fn left_normal(a: &na::Vector3<f64>, b: &na::Vector3<f64>) -> na::Vector3<f64> {
    let dir = (b.xy() - a.xy()).normalize();
    na::Vector3::new(-dir.y, dir.x, 0f64)
}

fn highlight(color: Color, highlighted: bool) -> Color {
    if !highlighted {
        return color;
    }
    let lift = |x: f64| x + (1f64 - x) * HIGHLIGHT_BLEND;
    Color::rgba(lift(color.r), lift(color.g), lift(color.b), 1f64)
}

/// 去掉水平方向上与前一点重合的点，保留先出现的那个
fn dedup_ribbon(points: &[RibbonPoint]) -> Vec<RibbonPoint> {
    let mut rst: Vec<RibbonPoint> = Vec::with_capacity(points.len());
    for each_point in points {
        match rst.last() {
            Some(last) if horizontal_distance(&last.position, &each_point.position) < POINT_EPSILON => {}
            _ => rst.push(*each_point),
        }
    }
    rst
}

/// 折线 [s0, s1] 段上的实线部分，返回 (起点参数, 终点参数)，参数为段内比例
fn dash_pieces(s0: f64, s1: f64, options: &RibbonOptions) -> Vec<(f64, f64)> {
    let seg_len = s1 - s0;
    if !options.dashed || options.dash_length <= 0f64 {
        return vec![(0f64, 1f64)];
    }
    let dash_length = options.dash_length.max(MIN_DASH_LENGTH);
    let period = 2f64 * dash_length;
    let first = (s0 / period).floor() as i64;
    let last = (s1 / period).floor() as i64;
    (first..=last)
        .filter_map(|k| {
            let on_start = (k as f64 * period).max(s0);
            let on_end = (k as f64 * period + dash_length).min(s1);
            if on_end - on_start > POINT_EPSILON {
                Some(((on_start - s0) / seg_len, (on_end - s0) / seg_len))
            } else {
                None
            }
        })
        .collect()
}

/// 单条带三角化
pub fn ribbon(points: &[RibbonPoint], color: Color, options: &RibbonOptions) -> TriangleListPrimitive {
    let points = dedup_ribbon(points);
    let mut mesh = Mesh::new();

    let mut arc_start = 0f64;
    for (a, b) in points.iter().tuple_windows() {
        let seg_len = horizontal_distance(&a.position, &b.position);
        let normal = left_normal(&a.position, &b.position);
        for (t0, t1) in dash_pieces(arc_start, arc_start + seg_len, options) {
            let p0 = a.position.lerp(&b.position, t0);
            let p1 = a.position.lerp(&b.position, t1);
            let half0 = (a.width + (b.width - a.width) * t0).max(0f64) * 0.5;
            let half1 = (a.width + (b.width - a.width) * t1).max(0f64) * 0.5;
            let (p0_left, p0_right) = (p0 + normal * half0, p0 - normal * half0);
            let (p1_left, p1_right) = (p1 + normal * half1, p1 - normal * half1);
            mesh.push_triangle(p0_left, p0_right, p1_left);
            mesh.push_triangle(p1_left, p0_right, p1_right);
        }
        arc_start += seg_len;
    }

    if options.arrows && points.len() >= 2 {
        let (tail, head) = if options.invert_arrows {
            (&points[1], &points[0])
        } else {
            (&points[points.len() - 2], &points[points.len() - 1])
        };
        push_arrow_head(&mut mesh, tail, head);
    }

    mesh.into_primitive(highlight(color, options.highlighted))
}

/// 在 head 点处画一个指向 tail->head 方向的三角形箭头
fn push_arrow_head(mesh: &mut Mesh, tail: &RibbonPoint, head: &RibbonPoint) {
    let dir = (head.position.xy() - tail.position.xy()).normalize();
    let forward = na::Vector3::new(dir.x, dir.y, 0f64);
    let normal = left_normal(&tail.position, &head.position);
    let width = head.width.max(0f64);
    let length = (width * ARROW_LENGTH_RATIO).max(MIN_ARROW_LENGTH);
    let half_width = (width * ARROW_HALF_WIDTH_RATIO).max(MIN_ARROW_LENGTH * 0.5);
    mesh.push_triangle(
        head.position + normal * half_width,
        head.position - normal * half_width,
        head.position + forward * length,
    );
}

/// 去掉与前一点三维重合的点
fn dedup_line(points: &[na::Vector3<f64>]) -> Vec<na::Vector3<f64>> {
    let mut rst: Vec<na::Vector3<f64>> = Vec::with_capacity(points.len());
    for each_point in points {
        match rst.last() {
            Some(last) if (each_point - last).norm() < POINT_EPSILON => {}
            _ => rst.push(*each_point),
        }
    }
    rst
}

/// 按弧长把折线均匀重采样成 `count` 个点，首尾点保持不变
pub fn resample(points: &[na::Vector3<f64>], count: usize) -> Vec<na::Vector3<f64>> {
    if points.len() < 2 || count < 2 {
        return points.iter().take(count).copied().collect();
    }
    let cumulative: Vec<f64> = std::iter::once(0f64)
        .chain(points.iter().tuple_windows().scan(0f64, |acc, (a, b)| {
            *acc += (b - a).norm();
            Some(*acc)
        }))
        .collect();
    let total = cumulative[cumulative.len() - 1];

    let mut seg = 0;
    (0..count)
        .map(|i| {
            let target = total * i as f64 / (count - 1) as f64;
            while seg + 2 < cumulative.len() && cumulative[seg + 1] < target {
                seg += 1;
            }
            let seg_len = cumulative[seg + 1] - cumulative[seg];
            let t = if seg_len > 0f64 { ((target - cumulative[seg]) / seg_len).clamp(0f64, 1f64) } else { 0f64 };
            points[seg].lerp(&points[seg + 1], t)
        })
        .collect()
}

/// 车道面三角化
///
/// 左右两侧点数可以不同：两侧都按弧长重采样到 max(左, 右) 个点再一一对应。
/// 如果右侧反向时首尾配对距离更短，先把右侧反过来
pub fn lane_surface(
    left: &[na::Vector3<f64>],
    right: &[na::Vector3<f64>],
    color: Color,
) -> TriangleListPrimitive {
    let left = dedup_line(left);
    let mut right = dedup_line(right);
    let mut mesh = Mesh::new();
    if left.len() < 2 || right.len() < 2 {
        return mesh.into_primitive(color);
    }

    let (l_first, l_last) = (left[0], left[left.len() - 1]);
    let (r_first, r_last) = (right[0], right[right.len() - 1]);
    if (l_first - r_first).norm() + (l_last - r_last).norm() > (l_first - r_last).norm() + (l_last - r_first).norm() {
        right.reverse();
    }

    let count = left.len().max(right.len());
    let (left, right) = (resample(&left, count), resample(&right, count));
    for ((l0, l1), (r0, r1)) in left.iter().tuple_windows().zip(right.iter().tuple_windows()) {
        mesh.push_triangle(*l0, *r0, *l1);
        mesh.push_triangle(*l1, *r0, *r1);
    }
    mesh.into_primitive(color)
}
