//! Bowyer-Watson Delaunay triangulation used to tessellate landmark meshes.

use std::collections::BTreeSet;

/// Triangulates `points` and returns the unique undirected edges as
/// `(lower_index, higher_index)` pairs, sorted.
///
/// Duplicate points are skipped. Fewer than three distinct points yield no
/// edges.
pub fn triangulate_edges(points: &[(f32, f32)]) -> Vec<(usize, usize)> {
    let mut edges = BTreeSet::new();
    for [a, b, c] in triangulate(points) {
        edges.insert((a.min(b), a.max(b)));
        edges.insert((b.min(c), b.max(c)));
        edges.insert((a.min(c), a.max(c)));
    }
    edges.into_iter().collect()
}

/// Triangles as index triples into `points`.
pub fn triangulate(points: &[(f32, f32)]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut verts: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    let n = verts.len();

    let (min_x, min_y, max_x, max_y) = verts.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(ax, ay, bx, by), &(x, y)| (ax.min(x), ay.min(y), bx.max(x), by.max(y)),
    );
    let span = (max_x - min_x).max(max_y - min_y).max(1.0) * 20.0;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    // Super triangle enclosing every input point
    verts.push((mid_x - span, mid_y - span));
    verts.push((mid_x, mid_y + span));
    verts.push((mid_x + span, mid_y - span));
    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for i in 0..n {
        let p = verts[i];
        if verts[..i].iter().any(|&q| q == p) {
            continue;
        }

        let (bad, kept): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|t| in_circumcircle(&verts, t, p));

        // Cavity boundary: edges of bad triangles not shared with another bad one
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for t in &bad {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let shared = bad.iter().any(|o| o != t && has_edge(o, a, b));
                if !shared {
                    boundary.push((a, b));
                }
            }
        }

        triangles = kept;
        triangles.extend(boundary.into_iter().map(|(a, b)| [a, b, i]));
    }

    triangles.retain(|t| t.iter().all(|&v| v < n));
    triangles
}

fn has_edge(t: &[usize; 3], a: usize, b: usize) -> bool {
    t.contains(&a) && t.contains(&b)
}

/// Whether `p` lies strictly inside the circumcircle of triangle `t`.
fn in_circumcircle(verts: &[(f64, f64)], t: &[usize; 3], p: (f64, f64)) -> bool {
    let (ax, ay) = verts[t[0]];
    let (bx, by) = verts[t[1]];
    let (cx, cy) = verts[t[2]];

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < f64::EPSILON {
        return false;
    }

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
    let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;

    let r2 = (ax - ux).powi(2) + (ay - uy).powi(2);
    let dist2 = (p.0 - ux).powi(2) + (p.1 - uy).powi(2);
    dist2 < r2 * (1.0 - 1e-12)
}
