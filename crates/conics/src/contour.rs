//! Implicit-curve tracing for level sets sampled on a rectilinear grid.
//!
//! - `ContourSampler`: the collaborator `Conic::sequence` hands its scalar field to.
//! - `Trace`: vertices with `MoveTo`/`LineTo` path codes; a `MoveTo` starts a new
//!   sub-path.
//! - `MarchingSquares`: reference sampler. Crossings are linear interpolations
//!   on grid edges and are keyed by edge, so neighbouring cells share endpoints
//!   exactly and segments stitch into maximal polylines (closed loops repeat
//!   their first vertex).

use std::collections::HashMap;

use nalgebra::DMatrix;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCode {
    MoveTo,
    LineTo,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    pub vertices: Vec<(f64, f64)>,
    pub codes: Vec<PathCode>,
}

impl Trace {
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.vertices.push((x, y));
        self.codes.push(PathCode::MoveTo);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.push((x, y));
        self.codes.push(PathCode::LineTo);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Split at every `MoveTo`. A leading `LineTo` opens a sub-path as well.
    pub fn polylines(&self) -> Vec<Vec<(f64, f64)>> {
        let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
        for (&v, &code) in self.vertices.iter().zip(self.codes.iter()) {
            match (code, out.last_mut()) {
                (PathCode::LineTo, Some(current)) => current.push(v),
                _ => out.push(vec![v]),
            }
        }
        out
    }
}

/// Traces the `level` set of a field sampled at `values[(j, i)] = f(xs[i], ys[j])`.
pub trait ContourSampler {
    fn trace(&self, xs: &[f64], ys: &[f64], values: &DMatrix<f64>, level: f64) -> Trace;
}

/// Marching squares with center-value saddle resolution.
///
/// Cells with a non-finite corner are skipped. A corner counts as inside when
/// its value is strictly above `level`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarchingSquares;

/// Grid edge: `H(i, j)` joins `(i, j)`–`(i+1, j)`, `V(i, j)` joins `(i, j)`–`(i, j+1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

impl MarchingSquares {
    fn crossing(xs: &[f64], ys: &[f64], z: &DMatrix<f64>, level: f64, e: Edge) -> (f64, f64) {
        let lerp = |a: f64, b: f64, fa: f64, fb: f64| a + (level - fa) / (fb - fa) * (b - a);
        match e {
            Edge::H(i, j) => (lerp(xs[i], xs[i + 1], z[(j, i)], z[(j, i + 1)]), ys[j]),
            Edge::V(i, j) => (xs[i], lerp(ys[j], ys[j + 1], z[(j, i)], z[(j + 1, i)])),
        }
    }

    fn segments(z: &DMatrix<f64>, level: f64) -> Vec<(Edge, Edge)> {
        let (ny, nx) = z.shape();
        let mut segs = Vec::new();
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let corners = [z[(j, i)], z[(j, i + 1)], z[(j + 1, i + 1)], z[(j + 1, i)]];
                if corners.iter().any(|v| !v.is_finite()) {
                    continue;
                }
                let inside = corners.map(|v| v > level);
                // counter-clockwise: bottom, right, top, left
                let sides = [Edge::H(i, j), Edge::V(i + 1, j), Edge::H(i, j + 1), Edge::V(i, j)];
                let cut: Vec<Edge> = (0..4)
                    .filter(|&k| inside[k] != inside[(k + 1) % 4])
                    .map(|k| sides[k])
                    .collect();
                match cut.len() {
                    2 => segs.push((cut[0], cut[1])),
                    4 => {
                        let center = corners.iter().sum::<f64>() / 4.0;
                        if (center > level) == inside[0] {
                            // corners 0 and 2 connect through the center
                            segs.push((sides[0], sides[1]));
                            segs.push((sides[2], sides[3]));
                        } else {
                            segs.push((sides[3], sides[0]));
                            segs.push((sides[1], sides[2]));
                        }
                    }
                    _ => {}
                }
            }
        }
        segs
    }
}

impl ContourSampler for MarchingSquares {
    fn trace(&self, xs: &[f64], ys: &[f64], values: &DMatrix<f64>, level: f64) -> Trace {
        let mut trace = Trace::default();
        if xs.len() < 2 || ys.len() < 2 || values.shape() != (ys.len(), xs.len()) {
            return trace;
        }
        let segs = Self::segments(values, level);
        let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
        for (s, &(a, b)) in segs.iter().enumerate() {
            by_edge.entry(a).or_default().push(s);
            by_edge.entry(b).or_default().push(s);
        }

        // Open chains first (start on an edge used once), then closed loops.
        let mut used = vec![false; segs.len()];
        let open_starts = segs.iter().enumerate().flat_map(|(s, &(a, b))| [(s, a), (s, b)]);
        let starts: Vec<(usize, Edge)> = open_starts
            .filter(|(_, e)| by_edge[e].len() == 1)
            .chain(segs.iter().enumerate().map(|(s, &(a, _))| (s, a)))
            .collect();

        for (start, from) in starts {
            if used[start] {
                continue;
            }
            let mut chain = vec![from];
            let (mut seg, mut at) = (start, from);
            loop {
                used[seg] = true;
                let (a, b) = segs[seg];
                let next = if a == at { b } else { a };
                chain.push(next);
                match by_edge[&next].iter().find(|&&t| !used[t]) {
                    Some(&t) => {
                        seg = t;
                        at = next;
                    }
                    None => break,
                }
            }
            for (k, &e) in chain.iter().enumerate() {
                let (x, y) = Self::crossing(xs, ys, values, level, e);
                if k == 0 {
                    trace.move_to(x, y);
                } else {
                    trace.line_to(x, y);
                }
            }
        }
        trace
    }
}
