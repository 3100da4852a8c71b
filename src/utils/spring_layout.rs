use log::debug;
use rustc_hash::FxHashMap;
use crate::error::{CodepNetError, Result};
use crate::utils::coordinates::{Position, Positions};

pub const DEFAULT_ITERATIONS: usize = 50;
const MIN_DISTANCE: f64 = 0.01;
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Parameters of a Fruchterman-Reingold run.
#[derive(Debug, Clone, Copy)]
pub struct SpringParams {
    /// Optimal node distance, `1/sqrt(n)` when unset.
    pub k: Option<f64>,
    pub iterations: usize,
    /// Where the rescaled layout is centred.
    pub center: Position,
}

impl Default for SpringParams {
    fn default() -> Self {
        SpringParams {
            k: None,
            iterations: DEFAULT_ITERATIONS,
            center: (0.0, 0.0),
        }
    }
}

/// Force-directed layout seeded from `seeds`.
///
/// `edges` are weighted `(from, to, weight)` index pairs into `nodes`;
/// heavier edges pull their endpoints closer. The result is rescaled so the
/// largest coordinate magnitude is 1 and then shifted onto `params.center`.
pub fn spring_layout(
    nodes: &[String],
    edges: &[(usize, usize, f64)],
    seeds: &Positions,
    params: SpringParams,
) -> Result<Positions> {
    let node_count = nodes.len();

    let mut pos: Vec<[f64; 2]> = nodes
        .iter()
        .map(|node| {
            seeds
                .get(node)
                .map(|&(x, y)| [x, y])
                .ok_or_else(|| CodepNetError::MissingPosition(node.clone()))
        })
        .collect::<Result<_>>()?;

    if node_count == 0 {
        return Ok(Positions::default());
    }
    if node_count == 1 {
        let mut single = Positions::default();
        single.insert(nodes[0].clone(), params.center);
        return Ok(single);
    }

    let mut adjacency: FxHashMap<(usize, usize), f64> = FxHashMap::default();
    for &(from, to, weight) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        adjacency.insert((from, to), weight);
        adjacency.insert((to, from), weight);
    }

    let k = params.k.unwrap_or_else(|| (1.0 / node_count as f64).sqrt());
    let extent = |axis: usize| {
        let (min, max) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
            (min.min(p[axis]), max.max(p[axis]))
        });
        max - min
    };
    let mut temperature = extent(0).max(extent(1)) * 0.1;
    let cooling = temperature / (params.iterations as f64 + 1.0);

    for iteration in 0..params.iterations {
        let mut displacement = vec![[0.0f64; 2]; node_count];

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let delta = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                let distance = delta[0].hypot(delta[1]).max(MIN_DISTANCE);
                let attraction = adjacency.get(&(i, j)).copied().unwrap_or(0.0);
                let force = k * k / (distance * distance) - attraction * distance / k;

                for axis in 0..2 {
                    displacement[i][axis] += delta[axis] * force;
                    displacement[j][axis] -= delta[axis] * force;
                }
            }
        }

        let mut total_step = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = d[0].hypot(d[1]);
            let length = if length < MIN_DISTANCE { 0.1 } else { length };
            let step = [d[0] * temperature / length, d[1] * temperature / length];
            p[0] += step[0];
            p[1] += step[1];
            total_step += step[0].hypot(step[1]);
        }
        temperature -= cooling;

        if total_step / (node_count as f64) < CONVERGENCE_THRESHOLD {
            debug!("Spring layout converged after {} iterations", iteration + 1);
            break;
        }
    }

    rescale(&mut pos);

    Ok(nodes
        .iter()
        .cloned()
        .zip(pos)
        .map(|(node, p)| (node, (p[0] + params.center.0, p[1] + params.center.1)))
        .collect())
}

/// Centres positions on their mean and scales the largest magnitude to 1.
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean = [
        pos.iter().map(|p| p[0]).sum::<f64>() / n,
        pos.iter().map(|p| p[1]).sum::<f64>() / n,
    ];

    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
        limit = limit.max(p[0].abs()).max(p[1].abs());
    }

    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(points: &[(&str, Position)]) -> Positions {
        points.iter().map(|(name, p)| (name.to_string(), *p)).collect()
    }

    #[test]
    fn test_layout_is_rescaled_around_center() {
        let nodes: Vec<String> = ["ROOT", "A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let seeds = seeds(&[
            ("ROOT", (0.0, 0.0)),
            ("A", (1.0, 0.0)),
            ("B", (0.0, 1.0)),
            ("C", (1.0, 1.0)),
        ]);
        let edges = vec![(0, 1, 2.0), (0, 2, 2.0), (0, 3, 2.0)];
        let params = SpringParams { center: (5.0, -5.0), ..SpringParams::default() };

        let layout = spring_layout(&nodes, &edges, &seeds, params).unwrap();
        assert_eq!(layout.len(), 4);

        let mean_x = layout.values().map(|p| p.0).sum::<f64>() / 4.0;
        let mean_y = layout.values().map(|p| p.1).sum::<f64>() / 4.0;
        assert!((mean_x - 5.0).abs() < 1e-9);
        assert!((mean_y + 5.0).abs() < 1e-9);

        let max_offset = layout
            .values()
            .map(|p| (p.0 - 5.0).abs().max((p.1 + 5.0).abs()))
            .fold(0.0, f64::max);
        assert!((max_offset - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let nodes: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let seeds = seeds(&[("A", (0.0, 0.0)), ("B", (2.0, 0.5)), ("C", (0.5, 3.0))]);
        let edges = vec![(0, 1, 1.0), (1, 2, 5.0)];

        let first = spring_layout(&nodes, &edges, &seeds, SpringParams::default()).unwrap();
        let second = spring_layout(&nodes, &edges, &seeds, SpringParams::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_seed_is_an_error() {
        let nodes = vec!["A".to_string(), "B".to_string()];
        let seeds = seeds(&[("A", (0.0, 0.0))]);
        let result = spring_layout(&nodes, &[], &seeds, SpringParams::default());
        assert!(matches!(result, Err(CodepNetError::MissingPosition(node)) if node == "B"));
    }

    #[test]
    fn test_single_node_sits_on_center() {
        let nodes = vec!["ROOT".to_string()];
        let seeds = seeds(&[("ROOT", (3.0, 4.0))]);
        let params = SpringParams { center: (3.0, 4.0), ..SpringParams::default() };
        let layout = spring_layout(&nodes, &[], &seeds, params).unwrap();
        assert_eq!(layout["ROOT"], (3.0, 4.0));
    }
}
