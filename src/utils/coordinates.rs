use rustc_hash::FxHashMap;

/// Layout position of a node, `(x, y)`.
pub type Position = (f64, f64);
pub type Positions = FxHashMap<String, Position>;

pub fn cart2pol(x: f64, y: f64) -> (f64, f64) {
    let rho = x.hypot(y);
    let phi = y.atan2(x);
    (rho, phi)
}

pub fn pol2cart(rho: f64, phi: f64) -> (f64, f64) {
    (rho * phi.cos(), rho * phi.sin())
}

/// Rotates every position by `angle` radians around `origin`.
pub fn rotate_positions(positions: &Positions, origin: Position, angle: f64) -> Positions {
    positions
        .iter()
        .map(|(gene, &(x, y))| {
            let (rho, phi) = cart2pol(x - origin.0, y - origin.1);
            let (dx, dy) = pol2cart(rho, phi + angle);
            (gene.clone(), (origin.0 + dx, origin.1 + dy))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_polar_conversions() {
        let (rho, phi) = cart2pol(0.0, 2.0);
        assert!((rho - 2.0).abs() < 1e-12);
        assert!((phi - FRAC_PI_2).abs() < 1e-12);

        let (x, y) = pol2cart(rho, phi);
        assert!(x.abs() < 1e-12);
        assert!((y - 2.0).abs() < 1e-12);

        let (_, phi) = cart2pol(-1.0, 0.0);
        assert!((phi - PI).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_positions_keeps_origin_fixed() {
        let mut positions = Positions::default();
        positions.insert("ROOT".to_string(), (1.0, 1.0));
        positions.insert("A".to_string(), (2.0, 1.0));

        let rotated = rotate_positions(&positions, (1.0, 1.0), FRAC_PI_2);
        let root = rotated["ROOT"];
        let a = rotated["A"];
        assert!((root.0 - 1.0).abs() < 1e-12 && (root.1 - 1.0).abs() < 1e-12);
        assert!((a.0 - 1.0).abs() < 1e-12 && (a.1 - 2.0).abs() < 1e-12);
    }
}
