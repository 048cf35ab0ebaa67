/// A closed bright-region boundary in pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionCandidate {
    points: Vec<(i32, i32)>,
    area: f64,
}

impl RegionCandidate {
    pub fn new(points: Vec<(i32, i32)>) -> Self {
        let area = polygon_area(&points);
        Self { points, area }
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    /// Enclosed area (shoelace formula), never negative.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Absolute shoelace area of a closed polygon. Fewer than 3 vertices is 0.
pub fn polygon_area(points: &[(i32, i32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// The candidate with the greatest area; the first one wins ties.
pub fn largest(candidates: &[RegionCandidate]) -> Option<&RegionCandidate> {
    candidates.iter().fold(None, |best, c| match best {
        Some(b) if b.area() >= c.area() => Some(b),
        _ => Some(c),
    })
}
