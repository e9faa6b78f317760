use serde::Deserialize;

/// A 2D point or displacement. Positions are continuous, hence floating point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero if the vector is too short
    /// to normalize meaningfully.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len < 1e-12 {
            Vec2::new(0.0, 0.0)
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn scale(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A simple polygon given as an ordered vertex list. Fewer than three
/// vertices is rejected on every construction path; self-intersection checks
/// are out of scope.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawPolygon")]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

#[derive(Deserialize)]
struct RawPolygon {
    vertices: Vec<Vec2>,
}

impl std::convert::TryFrom<RawPolygon> for Polygon {
    type Error = String;

    fn try_from(raw: RawPolygon) -> std::result::Result<Self, String> {
        if raw.vertices.len() < 3 {
            return Err(format!(
                "a polygon needs at least three vertices, got {}",
                raw.vertices.len()
            ));
        }
        Ok(Polygon {
            vertices: raw.vertices,
        })
    }
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        if vertices.len() < 3 {
            panic!("A polygon needs at least three vertices.");
        }
        Polygon { vertices }
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Polygon::new(coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect())
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Point-in-polygon via ray casting. Points exactly on an edge may land on
    /// either side; callers keep a clearance from the boundary anyway.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y)
                && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Minimum distance from a point to the polygon outline.
    pub fn distance_to_boundary(&self, p: Vec2) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| segment_distance(p, self.vertices[i], self.vertices[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Vertex average. Good enough as a routing target for the convex exit
    /// rectangle used here.
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len() as f64;
        let sum = self
            .vertices
            .iter()
            .fold(Vec2::new(0.0, 0.0), |acc, &v| acc + v);
        Vec2::new(sum.x / n, sum.y / n)
    }

    /// Axis-aligned bounding box as (min, max) corners.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        (min, max)
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq < 1e-24 {
        return p.distance(a);
    }
    let t = ((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq;
    let t = t.clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

/// The static geometry of a run: where agents may walk, where they spawn, and
/// where they leave. Immutable once built.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub walkable_area: Polygon,
    pub spawn_area: Polygon,
    pub exit_area: Polygon,
}

impl Scenario {
    /// Load an alternative geometry from a TOML file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// The fixed L-shaped corner corridor: a horizontal entry strip feeding a
    /// vertical leg with the exit at its top.
    pub fn corner() -> Self {
        Scenario {
            walkable_area: Polygon::from_coords(&[
                (0.0, 0.0),
                (12.0, 0.0),
                (12.0, 12.0),
                (10.0, 12.0),
                (10.0, 2.0),
                (0.0, 2.0),
            ]),
            spawn_area: Polygon::from_coords(&[
                (0.0, 0.0),
                (6.0, 0.0),
                (6.0, 2.0),
                (0.0, 2.0),
            ]),
            exit_area: Polygon::from_coords(&[
                (10.0, 11.0),
                (12.0, 11.0),
                (12.0, 12.0),
                (10.0, 12.0),
            ]),
        }
    }
}
