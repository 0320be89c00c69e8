use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer rectangle. `right()`/`bottom()` are exclusive edges; the
/// last pixel column/row sits at `right() - 1`/`bottom() - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strictly inside, excluding the corner pixel rows and columns.
    pub fn contains_proper(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() - 1 && p.y > self.y && p.y < self.bottom() - 1
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        let x1 = self.x.max(other.x);
        let x2 = self.right().min(other.right());
        let y1 = self.y.max(other.y);
        let y2 = self.bottom().min(other.bottom());
        x2 - x1 >= 0 && y2 - y1 >= 0
    }

    pub fn position(&self, p: Point) -> Position {
        if self.contains(p) {
            return Position::None;
        }
        let horizontal = if p.x < self.x {
            Some(Horizontal::West)
        } else if p.x >= self.right() {
            Some(Horizontal::East)
        } else {
            None
        };
        let vertical = if p.y < self.y {
            Some(Vertical::North)
        } else if p.y >= self.bottom() {
            Some(Vertical::South)
        } else {
            None
        };
        Position::from_axes(vertical, horizontal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    North,
    South,
}

/// Compass position of a point relative to a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    None,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Position {
    fn from_axes(vertical: Option<Vertical>, horizontal: Option<Horizontal>) -> Self {
        match (vertical, horizontal) {
            (None, None) => Position::None,
            (Some(Vertical::North), None) => Position::North,
            (Some(Vertical::South), None) => Position::South,
            (None, Some(Horizontal::East)) => Position::East,
            (None, Some(Horizontal::West)) => Position::West,
            (Some(Vertical::North), Some(Horizontal::East)) => Position::NorthEast,
            (Some(Vertical::North), Some(Horizontal::West)) => Position::NorthWest,
            (Some(Vertical::South), Some(Horizontal::East)) => Position::SouthEast,
            (Some(Vertical::South), Some(Horizontal::West)) => Position::SouthWest,
        }
    }

    pub fn is_north(self) -> bool {
        matches!(self, Position::North | Position::NorthEast | Position::NorthWest)
    }

    pub fn is_east(self) -> bool {
        matches!(self, Position::East | Position::NorthEast | Position::SouthEast)
    }
}

fn product_sign(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        0
    } else if (a < 0) ^ (b < 0) {
        -1
    } else {
        1
    }
}

fn cross(x1: i64, y1: i64, x2: i64, y2: i64) -> i64 {
    x1 * y2 - x2 * y1
}

/// Closed segment test: touching endpoints and collinear overlap count as an intersection.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    if !(p1.x.max(p2.x) >= p3.x.min(p4.x)
        && p3.x.max(p4.x) >= p1.x.min(p2.x)
        && p1.y.max(p2.y) >= p3.y.min(p4.y)
        && p3.y.max(p4.y) >= p1.y.min(p2.y))
    {
        return false;
    }

    let (x1, y1) = (i64::from(p1.x), i64::from(p1.y));
    let (x2, y2) = (i64::from(p2.x), i64::from(p2.y));
    let (x3, y3) = (i64::from(p3.x), i64::from(p3.y));
    let (x4, y4) = (i64::from(p4.x), i64::from(p4.y));

    let (p1p3_x, p1p3_y) = (x1 - x3, y1 - y3);
    let (p2p3_x, p2p3_y) = (x2 - x3, y2 - y3);
    let (p3p4_x, p3p4_y) = (x3 - x4, y3 - y4);
    if product_sign(
        cross(p2p3_x, p2p3_y, p3p4_x, p3p4_y),
        cross(p3p4_x, p3p4_y, p1p3_x, p1p3_y),
    ) < 0
    {
        return false;
    }

    let (p2p1_x, p2p1_y) = (x2 - x1, y2 - y1);
    let (p1p4_x, p1p4_y) = (x1 - x4, y1 - y4);
    product_sign(
        cross(-p1p3_x, -p1p3_y, p2p1_x, p2p1_y),
        cross(p2p1_x, p2p1_y, p1p4_x, p1p4_y),
    ) <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn crossing_diagonals_intersect() {
        assert!(segments_intersect(p(0, 0), p(10, 10), p(0, 10), p(10, 0)));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(p(0, 0), p(10, 0), p(0, 5), p(10, 5)));
        assert!(!segments_intersect(p(0, 0), p(4, 4), p(6, 6), p(9, 0)));
    }

    #[test]
    fn touching_endpoints_intersect() {
        assert!(segments_intersect(p(0, 0), p(5, 5), p(5, 5), p(10, 0)));
        assert!(segments_intersect(p(0, 0), p(10, 0), p(5, 0), p(5, 10)));
    }

    #[test]
    fn collinear_overlap_intersects() {
        assert!(segments_intersect(p(0, 0), p(10, 10), p(5, 5), p(20, 20)));
        assert!(!segments_intersect(p(0, 0), p(4, 4), p(5, 5), p(20, 20)));
    }

    #[test]
    fn rect_edges_and_corners() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.center(), p(25, 40));
        assert!(r.contains(p(10, 20)));
        assert!(!r.contains(p(40, 20)));
        assert!(!r.contains_proper(p(10, 30)));
        assert!(!r.contains_proper(p(39, 30)));
        assert!(r.contains_proper(p(38, 30)));
    }

    #[test]
    fn touching_rects_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(11, 0, 5, 5)));
    }

    #[test]
    fn position_classifies_compass_sectors() {
        let r = Rect::new(10, 10, 10, 10);
        assert_eq!(r.position(p(15, 15)), Position::None);
        assert_eq!(r.position(p(0, 0)), Position::NorthWest);
        assert_eq!(r.position(p(20, 0)), Position::NorthEast);
        assert_eq!(r.position(p(15, 25)), Position::South);
        assert_eq!(r.position(p(5, 15)), Position::West);
        assert_eq!(r.position(p(25, 25)), Position::SouthEast);
        assert!(Position::NorthEast.is_north() && Position::NorthEast.is_east());
        assert!(!Position::SouthWest.is_north() && !Position::SouthWest.is_east());
    }
}
