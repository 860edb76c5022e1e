use std::fmt;

/// Grid position, 1-based on both axes. Row 1 is the top edge, so `North`
/// steps toward smaller `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, enum_iterator::Sequence)]
pub enum Direction {
    North, East, South, West
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// How a coordinate renders for content authors: a numeric pair, or a
/// spreadsheet-style column letter plus row number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinateStyle {
    Numeric,
    Alphanumeric,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Coordinate {
        Coordinate { x, y }
    }
    pub fn offset(&self, dx: i32, dy: i32) -> Coordinate {
        Coordinate { x: self.x + dx, y: self.y + dy }
    }
    pub fn step(&self, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
    pub fn manhattan_distance(&self, other: &Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
    pub fn neighbors(&self) -> impl Iterator<Item = Coordinate> + '_ {
        enum_iterator::all::<Direction>().map(|d| self.step(d))
    }
    pub fn render(&self, style: CoordinateStyle) -> String {
        match style {
            CoordinateStyle::Numeric => format!("({}, {})", self.x, self.y),
            CoordinateStyle::Alphanumeric => format!("{}{}", column_letters(self.x), self.y),
        }
    }
}

/// 1 -> A, 26 -> Z, 27 -> AA. Columns outside the grid render as "?".
fn column_letters(x: i32) -> String {
    if x < 1 {
        return "?".into();
    }
    let mut n = x;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_else(|_| "?".into())
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(CoordinateStyle::Numeric))
    }
}

impl From<&(i32, i32)> for Coordinate {
    fn from(&(x, y): &(i32, i32)) -> Self {
        Coordinate { x, y }
    }
}
