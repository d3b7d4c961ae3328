use ndarray::Array2;

/// Board axis: widths, heights and positions all fit in a byte.
pub type Coord = u8;

/// Square counts, up to `255 * 255`.
pub type CellCount = u16;

/// `(x, y)` on a board, `x` picking the column.
pub type Coord2 = (Coord, Coord);

/// Conversion into an `ndarray` index.
pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [usize::from(self.0), usize::from(self.1)]
    }
}

/// Number of squares on a `width` by `height` board.
pub const fn mult(width: Coord, height: Coord) -> CellCount {
    (width as CellCount).saturating_mul(height as CellCount)
}

/// Converts wire coordinates into board coordinates, `None` when they can never be on a board.
pub fn coords_from_signed(x: i64, y: i64) -> Option<Coord2> {
    Some((Coord::try_from(x).ok()?, Coord::try_from(y).ok()?))
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let (x, y) = self.dim();
        // boards never exceed Coord::MAX on either axis
        let size = (x as Coord, y as Coord);
        NeighborIter::new(index, size)
    }
}

/// Left column first, then the cells above and below, then the right column.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn offset((x, y): Coord2, (dx, dy): (i8, i8), (width, height): Coord2) -> Option<Coord2> {
    let x = x.checked_add_signed(dx).filter(|&x| x < width)?;
    let y = y.checked_add_signed(dy).filter(|&y| y < height)?;
    Some((x, y))
}

#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = DISPLACEMENTS.get(usize::from(self.index)) {
            self.index += 1;
            if let Some(neighbor) = offset(self.center, delta, self.bounds) {
                return Some(neighbor);
            }
        }
        None
    }
}
