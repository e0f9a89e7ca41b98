use thiserror::Error;

/// Layout used when no map file is given. `1` is a wall, `0` is open floor.
pub const DEFAULT_LAYOUT: &str = "\
1111111111111111
1000000000000001
1010100000000001
1011101111011111
1011100000010101
1011100000000101
1011001110111101
1000001010010101
1011101110010001
1010000100010101
1011000100100101
1010100101100101
1010100000000101
1011101111000001
1000000000000101
1111111111111111
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Wall,
}

/// Read-only view of a tile grid, as needed by collision and ray traversal.
pub trait TileSource {
    /// Tile at grid coordinates. Anything outside the grid is a wall.
    fn tile_at(&self, col: i32, row: i32) -> Tile;

    /// Edge length of one tile in world units.
    fn tile_size(&self) -> f32;

    /// Whether the world-space point lies inside a wall tile.
    #[inline]
    fn is_wall(&self, world_x: f32, world_y: f32) -> bool {
        let size = self.tile_size();
        let col = (world_x / size).floor() as i32;
        let row = (world_y / size).floor() as i32;
        self.tile_at(col, row) == Tile::Wall
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map layout has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell {found:?} at row {row}, column {col}")]
    UnknownCell { row: usize, col: usize, found: char },
}

/// Rectangular tile grid, row-major. Immutable once built.
#[derive(Debug, Clone)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    cells: Vec<Tile>,
    tile_size: f32,
}

impl GridMap {
    /// Parse a layout of `0`/`1` cells, one row per line. Cells may be separated by
    /// whitespace or commas; blank lines are skipped.
    pub fn parse(layout: &str, tile_size: f32) -> Result<Self, MapError> {
        let mut cells = Vec::new();
        let mut rows = 0;
        let mut cols = 0;

        for line in layout.lines().filter(|l| !l.trim().is_empty()) {
            let mut found = 0;
            for ch in line.chars().filter(|c| !c.is_whitespace() && *c != ',') {
                let tile = match ch {
                    '0' => Tile::Empty,
                    '1' => Tile::Wall,
                    _ => {
                        return Err(MapError::UnknownCell {
                            row: rows,
                            col: found,
                            found: ch,
                        });
                    }
                };
                cells.push(tile);
                found += 1;
            }

            if rows == 0 {
                cols = found;
            } else if found != cols {
                return Err(MapError::Ragged {
                    row: rows,
                    expected: cols,
                    found,
                });
            }
            rows += 1;
        }

        if rows == 0 || cols == 0 {
            return Err(MapError::Empty);
        }

        let map = Self {
            rows,
            cols,
            cells,
            tile_size,
        };
        if !map.has_solid_border() {
            log::warn!("map outer ring is not entirely walls; rays and the player may leave the grid");
        }
        Ok(map)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether every cell on the outer ring is a wall.
    pub fn has_solid_border(&self) -> bool {
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        let horizontal = (0..cols).all(|c| {
            self.tile_at(c, 0) == Tile::Wall && self.tile_at(c, rows - 1) == Tile::Wall
        });
        let vertical = (0..rows).all(|r| {
            self.tile_at(0, r) == Tile::Wall && self.tile_at(cols - 1, r) == Tile::Wall
        });
        horizontal && vertical
    }
}

impl TileSource for GridMap {
    #[inline]
    fn tile_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 {
            return Tile::Wall;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return Tile::Wall;
        }
        self.cells[row * self.cols + col]
    }

    #[inline]
    fn tile_size(&self) -> f32 {
        self.tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_map() -> GridMap {
        GridMap::parse(DEFAULT_LAYOUT, 64.0).unwrap()
    }

    #[test]
    fn default_layout_is_enclosed() {
        let map = default_map();
        assert_eq!(map.rows(), 16);
        assert_eq!(map.cols(), 16);
        assert!(map.has_solid_border());
    }

    #[test]
    fn in_bounds_tiles_match_layout() {
        let map = GridMap::parse("111\n101\n111\n", 1.0).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let expected = if (col, row) == (1, 1) {
                    Tile::Empty
                } else {
                    Tile::Wall
                };
                assert_eq!(map.tile_at(col, row), expected, "({col}, {row})");
            }
        }
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let map = GridMap::parse("00\n00\n", 1.0).unwrap();
        for (col, row) in [(-1, 0), (0, -1), (2, 0), (0, 2), (100, 100), (i32::MIN, i32::MAX)] {
            assert_eq!(map.tile_at(col, row), Tile::Wall, "({col}, {row})");
        }
        assert!(!map.has_solid_border());
    }

    #[test]
    fn world_coordinates_map_onto_tiles() {
        let map = default_map();
        assert!(map.is_wall(32.0, 32.0));
        assert!(!map.is_wall(96.0, 96.0));
        assert!(!map.is_wall(64.5, 127.5));
        assert!(map.is_wall(-1.0, -1.0));
        assert!(map.is_wall(-0.001, 96.0));
        // tile (2, 2) is a wall in the default layout
        assert!(map.is_wall(160.0, 160.0));
    }

    #[test]
    fn parse_accepts_separators() {
        let map = GridMap::parse("1, 1, 1\n1, 0, 1\n\n1, 1, 1\n", 10.0).unwrap();
        assert_eq!((map.rows(), map.cols()), (3, 3));
        assert_eq!(map.tile_at(1, 1), Tile::Empty);
        assert!(map.has_solid_border());
    }

    #[test]
    fn parse_rejects_bad_layouts() {
        assert_eq!(GridMap::parse("\n  \n", 1.0).unwrap_err(), MapError::Empty);
        assert_eq!(
            GridMap::parse("111\n11\n", 1.0).unwrap_err(),
            MapError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            GridMap::parse("111\n1x1\n", 1.0).unwrap_err(),
            MapError::UnknownCell {
                row: 1,
                col: 1,
                found: 'x'
            }
        );
    }
}
