//! Fixed-size character grids.
//!
//! [`AsciiScreen`] is a `W`×`H` block of characters stored row major on the heap.
//! [`AnnotatedScreen`] adds optional per-cell side data (a color, an entity id,
//! anything) that is dropped whenever its cell is cleared.
//!
//! Positions are `(x, y)` with `x` the column and `y` the row. Positions and spans
//! outside the grid are programming errors and panic, like slice indexing.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::ops::{Bound, Range, RangeBounds};

use crate::error::{CoreError, Result};

/// Character a cleared cell holds.
pub const EMPTY_CELL: char = ' ';

/// Resolve `range` against `0..len`.
fn span(range: impl RangeBounds<usize>, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => Some(start),
        Bound::Excluded(&start) => start.checked_add(1),
        Bound::Unbounded => Some(0),
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.checked_add(1),
        Bound::Excluded(&end) => Some(end),
        Bound::Unbounded => Some(len),
    };
    match (start, end) {
        (Some(start), Some(end)) if start <= end && end <= len => start..end,
        _ => panic!(
            "span {:?}..{:?} out of range for length {len}",
            range.start_bound(),
            range.end_bound()
        ),
    }
}

/// A `W`×`H` character grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiScreen<const W: usize, const H: usize> {
    cells: Box<[char]>,
}

impl<const W: usize, const H: usize> Default for AsciiScreen<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> AsciiScreen<W, H> {
    /// Number of columns.
    pub const WIDTH: usize = W;
    /// Number of rows.
    pub const HEIGHT: usize = H;

    /// A grid filled with [`EMPTY_CELL`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![EMPTY_CELL; W * H].into_boxed_slice(),
        }
    }

    /// Columns per row.
    #[must_use]
    pub const fn width(&self) -> usize {
        W
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        H
    }

    /// Total number of cells.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// All cells, row major.
    #[must_use]
    pub fn data(&self) -> &[char] {
        &self.cells
    }

    /// All cells, row major, mutable.
    pub fn data_mut(&mut self) -> &mut [char] {
        &mut self.cells
    }

    /// One row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= H`.
    #[must_use]
    pub fn row(&self, y: usize) -> &[char] {
        assert!(y < H, "row {y} outside {W}x{H} screen");
        &self.cells[y * W..(y + 1) * W]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        (0..H).map(move |y| &self.cells[y * W..(y + 1) * W])
    }

    /// The character at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        (x < W && y < H).then(|| self.cells[y * W + x])
    }

    fn index(x: usize, y: usize) -> usize {
        assert!(x < W && y < H, "position ({x}, {y}) outside {W}x{H} screen");
        y * W + x
    }

    /// Set one cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, ch: char) -> &mut Self {
        self.cells[Self::index(x, y)] = ch;
        self
    }

    /// Set every cell.
    pub fn fill(&mut self, ch: char) -> &mut Self {
        self.cells.fill(ch);
        self
    }

    /// Set the cells of `row` whose columns fall in `columns`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= H` or `columns` reaches past `W`.
    pub fn set_row(&mut self, row: usize, ch: char, columns: impl RangeBounds<usize>) -> &mut Self {
        assert!(row < H, "row {row} outside {W}x{H} screen");
        let columns = span(columns, W);
        self.cells[row * W + columns.start..row * W + columns.end].fill(ch);
        self
    }

    /// Set the cells of `column` whose rows fall in `rows`.
    ///
    /// # Panics
    ///
    /// Panics if `column >= W` or `rows` reaches past `H`.
    pub fn set_column(
        &mut self,
        column: usize,
        ch: char,
        rows: impl RangeBounds<usize>,
    ) -> &mut Self {
        assert!(column < W, "column {column} outside {W}x{H} screen");
        for y in span(rows, H) {
            self.cells[y * W + column] = ch;
        }
        self
    }

    /// Write `text` left to right from `(x, y)`, dropping what runs past the row end.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str) -> &mut Self {
        let start = Self::index(x, y);
        for (offset, ch) in text.chars().take(W - x).enumerate() {
            self.cells[start + offset] = ch;
        }
        self
    }

    /// Reset every cell to [`EMPTY_CELL`].
    pub fn clear(&mut self) -> &mut Self {
        self.fill(EMPTY_CELL)
    }

    /// Reset one cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn clear_at(&mut self, x: usize, y: usize) -> &mut Self {
        self.set(x, y, EMPTY_CELL)
    }

    /// Reset part of a row.
    ///
    /// # Panics
    ///
    /// See [`set_row`](Self::set_row).
    pub fn clear_row(&mut self, row: usize, columns: impl RangeBounds<usize>) -> &mut Self {
        self.set_row(row, EMPTY_CELL, columns)
    }

    /// Reset part of a column.
    ///
    /// # Panics
    ///
    /// See [`set_column`](Self::set_column).
    pub fn clear_column(&mut self, column: usize, rows: impl RangeBounds<usize>) -> &mut Self {
        self.set_column(column, EMPTY_CELL, rows)
    }

    /// Write every row followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn show(&self, out: &mut impl Write) -> io::Result<()> {
        for row in self.rows() {
            let line: String = row.iter().collect();
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> fmt::Display for AsciiScreen<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &ch in row {
                f.write_char(ch)?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Key under which side data for `(x, y)` is stored: `(y << 32) + x`.
#[must_use]
pub const fn cell_key(x: usize, y: usize) -> u64 {
    ((y as u64) << 32) + x as u64
}

/// Inverse of [`cell_key`].
#[must_use]
pub const fn cell_pos(key: u64) -> (usize, usize) {
    ((key & 0xFFFF_FFFF) as usize, (key >> 32) as usize)
}

/// An [`AsciiScreen`] with optional side data of type `T` per cell.
#[derive(Debug, Clone)]
pub struct AnnotatedScreen<const W: usize, const H: usize, T> {
    screen: AsciiScreen<W, H>,
    data: HashMap<u64, T>,
}

impl<const W: usize, const H: usize, T> Default for AnnotatedScreen<W, H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize, T> AnnotatedScreen<W, H, T> {
    /// A blank grid with no side data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: AsciiScreen::new(),
            data: HashMap::new(),
        }
    }

    /// The characters.
    #[must_use]
    pub const fn screen(&self) -> &AsciiScreen<W, H> {
        &self.screen
    }

    /// The character at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.screen.get(x, y)
    }

    fn key(x: usize, y: usize) -> u64 {
        assert!(x < W && y < H, "position ({x}, {y}) outside {W}x{H} screen");
        cell_key(x, y)
    }

    /// Whether `(x, y)` carries side data.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[must_use]
    pub fn has_data(&self, x: usize, y: usize) -> bool {
        self.data.contains_key(&Self::key(x, y))
    }

    /// Side data at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCellData`] if the cell has none.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn data_at(&self, x: usize, y: usize) -> Result<&T> {
        self.data
            .get(&Self::key(x, y))
            .ok_or(CoreError::MissingCellData { x, y })
    }

    /// Mutable side data at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingCellData`] if the cell has none.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn data_at_mut(&mut self, x: usize, y: usize) -> Result<&mut T> {
        self.data
            .get_mut(&Self::key(x, y))
            .ok_or(CoreError::MissingCellData { x, y })
    }

    /// Number of cells carrying side data.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Annotated cells as `((x, y), data)`, in no particular order.
    pub fn iter_data(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data.iter().map(|(&key, value)| (cell_pos(key), value))
    }

    /// Set one character, leaving its side data alone.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, ch: char) -> &mut Self {
        self.screen.set(x, y, ch);
        self
    }

    /// Attach side data to `(x, y)`, replacing any previous value.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set_data(&mut self, x: usize, y: usize, value: T) -> &mut Self {
        self.data.insert(Self::key(x, y), value);
        self
    }

    /// Set a character and its side data.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set_with_data(&mut self, x: usize, y: usize, ch: char, value: T) -> &mut Self {
        self.set(x, y, ch).set_data(x, y, value)
    }

    /// Set every character, leaving side data alone.
    pub fn fill(&mut self, ch: char) -> &mut Self {
        self.screen.fill(ch);
        self
    }

    /// Set part of a row, leaving side data alone.
    ///
    /// # Panics
    ///
    /// See [`AsciiScreen::set_row`].
    pub fn set_row(&mut self, row: usize, ch: char, columns: impl RangeBounds<usize>) -> &mut Self {
        self.screen.set_row(row, ch, columns);
        self
    }

    /// Set part of a column, leaving side data alone.
    ///
    /// # Panics
    ///
    /// See [`AsciiScreen::set_column`].
    pub fn set_column(
        &mut self,
        column: usize,
        ch: char,
        rows: impl RangeBounds<usize>,
    ) -> &mut Self {
        self.screen.set_column(column, ch, rows);
        self
    }

    /// Write text from `(x, y)`, leaving side data alone.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str) -> &mut Self {
        self.screen.put_str(x, y, text);
        self
    }

    /// Remove side data from `(x, y)`, keeping the character.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn clear_data(&mut self, x: usize, y: usize) -> &mut Self {
        self.data.remove(&Self::key(x, y));
        self
    }

    /// Reset every cell and drop all side data.
    pub fn clear(&mut self) -> &mut Self {
        self.data.clear();
        self.screen.clear();
        self
    }

    /// Reset one cell and drop its side data.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn clear_at(&mut self, x: usize, y: usize) -> &mut Self {
        self.clear_data(x, y);
        self.screen.clear_at(x, y);
        self
    }

    /// Reset part of a row and drop its side data.
    ///
    /// # Panics
    ///
    /// See [`AsciiScreen::set_row`].
    pub fn clear_row(&mut self, row: usize, columns: impl RangeBounds<usize>) -> &mut Self {
        let columns = span(columns, W);
        self.screen.clear_row(row, columns.clone());
        for x in columns {
            self.data.remove(&cell_key(x, row));
        }
        self
    }

    /// Reset part of a column and drop its side data.
    ///
    /// # Panics
    ///
    /// See [`AsciiScreen::set_column`].
    pub fn clear_column(&mut self, column: usize, rows: impl RangeBounds<usize>) -> &mut Self {
        let rows = span(rows, H);
        self.screen.clear_column(column, rows.clone());
        for y in rows {
            self.data.remove(&cell_key(column, y));
        }
        self
    }

    /// Write every row followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn show(&self, out: &mut impl Write) -> io::Result<()> {
        self.screen.show(out)
    }
}

impl<const W: usize, const H: usize, T: Clone> AnnotatedScreen<W, H, T> {
    /// Attach `value` to every cell.
    pub fn fill_data(&mut self, value: T) -> &mut Self {
        for y in 0..H {
            for x in 0..W {
                self.data.insert(cell_key(x, y), value.clone());
            }
        }
        self
    }

    /// Set every character and attach `value` to every cell.
    pub fn fill_with_data(&mut self, ch: char, value: T) -> &mut Self {
        self.fill(ch).fill_data(value)
    }

    /// Attach `value` to part of a row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= H` or `columns` reaches past `W`.
    pub fn set_row_data(
        &mut self,
        row: usize,
        value: T,
        columns: impl RangeBounds<usize>,
    ) -> &mut Self {
        assert!(row < H, "row {row} outside {W}x{H} screen");
        for x in span(columns, W) {
            self.data.insert(cell_key(x, row), value.clone());
        }
        self
    }

    /// Set part of a row and attach `value` to the same cells.
    ///
    /// # Panics
    ///
    /// See [`set_row_data`](Self::set_row_data).
    pub fn set_row_with_data(
        &mut self,
        row: usize,
        ch: char,
        value: T,
        columns: impl RangeBounds<usize>,
    ) -> &mut Self {
        let columns = span(columns, W);
        self.set_row(row, ch, columns.clone())
            .set_row_data(row, value, columns)
    }

    /// Attach `value` to part of a column.
    ///
    /// # Panics
    ///
    /// Panics if `column >= W` or `rows` reaches past `H`.
    pub fn set_column_data(
        &mut self,
        column: usize,
        value: T,
        rows: impl RangeBounds<usize>,
    ) -> &mut Self {
        assert!(column < W, "column {column} outside {W}x{H} screen");
        for y in span(rows, H) {
            self.data.insert(cell_key(column, y), value.clone());
        }
        self
    }

    /// Set part of a column and attach `value` to the same cells.
    ///
    /// # Panics
    ///
    /// See [`set_column_data`](Self::set_column_data).
    pub fn set_column_with_data(
        &mut self,
        column: usize,
        ch: char,
        value: T,
        rows: impl RangeBounds<usize>,
    ) -> &mut Self {
        let rows = span(rows, H);
        self.set_column(column, ch, rows.clone())
            .set_column_data(column, value, rows)
    }
}

impl<const W: usize, const H: usize, T> fmt::Display for AnnotatedScreen<W, H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.screen, f)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    type Small = AsciiScreen<4, 3>;

    #[test]
    fn new_screen_is_blank() {
        let screen = Small::new();
        assert_eq!(screen.size(), 12);
        assert!(screen.data().iter().all(|&ch| ch == EMPTY_CELL));
        assert_eq!(Small::WIDTH, 4);
        assert_eq!(Small::HEIGHT, 3);
    }

    #[test]
    fn set_and_get() {
        let mut screen = Small::new();
        screen.set(3, 2, '#').set(0, 0, '@');
        assert_eq!(screen.get(3, 2), Some('#'));
        assert_eq!(screen.get(0, 0), Some('@'));
        assert_eq!(screen.get(4, 0), None);
        assert_eq!(screen.get(0, 3), None);
        assert_eq!(screen.data()[2 * 4 + 3], '#');
    }

    #[test]
    #[should_panic(expected = "outside 4x3 screen")]
    fn set_outside_panics() {
        Small::new().set(4, 0, 'x');
    }

    #[test]
    fn row_fill_stays_within_its_span() {
        let mut screen = Small::new();
        screen.set_row(1, '-', 1..3);
        assert_eq!(screen.row(1), &[' ', '-', '-', ' ']);
        assert_eq!(screen.row(0), &[' '; 4]);
        assert_eq!(screen.row(2), &[' '; 4]);

        screen.set_row(2, '=', ..);
        assert_eq!(screen.row(2), &['='; 4]);
    }

    #[test]
    fn column_fill_stays_within_its_span() {
        let mut screen = Small::new();
        screen.set_column(2, '|', 1..=2);
        assert_eq!(screen.get(2, 0), Some(' '));
        assert_eq!(screen.get(2, 1), Some('|'));
        assert_eq!(screen.get(2, 2), Some('|'));
        assert_eq!(screen.data().iter().filter(|&&ch| ch == '|').count(), 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn span_past_the_edge_panics() {
        Small::new().set_row(0, 'x', 2..5);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn inclusive_span_to_usize_max_panics() {
        Small::new().set_row(0, 'x', 0..=usize::MAX);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn exclusive_start_at_usize_max_panics() {
        Small::new().clear_column(0, (Bound::Excluded(usize::MAX), Bound::Unbounded));
    }

    #[test]
    fn clearing_resets_cells() {
        let mut screen = Small::new();
        screen.fill('x');
        screen.clear_at(0, 0).clear_row(1, 2..).clear_column(3, ..1);
        assert_eq!(screen.to_string(), " xx \nxx  \nxxxx\n");

        screen.clear();
        assert_eq!(screen, Small::new());
    }

    #[test]
    fn put_str_clips_at_row_end() {
        let mut screen = Small::new();
        screen.put_str(1, 0, "hello");
        assert_eq!(screen.row(0), &[' ', 'h', 'e', 'l']);
        assert_eq!(screen.row(1), &[' '; 4]);
    }

    #[test]
    fn show_writes_rows_with_newlines() {
        let mut screen = AsciiScreen::<3, 2>::new();
        screen.set_row(0, '*', ..).set(1, 1, 'o');
        let mut out = Vec::new();
        screen.show(&mut out).expect("show");
        assert_eq!(String::from_utf8(out).expect("utf8"), "***\n o \n");
    }

    #[test]
    fn cell_keys_round_trip() {
        assert_eq!(cell_key(3, 0), 3);
        assert_eq!(cell_key(0, 1), 1 << 32);
        assert_eq!(cell_pos(cell_key(7, 9)), (7, 9));
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Wall,
        Floor,
    }

    type Map = AnnotatedScreen<4, 3, Tag>;

    #[test]
    fn side_data_is_set_and_read() {
        let mut map = Map::new();
        map.set_with_data(1, 1, '#', Tag::Wall);
        assert_eq!(map.get(1, 1), Some('#'));
        assert!(map.has_data(1, 1));
        assert_eq!(*map.data_at(1, 1).expect("data"), Tag::Wall);

        *map.data_at_mut(1, 1).expect("data") = Tag::Floor;
        assert_eq!(*map.data_at(1, 1).expect("data"), Tag::Floor);
    }

    #[test]
    fn missing_side_data_is_an_error() {
        let map = Map::new();
        assert!(!map.has_data(0, 0));
        let err = map.data_at(2, 1).expect_err("missing");
        assert!(matches!(err, CoreError::MissingCellData { x: 2, y: 1 }));
    }

    #[test]
    fn character_setters_keep_side_data() {
        let mut map = Map::new();
        map.set_with_data(0, 0, 'a', Tag::Wall);
        map.set(0, 0, 'b').fill('c').set_row(0, 'd', ..);
        assert_eq!(map.get(0, 0), Some('d'));
        assert_eq!(*map.data_at(0, 0).expect("data"), Tag::Wall);
    }

    #[test]
    fn clearing_drops_side_data_for_cleared_cells_only() {
        let mut map = Map::new();
        map.fill_with_data('.', Tag::Floor);
        assert_eq!(map.data_len(), 12);

        map.clear_at(0, 0);
        map.clear_row(1, 1..3);
        map.clear_column(3, 2..);
        assert_eq!(map.data_len(), 12 - 1 - 2 - 1);
        assert!(!map.has_data(0, 0));
        assert!(!map.has_data(1, 1));
        assert!(!map.has_data(3, 2));
        assert!(map.has_data(0, 1));
        assert_eq!(map.get(1, 1), Some(EMPTY_CELL));

        map.clear();
        assert_eq!(map.data_len(), 0);
        assert_eq!(map.screen(), &AsciiScreen::<4, 3>::new());
    }

    #[test]
    fn clear_data_keeps_the_character() {
        let mut map = Map::new();
        map.set_with_data(2, 2, 'x', Tag::Wall).clear_data(2, 2);
        assert_eq!(map.get(2, 2), Some('x'));
        assert!(!map.has_data(2, 2));
    }

    #[test]
    fn row_and_column_data_cover_their_spans() {
        let mut map = Map::new();
        map.set_row_with_data(0, '-', Tag::Wall, ..)
            .set_column_with_data(0, '|', Tag::Floor, 1..);

        let mut cells: Vec<_> = map.iter_data().map(|(pos, tag)| (pos, *tag)).collect();
        cells.sort_by_key(|&((x, y), _)| (y, x));
        assert_eq!(
            cells,
            vec![
                ((0, 0), Tag::Wall),
                ((1, 0), Tag::Wall),
                ((2, 0), Tag::Wall),
                ((3, 0), Tag::Wall),
                ((0, 1), Tag::Floor),
                ((0, 2), Tag::Floor),
            ]
        );
        assert_eq!(map.to_string(), "----\n|   \n|   \n");
    }
}
