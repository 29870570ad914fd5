use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use smallvec::SmallVec;

use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A run of cells to be filled with a single word. Two slots are equal iff their start cell,
/// direction, and length all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Zero-indexed `(row, col)` of the first cell.
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(start_cell: GridCoord, direction: Direction, length: usize) -> Slot {
        Slot { start_cell, direction, length }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| {
            let (row, col) = self.start_cell;
            match self.direction {
                Direction::Across => (row, col + cell_idx),
                Direction::Down => (row + cell_idx, col),
            }
        })
    }
}

/// Problems with a grid description. These are preconditions of the solver rather than
/// failures it can report, so they're caught while building a `GridConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    EmptyTemplate,
    ZeroLengthSlot(SlotId),
    /// Two slots share more than one cell, or run in the same direction through a shared cell.
    ConflictingSlots(SlotId, SlotId),
    UnknownSlot(SlotId),
    /// An overlap index points past the end of one of its slots.
    OverlapOutOfBounds { slots: (SlotId, SlotId), cells: (usize, usize) },
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::EmptyTemplate => write!(f, "grid template has no rows"),
            GridError::ZeroLengthSlot(slot_id) => write!(f, "slot {} has zero length", slot_id),
            GridError::ConflictingSlots(x, y) => {
                write!(f, "slots {} and {} cannot share cells the way they do", x, y)
            }
            GridError::UnknownSlot(slot_id) => write!(f, "overlap refers to unknown slot {}", slot_id),
            GridError::OverlapOutOfBounds { slots: (x, y), cells: (i, j) } => write!(
                f,
                "overlap ({}, {}) is out of bounds for slots {} and {}",
                i, j, x, y
            ),
        }
    }
}

impl Error for GridError {}

/// The static structure of a puzzle: its slots and the overlaps between them. Nothing here
/// changes while solving.
pub struct GridConfig {
    pub height: usize,
    pub width: usize,
    pub slots: Vec<Slot>,

    /// Keyed by ordered slot pair; both orientations are stored, with indices swapped.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,

    /// For each slot, the ids of the slots crossing it, ascending.
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,

    /// `open_cells[row][col]` is true for every non-block cell, including ones in no slot.
    open_cells: Vec<Vec<bool>>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("slots", &self.slots)
            .field("overlaps", &(["(", &(self.overlaps.len() / 2).to_string(), " crossings)"].join("")))
            .finish()
    }
}

impl GridConfig {
    /// Build a grid from a list of slots, deriving the overlap map from their geometry.
    pub fn from_slots(slots: Vec<Slot>) -> Result<GridConfig, GridError> {
        // Map each cell to the (slot, cell index) pairs covering it.
        let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            if slot.length == 0 {
                return Err(GridError::ZeroLengthSlot(slot_id));
            }
            for (cell_idx, loc) in slot.cell_coords().enumerate() {
                entries_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> = HashMap::new();
        for entries in entries_by_loc.values() {
            for (a, &(x, i)) in entries.iter().enumerate() {
                for &(y, j) in &entries[a + 1..] {
                    if slots[x].direction == slots[y].direction || overlaps.contains_key(&(x, y)) {
                        return Err(GridError::ConflictingSlots(x.min(y), x.max(y)));
                    }
                    overlaps.insert((x, y), (i, j));
                    overlaps.insert((y, x), (j, i));
                }
            }
        }

        Ok(Self::build(slots, overlaps))
    }

    /// Build a grid from slots and an explicit overlap map, keyed by slot pair in either
    /// orientation. Each entry `((x, y), (i, j))` ties letter `i` of `x` to letter `j` of `y`.
    pub fn with_overlaps<I>(slots: Vec<Slot>, overlap_entries: I) -> Result<GridConfig, GridError>
        where
            I: IntoIterator<Item=((SlotId, SlotId), (usize, usize))>
    {
        let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> = HashMap::new();

        for (slot_id, slot) in slots.iter().enumerate() {
            if slot.length == 0 {
                return Err(GridError::ZeroLengthSlot(slot_id));
            }
        }

        for ((x, y), (i, j)) in overlap_entries {
            for slot_id in [x, y] {
                if slot_id >= slots.len() {
                    return Err(GridError::UnknownSlot(slot_id));
                }
            }
            if x == y {
                return Err(GridError::ConflictingSlots(x, y));
            }
            if i >= slots[x].length || j >= slots[y].length {
                return Err(GridError::OverlapOutOfBounds { slots: (x, y), cells: (i, j) });
            }
            if let Some(&existing) = overlaps.get(&(x, y)) {
                if existing != (i, j) {
                    return Err(GridError::ConflictingSlots(x.min(y), x.max(y)));
                }
            }
            overlaps.insert((x, y), (i, j));
            overlaps.insert((y, x), (j, i));
        }

        Ok(Self::build(slots, overlaps))
    }

    /// Parse a structure template: one row per line, `_` or `.` for an open cell, anything
    /// else for a block. Every run of two or more open cells becomes a slot.
    pub fn from_template(template: &str) -> Result<GridConfig, GridError> {
        // Blank lines around the grid are padding; blank lines inside it are rows of blocks.
        let lines: Vec<&str> = template.lines().map(|line| line.trim_end_matches('\r')).collect();
        let first = lines.iter().position(|line| !line.trim().is_empty()).unwrap_or(lines.len());
        let last = lines.iter().rposition(|line| !line.trim().is_empty()).map_or(first, |last| last + 1);

        let rows: Vec<Vec<bool>> = lines[first..last]
            .iter()
            .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
            .collect();

        if rows.is_empty() {
            return Err(GridError::EmptyTemplate);
        }

        let height = rows.len();
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let is_open = |row: usize, col: usize| rows[row].get(col).copied().unwrap_or(false);

        let mut slots: Vec<Slot> = vec![];
        for row in 0..height {
            for col in 0..width {
                if !is_open(row, col) {
                    continue;
                }
                // Only start a slot at the beginning of a run.
                if col == 0 || !is_open(row, col - 1) {
                    let length = (col..width).take_while(|&c| is_open(row, c)).count();
                    if length > 1 {
                        slots.push(Slot::new((row, col), Direction::Across, length));
                    }
                }
                if row == 0 || !is_open(row - 1, col) {
                    let length = (row..height).take_while(|&r| is_open(r, col)).count();
                    if length > 1 {
                        slots.push(Slot::new((row, col), Direction::Down, length));
                    }
                }
            }
        }

        let mut grid_config = Self::from_slots(slots)?;
        grid_config.height = height;
        grid_config.width = width;
        grid_config.open_cells = (0..height)
            .map(|row| (0..width).map(|col| is_open(row, col)).collect())
            .collect();
        Ok(grid_config)
    }

    fn build(slots: Vec<Slot>, overlaps: HashMap<(SlotId, SlotId), (usize, usize)>) -> GridConfig {
        let mut neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> =
            slots.iter().map(|_| SmallVec::new()).collect();
        for &(x, y) in overlaps.keys() {
            neighbors[x].push(y);
        }
        for slot_neighbors in &mut neighbors {
            slot_neighbors.sort_unstable();
        }

        let (height, width) = slots.iter().fold((0, 0), |(height, width), slot| {
            let (row, col) = slot.cell_coords().last().unwrap_or(slot.start_cell);
            (height.max(row + 1), width.max(col + 1))
        });

        // Without a template, the open cells are exactly the ones some slot covers.
        let mut open_cells = vec![vec![false; width]; height];
        for slot in &slots {
            for (row, col) in slot.cell_coords() {
                open_cells[row][col] = true;
            }
        }

        GridConfig { height, width, slots, overlaps, neighbors, open_cells }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cell at `(row, col)` is open. Cells outside the grid are not.
    pub fn is_open(&self, (row, col): GridCoord) -> bool {
        self.open_cells.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    /// The overlap between `x` and `y`, as `(index in x, index in y)`. `None` if they don't
    /// cross, including when `x == y`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    /// Ids of the slots crossing `slot_id`, ascending.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// The number of slots crossing `slot_id`.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors[slot_id].len()
    }

    /// Every ordered pair of crossing slots, ascending.
    pub fn arcs(&self) -> Vec<(SlotId, SlotId)> {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(x, slot_neighbors)| slot_neighbors.iter().map(move |&y| (x, y)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction::{Across, Down};

    /// ##__
    /// ____
    /// _#__
    const TEMPLATE: &str = "##__\n____\n_#__\n";

    #[test]
    fn test_from_template_finds_slots_in_row_major_order() {
        let grid = GridConfig::from_template(TEMPLATE).unwrap();

        assert_eq!(grid.height, 3);
        assert_eq!(grid.width, 4);
        assert_eq!(grid.slots, vec![
            Slot::new((0, 2), Across, 2),
            Slot::new((0, 2), Down, 3),
            Slot::new((0, 3), Down, 3),
            Slot::new((1, 0), Across, 4),
            Slot::new((1, 0), Down, 2),
            Slot::new((2, 2), Across, 2),
        ]);
    }

    #[test]
    fn test_from_template_computes_overlaps_both_ways() {
        let grid = GridConfig::from_template(TEMPLATE).unwrap();

        // 0 = (0,2) across, 1 = (0,2) down, 3 = (1,0) across
        assert_eq!(grid.overlap(0, 1), Some((0, 0)));
        assert_eq!(grid.overlap(1, 0), Some((0, 0)));
        assert_eq!(grid.overlap(3, 1), Some((2, 1)));
        assert_eq!(grid.overlap(1, 3), Some((1, 2)));
        assert_eq!(grid.overlap(0, 3), None);
        assert_eq!(grid.overlap(1, 1), None);
        assert_eq!(grid.neighbors(3), &[1, 2, 4]);
        assert_eq!(grid.degree(3), 3);
    }

    #[test]
    fn test_from_template_ignores_single_cells_and_pads_short_rows() {
        let grid = GridConfig::from_template("\n_#_\n__\n").unwrap();

        assert_eq!(grid.width, 3);
        assert_eq!(grid.slots, vec![Slot::new((0, 0), Down, 2), Slot::new((1, 0), Across, 2)]);
    }

    #[test]
    fn test_from_template_keeps_interior_blank_rows() {
        let grid = GridConfig::from_template("\n__\n  \n__\n\n").unwrap();

        assert_eq!(grid.height, 3);
        assert_eq!(grid.width, 2);
        assert_eq!(grid.slots, vec![Slot::new((0, 0), Across, 2), Slot::new((2, 0), Across, 2)]);
        assert!(!grid.is_open((1, 0)));
        assert!(grid.is_open((2, 1)));
    }

    #[test]
    fn test_open_cells_include_cells_outside_slots() {
        let grid = GridConfig::from_template("__#_\n####").unwrap();
        assert!(grid.is_open((0, 3)));
        assert!(!grid.is_open((0, 2)));
        assert!(!grid.is_open((5, 5)));

        let grid = GridConfig::from_slots(vec![Slot::new((0, 1), Down, 2)]).unwrap();
        assert_eq!((grid.height, grid.width), (2, 2));
        assert!(grid.is_open((1, 1)));
        assert!(!grid.is_open((0, 0)));
    }

    #[test]
    fn test_from_template_rejects_empty_input() {
        assert_eq!(GridConfig::from_template("\n  \n").unwrap_err(), GridError::EmptyTemplate);
    }

    #[test]
    fn test_from_slots_rejects_parallel_slots_sharing_a_cell() {
        let result = GridConfig::from_slots(vec![
            Slot::new((0, 0), Across, 3),
            Slot::new((0, 2), Across, 3),
        ]);

        assert_eq!(result.unwrap_err(), GridError::ConflictingSlots(0, 1));
    }

    #[test]
    fn test_with_overlaps_validates_indices() {
        let slots = vec![Slot::new((0, 0), Across, 3), Slot::new((0, 0), Down, 2)];

        let grid = GridConfig::with_overlaps(slots.clone(), [((1, 0), (1, 2))]).unwrap();
        assert_eq!(grid.overlap(0, 1), Some((2, 1)));
        assert_eq!(grid.arcs(), vec![(0, 1), (1, 0)]);

        assert_eq!(
            GridConfig::with_overlaps(slots.clone(), [((0, 1), (0, 2))]).unwrap_err(),
            GridError::OverlapOutOfBounds { slots: (0, 1), cells: (0, 2) },
        );
        assert_eq!(
            GridConfig::with_overlaps(slots, [((0, 5), (0, 0))]).unwrap_err(),
            GridError::UnknownSlot(5),
        );
    }
}
