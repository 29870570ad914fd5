use crate::grid::GridConfig;
use crate::search::Assignment;
use crate::vocabulary::Vocabulary;

pub const BLOCK: char = '█';

/// Turn the given grid and assignment into a rendered string. Blocked cells render as
/// `BLOCK`; open cells with no letter yet are blank.
pub fn render_grid(grid: &GridConfig, vocabulary: &Vocabulary, assignment: &Assignment) -> String {
    let mut cells: Vec<Vec<char>> = (0..grid.height)
        .map(|row| (0..grid.width).map(|col| if grid.is_open((row, col)) { ' ' } else { BLOCK }).collect())
        .collect();

    for (slot_id, slot) in grid.slots.iter().enumerate() {
        let word = match assignment.get(slot_id) {
            Some(word_id) => vocabulary.word(word_id),
            None => continue,
        };

        for ((row, col), &letter) in slot.cell_coords().zip(word.letters.iter()) {
            cells[row][col] = letter;
        }
    }

    cells.iter().map(|row| row.iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::solve;
    use crate::test_support::ring_grid;

    #[test]
    fn test_render_solved_ring() {
        let grid = ring_grid();
        let vocabulary = Vocabulary::new(["bat", "bee", "tab", "ebb"]);

        let result = solve(&grid, &vocabulary).expect("Failed to find a fill");

        assert_eq!(render_grid(&grid, &vocabulary, &result.assignment), "bat\ne█a\nebb");
    }

    #[test]
    fn test_render_partial_assignment_leaves_blanks() {
        let grid = GridConfig::from_template("##__\n____").unwrap();
        let vocabulary = Vocabulary::new(["ox", "oxen"]);
        let mut assignment = Assignment::unassigned(grid.slot_count());
        // Slot 3 is the bottom row.
        assignment.assign(3, vocabulary.id_of("oxen").unwrap());

        assert_eq!(render_grid(&grid, &vocabulary, &assignment), "██  \noxen");
    }

    #[test]
    fn test_render_open_cell_outside_every_slot_is_blank() {
        let grid = GridConfig::from_template("__#_\n####").unwrap();
        let vocabulary = Vocabulary::new(["at"]);
        let mut assignment = Assignment::unassigned(grid.slot_count());
        assignment.assign(0, vocabulary.id_of("at").unwrap());

        assert_eq!(render_grid(&grid, &vocabulary, &assignment), "at█ \n████");
    }
}
