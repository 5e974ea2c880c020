use std::fmt::Display;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;

use crate::{Matrix, Vector};

impl<T: Display> Matrix<T> {
    /// Render as a bordered table with row and column indices.
    pub fn to_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new(format!("{}x{}", self.rows(), self.cols()))
            .set_alignment(CellAlignment::Center)];
        header.extend((0..self.cols()).map(|c| Cell::new(c).set_alignment(CellAlignment::Center)));
        table.set_header(header);

        for (r, row) in self.row_iter().enumerate() {
            let mut cells = vec![Cell::new(r).set_alignment(CellAlignment::Center)];
            cells.extend(row.iter().map(|x| Cell::new(x).set_alignment(CellAlignment::Right)));
            table.add_row(cells);
        }

        table.to_string()
    }
}

impl<T: Display> Vector<T> {
    /// Render as a single-column table with component indices.
    pub fn to_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("i").set_alignment(CellAlignment::Center),
                Cell::new(format!("dim {}", self.dim())).set_alignment(CellAlignment::Center),
            ]);

        for (i, x) in self.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i).set_alignment(CellAlignment::Center),
                Cell::new(x).set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_table_lists_every_entry() {
        let m = Matrix::from_rows(&[[1.5, -2.0], [3.25, 40.0]]).unwrap();
        let rendered = m.to_table();

        assert!(rendered.contains("2x2"));
        for entry in ["1.5", "-2", "3.25", "40"] {
            assert!(rendered.contains(entry), "missing {entry} in\n{rendered}");
        }
    }

    #[test]
    fn vector_table_lists_every_component() {
        let rendered = Vector::from([7, 8, 9]).to_table();
        assert!(rendered.contains("dim 3"));
        for entry in ['7', '8', '9'] {
            assert!(rendered.contains(entry));
        }
    }
}
