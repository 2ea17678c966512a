//! Table output formatting for CLI commands, using comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};

/// Render a category distribution as a two-column table.
pub fn format_distribution(rows: &[(String, i64)]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);
    for (category, count) in rows {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(count.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_table_contains_rows() {
        let rows = vec![
            ("Cardiology".to_string(), 384i64),
            ("Unknown".to_string(), 12i64),
        ];
        let rendered = format_distribution(&rows);
        assert!(rendered.contains("Cardiology"));
        assert!(rendered.contains("384"));
        assert!(rendered.contains("Unknown"));
    }

    #[test]
    fn test_empty_distribution_renders_header_only() {
        let rendered = format_distribution(&[]);
        assert!(rendered.contains("Category"));
    }
}
