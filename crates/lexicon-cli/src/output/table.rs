//! Table formatting utilities for CLI output.

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};

/// Coverage data for a single locale.
pub struct LocaleCoverage {
    /// Locale tag (e.g., "ro", "pt-BR").
    pub locale: String,
    /// Number of default-catalog keys the locale translates.
    pub translated: usize,
    /// Dotted key paths with no translation.
    pub missing: Vec<String>,
}

impl LocaleCoverage {
    fn percent(&self, total: usize) -> String {
        if total == 0 {
            return "100%".to_string();
        }
        let ratio = self.translated as f64 * 100.0 / total as f64;
        format!("{ratio:.0}%")
    }
}

/// Format coverage data as a table.
pub fn format_coverage_table(total: usize, coverage: &[LocaleCoverage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Locale", "Coverage", "Percent", "Missing"]);

    for locale in coverage {
        table.add_row(vec![
            locale.locale.clone(),
            format!("{}/{}", locale.translated, total),
            locale.percent(total),
            locale.missing.len().to_string(),
        ]);
    }
    for index in 1..4 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}
