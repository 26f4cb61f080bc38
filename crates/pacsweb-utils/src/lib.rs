//! Utility functions and helpers

pub mod crypto;
pub mod error;
pub mod storage;

pub use crypto::{decrypt_token, encrypt_token};
pub use error::{Result, UtilsError};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, TokenCache, ENCRYPTED_TOKEN_KEY};

/// Render rows as a plain text table with left aligned, padded columns.
///
/// Rows may have different lengths; missing cells render empty.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = std::iter::once(header.len())
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_row = |row: &[String]| -> String {
        (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![render_row(header)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|row| render_row(row)));
    out.join("\n")
}

/// Truncate a string to `max` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let header = vec!["Pk".to_string(), "Name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Assets".to_string()],
            vec!["12".to_string()],
        ];
        let table = render_table(&header, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Pk | Name");
        assert_eq!(lines[1], "---+-------");
        assert_eq!(lines[2], "1  | Assets");
        assert_eq!(lines[3], "12 |");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long description", 6), "a lon…");
    }
}
