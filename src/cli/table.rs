//! Plain-text tables for the terminal.

/// Render `rows` under `headers` with columns padded to the widest cell
///
/// Multi-line cells are split across several table lines.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            let widest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            widths[i] = widths[i].max(widest);
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+", separator);

    let mut lines = vec![separator.clone()];
    if headers.iter().any(|h| !h.is_empty()) {
        lines.push(line(&headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(), &widths));
        lines.push(separator.clone());
    }
    for row in rows {
        let height = row.iter().map(|c| c.lines().count().max(1)).max().unwrap_or(1);
        for n in 0..height {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    row.get(i)
                        .and_then(|c| c.lines().nth(n))
                        .unwrap_or("")
                        .to_string()
                })
                .collect();
            lines.push(line(&cells, &widths));
        }
    }
    lines.push(separator);
    lines
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
        .collect();
    format!("|{}|", padded.join("|"))
}
