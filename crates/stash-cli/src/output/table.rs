#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    pub max_width: Option<usize>,
}

impl TableOptions {
    /// Width limit from `COLUMNS`, ignored below 40.
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|width| *width >= 40);
        Self { max_width }
    }
}

/// Render an aligned table. Multi-line cells are folded onto one line.
#[must_use]
pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>], options: TableOptions) -> String {
    let headers: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| fold_lines(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    fit_widths(&mut widths, &headers, options.max_width);

    let header_line = join_cells(headers.iter().map(|h| (*h).to_string()), &widths);
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    for row in &rows {
        let cells = (0..widths.len()).map(|index| row.get(index).cloned().unwrap_or_else(|| "-".to_string()));
        lines.push(join_cells(cells, &widths));
    }
    lines.join("\n")
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let text = truncate_text(&cell, *width);
            let pad = width.saturating_sub(text.chars().count());
            format!("{text}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn fold_lines(cell: &str) -> String {
    cell.split("\r\n").flat_map(|part| part.split('\n')).collect::<Vec<_>>().join(" ")
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > headers[*idx].chars().count().max(6))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = candidate else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}
