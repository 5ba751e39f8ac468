#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render an aligned table for string rows.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(MIN_WIDTH)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| pad(&truncate_text(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join("  ");
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let text = truncate_text(value, *width);
                let padded = pad(&text, *width, looks_numeric(&text));
                if options.color {
                    colorize(&padded, headers[index])
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line);
    }
    lines.join("\n")
}

const MIN_WIDTH: usize = 4;

/// Shrink the widest columns until the row fits `max_width`.
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
            .filter(|(idx, width)| **width > headers[*idx].len().max(MIN_WIDTH))
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

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit())
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Paint `color` cells in the colour they name.
fn colorize(cell: &str, header: &str) -> String {
    if header != "color" {
        return cell.to_string();
    }
    let code = match cell.trim() {
        "red" => "31",
        "green" | "emerald" => "32",
        "orange" | "yellow" => "33",
        "blue" | "indigo" | "sky" => "34",
        "purple" | "pink" => "35",
        _ => return cell.to_string(),
    };
    format!("\u{1b}[{code}m{cell}\u{1b}[0m")
}
