use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header. Trailing padding is trimmed.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(padded_line(self.headers.iter().copied(), &widths));
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        out.push(rule.join("  "));
        for row in &self.rows {
            out.push(padded_line(row.iter().map(String::as_str), &widths));
        }
        out.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn padded_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:w$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Numbered action list shown for `--dry-run`.
pub fn render_plan(activity: &str, actions: &[String]) -> String {
    let mut out = format!("{activity} (dry run):");
    if actions.is_empty() {
        out.push_str("\n  nothing to do");
    }
    for (i, action) in actions.iter().enumerate() {
        out.push_str(&format!("\n  {:>2}. {action}", i + 1));
    }
    out
}
