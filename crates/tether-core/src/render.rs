use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Config;
use crate::session::View;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_view(&mut self, view: &View<'_>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if view.entries.is_empty() {
            writeln!(out, "No tasks to show.")?;
        } else {
            self.write_task_table(&mut out, &view.entries)?;
        }

        if view.show_pagination {
            if view.total_pages > 0 {
                writeln!(out, "\nPage {} of {}", view.current_page, view.total_pages)?;
            }
        } else {
            writeln!(out, "\n{} matching task(s)", view.entries.len())?;
        }

        Ok(())
    }

    fn write_task_table<W: Write>(&self, writer: W, tasks: &[&Task]) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Created".to_string(),
            "Description".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let done = if task.completed { "[x]" } else { "[ ]" };
            let created = task
                .created_at
                .clone()
                .unwrap_or_else(|| "No Date".to_string());

            let text = if task.completed {
                self.paint(&task.text, "2;9")
            } else {
                task.text.clone()
            };

            rows.push(vec![
                self.paint(&task.id.to_string(), "33"),
                done.to_string(),
                created,
                text,
            ]);
        }

        write_table(writer, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| visible_width(cell))
                .chain(std::iter::once(UnicodeWidthStr::width(header.as_str())))
                .max()
                .unwrap_or(0)
        })
        .collect();

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:<width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let padding = width.saturating_sub(visible_width(cell));
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn visible_width(cell: &str) -> usize {
    let mut in_escape = false;
    let mut width = 0usize;

    for ch in cell.chars() {
        if in_escape {
            in_escape = ch != 'm';
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += UnicodeWidthChar::width(ch).unwrap_or(0);
        }
    }

    width
}
