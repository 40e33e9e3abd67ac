//! FILENAME: app/cli/src/terminal.rs
// PURPOSE: Paints styled report lines for the terminal.

use console::{style, StyledObject};
use pivot_engine::{Emphasis, Line, Styled, Traffic, Trend};

/// A cell with its emphasis applied. Plain cells come back unchanged.
pub fn paint(cell: &Styled) -> String {
    let text: StyledObject<&str> = style(cell.text.as_str());
    match cell.emphasis {
        Emphasis::Plain => cell.text.clone(),
        Emphasis::Bold => text.bold().to_string(),
        Emphasis::Grey => text.dim().to_string(),
        Emphasis::Traffic(Traffic::Green) => text.green().to_string(),
        Emphasis::Traffic(Traffic::Yellow) => text.yellow().to_string(),
        Emphasis::Traffic(Traffic::Red) => text.red().to_string(),
        Emphasis::Trend(Trend::Up) => text.green().bold().to_string(),
        Emphasis::Trend(Trend::Down) => text.red().bold().to_string(),
        Emphasis::Trend(Trend::Flat) => text.dim().to_string(),
    }
}

pub fn paint_line(line: &Line) -> String {
    line.cells.iter().map(paint).collect()
}

/// Whether stdout takes colors; `console` honors NO_COLOR and CLICOLOR.
pub fn colors_enabled() -> bool {
    console::colors_enabled()
}

/// Renders lines for stdout, painted or as plain text.
pub fn render(lines: &[Line], colors: bool) -> Vec<String> {
    lines
        .iter()
        .map(|line| if colors { paint_line(line) } else { line.text() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_cells_are_untouched() {
        assert_eq!(paint(&Styled::plain("ANZ")), "ANZ");
    }

    #[test]
    fn test_painting_keeps_text() {
        console::set_colors_enabled(true);
        let painted = paint(&Styled::traffic("120.0%", Traffic::Green));
        assert!(painted.contains("120.0%"));
        assert_eq!(console::strip_ansi_codes(&painted), "120.0%");
    }

    #[test]
    fn test_render_without_colors() {
        let lines = vec![Line::new(vec![Styled::bold("TOTAL "), Styled::plain(" $130k")])];
        assert_eq!(render(&lines, false), vec!["TOTAL  $130k".to_string()]);
    }
}
