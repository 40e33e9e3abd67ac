//! FILENAME: core/pivot-engine/src/styled.rs
//! Styled cells - rendered text with a semantic emphasis tag.
//!
//! The reporter never produces terminal escape codes. Each cell carries an
//! `Emphasis` and the front end decides how to paint it.

use serde::{Deserialize, Serialize};

/// Traffic-light state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    Green,
    Yellow,
    Red,
}

/// Direction of change against the previous column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Compares `current` against `previous`.
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Plain,
    Bold,
    /// Secondary information such as repeated headers.
    Grey,
    Traffic(Traffic),
    Trend(Trend),
}

/// Where text sits when a cell is padded to its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// A piece of rendered text and how to emphasize it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Styled {
    pub text: String,
    pub emphasis: Emphasis,
}

impl Styled {
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Styled {
            text: text.into(),
            emphasis,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Styled::new(text, Emphasis::Plain)
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Styled::new(text, Emphasis::Bold)
    }

    pub fn grey(text: impl Into<String>) -> Self {
        Styled::new(text, Emphasis::Grey)
    }

    pub fn traffic(text: impl Into<String>, light: Traffic) -> Self {
        Styled::new(text, Emphasis::Traffic(light))
    }

    pub fn trend(trend: Trend) -> Self {
        Styled::new(trend.symbol(), Emphasis::Trend(trend))
    }

    /// Number of characters, the unit every layout width is measured in.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    /// Pads or truncates the text to exactly `width` characters.
    pub fn fit(mut self, width: usize, align: Align) -> Self {
        self.text = fit_text(&self.text, width, align);
        self
    }

    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }
}

/// Pads or truncates `text` to exactly `width` characters.
pub fn fit_text(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    match align {
        Align::Left => format!("{:<width$}", text, width = width),
        Align::Right => format!("{:>width$}", text, width = width),
        Align::Center => format!("{:^width$}", text, width = width),
    }
}

/// One output line: a sequence of styled cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Line {
    pub cells: Vec<Styled>,
}

impl Line {
    pub fn new(cells: Vec<Styled>) -> Self {
        Line { cells }
    }

    pub fn blank() -> Self {
        Line::default()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.is_empty()
    }

    /// The line without any emphasis.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.cells.iter().map(Styled::width).sum()
    }
}
