//! Paints rendered segments onto the read-only answer editor.

use crate::renderer::{LineLayout, SegmentStyle};
use iced::advanced::text::highlighter::{self, Format};
use iced::font::{self, Font};
use iced::{Color, Theme};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub layout: Arc<LineLayout>,
    pub font: Font,
    pub heading: Color,
    pub code: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct Highlight {
    style: SegmentStyle,
    font: Font,
    heading: Color,
    code: Color,
}

/// Looks up the precomputed style runs for each line instead of parsing.
pub struct SegmentHighlighter {
    settings: Settings,
    current_line: usize,
}

impl highlighter::Highlighter for SegmentHighlighter {
    type Settings = Settings;
    type Highlight = Highlight;
    type Iterator<'a> = std::vec::IntoIter<(Range<usize>, Highlight)>;

    fn new(settings: &Settings) -> Self {
        SegmentHighlighter {
            settings: settings.clone(),
            current_line: 0,
        }
    }

    fn update(&mut self, new_settings: &Settings) {
        self.settings = new_settings.clone();
        self.current_line = 0;
    }

    fn change_line(&mut self, line: usize) {
        self.current_line = line;
    }

    fn highlight_line(&mut self, line: &str) -> Self::Iterator<'_> {
        let Settings {
            layout,
            font,
            heading,
            code,
        } = &self.settings;

        let runs: Vec<_> = layout
            .get(self.current_line)
            .into_iter()
            .flatten()
            .filter(|(range, _)| range.end <= line.len())
            .map(|(range, style)| {
                let highlight = Highlight {
                    style: *style,
                    font: *font,
                    heading: *heading,
                    code: *code,
                };
                (range.clone(), highlight)
            })
            .collect();

        self.current_line += 1;
        runs.into_iter()
    }

    fn current_line(&self) -> usize {
        self.current_line
    }
}

pub fn to_format(highlight: &Highlight, _theme: &Theme) -> Format<Font> {
    let bold = Font {
        weight: font::Weight::Bold,
        ..highlight.font
    };

    match highlight.style {
        SegmentStyle::Plain => Format {
            color: None,
            font: None,
        },
        // The editor has a single text size, so only h1/h2 get the accent.
        SegmentStyle::Heading(level) => Format {
            color: (level < 3).then_some(highlight.heading),
            font: Some(bold),
        },
        SegmentStyle::Bold => Format {
            color: None,
            font: Some(bold),
        },
        SegmentStyle::Italic => Format {
            color: None,
            font: Some(Font {
                style: font::Style::Italic,
                ..highlight.font
            }),
        },
        SegmentStyle::Code => Format {
            color: Some(highlight.code),
            font: Some(Font::MONOSPACE),
        },
    }
}
