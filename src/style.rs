use crate::config::{parse_hex_color, ColorsConfig};
use iced::widget::{button, container, text_editor};
use iced::{theme, Background, Border, Color, Theme};

/// Colors from the `[colors]` section, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub selection: Color,
    pub button: Color,
    pub button_hover: Color,
    pub button_active: Color,
    pub button_text: Color,
    pub code: Color,
    pub heading: Color,
}

impl Palette {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        let defaults = ColorsConfig::default();
        let pick = |name: &str, value: &str, fallback: &str| {
            let rgba = parse_hex_color(value).or_else(|| {
                tracing::warn!("invalid color {:?} for {}, using {}", value, name, fallback);
                parse_hex_color(fallback)
            });
            rgba.map_or(Color::WHITE, |[r, g, b, a]| Color::from_rgba(r, g, b, a))
        };

        Palette {
            background: pick("background", &colors.background, &defaults.background),
            text: pick("text", &colors.text, &defaults.text),
            selection: pick("text_selection", &colors.text_selection, &defaults.text_selection),
            button: pick("button", &colors.button, &defaults.button),
            button_hover: pick("button_hover", &colors.button_hover, &defaults.button_hover),
            button_active: pick("button_active", &colors.button_active, &defaults.button_active),
            button_text: pick("button_text", &colors.button_text, &defaults.button_text),
            code: pick("code", &colors.code, &defaults.code),
            heading: pick("heading", &colors.heading, &defaults.heading),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::custom(
            "linchat".to_string(),
            theme::Palette {
                background: self.background,
                text: self.text,
                primary: self.selection,
                success: self.code,
                danger: Color::from_rgb(0.9, 0.35, 0.35),
            },
        )
    }
}

pub fn window(palette: Palette) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette.background)),
        text_color: Some(palette.text),
        ..container::Style::default()
    }
}

pub fn editor(palette: Palette) -> text_editor::Style {
    text_editor::Style {
        background: Background::Color(palette.background),
        border: Border::default(),
        icon: palette.text,
        placeholder: Color {
            a: 0.5,
            ..palette.text
        },
        value: palette.text,
        selection: palette.selection,
    }
}

pub fn button_style(palette: Palette, radius: f32, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered => palette.button_hover,
        button::Status::Pressed => palette.button_active,
        button::Status::Active | button::Status::Disabled => palette.button,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: palette.button_text,
        border: Border {
            radius: radius.into(),
            ..Border::default()
        },
        ..button::Style::default()
    }
}
