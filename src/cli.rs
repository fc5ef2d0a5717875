use crate::config::WindowConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Center,
    /// Next to the mouse pointer.
    Mouse,
}

#[derive(Parser, Debug)]
#[command(version, about = "Always-on-top chat launcher")]
pub struct Cli {
    /// Submit this query as soon as the window opens.
    #[arg(long)]
    pub query: Option<String>,

    /// Where to open the window.
    #[arg(long, value_enum, default_value_t)]
    pub position: Position,

    /// Window width in pixels, overriding the config file.
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in pixels, overriding the config file.
    #[arg(long)]
    pub height: Option<u32>,

    /// Read configuration from this file instead of ~/.config/linchat/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, window: &mut WindowConfig) {
        if let Some(width) = self.width {
            window.width = width;
        }
        if let Some(height) = self.height {
            window.height = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["linchat"]).unwrap();
        assert_eq!(cli.query, None);
        assert_eq!(cli.position, Position::Center);
        assert_eq!(cli.width, None);
        assert_eq!(cli.height, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "linchat",
            "--query",
            "what time is it in Tokyo?",
            "--position",
            "mouse",
            "--width",
            "800",
            "--height",
            "120",
            "--config",
            "/tmp/linchat.toml",
        ])
        .unwrap();

        assert_eq!(cli.query.as_deref(), Some("what time is it in Tokyo?"));
        assert_eq!(cli.position, Position::Mouse);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/linchat.toml")));

        let mut window = WindowConfig::default();
        cli.apply(&mut window);
        assert_eq!(window.width, 800);
        assert_eq!(window.height, 120);
        assert_eq!(window.min_width, WindowConfig::default().min_width);
    }

    #[test]
    fn rejects_unknown_position() {
        let err = Cli::try_parse_from(["linchat", "--position", "corner"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn version_flag() {
        let err = Cli::try_parse_from(["linchat", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}
