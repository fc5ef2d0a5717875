use anyhow::{anyhow, Context, Result};
use std::process::Command;

use crate::cli::Position;

/// Top-left corner for the window, or `None` to let the toolkit center it.
pub fn resolve(position: Position, width: u32) -> Option<(f32, f32)> {
    match position {
        Position::Center => None,
        Position::Mouse => match pointer_location() {
            Ok((x, y)) => Some(((x - width as f32 / 2.0).max(0.0), y.max(0.0))),
            Err(e) => {
                tracing::warn!("could not find the mouse pointer, centering instead: {:#}", e);
                None
            }
        },
    }
}

fn pointer_location() -> Result<(f32, f32)> {
    let output = Command::new("xdotool")
        .args(["getmouselocation", "--shell"])
        .output()
        .context("running xdotool")?;

    if !output.status.success() {
        return Err(anyhow!(
            "xdotool failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    parse_location(&String::from_utf8_lossy(&output.stdout))
}

/// Parses `xdotool getmouselocation --shell` output (`X=..`, `Y=..` lines).
fn parse_location(output: &str) -> Result<(f32, f32)> {
    let mut x = None;
    let mut y = None;

    for line in output.lines() {
        match line.trim().split_once('=') {
            Some(("X", value)) => x = value.trim().parse::<f32>().ok(),
            Some(("Y", value)) => y = value.trim().parse::<f32>().ok(),
            _ => {}
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(anyhow!("unexpected xdotool output: {:?}", output)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_output() {
        let output = "X=1043\nY=388\nSCREEN=0\nWINDOW=62914567\n";
        assert_eq!(parse_location(output).unwrap(), (1043.0, 388.0));
    }

    #[test]
    fn rejects_incomplete_output() {
        assert!(parse_location("X=12\n").is_err());
        assert!(parse_location("X=a\nY=b\n").is_err());
        assert!(parse_location("").is_err());
    }

    #[test]
    fn center_needs_no_lookup() {
        assert_eq!(resolve(Position::Center, 600), None);
    }
}
