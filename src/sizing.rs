use crate::config::WindowConfig;
use crate::session::SessionState;

const LINE_HEIGHT: u32 = 20;
const MAX_INPUT_LINES: u32 = 10;
const INPUT_PADDING: u32 = 40;

const RESPONSE_BASE_HEIGHT: usize = 100;
const CHARS_PER_PIXEL: usize = 3;
const RESPONSE_MIN_HEIGHT: usize = 400;
const RESPONSE_MAX_HEIGHT: usize = 800;
const COPY_BUTTON_OFFSET: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

/// Height of the input area: one line per input line, up to ten.
pub fn input_height(line_count: usize) -> u32 {
    let lines = u32::try_from(line_count).unwrap_or(u32::MAX);
    LINE_HEIGHT
        .saturating_mul(lines)
        .clamp(LINE_HEIGHT, LINE_HEIGHT * MAX_INPUT_LINES)
}

/// Window size from content, using a character-count heuristic instead of
/// measuring laid-out text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingPolicy {
    width: u32,
    min_width: u32,
    min_height: u32,
    max_width: u32,
    max_height: u32,
}

impl SizingPolicy {
    pub fn from_window(window: &WindowConfig) -> Self {
        SizingPolicy {
            width: window.width,
            min_width: window.min_width,
            min_height: window.min_height,
            max_width: window.max_width.max(window.min_width),
            max_height: window.max_height.max(window.min_height),
        }
    }

    pub fn compute_size(&self, state: &SessionState, input_line_count: usize) -> Geometry {
        let height = if state.response_pane_visible() {
            let length = state.response_text.chars().count();
            let content = (length / CHARS_PER_PIXEL + RESPONSE_BASE_HEIGHT)
                .clamp(RESPONSE_MIN_HEIGHT, RESPONSE_MAX_HEIGHT) as u32;
            if state.copy_button_visible() {
                content + COPY_BUTTON_OFFSET
            } else {
                content
            }
        } else {
            input_height(input_line_count) + INPUT_PADDING
        };

        self.clamp(Geometry {
            width: self.width,
            height,
        })
    }

    fn clamp(&self, geometry: Geometry) -> Geometry {
        Geometry {
            width: geometry.width.max(self.min_width).min(self.max_width),
            height: geometry.height.max(self.min_height).min(self.max_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::ChatOutcome;

    fn policy() -> SizingPolicy {
        SizingPolicy::from_window(&WindowConfig::default())
    }

    fn answered(text: &str) -> SessionState {
        let mut state = SessionState::new();
        state.set_input("question".to_string());
        let submission = state.submit().unwrap();
        state.complete(submission.sequence, &ChatOutcome::Success(text.to_string()));
        state
    }

    #[test]
    fn input_only_grows_with_lines_up_to_ten() {
        let policy = policy();
        let state = SessionState::new();

        assert_eq!(policy.compute_size(&state, 0).height, 60);
        assert_eq!(policy.compute_size(&state, 1).height, 60);
        assert_eq!(policy.compute_size(&state, 3).height, 100);
        assert_eq!(policy.compute_size(&state, 10).height, 240);
        assert_eq!(policy.compute_size(&state, 500).height, 240);
        assert_eq!(policy.compute_size(&state, 3).width, 600);
    }

    #[test]
    fn pending_uses_the_minimum_response_height() {
        let mut state = SessionState::new();
        state.set_input("q".to_string());
        state.submit();
        assert_eq!(
            policy().compute_size(&state, 1),
            Geometry {
                width: 600,
                height: 400
            }
        );
    }

    #[test]
    fn response_height_adds_copy_button_offset() {
        let policy = policy();
        assert_eq!(policy.compute_size(&answered("short"), 1).height, 450);
        assert_eq!(policy.compute_size(&answered(&"x".repeat(1200)), 1).height, 550);
        assert_eq!(policy.compute_size(&answered(&"x".repeat(100_000)), 1).height, 850);
    }

    #[test]
    fn response_height_ignores_input_lines() {
        let policy = policy();
        let state = answered("hello");
        assert_eq!(policy.compute_size(&state, 1), policy.compute_size(&state, 9));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let policy = policy();
        let ascii = answered(&"a".repeat(1500));
        let wide = answered(&"é".repeat(1500));
        assert_eq!(policy.compute_size(&ascii, 1), policy.compute_size(&wide, 1));
    }

    #[test]
    fn idempotent_and_monotonic_in_length() {
        let policy = policy();
        let mut previous = 0;
        for length in (0..3000).step_by(7) {
            let state = answered(&"y".repeat(length));
            let first = policy.compute_size(&state, 1);
            assert_eq!(first, policy.compute_size(&state, 1));

            let content = if length == 0 {
                first.height
            } else {
                first.height - COPY_BUTTON_OFFSET
            };
            assert!((400..=800).contains(&content), "{content} at {length}");
            assert!(content >= previous, "height shrank at {length}");
            previous = content;
        }
    }

    #[test]
    fn clamps_to_window_bounds() {
        let policy = SizingPolicy::from_window(&WindowConfig {
            width: 2000,
            height: 60,
            min_width: 300,
            min_height: 100,
            max_width: 1000,
            max_height: 500,
        });

        let idle = policy.compute_size(&SessionState::new(), 1);
        assert_eq!(
            idle,
            Geometry {
                width: 1000,
                height: 100
            }
        );
        assert_eq!(policy.compute_size(&answered(&"z".repeat(5000)), 1).height, 500);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let policy = SizingPolicy::from_window(&WindowConfig {
            width: 600,
            height: 60,
            min_width: 800,
            min_height: 900,
            max_width: 100,
            max_height: 100,
        });
        assert_eq!(
            policy.compute_size(&SessionState::new(), 1),
            Geometry {
                width: 800,
                height: 900
            }
        );
    }
}
