mod cli;
mod clipboard;
mod config;
mod controller;
mod dispatcher;
mod highlight;
mod placement;
mod renderer;
mod session;
mod sizing;
mod style;

use clap::Parser;
use futures_util::future::BoxFuture;
use iced::{
    widget::{self, column, container, button, text, text_editor},
    Element, Length, Task, Theme, Font, Subscription, Size, Point,
    time, clipboard as iced_clipboard,
    keyboard::{self, Key},
    mouse,
    event::{self, Event as IcedEvent},
    alignment, Padding,
    window::{self, Level},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::clipboard::{ClipboardHost, CopyTrigger};
use crate::config::{Config, UiConfig};
use crate::controller::{Controller, HostWindow, UiEvent, UiScheduler};
use crate::dispatcher::{ReqwestTransport, RequestDispatcher};
use crate::renderer::{RenderMode, RenderedSegment};
use crate::sizing::{Geometry, SizingPolicy};
use crate::style::Palette;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn init_tracing() {
    let default_directive = if std::env::var_os("LINCHAT_DEBUG").is_some() {
        "warn,linchat=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    let cli = cli::Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    cli.apply(&mut config.window);

    let position = match placement::resolve(cli.position, config.window.width) {
        Some((x, y)) => window::Position::Specific(Point::new(x, y)),
        None => window::Position::Centered,
    };

    // Font names must outlive the application; this runs once per process.
    let font = Font::with_name(Box::leak(config.ui.font_family.clone().into_boxed_str()));
    let palette = Palette::from_config(&config.colors);
    let settings = window::Settings {
        size: Size::new(config.window.width as f32, config.window.height as f32),
        position,
        decorations: false,
        level: Level::AlwaysOnTop,
        ..Default::default()
    };
    let query = cli.query;

    iced::application("linchat", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(settings)
        .default_font(font)
        .run_with(move || App::new(config, palette, font, query))
}

#[derive(Debug, Clone)]
enum Message {
    Ui(UiEvent),
    Edit(text_editor::Action),
    ResponseAction(text_editor::Action),
    CopyShortcut,
    DragWindow,
    Tick,
}

struct App {
    controller: Controller,
    input: text_editor::Content,
    response: text_editor::Content,
    highlight: highlight::Settings,
    palette: Palette,
    ui: UiConfig,
    loading_frame: usize,
}

/// Implements the controller's host seams by collecting iced tasks.
struct IcedHost<'a> {
    tasks: Vec<Task<Message>>,
    response: &'a mut text_editor::Content,
    highlight: &'a mut highlight::Settings,
}

impl UiScheduler for IcedHost<'_> {
    fn run_on_ui_thread(&mut self, work: BoxFuture<'static, UiEvent>) {
        self.tasks.push(Task::future(work).map(Message::Ui));
    }

    fn schedule_after(&mut self, delay: Duration, event: UiEvent) {
        self.tasks.push(Task::perform(tokio::time::sleep(delay), move |_| {
            Message::Ui(event.clone())
        }));
    }
}

impl HostWindow for IcedHost<'_> {
    fn resize(&mut self, geometry: Geometry) {
        let size = Size::new(geometry.width as f32, geometry.height as f32);
        self.tasks.push(
            window::get_latest().and_then(move |id| window::resize(id, size)),
        );
    }

    fn show_response(&mut self, segments: &[RenderedSegment]) {
        *self.response = text_editor::Content::with_text(&renderer::display_text(segments));
        self.highlight.layout = Arc::new(renderer::line_layout(segments));
    }

    fn close(&mut self) {
        self.tasks.push(iced::exit());
    }
}

impl ClipboardHost for IcedHost<'_> {
    fn write(&mut self, text: String) {
        self.tasks.push(iced_clipboard::write(text));
    }
}

impl App {
    fn new(config: Config, palette: Palette, font: Font, query: Option<String>) -> (Self, Task<Message>) {
        let dispatcher = RequestDispatcher::new(
            Arc::new(ReqwestTransport::new()),
            Duration::from_secs(config.api.timeout_secs),
        );
        let render_mode = if config.ui.markdown {
            RenderMode::Markdown
        } else {
            RenderMode::Plain
        };

        let controller = Controller::new(
            config.api,
            dispatcher,
            SizingPolicy::from_window(&config.window),
            render_mode,
        );

        let mut app = App {
            controller,
            input: text_editor::Content::new(),
            response: text_editor::Content::new(),
            highlight: highlight::Settings {
                layout: Arc::default(),
                font,
                heading: palette.heading,
                code: palette.code,
            },
            palette,
            ui: config.ui,
            loading_frame: 0,
        };

        let mut tasks = vec![widget::focus_next()];
        if let Some(query) = query {
            app.input = text_editor::Content::with_text(&query);
            tasks.push(app.dispatch(app.input_changed()));
            tasks.push(app.dispatch(UiEvent::Submit));
        }

        (app, Task::batch(tasks))
    }

    fn input_changed(&self) -> UiEvent {
        UiEvent::InputChanged {
            text: self.input.text(),
            line_count: self.input.line_count(),
        }
    }

    fn dispatch(&mut self, event: UiEvent) -> Task<Message> {
        let mut host = IcedHost {
            tasks: Vec::new(),
            response: &mut self.response,
            highlight: &mut self.highlight,
        };
        self.controller.handle(event, &mut host);
        Task::batch(host.tasks)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Ui(event) => self.dispatch(event),
            Message::Edit(action) => {
                let is_edit = action.is_edit();
                self.input.perform(action);
                if is_edit {
                    self.dispatch(self.input_changed())
                } else {
                    Task::none()
                }
            }
            Message::ResponseAction(action) => {
                // The answer pane is read-only; only selection and scrolling get through.
                if !action.is_edit() {
                    self.response.perform(action);
                }
                Task::none()
            }
            Message::CopyShortcut => {
                if !self.controller.state().response_pane_visible() {
                    return Task::none();
                }
                let selection = self.response.selection();
                self.dispatch(UiEvent::CopyRequested(CopyTrigger::Shortcut { selection }))
            }
            Message::DragWindow => window::get_latest().and_then(window::drag),
            Message::Tick => {
                if self.controller.state().is_pending() {
                    self.loading_frame = (self.loading_frame + 1) % SPINNER_FRAMES.len();
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let timer = if self.controller.state().is_pending() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        Subscription::batch([timer, event::listen_with(window_shortcut)])
    }

    fn view(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let state = self.controller.state();
        let font_size = self.ui.font_size;
        let padding = self.ui.padding;

        let lines = self.controller.input_line_count();
        let input_height = if state.response_pane_visible() {
            Length::Fixed((sizing::input_height(lines) + 2 * u32::from(padding)) as f32)
        } else {
            Length::Fill
        };

        let input = text_editor(&self.input)
            .placeholder("Ask anything...")
            .on_action(Message::Edit)
            .key_binding(|key_press| {
                let enter = matches!(key_press.key, Key::Named(keyboard::key::Named::Enter));
                if enter && !key_press.modifiers.shift() {
                    Some(text_editor::Binding::Custom(Message::Ui(UiEvent::Submit)))
                } else {
                    text_editor::Binding::from_key_press(key_press)
                }
            })
            .size(font_size)
            .padding(padding)
            .height(input_height)
            .style(move |_, _| style::editor(palette));

        let mut content_column = column![input];

        if state.is_pending() {
            let spinner = container(
                column![
                    text(SPINNER_FRAMES[self.loading_frame]).size(32),
                    text("Thinking...").size(font_size),
                ]
                .spacing(10)
                .align_x(alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center);

            content_column = content_column.push(spinner);
        } else if state.response_pane_visible() {
            let answer = text_editor(&self.response)
                .on_action(Message::ResponseAction)
                .key_binding(|key_press| {
                    if is_copy_shortcut(&key_press.key, key_press.modifiers) {
                        Some(text_editor::Binding::Custom(Message::CopyShortcut))
                    } else {
                        text_editor::Binding::from_key_press(key_press)
                    }
                })
                .highlight_with::<highlight::SegmentHighlighter>(
                    self.highlight.clone(),
                    highlight::to_format,
                )
                .size(font_size)
                .padding(padding)
                .height(Length::Fill)
                .style(move |_, _| style::editor(palette));

            content_column = content_column.push(answer);
        }

        if state.copy_button_visible() {
            let label = if self.controller.copy_acknowledged() {
                "Copied!"
            } else {
                "[Copy]"
            };
            let radius = self.ui.border_radius;
            let copy_button = container(
                button(text(label).size(14))
                    .on_press(Message::Ui(UiEvent::CopyRequested(CopyTrigger::Action)))
                    .padding(10)
                    .style(move |_, status| style::button_style(palette, radius, status)),
            )
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Right)
            .padding(Padding::from([0, 10]));

            content_column = content_column.push(copy_button);
        }

        container(content_column.spacing(4))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_| style::window(palette))
            .into()
    }

    fn theme(&self) -> Theme {
        self.palette.theme()
    }
}

fn is_copy_shortcut(key: &Key, modifiers: keyboard::Modifiers) -> bool {
    modifiers.control() && matches!(key, Key::Character(c) if c.as_str() == "c")
}

/// Window-wide keys and drag. Ctrl+C only counts when no widget captured it,
/// so copying a selection from the input editor is left to the editor.
fn window_shortcut(event: IcedEvent, status: event::Status, _id: window::Id) -> Option<Message> {
    let ignored = status == event::Status::Ignored;
    match event {
        IcedEvent::Keyboard(keyboard::Event::KeyPressed {
            key: Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::Ui(UiEvent::Close)),
        IcedEvent::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. })
            if ignored && is_copy_shortcut(&key, modifiers) =>
        {
            Some(Message::CopyShortcut)
        }
        IcedEvent::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) if ignored => {
            Some(Message::DragWindow)
        }
        _ => None,
    }
}
