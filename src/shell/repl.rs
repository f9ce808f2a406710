use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use std::path::{Path, PathBuf};

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::api::PlantApiClient;
use crate::camera::CommandStream;
use crate::config::ResolvedConfig;
use crate::fs::{atomic_write, default_annotated_path};
use crate::input::ImageReader;
use crate::session::{Disposition, SessionController, SessionError, Settled};
use crate::ui::{Spinner, is_prompt_cancelled, report};

/// Display and camera settings of a shell.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub server_name: Option<String>,
    pub endpoint: String,
    pub camera_command: Vec<String>,
}

impl From<&ResolvedConfig> for ShellConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            server_name: config.server_name.clone(),
            endpoint: config.endpoint.clone(),
            camera_command: config.camera_command.clone(),
        }
    }
}

/// An interactive identify-then-chat session.
pub struct Shell {
    config: ShellConfig,
    controller: SessionController<PlantApiClient>,
}

impl Shell {
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        let client = PlantApiClient::from_config(config)?;
        Ok(Self {
            config: ShellConfig::from(config),
            controller: SessionController::new(client),
        })
    }

    /// Runs the prompt loop. An initial image is selected and detected right away.
    pub async fn run(&mut self, initial_image: Option<&Path>) -> Result<()> {
        ui::print_header();

        if let Some(path) = initial_image
            && self.open_image(path)
        {
            self.detect().await;
        }

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightGreen)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        // Non-highlighted suggestions: gray
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        // Highlighted suggestion: green
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkGreen));

        loop {
            // Answers that arrived after the user stopped waiting.
            for settled in self.controller.drain_settled() {
                self.report(settled);
            }

            let help = self.help_message();
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message(&help)
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd).await {
                            break;
                        }
                    }
                    Input::Message(text) => self.ask(&text).await,
                },
                Err(e) if is_prompt_cancelled(&e) => {
                    println!(); // Clear line before goodbye message
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.controller.cancel_camera();
        ui::print_goodbye();
        Ok(())
    }

    fn help_message(&self) -> String {
        let state = self.controller.state();
        if self.controller.camera_open() {
            "/snap to capture, /cancel to close the camera".to_string()
        } else if state.can_chat() {
            format!(
                "Ask about {}, /help for commands, Ctrl+C to quit",
                state.chat().plant_name()
            )
        } else if state.can_detect() {
            "/detect to identify the plant, /help for commands".to_string()
        } else {
            "/open <path> or /camera to pick a photo, /help for commands".to_string()
        }
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Open(None) => ui::print_error("Usage: /open <path>"),
            SlashCommand::Open(Some(path)) => {
                if self.open_image(&expand_home(&path)) {
                    ui::print_hint("Run /detect to identify it.");
                }
            }
            SlashCommand::Camera => self.open_camera(),
            SlashCommand::Snap => self.snap().await,
            SlashCommand::Cancel => {
                if self.controller.camera_open() {
                    self.controller.cancel_camera();
                    ui::print_success("Camera closed");
                } else {
                    ui::print_hint("No camera is open.");
                }
            }
            SlashCommand::Detect => self.detect().await,
            SlashCommand::Plants => match self.controller.state().detection() {
                Some(result) => {
                    report::print_detection(result);
                    println!();
                }
                None => ui::print_hint("Nothing detected yet. Run /detect first."),
            },
            SlashCommand::Save(path) => self.save(path.as_deref()),
            SlashCommand::Clear => {
                self.controller.clear_session();
                ui::print_success("Session cleared");
            }
            SlashCommand::Status => {
                ui::print_status(self.controller.state(), self.controller.camera_open());
            }
            SlashCommand::Config => ui::print_config(&self.config),
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Quit => return false,
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        true
    }

    fn open_image(&mut self, path: &Path) -> bool {
        match ImageReader::read(path) {
            Ok(image) => {
                let message = format!("Selected {}", image.display_url());
                self.controller.set_image_source(image);
                ui::print_success(&message);
                true
            }
            Err(e) => {
                ui::print_error(&format!("{e:#}"));
                false
            }
        }
    }

    fn open_camera(&mut self) {
        match CommandStream::spawn(&self.config.camera_command) {
            Ok(stream) => {
                self.controller.open_camera(stream);
                ui::print_success("Camera open. /snap to capture, /cancel to close.");
            }
            Err(e) => ui::print_error(&format!("{e:#}")),
        }
    }

    async fn snap(&mut self) {
        if !self.controller.camera_open() {
            ui::print_error(&SessionError::NoCamera.to_string());
            return;
        }

        let spinner = Spinner::new("Capturing...");
        let captured = self.controller.capture_photo().await;
        spinner.stop();

        match captured {
            Ok(()) => ui::print_success("Photo captured. Run /detect to identify it."),
            Err(e) => ui::print_error(&format!("{e:#}")),
        }
    }

    async fn detect(&mut self) {
        match self.controller.request_detection() {
            Ok(true) => self.await_response("Identifying plant...").await,
            Ok(false) => ui::print_hint("Detection is already running."),
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    async fn ask(&mut self, text: &str) {
        match self.controller.send_chat_message(text) {
            Ok(()) => self.await_response("Thinking...").await,
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    /// Waits for the in-flight request. Ctrl+C stops waiting without cancelling it.
    async fn await_response(&mut self, message: &str) {
        let spinner = Spinner::new(message);

        while self.controller.state().is_busy() {
            let settled = tokio::select! {
                settled = self.controller.next_settled() => Some(settled),
                _ = tokio::signal::ctrl_c() => None,
            };

            match settled {
                Some(Some(settled)) => {
                    spinner.stop();
                    self.report(settled);
                }
                Some(None) => break,
                None => {
                    spinner.stop();
                    ui::print_hint("Stopped waiting. The answer will appear when it arrives.");
                    return;
                }
            }
        }
    }

    fn report(&self, settled: Settled) {
        let state = self.controller.state();
        match settled {
            Settled::Detection(Disposition::Applied) => {
                match state.detection() {
                    Some(result) => {
                        report::print_detection(result);
                        println!();
                        if let Some(message) = state.chat().last_message() {
                            report::print_message(message);
                        }
                    }
                    None => ui::print_error(&format!(
                        "Detection failed: {}",
                        state.error().unwrap_or("unknown error")
                    )),
                }
            }
            Settled::Chat(Disposition::Applied) => {
                if let Some(message) = state.chat().last_message() {
                    report::print_message(message);
                }
            }
            _ => {}
        }
    }

    fn save(&self, path: Option<&str>) {
        let state = self.controller.state();
        let (Some(result), Some(image)) = (state.detection(), state.image()) else {
            ui::print_hint("Nothing to save yet. Run /detect first.");
            return;
        };

        let target = match path {
            Some(path) => Ok(expand_home(path)),
            None => default_annotated_path(image.fingerprint()),
        };

        match target.and_then(|target| {
            atomic_write(&target, &result.annotated_image)?;
            Ok(target)
        }) {
            Ok(target) => ui::print_success(&format!(
                "Saved annotated image to {}",
                target.display()
            )),
            Err(e) => ui::print_error(&format!("{e:#}")),
        }
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
