use anyhow::{Context, Result, bail};
use bytes::Bytes;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use super::MediaStream;

/// A capture device driven by an external command that writes one encoded
/// frame to stdout (for example `ffmpeg ... -frames:v 1 -f image2pipe -`).
///
/// The device is held for as long as the child process runs.
pub struct CommandStream {
    child: Child,
    program: String,
}

impl CommandStream {
    /// Starts the capture command.
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Camera command is empty. Set 'camera' in the [plantid] config section")?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start camera command: {program}"))?;

        Ok(Self {
            child,
            program: program.clone(),
        })
    }
}

impl MediaStream for CommandStream {
    async fn read_frame(&mut self) -> Result<Bytes> {
        let mut stdout = self
            .child
            .stdout
            .take()
            .context("Camera frame was already read")?;

        let mut frame = Vec::new();
        stdout
            .read_to_end(&mut frame)
            .await
            .context("Failed to read frame from camera")?;

        let status = self
            .child
            .wait()
            .await
            .context("Failed to wait for camera command")?;

        if !status.success() {
            bail!("Camera command '{}' exited with {status}", self.program);
        }
        if frame.is_empty() {
            bail!("Camera command '{}' produced no frame", self.program);
        }

        Ok(Bytes::from(frame))
    }

    fn stop(&mut self) {
        // Already exited after a successful capture; the error is expected then.
        let _ = self.child.start_kill();
    }

    fn label(&self) -> String {
        format!("camera:{}", self.program)
    }
}
