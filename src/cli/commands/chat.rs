use anyhow::Result;
use std::path::PathBuf;

use crate::config::{ResolveOptions, load_resolved};
use crate::shell::Shell;

pub struct ChatOptions {
    pub image: Option<PathBuf>,
    pub server: ResolveOptions,
}

pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let config = load_resolved(&options.server)?;
    let mut shell = Shell::new(&config)?;
    shell.run(options.image.as_deref()).await
}
