use std::path::PathBuf;

use clap::Parser;

/// Ask Dedalus with active conversation context.
#[derive(Debug, Parser)]
#[command(name = "verdant-ask", version, about)]
pub struct Cli {
    /// Latest user message.
    #[arg(long)]
    pub message: String,

    /// Path to the active conversation JSON file.
    #[arg(long, value_name = "FILE")]
    pub conversation_json_path: PathBuf,

    /// Active conversation id. Defaults to the conversation json filename stem.
    #[arg(long)]
    pub conversation_id: Option<String>,

    /// Path to the global info JSON file.
    #[arg(long, value_name = "FILE", default_value = "dedalus_stuff/globalInfo.json")]
    pub global_json_path: PathBuf,

    /// Optional model override. Defaults to DEDALUS_MODEL, then the conversation model.
    #[arg(long)]
    pub model: Option<String>,

    /// Disable streaming and read one buffered completion instead.
    #[arg(long)]
    pub no_stream: bool,

    /// Allow writes to the global info JSON. Disabled by default for single-writer mode.
    #[arg(long)]
    pub update_global_index: bool,
}
