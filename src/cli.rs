use anyhow::{Context, Result, anyhow};
use clap::Parser;
use essaydesk_client::keymap::SHORTCUTS;
use essaydesk_client::{ApiClient, FileStore};
use essaydesk_core::history::DEFAULT_MAX_HISTORY;
use essaydesk_core::progress::DEFAULT_WORD_LIMIT;
use essaydesk_proto::EssayDraft;
use essaydesk_session::SessionConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Essay text file to edit (created on first save when missing)
    #[arg(value_name = "FILE", required_unless_present = "list_shortcuts")]
    pub file: Option<PathBuf>,

    /// Base URL of the essay API used for saving and analysis
    #[arg(
        long,
        value_name = "URL",
        env = "ESSAYDESK_API_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    /// Save drafts to FILE instead of the API
    #[arg(long)]
    pub local: bool,

    /// Identifier of an existing essay on the server
    #[arg(long, value_name = "ID", env = "ESSAYDESK_ESSAY_ID")]
    pub essay_id: Option<String>,

    /// Essay title sent with every save
    #[arg(long, default_value = "Untitled essay")]
    pub title: String,

    /// Target university sent with every save (required unless --local)
    #[arg(long, env = "ESSAYDESK_UNIVERSITY", default_value = "")]
    pub university: String,

    /// Essay prompt sent with every save
    #[arg(long)]
    pub prompt: Option<String>,

    /// Word limit shown in the status line
    #[arg(long, value_name = "WORDS", default_value_t = DEFAULT_WORD_LIMIT)]
    pub word_limit: usize,

    /// Quiet period before autosave and analysis run
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub debounce_ms: u64,

    /// Number of undo snapshots kept
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_HISTORY)]
    pub max_history: usize,

    /// Do not analyse the essay when it is opened
    #[arg(long)]
    pub no_analyze_on_open: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH", env = "ESSAYDESK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the keyboard shortcuts and exit
    #[arg(long)]
    pub list_shortcuts: bool,
}

/// Where drafts are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Api,
    File,
}

/// Everything needed to open the editor.
#[derive(Debug, Clone)]
pub struct EditOptions {
    pub file: PathBuf,
    pub api_url: String,
    pub store: StoreKind,
    pub draft: EssayDraft,
    pub config: SessionConfig,
}

#[derive(Debug)]
pub enum Mode {
    ListShortcuts,
    Edit(Box<EditOptions>),
}

impl Args {
    pub fn mode(&self) -> Result<Mode> {
        if self.list_shortcuts {
            return Ok(Mode::ListShortcuts);
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| anyhow!("an essay FILE is required"))?;
        if self.word_limit == 0 {
            return Err(anyhow!("--word-limit must be greater than zero"));
        }
        if self.max_history == 0 {
            return Err(anyhow!("--max-history must be greater than zero"));
        }
        let store = if self.local {
            StoreKind::File
        } else {
            StoreKind::Api
        };
        if store == StoreKind::Api {
            if self.title.trim().is_empty() {
                return Err(anyhow!("--title is required when saving to the essay API"));
            }
            if self.university.trim().is_empty() {
                return Err(anyhow!(
                    "--university is required when saving to the essay API (or use --local)"
                ));
            }
        }
        let draft = EssayDraft {
            id: self.essay_id.clone(),
            title: self.title.clone(),
            university: self.university.clone(),
            prompt: self.prompt.clone(),
            content: String::new(),
        };
        let config = SessionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            max_history: self.max_history,
            word_limit: self.word_limit,
            analyze_on_open: !self.no_analyze_on_open,
        };
        Ok(Mode::Edit(Box::new(EditOptions {
            file,
            api_url: self.api_url.clone(),
            store,
            draft,
            config,
        })))
    }
}

/// Install the global subscriber.
///
/// While the editor owns the terminal, logs are discarded unless a log file
/// is given.
pub fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = if log_file.is_some() || !interactive {
        "info"
    } else {
        "off"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let subscriber = fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        None if interactive => {
            let subscriber = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        None => {
            let subscriber = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
    }
    Ok(())
}

pub async fn run() -> Result<()> {
    run_with_args(Args::parse()).await
}

async fn run_with_args(args: Args) -> Result<()> {
    let mode = args.mode()?;
    init_logging(args.log_file.as_deref(), matches!(mode, Mode::Edit(_)))?;
    dispatch(mode).await
}

async fn dispatch(mode: Mode) -> Result<()> {
    match mode {
        Mode::ListShortcuts => {
            print!("{}", shortcut_table());
            Ok(())
        }
        Mode::Edit(opts) => {
            tracing::info!(file = %opts.file.display(), store = ?opts.store, "mode = edit");
            let analyzer = Arc::new(ApiClient::new(&opts.api_url)?);
            match opts.store {
                StoreKind::Api => crate::app::run(*opts, analyzer.clone(), analyzer).await,
                StoreKind::File => {
                    let store = Arc::new(FileStore::new(opts.file.clone()));
                    crate::app::run(*opts, store, analyzer).await
                }
            }
        }
    }
}

/// Two-column listing of the keyboard shortcuts.
pub fn shortcut_table() -> String {
    let mut out = String::from("Keyboard Shortcuts\n");
    for binding in SHORTCUTS {
        out.push_str(&format!("  {:<16}{}\n", binding.label(), binding.description));
    }
    out.push_str(&format!("  {:<16}{}\n", "Ctrl+O", "Upload file"));
    out.push_str(&format!("  {:<16}{}\n", "Esc / Ctrl+C", "Quit"));
    out
}
