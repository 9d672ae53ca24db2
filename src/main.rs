//! rfe - A remote file explorer client.
//!
//! Usage:
//!   rfe ls [PATH]                 List a directory
//!   rfe tree [PATH]               Show the directory tree
//!   rfe search PATH QUERY         Recursive search
//!   rfe cat FILE                  Print a text file
//!   rfe mv SOURCE... DEST         Move entries into a directory
//!   rfe cp SOURCE DEST            Copy an entry into a directory
//!   rfe undo TOKEN                Reverse a move
//!   rfe upload DEST FILE...       Upload local files
//!   rfe download PATH...          Download files or folders
//!   rfe share PATH                Create a share link
//!   rfe stats [PATH]              Host statistics
//!   rfe watch [PATH]              Follow changes of a directory
//!   rfe roots                     List drive roots
//!   rfe pins                      List, add or remove pins
//!   rfe --help                    Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use rfe_client::{
    ClientSession, DirectoryTree, DownloadPlan, Preferences, TextBufferFactory, TomlFileStore,
    TreeRow, UploadSession, start_stats_poll, start_watch,
};
use rfe_core::{ClientConfig, Entry, RemoteFs, UploadFile};
use rfe_ops::{AccessMode, ClipboardSlot, SharePanel, UndoSlot, move_batch};
use rfe_remote::{HttpRemote, WsWatchTransport};

#[derive(Parser)]
#[command(
    name = "rfe",
    version,
    about = "A remote file explorer client",
    long_about = "rfe browses and manages files on a remote file service.\n\n\
                  Every command talks to the server given by --server or the \
                  base_url of the config file."
)]
struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Entries per page for listings
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory
    Ls {
        /// Directory (defaults to the last visited one)
        path: Option<String>,

        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Only show entries whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show the directory tree
    Tree {
        /// Root of the tree (defaults to the drive roots)
        path: Option<String>,

        /// Maximum depth to expand
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },

    /// Recursive search below a directory
    Search {
        /// Directory to search
        path: String,

        /// Name fragment to search for
        query: String,
    },

    /// Print a text file
    Cat {
        /// File to print
        path: String,
    },

    /// Move entries into a directory
    Mv {
        /// Entries to move
        #[arg(required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Destination directory
        dest: String,
    },

    /// Copy an entry into a directory
    Cp {
        /// Entry to copy
        source: String,

        /// Destination directory
        dest: String,
    },

    /// Reverse a move
    Undo {
        /// Token printed by `mv`
        token: String,
    },

    /// Upload local files into a directory
    Upload {
        /// Destination directory
        dest: String,

        /// Local files
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Download files or folders
    Download {
        /// Remote entries
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Use better compression for folders
        #[arg(long)]
        compress: bool,
    },

    /// Create a share link
    Share {
        /// Entry to share
        path: String,

        /// Allow recipients to edit
        #[arg(long)]
        edit: bool,

        /// Disallow downloads
        #[arg(long)]
        no_download: bool,

        /// Link lifetime in hours (never expires when omitted)
        #[arg(long)]
        hours: Option<f64>,
    },

    /// Show host statistics
    Stats {
        /// Volume to report
        #[arg(default_value = "C:\\")]
        path: String,

        /// Keep polling
        #[arg(short, long)]
        follow: bool,
    },

    /// Follow changes of a directory
    Watch {
        /// Directory (defaults to the last visited one)
        path: Option<String>,
    },

    /// List drive roots
    Roots,

    /// List, add or remove pins
    Pins {
        /// Pin a directory
        #[arg(long, conflicts_with = "remove")]
        add: Option<String>,

        /// Remove a pin
        #[arg(long)]
        remove: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let remote: Arc<dyn RemoteFs> =
        Arc::new(HttpRemote::new(&config).map_err(|e| eyre!(e.user_message()))?);

    match cli.command {
        Command::Ls { path, page, filter } => run_ls(remote, config, path, page, filter).await?,
        Command::Tree { path, depth } => run_tree(remote.as_ref(), path, depth).await?,
        Command::Search { path, query } => {
            let results = remote
                .search(&path, &query)
                .await
                .map_err(|e| eyre!("Search failed: {}", e.user_message()))?;
            print_entries(&results);
            eprintln!("{} results", results.len());
        }
        Command::Cat { path } => {
            let text = remote.read(&path).await.map_err(|e| eyre!(e.user_message()))?;
            print!("{text}");
        }
        Command::Mv { sources, dest } => {
            let mut undo = UndoSlot::new();
            let batch = move_batch(remote.as_ref(), &sources, &dest, &mut undo).await;
            println!("{}", batch.summary());
            for skip in &batch.skipped {
                println!("  skipped {} ({})", skip.source, skip.kind);
            }
            if let Some(token) = undo.token() {
                println!("Undo with: rfe undo {token}");
            }
            if !batch.is_success() {
                bail!("Move stopped early");
            }
        }
        Command::Cp { source, dest } => {
            let mut clipboard = ClipboardSlot::new();
            let mut undo = UndoSlot::new();
            clipboard.copy(Entry::from_path(source));
            clipboard
                .paste_here(remote.as_ref(), &dest, &mut undo)
                .await
                .map_err(|e| eyre!(e.user_message()))?;
            println!("Copied into {dest}");
        }
        Command::Undo { token } => {
            let mut undo = UndoSlot::new();
            undo.store(Some(token));
            undo.apply(remote.as_ref())
                .await
                .map_err(|e| eyre!(e.user_message()))?;
            println!("Undone");
        }
        Command::Upload { dest, files } => run_upload(remote, &dest, &files).await?,
        Command::Download {
            paths,
            output,
            compress,
        } => run_download(remote.as_ref(), paths, &output, !compress).await?,
        Command::Share {
            path,
            edit,
            no_download,
            hours,
        } => {
            let mut panel = SharePanel::new();
            panel.open(Entry::from_path(path));
            panel.options.access = if edit {
                AccessMode::Edit
            } else {
                AccessMode::ReadOnly
            };
            panel.options.allow_download = !no_download;
            panel.options.no_expiry = hours.is_none();
            panel.options.expires_hours = hours.unwrap_or_default();
            panel
                .create(remote.as_ref())
                .await
                .map_err(|e| eyre!(e.user_message()))?;
            println!("{}", panel.url().unwrap_or_default());
            match panel.expires_at() {
                Some(at) => println!("Expires {}", at.format("%Y-%m-%d %H:%M UTC")),
                None => println!("Never expires"),
            }
        }
        Command::Stats { path, follow } => run_stats(remote, &config, path, follow).await?,
        Command::Watch { path } => run_watch(remote, config, path).await?,
        Command::Roots => {
            let roots = remote.roots().await.map_err(|e| eyre!(e.user_message()))?;
            for root in roots {
                println!("{root}");
            }
        }
        Command::Pins { add, remove } => {
            if let Some(path) = add {
                remote.pin(&path).await.map_err(|e| eyre!(e.user_message()))?;
            }
            if let Some(path) = remove {
                remote.unpin(&path).await.map_err(|e| eyre!(e.user_message()))?;
            }
            for pin in remote.pins().await.map_err(|e| eyre!(e.user_message()))? {
                println!("{pin}");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rfe").join("config.toml"))
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let base_url = cli.server.clone().unwrap_or_default();
    let mut config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => ClientConfig::load(&path, base_url).map_err(|e| eyre!(e))?,
        None => ClientConfig::new(base_url),
    };

    if let Some(server) = &cli.server {
        config.base_url = server.clone();
    }
    if let Some(page_size) = cli.page_size {
        if page_size == 0 {
            bail!("--page-size must be greater than zero");
        }
        config.page_size = page_size;
    }
    if config.base_url.trim().is_empty() {
        bail!("No server given; pass --server or set base_url in the config file");
    }
    tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "Config loaded");
    Ok(config)
}

fn open_session(remote: Arc<dyn RemoteFs>, config: ClientConfig) -> ClientSession {
    let prefs = match TomlFileStore::default_location() {
        Some(path) => Preferences::load(Box::new(TomlFileStore::open(path))),
        None => Preferences::in_memory(),
    };
    ClientSession::new(remote, config, prefs, Arc::new(TextBufferFactory::new()))
}

/// Drain toasts to stderr. Returns whether any was an error.
fn flush_toasts(session: &mut ClientSession) -> bool {
    let mut failed = false;
    for toast in session.toasts_mut().take_all() {
        eprintln!("[{}] {}", toast.level, toast.message);
        failed |= toast.level == rfe_client::ToastLevel::Error;
    }
    failed
}

async fn run_ls(
    remote: Arc<dyn RemoteFs>,
    config: ClientConfig,
    path: Option<String>,
    page: usize,
    filter: Option<String>,
) -> Result<()> {
    let mut session = open_session(remote, config);
    let target = path.unwrap_or_else(|| session.current_path().to_string());
    if !session.load(&target).await {
        flush_toasts(&mut session);
        bail!("Cannot list {target}");
    }

    if let Some(filter) = filter {
        session.set_filter(&filter);
    }
    for _ in 1..page {
        if !session.next_page() {
            break;
        }
    }

    println!("{}", session.current_path());
    print_entries(&session.displayed());
    eprintln!(
        "page {}/{} ({} entries)",
        session.page(),
        session.total_pages(),
        session.search().filtered_count(session.entries())
    );
    Ok(())
}

async fn run_tree(remote: &dyn RemoteFs, path: Option<String>, depth: usize) -> Result<()> {
    let roots = match path {
        Some(path) => vec![path],
        None => remote.roots().await.map_err(|e| eyre!(e.user_message()))?,
    };

    let mut tree = DirectoryTree::new();
    tree.set_roots(roots.into_iter().map(Entry::from_path).collect());

    let mut frontier = tree.roots().to_vec();
    for _ in 0..depth {
        let mut next = Vec::new();
        for id in frontier {
            tree.toggle_and_load(id, remote).await;
            if let Some(node) = tree.node(id) {
                next.extend_from_slice(node.children());
            }
        }
        frontier = next;
    }

    for row in tree.rows("") {
        if let TreeRow::Node {
            name, depth, is_open, ..
        } = row
        {
            let marker = if is_open { "▼ " } else { "▶ " };
            println!("{}{}{}", "  ".repeat(depth), marker, name);
        }
    }
    Ok(())
}

async fn run_upload(remote: Arc<dyn RemoteFs>, dest: &str, files: &[PathBuf]) -> Result<()> {
    let mut picked = Vec::with_capacity(files.len());
    for file in files {
        let data = std::fs::read(file).with_context(|| format!("Cannot read {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| eyre!("Not a file: {}", file.display()))?;
        picked.push(UploadFile::new(name, data));
    }

    let mut uploads = UploadSession::new();
    uploads.stage(picked);
    let complete = uploads
        .run_with(remote, dest, |progress| {
            if let Some(current) = &progress.current_file {
                eprint!(
                    "\r{:>3}% {} ({}/{})",
                    progress.percent,
                    truncate(current, 40),
                    progress.files_completed,
                    progress.files_total
                );
            }
        })
        .await;
    eprintln!();

    match complete {
        Some(complete) if complete.is_success() => {
            println!("{}", complete.summary());
            Ok(())
        }
        Some(complete) => bail!(complete.summary()),
        None => Ok(()),
    }
}

async fn run_download(
    remote: &dyn RemoteFs,
    paths: Vec<String>,
    output: &Path,
    fast: bool,
) -> Result<()> {
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let info = remote.stat(&path).await.map_err(|e| eyre!(e.user_message()))?;
        let entry = if info.is_dir {
            Entry::dir(info.name, info.path)
        } else {
            Entry::file(info.name, info.path, info.size)
        };
        entries.push(entry);
    }

    let refs: Vec<&Entry> = entries.iter().collect();
    let Some(plan) = DownloadPlan::for_selection(&refs, fast) else {
        return Ok(());
    };
    let bytes = plan
        .fetch(remote)
        .await
        .map_err(|e| eyre!("Failed to download selected files: {}", e.user_message()))?;

    let target = output.join(plan.file_name());
    std::fs::write(&target, &bytes).with_context(|| format!("Cannot write {}", target.display()))?;
    println!("{} ({})", target.display(), format_size(bytes.len() as u64));
    Ok(())
}

async fn run_stats(
    remote: Arc<dyn RemoteFs>,
    config: &ClientConfig,
    path: String,
    follow: bool,
) -> Result<()> {
    if !follow {
        let snapshot = rfe_client::fetch_stats(remote.as_ref(), &path)
            .await
            .ok_or_else(|| eyre!("Statistics unavailable"))?;
        print_stats(&snapshot);
        return Ok(());
    }

    let mut rx = start_stats_poll(remote, path, config.stats_interval());
    while let Some(snapshot) = rx.recv().await {
        print_stats(&snapshot);
    }
    Ok(())
}

async fn run_watch(remote: Arc<dyn RemoteFs>, config: ClientConfig, path: Option<String>) -> Result<()> {
    let transport =
        Arc::new(WsWatchTransport::new(&config.base_url).map_err(|e| eyre!(e.user_message()))?);
    let delay = config.reconnect_delay();
    let mut session = open_session(remote, config);
    if let Some(path) = path {
        session.load(&path).await;
    } else {
        session.reload().await;
    }
    if flush_toasts(&mut session) {
        bail!("Cannot watch {}", session.current_path());
    }

    let (handle, mut events) = start_watch(transport, None, delay);
    session.attach_watch(handle);
    eprintln!("Watching {} (Ctrl+C to stop)", session.current_path());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                eprintln!("[{event:?}]");
                session.handle_watch_event(event).await;
                if event == rfe_client::WatchEvent::Change {
                    println!("{} entries", session.entries().len());
                }
                flush_toasts(&mut session);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_entries(entries: &[Entry]) {
    for entry in entries {
        let size = match (entry.is_dir, entry.size) {
            (true, _) => "<DIR>".to_string(),
            (false, Some(size)) => format_size(size),
            (false, None) => String::new(),
        };
        let modified = entry
            .modified_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:<40} {:>10}  {}", truncate(&entry.name, 40), size, modified);
    }
}

fn print_stats(stats: &rfe_client::StatsSnapshot) {
    println!(
        "cpu {:>5.1}%  mem {:>5.1}% ({} / {})  disk {:>5.1}% ({} free)",
        stats.cpu_percent,
        stats.memory_percent,
        stats.memory_used,
        stats.memory_total,
        stats.disk_percent,
        stats.disk_free
    );
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
