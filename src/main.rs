use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use playground::{
    config,
    config_io::{self, DirectoryContext},
    model::buffer::{BufferKind, BufferSet},
    services::notifications::{NotificationLevel, NotificationLog},
    services::store::JsonProjectStore,
    services::time_source::RealTimeSource,
    services::tracing_setup,
    Playground,
};
use std::path::{Path, PathBuf};

/// A live HTML/CSS/JS playground
#[derive(Parser, Debug)]
#[command(name = "playground")]
#[command(about = "Run, save and render HTML/CSS/JS playground projects", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Path to log file for diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and run the sources once, then print the console log
    Run {
        /// Markup source file
        #[arg(long, value_name = "FILE")]
        markup: Option<PathBuf>,

        /// Style source file
        #[arg(long, value_name = "FILE")]
        style: Option<PathBuf>,

        /// Script source file
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Start from a stored project; files given above replace its sources
        #[arg(long, value_name = "NAME")]
        project: Option<String>,
    },

    /// Store the given sources as a named project
    Save {
        name: String,

        #[arg(long, value_name = "FILE")]
        markup: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        style: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
    },

    /// List stored projects
    List,

    /// Print the combined HTML document of a stored project
    Render { name: String },
}

fn read_source(path: &Path) -> AnyhowResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Overlay the given files onto `buffers`
fn apply_sources(
    buffers: &mut BufferSet,
    markup: Option<&Path>,
    style: Option<&Path>,
    script: Option<&Path>,
) -> AnyhowResult<()> {
    for (kind, path) in [
        (BufferKind::Markup, markup),
        (BufferKind::Style, style),
        (BufferKind::Script, script),
    ] {
        if let Some(path) = path {
            buffers.get_mut(kind).replace(read_source(path)?);
        }
    }
    Ok(())
}

/// Print and clear pending notifications. Returns false if any was an error.
fn flush_notifications(playground: &mut Playground) -> bool {
    let mut ok = true;
    for notification in playground.notifications_mut().take() {
        eprintln!("{}", notification);
        ok &= notification.level == NotificationLevel::Success;
    }
    ok
}

fn run_command(
    command: Command,
    playground: &mut Playground,
    runtime: &tokio::runtime::Runtime,
) -> AnyhowResult<()> {
    match command {
        Command::Run {
            markup,
            style,
            script,
            project,
        } => {
            if let Some(name) = project {
                playground.load_project(&name);
                if !flush_notifications(playground) {
                    anyhow::bail!("Could not load project {:?}", name);
                }
            }

            let mut buffers = playground.state().buffers().clone();
            apply_sources(
                &mut buffers,
                markup.as_deref(),
                style.as_deref(),
                script.as_deref(),
            )?;
            playground.set_sources(buffers);

            let generation = runtime.block_on(playground.rebuild_now());
            tracing::info!("Ran {} for project {:?}", generation, playground.project_name());
            for entry in playground.console().list() {
                println!("{}", entry);
            }
        }

        Command::Save {
            name,
            markup,
            style,
            script,
        } => {
            let mut buffers = BufferSet::new();
            apply_sources(
                &mut buffers,
                markup.as_deref(),
                style.as_deref(),
                script.as_deref(),
            )?;
            playground.set_sources(buffers);
            playground.save_project(&name);
            if !flush_notifications(playground) {
                anyhow::bail!("Could not save project {:?}", name);
            }
        }

        Command::List => {
            let projects = playground.list_projects();
            if !flush_notifications(playground) {
                anyhow::bail!("Could not list projects");
            }
            for project in projects {
                let saved = project.timestamp.with_timezone(&chrono::Local);
                println!("{:<24} {}", project.name, saved.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Command::Render { name } => {
            playground.load_project(&name);
            if !flush_notifications(playground) {
                anyhow::bail!("Could not load project {:?}", name);
            }
            runtime.block_on(playground.rebuild_now());
            match playground.document() {
                Some(document) => print!("{}", document),
                None => anyhow::bail!("Failed to build project {:?}", name),
            }
        }
    }
    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();
    let dir_context = DirectoryContext::from_system()?;

    // Handle --dump-config early (no logging or runtime needed)
    if args.dump_config {
        let config = config_io::load_config(&dir_context, args.config.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    tracing_setup::init_global(&log_file);

    let config: config::Config = config_io::load_config(&dir_context, args.config.as_deref())?;
    let store_path = dir_context.resolve_projects_path(&config);
    tracing::info!("Playground starting, projects in {:?}", store_path);

    let Some(command) = args.command else {
        eprintln!("No command given; see --help");
        return Ok(());
    };

    // The script runtime is single-threaded, so the pipeline runs on a
    // current-thread runtime.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let mut playground = Playground::new(
        config,
        Box::new(JsonProjectStore::new(store_path)),
        NotificationLog::new(),
        RealTimeSource::shared(),
    );

    run_command(command, &mut playground, &runtime)
}
