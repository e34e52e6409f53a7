mod reload;

use std::env;
use std::path::{Path, PathBuf};
use treeweb_web::{AppConfig, AppState, default_sources, do_build, render_index, router};

#[derive(Debug, Clone, PartialEq)]
enum CliCommand {
    Serve {
        dir: PathBuf,
        port: Option<u16>,
        reloader: bool,
        debug: bool,
        build: bool,
    },
    Build {
        dir: PathBuf,
        force: bool,
    },
    Page {
        dir: PathBuf,
        indent: Option<usize>,
    },
}

impl CliCommand {
    fn debug(&self) -> bool {
        match self {
            CliCommand::Serve { debug, .. } => *debug,
            _ => false,
        }
    }
}

pub async fn run_from_env() -> Result<(), String> {
    run_from_args(env::args().skip(1).collect()).await
}

pub async fn run_from_args(args: Vec<String>) -> Result<(), String> {
    let command = parse_command(args)?;
    init_logging(command.debug());

    match command {
        CliCommand::Serve {
            dir,
            port,
            reloader,
            build,
            ..
        } => run_server(dir, port, reloader, build).await,
        CliCommand::Build { dir, force } => run_build(dir, force),
        CliCommand::Page { dir, indent } => run_page(dir, indent),
    }
}

/// `RUST_LOG` wins; otherwise debug output from the treeweb crates when
/// debug mode is on.
fn init_logging(debug: bool) {
    let default_filter = if debug {
        "info,treeweb_core=debug,treeweb_web=debug,treeweb_cli=debug"
    } else {
        "info"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

fn parse_command(args: Vec<String>) -> Result<CliCommand, String> {
    if args.is_empty() {
        return Err(help_text());
    }

    let cmd = args[0].as_str();
    match cmd {
        "serve" => parse_serve(args),
        "build" => parse_build(args),
        "page" => parse_page(args),
        "help" | "--help" | "-h" => Err(help_text()),
        _ => Err(format!("unknown command: {cmd}\n\n{}", help_text())),
    }
}

fn parse_serve(args: Vec<String>) -> Result<CliCommand, String> {
    let mut dir: Option<PathBuf> = None;
    let mut port: Option<u16> = None;
    let mut reloader = true;
    let mut debug = true;
    let mut build = true;

    let mut i = 1usize;
    while i < args.len() {
        let token = &args[i];
        match token.as_str() {
            "--port" | "-p" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--port requires a value".to_string())?;
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("invalid port: {value}"))?,
                );
            }
            "--no-reloader" => reloader = false,
            "--no-debug" => debug = false,
            "--no-build" => build = false,
            x if x.starts_with('-') => return Err(format!("unknown flag: {x}")),
            _ => set_dir(&mut dir, token)?,
        }
        i += 1;
    }

    Ok(CliCommand::Serve {
        dir: dir.unwrap_or_else(|| PathBuf::from(".")),
        port,
        reloader,
        debug,
        build,
    })
}

fn parse_build(args: Vec<String>) -> Result<CliCommand, String> {
    let mut dir: Option<PathBuf> = None;
    let mut force = false;

    for token in &args[1..] {
        match token.as_str() {
            "--force" | "-f" => force = true,
            x if x.starts_with('-') => return Err(format!("unknown flag: {x}")),
            _ => set_dir(&mut dir, token)?,
        }
    }

    Ok(CliCommand::Build {
        dir: dir.unwrap_or_else(|| PathBuf::from(".")),
        force,
    })
}

fn parse_page(args: Vec<String>) -> Result<CliCommand, String> {
    let mut dir: Option<PathBuf> = None;
    let mut indent: Option<usize> = None;

    let mut i = 1usize;
    while i < args.len() {
        let token = &args[i];
        match token.as_str() {
            "--indent" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--indent requires a value".to_string())?;
                indent = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("invalid indent: {value}"))?,
                );
            }
            x if x.starts_with('-') => return Err(format!("unknown flag: {x}")),
            _ => set_dir(&mut dir, token)?,
        }
        i += 1;
    }

    Ok(CliCommand::Page {
        dir: dir.unwrap_or_else(|| PathBuf::from(".")),
        indent,
    })
}

fn set_dir(dir: &mut Option<PathBuf>, token: &str) -> Result<(), String> {
    if dir.is_some() {
        return Err("only one DIR positional argument is allowed".to_string());
    }
    *dir = Some(PathBuf::from(token));
    Ok(())
}

fn help_text() -> String {
    [
        "treeweb CLI",
        "",
        "Commands:",
        "  treeweb serve [DIR] [--port 8800] [--no-reloader] [--no-debug] [--no-build]",
        "  treeweb build [DIR] [--force]",
        "  treeweb page  [DIR] [--indent N]",
    ]
    .join("\n")
}

fn resolve_root(dir: &Path) -> Result<PathBuf, String> {
    dir.canonicalize()
        .map_err(|e| format!("failed to resolve {}: {e}", dir.display()))
}

fn run_build(dir: PathBuf, force: bool) -> Result<(), String> {
    let root = resolve_root(&dir)?;
    let config = AppConfig::load(&root).map_err(|e| e.to_string())?;
    let report = do_build(&config, &default_sources(&root), force).map_err(|e| e.to_string())?;

    if report.is_noop() {
        println!("up to date");
    }
    for path in report.index.iter().chain(report.script.iter()) {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn run_page(dir: PathBuf, indent: Option<usize>) -> Result<(), String> {
    let root = resolve_root(&dir)?;
    let config = AppConfig::load(&root).map_err(|e| e.to_string())?;
    let html = render_index(&config, indent).map_err(|e| e.to_string())?;
    println!("{html}");
    Ok(())
}

async fn run_server(dir: PathBuf, port: Option<u16>, reloader: bool, build: bool) -> Result<(), String> {
    let root = resolve_root(&dir)?;
    let config = AppConfig::load(&root).map_err(|e| e.to_string())?;

    if build {
        do_build(&config, &default_sources(&root), false).map_err(|e| e.to_string())?;
    } else if !config.index_path().is_file() {
        log::warn!(
            "{} is missing and --no-build was given; run `treeweb build` first",
            config.index_path().display()
        );
    }

    let port = port.unwrap_or(config.port);
    let state = AppState::new(config);

    if reloader {
        tokio::spawn(reload::watch(root.clone(), state.clone()));
    }

    let app = router(state);
    let host = format!("0.0.0.0:{port}");
    log::info!("root: {}", root.display());
    log::info!("url:  http://localhost:{port}");
    log::info!("reloader: {}", if reloader { "on" } else { "off" });

    let listener = tokio::net::TcpListener::bind(&host)
        .await
        .map_err(|e| format!("failed to bind {host}: {e}"))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server failed: {e}"))
}
