//! # msg
//!
//! 对话脚本的命令行宿主。
//!
//! ## 用法
//!
//! ```bash
//! # 检查脚本
//! cargo run -p msg-cli -- check scripts/demo.txt
//!
//! # 查看 AST 与事件
//! cargo run -p msg-cli -- dump scripts/demo.txt
//! cargo run -p msg-cli -- dump scripts/demo.txt --json
//!
//! # 在终端播放（回车翻页）
//! cargo run -p msg-cli -- play scripts/demo.txt --preset fast
//! cargo run -p msg-cli -- play scripts/demo.txt --auto
//! cargo run -p msg-cli -- play scripts/demo.txt --typewriter typewriter.json
//!
//! # 写出默认配置
//! cargo run -p msg-cli -- init
//!
//! # 用打字机显示一段正文
//! cargo run -p msg-cli -- type "スライムが現れた！" --preset dramatic
//! ```

mod config;
mod play;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use anyhow::Context;
use clap::{Parser, Subcommand};
use msg_runtime::{Checker, DiagnosticResult, Evaluator, MessageHandler, TypewriterPreset};
use tracing::{Level, debug, info, warn};

use config::AppConfig;
use play::{PlayOptions, Player};

/// 脚本文件扩展名
const SCRIPT_EXTENSIONS: [&str; 2] = ["txt", "msg"];

#[derive(Parser)]
#[command(name = "msg")]
#[command(about = "对话脚本工具 - 检查、查看和播放 RPG 对话脚本")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查脚本并输出诊断
    Check {
        /// 脚本文件（.txt / .msg）
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// 输出脚本的语句与事件
    Dump {
        /// 脚本文件
        file: PathBuf,

        /// 以 JSON 格式输出
        #[arg(long)]
        json: bool,
    },

    /// 在终端播放脚本
    Play {
        /// 脚本文件
        file: PathBuf,

        /// 打字机预设（instant / fast / normal / slow / dramatic）
        #[arg(short, long)]
        preset: Option<TypewriterPreset>,

        /// 打字机配置 JSON 文件（优先于 --preset）
        #[arg(short, long, value_name = "FILE")]
        typewriter: Option<PathBuf>,

        /// 翻页处不等待回车
        #[arg(short, long)]
        auto: bool,
    },

    /// 写出默认配置文件
    Init {
        /// 覆盖已有的配置文件
        #[arg(long)]
        force: bool,
    },

    /// 用打字机显示一段正文
    Type {
        /// 要显示的正文
        text: String,

        /// 打字机预设
        #[arg(short, long)]
        preset: Option<TypewriterPreset>,

        /// 打字机配置 JSON 文件（优先于 --preset）
        #[arg(short, long, value_name = "FILE")]
        typewriter: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(&cli.config);
    if let Err(e) = config.validate() {
        eprintln!("❌ 配置无效: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Check { paths } => run_check(&paths, &config),
        Commands::Dump { file, json } => run_dump(&file, json, &config).map(|()| true),
        Commands::Play {
            file,
            preset,
            typewriter,
            auto,
        } => run_play(&file, preset, typewriter.as_deref(), auto, config).map(|()| true),
        Commands::Type {
            text,
            preset,
            typewriter,
        } => run_type(&text, preset, typewriter.as_deref(), config).map(|()| true),
        Commands::Init { force } => run_init(&cli.config, force, &config).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("读取脚本失败: {}", path.display()))
}

fn read_typewriter(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    path.map(|path| {
        fs::read_to_string(path)
            .with_context(|| format!("读取打字机配置失败: {}", path.display()))
    })
    .transpose()
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// 检查脚本，返回是否没有错误
fn run_check(paths: &[PathBuf], config: &AppConfig) -> anyhow::Result<bool> {
    let checker = Checker::from_config(&config.checker);
    let mut total = DiagnosticResult::new();
    let mut checked = 0;

    for path in paths {
        if !is_script(path) {
            warn!(path = %path.display(), "不是脚本文件，已跳过");
            continue;
        }
        let source = read_script(path)?;
        let result = checker.check(&path.display().to_string(), &source);
        debug!(path = %path.display(), diagnostics = result.len(), "检查完成");
        for diag in &result.diagnostics {
            println!("{diag}");
        }
        total.merge(result);
        checked += 1;
    }

    println!(
        "检查了 {} 个脚本: {} 个错误, {} 个警告, {} 条提示",
        checked,
        total.error_count(),
        total.warn_count(),
        total.info_count()
    );
    Ok(!total.has_errors())
}

fn run_dump(path: &Path, json: bool, config: &AppConfig) -> anyhow::Result<()> {
    let source = read_script(path)?;
    let program = msg_runtime::parse(&source)?;
    let events = Evaluator::with_page_break_marker(config.checker.page_break_marker.as_str())
        .evaluate(&program);

    if json {
        let value = serde_json::json!({
            "statements": program.statements,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# statements ({})", program.len());
    for statement in &program.statements {
        println!("{:>6}  {}", statement.position, statement.expression);
    }
    println!();
    println!("# events ({})", events.len());
    for (index, event) in events.iter().enumerate() {
        println!("{:>4}  {:?}", index, event);
    }
    Ok(())
}

fn run_play(
    path: &Path,
    preset: Option<TypewriterPreset>,
    typewriter: Option<&Path>,
    auto: bool,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    let source = read_script(path)?;
    let queue = play::build_queue(&source, &config)?;
    let json = read_typewriter(typewriter)?;
    config.typewriter = config.resolve_typewriter(preset, json.as_deref())?;
    info!(path = %path.display(), events = queue.len(), "开始播放");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = Player::new(
        queue,
        PlayOptions::from_config(&config, auto),
        stdin.lock(),
        stdout.lock(),
        thread::sleep,
    )
    .run()?;

    info!(pages = report.pages, chars = report.chars, "播放结束");
    Ok(())
}

fn run_init(path: &Path, force: bool, config: &AppConfig) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
    }
    config.save(path)?;
    println!("✅ 已写出配置文件: {}", path.display());
    Ok(())
}

fn run_type(
    text: &str,
    preset: Option<TypewriterPreset>,
    typewriter: Option<&Path>,
    config: AppConfig,
) -> anyhow::Result<()> {
    let frame = config.frame_interval();
    let json = read_typewriter(typewriter)?;
    let mut handler = MessageHandler::new(config.resolve_typewriter(preset, json.as_deref())?);

    let mut stdout = io::stdout().lock();
    let elapsed = play::type_text(&mut handler, text, &mut stdout, || thread::sleep(frame))?;
    stdout.flush()?;

    info!(elapsed_ms = elapsed.as_millis() as u64, "显示完成");
    Ok(())
}
