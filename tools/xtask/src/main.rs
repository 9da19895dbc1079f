//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `script-check`: 检查脚本文件（语法、命令名、未结束的页）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use msg_runtime::{Checker, CheckerConfig, DiagnosticResult};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

/// 默认脚本目录（相对于 workspace root）
const SCRIPTS_DIR: &str = "scripts";

/// 宿主配置文件，读取其中的 `known_commands` 与 `page_break_marker`
const CONFIG_FILE: &str = "config.json";

/// 脚本文件扩展名
const SCRIPT_EXTENSIONS: [&str; 2] = ["txt", "msg"];

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => check_all()?,
        "script-check" => {
            let path = args.next();
            script_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  script-check    检查脚本文件

SCRIPT-CHECK:
  cargo xtask script-check [path]

  不带参数：检查 scripts/ 下所有 .txt / .msg 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - 脚本语法错误
    - 重复的参数名
    - 未登记的命令名（config.json 中的 known_commands）
    - 最后一个翻页之后的正文

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo script-check  -> cargo xtask script-check
"#
    );
}

//=============================================================================
// script-check 命令实现
//=============================================================================

/// 脚本检查结果
struct ScriptCheckResult {
    /// 检查的脚本数量
    scripts_checked: usize,
    /// 无法读取的文件数量
    read_errors: usize,
    /// 诊断结果
    diagnostics: DiagnosticResult,
}

/// 执行脚本检查
fn script_check(path: Option<&str>) -> anyhow::Result<()> {
    // 确定要检查的文件
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_script_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCRIPTS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认脚本目录不存在: {}\n请在 workspace 根目录运行，或指定脚本路径",
                    dir.display()
                );
            }
            collect_script_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到脚本文件（.txt / .msg）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个脚本文件...\n", files.len());

    let checker = load_checker(Path::new(CONFIG_FILE))?;
    let mut result = ScriptCheckResult {
        scripts_checked: 0,
        read_errors: 0,
        diagnostics: DiagnosticResult::new(),
    };

    for file in &files {
        check_script_file(file, &checker, &mut result);
    }

    print_check_result(&result);

    // 如果有错误则返回失败
    if result.read_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("脚本检查发现错误");
    }

    Ok(())
}

/// 按宿主配置创建检查器；没有配置文件时使用默认配置
fn load_checker(config_path: &Path) -> anyhow::Result<Checker> {
    if !config_path.exists() {
        return Ok(Checker::from_config(&CheckerConfig::default()));
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("读取配置失败: {}", config_path.display()))?;
    let config: CheckerConfig = serde_json::from_str(&content)
        .with_context(|| format!("解析配置失败: {}", config_path.display()))?;

    Ok(Checker::from_config(&config))
}

/// 收集目录下的所有脚本文件
fn collect_script_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();
    files
}

/// 检查单个脚本文件
fn check_script_file(file: &Path, checker: &Checker, result: &mut ScriptCheckResult) {
    let script_id = file.display().to_string();
    result.scripts_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", script_id, e);
            result.read_errors += 1;
            return;
        }
    };

    result.diagnostics.merge(checker.check(&script_id, &content));
}

/// 输出检查结果
fn print_check_result(result: &ScriptCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个脚本", result.scripts_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{}", diag);
    }

    // 汇总
    let error_count = result.read_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
