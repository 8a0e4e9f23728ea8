// acdc-cli/src/main.rs

use acdc_core::scanner::Scanner;
use acdc_core::{analyze, Analysis};
use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 出力する内容の種類
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// 生成した`dc`のプログラム
    #[default]
    Code,
    /// トークン列(1行に1トークン)
    Tokens,
    /// 型検査済みASTの構造表現
    Ast,
    /// コード生成後の記号表
    Symbols,
}

/// コマンドライン引数を定義するための構造体
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// ソースファイルのパス。`-`で標準入力から読む
    input: String,
    /// 出力先のファイル。省略すると標準出力に書く
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Emit::Code)]
    emit: Emit,
    /// ログの詳細度(-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// 入力パスからScannerを作る。ファイルの読み込みはScannerに任せる。
fn open_input(input: &str) -> anyhow::Result<Scanner> {
    if input == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|err| anyhow!("failed to read standard input: {err}"))?;
        return Ok(Scanner::new(&source));
    }
    Ok(Scanner::from_path(input)?)
}

/// 意味エラーがあれば全件をまとめたエラーにする
fn semantic_failure(analysis: &Analysis) -> Option<anyhow::Error> {
    analysis
        .has_errors()
        .then(|| anyhow!("Semantic Error:\n{}", analysis.log()))
}

/// 書き出すテキストと、書き出した後に報告する失敗
struct Rendered {
    text: String,
    failure: Option<anyhow::Error>,
}

impl Rendered {
    fn ok(text: String) -> Self {
        Self {
            text,
            failure: None,
        }
    }
}

fn render(mut scanner: Scanner, emit: Emit) -> anyhow::Result<Rendered> {
    match emit {
        Emit::Tokens => {
            let tokens = scanner.tokenize_all()?;
            Ok(Rendered::ok(
                tokens
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ))
        }
        // 意味エラーがあってもASTは書き出してから失敗させる
        Emit::Ast => {
            let analysis = analyze(scanner)?;
            Ok(Rendered {
                text: analysis.program.to_string(),
                failure: semantic_failure(&analysis),
            })
        }
        Emit::Code => {
            let mut analysis = analyze(scanner)?;
            if let Some(failure) = semantic_failure(&analysis) {
                return Err(failure);
            }
            Ok(Rendered::ok(analysis.generate()?))
        }
        Emit::Symbols => {
            let mut analysis = analyze(scanner)?;
            if let Some(failure) = semantic_failure(&analysis) {
                return Err(failure);
            }
            analysis.generate()?;
            Ok(Rendered::ok(analysis.symbol_table().dump()))
        }
    }
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .map_err(|err| anyhow!("failed to write '{}': {err}", path.display()))?;
            info!(output = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    info!(input = %cli.input, emit = ?cli.emit, "compiling");
    let scanner = open_input(&cli.input)?;
    let rendered = render(scanner, cli.emit)?;
    write_output(cli.output.as_deref(), &rendered.text)?;
    match rendered.failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    // コマンドライン引数をパース(不正な引数はclapが終了コード2で終了する)
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("compilation failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
