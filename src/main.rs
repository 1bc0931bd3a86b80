use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use capsule::ast::DeclOrigin;
use capsule::config::{Config, OutputFormat};
use capsule::diagnostics::{CompileError, render_error};
use capsule::sugar::SugarCtx;

#[derive(Parser)]
#[command(name = "capsule", version, about = "Expand partial application, lambda and object literal sugar")]
struct Cli {
    /// Path to a capsule.toml (defaults to the nearest one above the input file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Desugar a JSON program and print the result
    Expand {
        /// Program file (.json)
        file: PathBuf,
        /// Output format, overriding capsule.toml
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Source text the program's spans point into, for labelled diagnostics
        #[arg(long)]
        source: Option<PathBuf>,
        /// Print every generated declaration to stderr
        #[arg(short, long)]
        verbose: bool,
    },
    /// Desugar a JSON program and report errors only
    Check {
        /// Program file (.json)
        file: PathBuf,
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Expand { file, format, source, verbose } => {
            let config = load_config(cli.config.as_deref(), &file);
            let format = match format {
                Some(FormatArg::Pretty) => OutputFormat::Pretty,
                Some(FormatArg::Json) => OutputFormat::Json,
                None => config.output.format,
            };
            let verbose = verbose || config.desugar.verbose;

            let (program, ctx) = desugar_file(&file, source.as_deref());
            if verbose {
                for (name, origin) in &ctx.registry.generated {
                    let how = match origin {
                        DeclOrigin::Hoisted => "hoisted",
                        _ => "inline",
                    };
                    eprintln!("  generated {name} ({how})");
                }
                eprintln!("{}: {} declaration(s) generated", file.display(), ctx.registry.len());
            }

            match format {
                OutputFormat::Pretty => print!("{}", capsule::pretty::pretty_print(&program)),
                OutputFormat::Json => match serde_json::to_string_pretty(&program) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: could not serialize program: {e}");
                        std::process::exit(1);
                    }
                },
            }
        }
        Commands::Check { file, source } => {
            let (_, ctx) = desugar_file(&file, source.as_deref());
            eprintln!("{}: ok ({} declaration(s) generated)", file.display(), ctx.registry.len());
        }
    }
}

fn load_config(explicit: Option<&Path>, input: &Path) -> Config {
    let result = match explicit {
        Some(path) => Config::load(path),
        None => {
            let dir = input.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            Config::discover(dir)
        }
    };
    result.unwrap_or_else(|err| fail(&err, None, "capsule.toml"))
}

fn desugar_file(file: &Path, source: Option<&Path>) -> (capsule::ast::Program, SugarCtx) {
    let filename = file.display().to_string();
    let json = std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("error: could not read {filename}: {e}");
        std::process::exit(1);
    });
    let mut program = capsule::parse_program(&json).unwrap_or_else(|err| fail(&err, None, &filename));

    let mut ctx = SugarCtx::new();
    if let Err(err) = capsule::desugar_with(&mut program, &mut ctx) {
        let text = source.and_then(|p| std::fs::read_to_string(p).ok());
        fail(&err, text.as_deref(), &filename);
    }
    (program, ctx)
}

fn fail(err: &CompileError, source: Option<&str>, filename: &str) -> ! {
    match source {
        Some(text) => {
            if let Err(e) = render_error(text, filename, err) {
                eprintln!("error: could not render diagnostics: {e}");
                for e in err.flatten() {
                    eprintln!("error [{filename}]: {e}");
                }
            }
        }
        None => {
            for e in err.flatten() {
                eprintln!("error [{filename}]: {e}");
            }
        }
    }
    std::process::exit(1);
}
