//! `bakefile` — the reference CLI driver over `bakefile-core`.
//!
//! Interprets a project described by a pre-parsed AST (the concrete
//! grammar/lexer is an external collaborator, so this driver accepts its
//! output pre-parsed, as JSON) and either runs the dependency ledger /
//! output writer, or dumps the built model for inspection.
//!
//! # Usage
//!
//! ```bash
//! bakefile project.bkl.json --verbose
//! bakefile project.bkl.json --dump-model
//! bakefile project.bkl.json --dry-run
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use bakefile_core::ast::ModuleAst;
use bakefile_core::builder::{Builder, NoSubmodules};
use bakefile_core::model::{Project, VarType};
use bakefile_core::registry::StaticPropertyRegistry;
use bakefile_core::writer::{Eol, OutputFile};
use bakefile_core::ModuleId;

/// Interpret a Bakefile project and report the resulting model.
#[derive(Parser, Debug)]
#[command(name = "bakefile")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a `.bkl` file's AST, encoded as JSON.
    ast: PathBuf,

    /// Info-level logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Debug-level logging; errors are reported with their full Debug
    /// representation instead of a single summary line.
    #[arg(long)]
    debug: bool,

    /// Suppress file writes; the model is still built and reported.
    #[arg(long)]
    dry_run: bool,

    /// Serialize the built model to `model.json` instead of running a
    /// back-end emitter.
    #[arg(long)]
    dump_model: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            // Argument errors exit 3, distinct from clap's own default of 2.
            let _ = err.print();
            return ExitCode::from(3);
        }
    };

    init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if args.debug {
                eprintln!("{err:?}");
            } else {
                eprintln!("{} {err}", "error:".red().bold());
            }
            ExitCode::from(1)
        }
    }
}

fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).without_time().init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.ast)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", args.ast.display()))?;
    let ast: ModuleAst = serde_json::from_str(&json)
        .map_err(|e| anyhow::anyhow!("parsing AST JSON in {}: {e}", args.ast.display()))?;

    let registry = StaticPropertyRegistry::standard();
    let mut loader = NoSubmodules;
    let mut builder = Builder::new(&registry, &mut loader);
    let srcdir = args
        .ast
        .parent()
        .map(|p| p.display().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let module_id = builder.build_module(&ast, &srcdir)?;

    for warning in builder.take_diagnostics() {
        tracing::warn!(pos = ?warning.pos, "{}", warning.message);
    }

    let project = builder.into_project();

    if args.dump_model {
        let dump = dump_model(&project, module_id);
        let mut out = OutputFile::new("model.json", Eol::Unix);
        out.write(&serde_json::to_string_pretty(&dump)?);
        out.commit(args.dry_run)?;
        return Ok(());
    }

    println!(
        "{} {} ({} target(s))",
        "built".green().bold(),
        ast.source_file,
        project.module(module_id).map(|m| m.targets().len()).unwrap_or(0)
    );

    Ok(())
}

#[derive(serde::Serialize)]
struct ModelDump {
    source_file: String,
    srcdir: String,
    variables: Vec<VariableDump>,
    sources: Vec<SourceFileDump>,
    headers: Vec<SourceFileDump>,
    targets: Vec<TargetDump>,
}

#[derive(serde::Serialize)]
struct VariableDump {
    name: String,
    value: String,
    var_type: String,
}

#[derive(serde::Serialize)]
struct SourceFileDump {
    path: String,
    condition: Option<String>,
}

#[derive(serde::Serialize)]
struct TargetDump {
    name: String,
    type_name: String,
    condition: Option<String>,
    variables: Vec<VariableDump>,
}

fn var_type_name(var_type: &VarType) -> String {
    match var_type {
        VarType::Any => "any".to_string(),
        VarType::List => "list".to_string(),
        VarType::Named(name) => name.clone(),
    }
}

fn dump_model(project: &Project, module_id: ModuleId) -> ModelDump {
    let module = project.module(module_id).expect("module was just built into this project");
    ModelDump {
        source_file: module.source_file().to_string(),
        srcdir: module.srcdir().to_string(),
        variables: module
            .variables()
            .iter()
            .map(|v| VariableDump {
                name: v.name().to_string(),
                value: v.value().to_string(),
                var_type: var_type_name(v.var_type()),
            })
            .collect(),
        sources: module.sources().iter().map(dump_source_file).collect(),
        headers: module.headers().iter().map(dump_source_file).collect(),
        targets: module
            .targets()
            .iter()
            .map(|t| TargetDump {
                name: t.name().to_string(),
                type_name: t.type_name().to_string(),
                condition: t.condition().map(|c| c.to_string()),
                variables: t
                    .variables()
                    .iter()
                    .map(|v| VariableDump {
                        name: v.name().to_string(),
                        value: v.value().to_string(),
                        var_type: var_type_name(v.var_type()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn dump_source_file(sf: &bakefile_core::model::SourceFile) -> SourceFileDump {
    SourceFileDump {
        path: sf.path().to_string(),
        condition: sf.condition().map(|c| c.to_string()),
    }
}
