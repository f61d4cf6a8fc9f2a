use clap::CommandFactory;
use clap::{Parser, Subcommand};
use clap_complete::ArgValueCompleter;
use clap_complete::CompletionCandidate;
use comfy_table::{Attribute, Cell, Table};
use crossterm::style::Stylize;
use devcall::bundle;
use devcall::exceptions::DevcallError;
use devcall::models::ProcInfo;
use devcall::registry::ProcPath;
use std::io::Read;

// Use jemalloc on musl x86_64 for better performance
#[cfg(all(target_env = "musl", target_arch = "x86_64"))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser)]
#[command(
    name = "devcall",
    about = "Composable dev-workflow procedures from the terminal",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\n",
        "Build Information:\n",
        "  Timestamp:         ", env!("VERGEN_BUILD_TIMESTAMP"), "\n",
        "  Target Triple:     ", env!("VERGEN_CARGO_TARGET_TRIPLE"), "\n",
        "\n",
        "Source Control:\n",
        "  Commit SHA:        ", env!("VERGEN_GIT_SHA"), "\n",
        "  Commit Timestamp:  ", env!("VERGEN_GIT_COMMIT_TIMESTAMP"), "\n",
        "  Branch:            ", env!("VERGEN_GIT_BRANCH"), "\n",
        "\n",
        "Compiler:\n",
        "  Rustc Version:     ", env!("VERGEN_RUSTC_SEMVER"), "\n",
        "  Rustc Channel:     ", env!("VERGEN_RUSTC_CHANNEL"), "\n",
        "  Host Triple:       ", env!("VERGEN_RUSTC_HOST_TRIPLE"), "\n"
    ),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every procedure the bundle registers.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one procedure's provider and summary.
    Describe {
        #[arg(add = ArgValueCompleter::new(procedure_completer))]
        procedure: String,
    },
    /// Invoke a procedure with JSON arguments.
    ///
    /// ARGS is a JSON object literal, or '-' to read it from stdin.
    /// Omitting it passes an empty object:
    ///   devcall call git.status
    ///   devcall call fs.write '{"path": "notes.txt", "content": "hi"}'
    Call {
        #[arg(add = ArgValueCompleter::new(procedure_completer))]
        procedure: String,
        #[arg(allow_hyphen_values = true)]
        args: Option<String>,
    },
    /// List the bundled providers in registration order.
    Providers,
    /// Show instructions for enabling shell completions.
    Completions,
}

fn main() {
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { json } => cmd_list(json),
        Commands::Describe { procedure } => cmd_describe(&procedure),
        Commands::Call { procedure, args } => cmd_call(&procedure, args),
        Commands::Providers => cmd_providers(),
        Commands::Completions => {
            println!(
                "Bash:\n\
                echo \"source <(COMPLETE=bash devcall)\" >> ~/.bashrc\n\
                \n\
                Elvish:\n\
                echo \"eval (E:COMPLETE=elvish devcall | slurp)\" >> ~/.elvish/rc.elv\n\
                \n\
                Fish:\n\
                echo \"COMPLETE=fish devcall | source\" >> ~/.config/fish/config.fish\n\
                \n\
                Zsh:\n\
                echo \"source <(COMPLETE=zsh devcall)\" >> ~/.zshrc\n"
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_list(json: bool) -> Result<(), DevcallError> {
    let registry = bundle::shared()?;

    let infos: Vec<ProcInfo> = registry
        .procedures()
        .map(|registration| ProcInfo {
            path: registration.path().to_string(),
            provider: registration.provider().to_string(),
            summary: registration.summary().to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Procedure").add_attribute(Attribute::Bold),
        Cell::new("Provider").add_attribute(Attribute::Bold),
        Cell::new("Summary").add_attribute(Attribute::Bold),
    ]);
    for info in &infos {
        table.add_row(vec![&info.path, &info.provider, &info.summary]);
    }
    println!("{}", table);

    Ok(())
}

fn cmd_describe(procedure: &str) -> Result<(), DevcallError> {
    let registry = bundle::shared()?;
    let path = ProcPath::parse(procedure)?;
    let registration = registry
        .get(&path)
        .ok_or_else(|| DevcallError::UnknownProcedure(procedure.to_string()))?;

    let width = devcall::console::get_terminal_width();
    let provider_line = format!("provider: {}", registration.provider());
    let provider_line = if devcall::console::is_stdout_terminal() {
        provider_line.dim().to_string()
    } else {
        provider_line
    };

    devcall::console::draw_panel(
        &registration.path().to_string(),
        &[registration.summary().to_string(), provider_line],
        width,
    );
    Ok(())
}

fn cmd_call(procedure: &str, args: Option<String>) -> Result<(), DevcallError> {
    let registry = bundle::shared()?;
    let path = ProcPath::parse(procedure)?;

    let raw = match args.as_deref() {
        None => "{}".to_string(),
        Some("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        Some(text) => text.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| DevcallError::InvalidInput(format!("arguments are not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(DevcallError::InvalidInput(
            "procedure arguments must be a JSON object".to_string(),
        ));
    }

    let result = registry.call(&path, value)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_providers() -> Result<(), DevcallError> {
    let registry = bundle::shared()?;
    for name in registry.provider_names() {
        println!("{}", name);
    }
    Ok(())
}

fn procedure_completer(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    if let Ok(registry) = devcall::bundle::shared() {
        let current_input = current.to_string_lossy();
        registry
            .procedures()
            .map(|registration| registration.path().to_string())
            .filter(|p| p.starts_with(current_input.as_ref()))
            .map(CompletionCandidate::new)
            .collect()
    } else {
        vec![]
    }
}
