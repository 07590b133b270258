use clap::{Parser, Subcommand};
use dialoguer::Input;
use duo_scaffold::{
  app::{self, ApiConfig, DEFAULT_WEB_PORT, ListenConfig},
  coverage,
  generate::{self, GenerateOptions, ProjectName},
  util::init_tracing,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duo-scaffold", version, about = "Two-service demo scaffold")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run the API service (HOST, PORT, DUO_SCAFFOLD_DATABASE)
  Api,
  /// Run the web app (HOST, PORT)
  Web,
  /// Create a new project from this template
  Generate {
    /// Project name in kebab-case; prompted for when omitted
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value = ".")]
    template: PathBuf,
    /// Directory the project folder is created in
    #[arg(long, default_value = ".")]
    out: PathBuf,
    #[arg(long)]
    force: bool,
  },
  /// Merge coverage reports; missing inputs are skipped
  Coverage {
    #[arg(long, default_value = coverage::DEFAULT_OUTPUT)]
    output: PathBuf,
    reports: Vec<PathBuf>,
  },
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  init_tracing();

  if let Err(e) = run(cli.command).await {
    eprintln!("error: {e:#}");
    std::process::exit(1);
  }
}

async fn run(command: Command) -> anyhow::Result<()> {
  match command {
    Command::Api => app::run_api(ApiConfig::from_env()?).await,
    Command::Web => app::run_web(ListenConfig::from_env(DEFAULT_WEB_PORT)).await,
    Command::Generate {
      name,
      template,
      out,
      force,
    } => {
      let name = match name {
        Some(raw) => ProjectName::parse(&raw)?,
        None => prompt_name()?,
      };
      let report = generate::generate(&GenerateOptions {
        name,
        template,
        out_dir: out,
        force,
      })?;
      println!(
        "Created {} ({} files)",
        report.destination.display(),
        report.files_written
      );
      Ok(())
    }
    Command::Coverage { output, reports } => {
      let reports = if reports.is_empty() {
        coverage::DEFAULT_REPORTS.iter().map(PathBuf::from).collect()
      } else {
        reports
      };
      let summary = coverage::combine_reports(&reports, &output)?;
      println!(
        "Combined {} report(s), {} skipped, {} file entries merged into {}",
        summary.reports_read,
        summary.reports_skipped,
        summary.files_merged,
        output.display()
      );
      Ok(())
    }
  }
}

fn prompt_name() -> anyhow::Result<ProjectName> {
  let raw: String = Input::new()
    .with_prompt("Project name")
    .validate_with(|input: &String| -> Result<(), String> {
      ProjectName::parse(input)
        .map(|_| ())
        .map_err(|e| e.to_string())
    })
    .interact_text()?;
  Ok(ProjectName::parse(&raw)?)
}
