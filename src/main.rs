use anyhow::Context;
use asset_deps::bundle::{BundleOptions, BundlePlan, Environment, Esbuild};
use asset_deps::{Emission, Manifest, Notice};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum GroupArg {
    Head,
    Footer,
    #[default]
    All,
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Raise the log level, can be repeated.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the emission order of a manifest as JSON.
    Resolve {
        manifest: Utf8PathBuf,
        #[arg(long, value_enum, default_value_t)]
        group: GroupArg,
    },
    /// Print the dependency graph of a manifest as a Mermaid diagram.
    Graph { manifest: Utf8PathBuf },
    /// Print the vendor bundle plan for a package.json as JSON.
    Plan {
        package: Utf8PathBuf,
        #[arg(long, default_value = "production")]
        env: Environment,
        #[arg(long)]
        target: Option<Utf8PathBuf>,
    },
    /// Copy vendor files and compile packages.
    Bundle {
        package: Utf8PathBuf,
        #[arg(long, default_value = "production")]
        env: Environment,
        #[arg(long)]
        target: Option<Utf8PathBuf>,
        /// Path to the esbuild binary.
        #[arg(long, default_value = "esbuild")]
        esbuild: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn plan(package: &Utf8Path, env: Environment, target: Option<Utf8PathBuf>) -> anyhow::Result<BundlePlan> {
    let base = match package.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
        _ => Utf8PathBuf::from("."),
    };

    let mut options = BundleOptions::from_env(base)
        .environment(env)
        .package_json(package)
        .with_context(|| format!("reading {package}"))?;

    options.build_target = target;

    Ok(BundlePlan::new(&options))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Resolve { manifest, group } => {
            let mut scripts = Manifest::from_path(&manifest)?.into_scripts();

            let emitted: Vec<Emission> = match group {
                GroupArg::Head => scripts.do_head_items(),
                GroupArg::Footer => scripts.do_footer_items(),
                GroupArg::All => {
                    let mut emitted = scripts.do_head_items();
                    emitted.extend(scripts.do_footer_items());
                    emitted
                }
            };

            println!("{}", serde_json::to_string_pretty(&emitted)?);

            let missing = scripts
                .notices()
                .iter()
                .filter(|notice| matches!(notice, Notice::MissingDependency { .. }))
                .count();

            if missing > 0 {
                eprintln!("{missing} queued script(s) skipped, see warnings above");
            }
        }
        Command::Graph { manifest } => {
            let scripts = Manifest::from_path(&manifest)?.into_scripts();
            print!("{}", scripts.registry());

            for cycle in scripts.registry().cycles() {
                eprintln!("cycle: {}", cycle.join(" -> "));
            }
        }
        Command::Plan {
            package,
            env,
            target,
        } => {
            let plan = plan(&package, env, target)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Bundle {
            package,
            env,
            target,
            esbuild,
        } => {
            let plan = plan(&package, env, target)?;
            let esbuild = Esbuild { binary: esbuild };

            let copied = plan.copy(&esbuild)?;
            plan.compile(&esbuild)?;

            if let Some(port) = plan.live_reload_port {
                tracing::info!(port, "live reload port");
            }

            eprintln!(
                "Wrote {} vendor files and {} packages to {}",
                copied.len(),
                plan.entries.len(),
                plan.base_dir.join(&plan.target)
            );
            eprintln!("Asset manifest: {}", plan.asset_manifest);
        }
    }

    Ok(())
}
