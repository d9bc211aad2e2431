use anyhow::{Result, bail};
use clap::Parser;
use std::process::Command;

const DEFAULT_IMAGE: &str =
    "ghcr.io/bitaxeorg/esp-miner/devcontainer:sha-6a7c499a5dd8f985a578a05e04eba3fa9f93f1f7";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Run ESP-Miner builds inside a container", long_about = None)]
struct Cli {
    /// Container image for the build environment
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// Build command to run inside the container (default: idf.py build)
    #[arg(trailing_var_arg = true)]
    build_cmd: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = find_container_runtime()?;
    let workspace = std::env::current_dir()?.to_string_lossy().into_owned();
    let name = format!("esp-miner-{}", std::process::id());
    let mount = format!("{workspace}:{workspace}:rw,z");

    let build_cmd: Vec<String> = if cli.build_cmd.is_empty() {
        vec!["idf.py".to_string(), "build".to_string()]
    } else {
        cli.build_cmd
    };

    println!("Running {} via {}...", build_cmd.join(" "), runtime);
    let status = Command::new(&runtime)
        .args([
            "run",
            "--rm",
            "-it",
            "--name",
            name.as_str(),
            "-v",
            mount.as_str(),
            "-w",
            workspace.as_str(),
            cli.image.as_str(),
        ])
        .args(&build_cmd)
        .status()?;
    if !status.success() {
        bail!("Build failed");
    }

    Ok(())
}

/// Return the first available container runtime (podman or docker).
fn find_container_runtime() -> Result<String> {
    for runtime in ["podman", "docker"] {
        if Command::new(runtime).arg("--version").output().is_ok() {
            return Ok(runtime.to_string());
        }
    }
    bail!("neither podman nor docker was found in PATH")
}
