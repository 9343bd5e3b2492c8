use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use imaginex_artifacts::{BuildVariant, DependencyArtifact};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the imaginex image optimizer workspace",
    long_about = "Builds and packages the optimizer Lambda, reports where the packaged\n\
                  artifacts live, invokes the handler locally and runs CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Lambda binary and write the archives the artifact locator points at.
    ///
    /// Only `code.zip` is built from source. The `layer/` directory next to the
    /// locator crate is staged by hand (shared assets, config files); the
    /// bundled-layer variant ships it as-is and bundled-dependencies zips it.
    Package {
        /// Which dependency layout to produce
        #[arg(value_enum, long, default_value_t = Variant::BundledLayer)]
        variant: Variant,
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Print the artifact location set for a variant as JSON
    Locate {
        #[arg(value_enum, long, default_value_t = Variant::BundledLayer)]
        variant: Variant,
    },
    /// Run the optimizer handler once against a saved API Gateway event
    InvokeLocal {
        /// Event JSON file
        #[arg(long, default_value = "crates/imaginex_lambda/events/event-absolute.json")]
        event: String,
        /// Where to write the optimized image
        #[arg(long)]
        output: Option<String>,
        /// Bucket used for relative urls
        #[arg(long, env = "S3_BUCKET_NAME")]
        bucket: Option<String>,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    BundledLayer,
    ExternalLayers,
    BundledDependencies,
}

impl From<Variant> for BuildVariant {
    fn from(value: Variant) -> Self {
        match value {
            Variant::BundledLayer => Self::BundledLayer,
            Variant::ExternalLayers => Self::ExternalLayers,
            Variant::BundledDependencies => Self::BundledDependencies,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_optimizer_lambda(variant: BuildVariant, target: &str, profile: BuildProfile) {
    let locator = imaginex_artifacts::installed()
        .unwrap_or_else(|error| panic!("cannot resolve artifact locations: {error}"));
    let locations = locator.location_set(variant);

    ensure_rust_target_installed(target);
    ensure_c_linker_available(target);

    step("Build optimizer lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        "imaginex_lambda",
        "--target",
        target,
        "--bin",
        "optimizer_lambda",
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step(&format!("Package {variant} lambda artifacts"));
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    fs::create_dir_all(locator.module_dir()).expect("failed to create artifact directory");

    package_lambda_zip(
        &target_dir.join(binary_name("optimizer_lambda", target)),
        &locations.code_path,
    );

    let dependency_summary = match &locations.dependency {
        DependencyArtifact::LayerPath(layer_dir) => {
            fs::create_dir_all(layer_dir).expect("failed to create layer directory");
            warn_if_unstaged(layer_dir);
            format!("- layer directory {}", layer_dir.display())
        }
        DependencyArtifact::DependencyPath(archive) => {
            let staging = locator.module_dir().join(imaginex_artifacts::LAYER_DIR);
            fs::create_dir_all(&staging).expect("failed to create layer staging directory");
            warn_if_unstaged(&staging);
            let entries = package_directory_zip(&staging, archive);
            format!("- {} ({entries} entries)", archive.display())
        }
        DependencyArtifact::LayerArns(arns) => {
            format!("- external layers: {}", arns.join(", "))
        }
    };

    eprintln!(
        "\nPackaged artifacts:\n- {}\n{dependency_summary}\nhandler: {}",
        locations.code_path.display(),
        locations.handler,
    );
}

fn warn_if_unstaged(layer_dir: &Path) {
    if directory_is_empty(layer_dir) {
        eprintln!(
            "warning: layer directory '{}' is empty; stage layer files there by hand before deploying",
            layer_dir.display()
        );
    }
}

fn directory_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    if !target_is_listed(&String::from_utf8_lossy(&output.stdout), target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- package`"
        );
    }
}

fn target_is_listed(installed: &str, target: &str) -> bool {
    installed.lines().any(|line| line.trim() == target)
}

/// Linker commands to try, in order: per-target and generic `CC` overrides, then the default.
fn linker_candidates(target: &str, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let override_keys = [
        format!("CC_{}", target.replace('-', "_")),
        format!("CC_{target}"),
        "TARGET_CC".to_string(),
        "CC".to_string(),
    ];

    override_keys
        .iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .chain(std::iter::once(CROSS_LINKER.to_string()))
        .collect()
}

const CROSS_LINKER: &str = "x86_64-linux-gnu-gcc";

fn ensure_c_linker_available(target: &str) {
    if !cfg!(windows) || !target.ends_with("unknown-linux-gnu") {
        return;
    }

    let canonical = CROSS_LINKER;
    if linker_candidates(target, |key| std::env::var(key).ok())
        .iter()
        .any(|candidate| tool_works(candidate))
    {
        return;
    }

    panic!("{}", missing_linker_message(target, canonical));
}

fn missing_linker_message(target: &str, canonical: &str) -> String {
    format!(
        "missing C cross-linker for target `{target}`. install `{canonical}` (or set CC_x86_64_unknown_linux_gnu) before running `cargo run -p xtask -- package`.\n\
         Tip: the AWS SDK's TLS and crypto crates (aws-lc-sys, ring) build C code and need a Linux toolchain when cross-compiling from Windows."
    )
}

fn tool_works(program: &str) -> bool {
    let mut parts = program.split_whitespace();
    let Some(bin) = parts.next() else {
        return false;
    };
    let args: Vec<&str> = parts.collect();

    Command::new(bin)
        .args(&args)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

/// Zips every file under `source_dir` with paths relative to it. Returns the entry count.
fn package_directory_zip(source_dir: &Path, zip_path: &Path) -> usize {
    let mut files = Vec::new();
    collect_files(source_dir, &mut files);
    files.sort();

    let file = fs::File::create(zip_path).expect("failed to create dependency zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let relative = path
            .strip_prefix(source_dir)
            .expect("collected file should live under the source directory");
        let entry_name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = fs::read(path).expect("failed to read layer file");
        zip.start_file(entry_name, options)
            .expect("failed to start dependency zip entry");
        zip.write_all(&contents)
            .expect("failed to write dependency zip entry");
    }

    zip.finish().expect("failed to finish dependency zip");
    files.len()
}

fn collect_files(dir: &Path, files: &mut Vec<std::path::PathBuf>) {
    let entries = fs::read_dir(dir).expect("failed to read layer directory");
    for entry in entries {
        let path = entry.expect("failed to read layer directory entry").path();
        if path.is_dir() {
            collect_files(&path, files);
        } else {
            files.push(path);
        }
    }
}

fn print_location_set(variant: BuildVariant) {
    let locations = imaginex_artifacts::installed_location_set(variant)
        .unwrap_or_else(|error| panic!("cannot resolve artifact locations: {error}"));
    let json =
        serde_json::to_string_pretty(locations).expect("location set should serialize to json");
    println!("{json}");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test workspace");
    run_cargo(&["test", "--workspace"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Package {
            variant,
            target,
            profile,
        } => {
            package_optimizer_lambda(variant.into(), &target, profile);
        }
        Commands::Locate { variant } => print_location_set(variant.into()),
        Commands::InvokeLocal {
            event,
            output,
            bucket,
        } => {
            let mut args = vec![
                "run",
                "-p",
                "imaginex_lambda",
                "--bin",
                "local_invoke",
                "--",
                event.as_str(),
            ];
            if let Some(path) = output.as_deref() {
                args.push(path);
            }
            if let Some(bucket) = bucket.as_deref() {
                std::env::set_var("S3_BUCKET_NAME", bucket);
            }
            run_cargo(&args);
        }
        Commands::Ci => {
            ci_check();
            eprintln!("\nCI job passed.");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn variant_flags_map_onto_build_variants() {
        assert_eq!(
            BuildVariant::from(Variant::ExternalLayers),
            BuildVariant::ExternalLayers
        );
        assert_eq!(
            BuildVariant::from(Variant::BundledDependencies).handler(),
            "imaginex_lambda/handler.handler"
        );
    }

    #[test]
    fn lambda_zip_contains_executable_bootstrap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = dir.path().join("optimizer_lambda");
        fs::write(&binary, b"\x7fELF-binary").expect("write binary");
        let zip_path = dir.path().join("code.zip");

        package_lambda_zip(&binary, &zip_path);

        let mut archive =
            zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("read zip");
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name("bootstrap").expect("bootstrap entry");
        assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o755));
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).expect("read entry");
        assert_eq!(contents, b"\x7fELF-binary");
    }

    #[test]
    fn directory_zip_uses_relative_forward_slash_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let staging = dir.path().join("layer");
        fs::create_dir_all(staging.join("share/icc")).expect("create staging");
        fs::write(staging.join("README"), b"layer").expect("write readme");
        fs::write(staging.join("share/icc/srgb.icc"), b"icc").expect("write profile");
        let zip_path = dir.path().join("dependencies.zip");

        let entries = package_directory_zip(&staging, &zip_path);

        assert_eq!(entries, 2);
        let mut archive =
            zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("read zip");
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["README", "share/icc/srgb.icc"]);
        assert!(archive.by_name("share/icc/srgb.icc").is_ok());
    }

    #[test]
    fn empty_staging_directory_yields_empty_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let zip_path = dir.path().join("dependencies.zip");

        assert_eq!(package_directory_zip(dir.path(), &zip_path), 0);
        let archive =
            zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("read zip");
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn detects_unstaged_layer_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(directory_is_empty(dir.path()));
        assert!(directory_is_empty(&dir.path().join("missing")));

        fs::write(dir.path().join("config.json"), b"{}").expect("write layer file");
        assert!(!directory_is_empty(dir.path()));
    }

    #[test]
    fn linker_hint_names_the_crates_that_need_a_c_toolchain() {
        let message = missing_linker_message("x86_64-unknown-linux-gnu", "x86_64-linux-gnu-gcc");
        assert!(message.contains("x86_64-linux-gnu-gcc"));
        assert!(message.contains("AWS SDK"));
        assert!(!message.contains("image codecs"));
    }

    #[test]
    fn matches_installed_targets_by_whole_line() {
        let installed = "wasm32-unknown-unknown\n x86_64-unknown-linux-gnu \n";
        assert!(target_is_listed(installed, "x86_64-unknown-linux-gnu"));
        assert!(!target_is_listed(installed, "x86_64-unknown-linux"));
    }

    #[test]
    fn linker_overrides_come_before_the_default_cross_linker() {
        let candidates = linker_candidates("x86_64-unknown-linux-gnu", |key| match key {
            "CC_x86_64_unknown_linux_gnu" => Some(" zig cc ".to_string()),
            "TARGET_CC" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(candidates, vec!["zig cc", "x86_64-linux-gnu-gcc"]);
    }
}
