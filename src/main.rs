//! Command-line front end for the responsive image loader.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use imgproxy_responsive::batch::load_directory;
use imgproxy_responsive::{LoaderOptions, LoaderRequest, ResponsiveImageLoader, UrlRegistry};

/// Generate responsive imgproxy descriptors for breakpoint-named images.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Loader configuration file (JSON or YAML). Defaults to `imgproxy.config.{json,yaml,yml}`
    /// in the current directory.
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a single image and print the resulting module source
    Load {
        /// Image being processed
        #[arg(value_hint = clap::ValueHint::FilePath)]
        resource: PathBuf,

        /// Directory the image name is resolved against (defaults to the image's parent)
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        context: Option<PathBuf>,

        /// Upstream module source; read from stdin when omitted
        #[arg(long)]
        source: Option<String>,
    },

    /// Process every image of a directory and print the descriptors as JSON
    Batch {
        /// Directory holding one image per breakpoint
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Public URL prefix the bundler serves the directory under
        #[arg(short, long, default_value = "/")]
        public_path: String,

        /// Write the aggregated proxy URLs to this file
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        urls_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    run(cli, &cwd, &mut io::stdin().lock(), &mut io::stdout().lock())
}

/// Execute `cli` with relative paths resolved against `cwd`.
fn run(cli: Cli, cwd: &Path, stdin: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let options = load_options(cli.config.as_deref(), cwd)?;
    let loader = ResponsiveImageLoader::new(&options);
    let registry = UrlRegistry::new();

    match cli.command {
        Commands::Load {
            resource,
            context,
            source,
        } => {
            let resource = cwd.join(resource);
            let context = match context {
                Some(context) => cwd.join(context),
                None => resource
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            };
            let source = match source {
                Some(source) => source,
                None => {
                    let mut buffer = String::new();
                    stdin
                        .read_to_string(&mut buffer)
                        .context("failed to read upstream module source from stdin")?;
                    buffer
                }
            };

            let request = LoaderRequest {
                resource_path: &resource,
                context: &context,
                source: &source,
            };
            writeln!(out, "{}", loader.load_module(&request, &registry)?)?;
        }
        Commands::Batch {
            dir,
            public_path,
            urls_out,
        } => {
            let results = load_directory(&loader, &cwd.join(dir), &public_path, &registry)?;
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(&results).context("failed to serialise results")?
            )?;
            if let Some(path) = urls_out {
                registry.write_manifest(&cwd.join(path))?;
            }
        }
    }

    Ok(())
}

fn load_options(config: Option<&Path>, cwd: &Path) -> Result<LoaderOptions> {
    match config {
        Some(path) => {
            let path = cwd.join(path);
            LoaderOptions::from_path(&path)
                .with_context(|| format!("invalid loader configuration in {}", path.display()))
        }
        None => Ok(LoaderOptions::discover(cwd)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use imgproxy_responsive::LoaderResult;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn write_config(dir: &Path, file_name: &str, disable: bool) {
        let config = json!({
            "breakpoints": [{ "name": "mobile" }, { "name": "desktop", "minWidth": 768 }],
            "imgproxy": {
                "disable": disable,
                "imagesHost": "https://static.example.com",
                "host": "https://img.example.com"
            }
        });
        fs::write(dir.join(file_name), config.to_string()).unwrap();
    }

    fn run_with(args: &[&str], cwd: &Path, stdin: &str) -> Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, cwd, &mut stdin.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn load_reads_source_from_stdin_and_defaults_context_to_parent() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "imgproxy.config.json", true);
        fs::create_dir(dir.path().join("hero")).unwrap();

        let output = run_with(
            &["imgproxy-responsive", "load", "hero/desktop.png"],
            dir.path(),
            "module.exports = \"/build/hero/desktop-1a2b.png\";\n",
        )
        .unwrap();

        let result = LoaderResult::from_module_source(&output).unwrap();
        assert_eq!(result.order, 1);
        assert_eq!(result.fallback_src, "/build/hero/desktop-1a2b.png");
        assert_eq!(result.data[0].breakpoint_media.as_deref(), Some("(min-width: 768px)"));
    }

    #[test]
    fn load_prefers_source_argument_and_explicit_context() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "custom.json", true);

        let output = run_with(
            &[
                "imgproxy-responsive",
                "--config",
                "custom.json",
                "load",
                "img/hero/all.jpg",
                "--context",
                "img/hero",
                "--source",
                "module.exports = \"/all.jpg\";",
            ],
            dir.path(),
            "ignored",
        )
        .unwrap();

        let result = LoaderResult::from_module_source(&output).unwrap();
        assert_eq!(result.order, -1);
        assert_eq!(result.fallback_src, "/all.jpg");
    }

    #[test]
    fn load_with_mismatched_context_reports_naming_error() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "imgproxy.config.json", true);

        let err = run_with(
            &[
                "imgproxy-responsive",
                "load",
                "img/hero/mobile.png",
                "--context",
                "img",
                "--source",
                "module.exports = \"/m.png\";",
            ],
            dir.path(),
            "",
        )
        .unwrap_err();

        assert!(err.to_string().contains("hero/mobile.png"), "{err}");
    }

    #[test]
    fn missing_configuration_fails_before_processing() {
        let dir = tempdir().unwrap();

        let err = run_with(
            &["imgproxy-responsive", "load", "mobile.png", "--source", "x"],
            dir.path(),
            "",
        )
        .unwrap_err();

        assert!(err.to_string().contains("no loader configuration"), "{err}");
    }

    #[test]
    fn batch_prints_results_and_writes_url_manifest() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "imgproxy.config.yaml", false);
        let images = dir.path().join("images");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("mobile.png"), b"img").unwrap();
        fs::write(images.join("desktop.jpg"), b"img").unwrap();

        let output = run_with(
            &[
                "imgproxy-responsive",
                "batch",
                "images",
                "--public-path",
                "/build/images",
                "--urls-out",
                "out/urls.json",
            ],
            dir.path(),
            "",
        )
        .unwrap();

        let printed: Value = serde_json::from_str(&output).unwrap();
        let entries = printed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["fileName"], "mobile.png");
        assert_eq!(entries[1]["fileName"], "desktop.jpg");

        let urls: Vec<String> =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out/urls.json")).unwrap())
                .unwrap();
        assert_eq!(urls.len(), 12);
        assert!(urls.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["imgproxy-responsive", "serve"]).is_err());
    }
}
