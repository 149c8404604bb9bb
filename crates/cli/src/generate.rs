use std::path::Path;
use std::process;

use fm_codegen::{Cmd, DiskWriter, GoImports, RunReport, SpyGenerator, SpyOptions};
use fm_core::SrcFileParser;

use crate::config::Settings;
use crate::OutputFormat;

pub(crate) fn build_cmd(settings: &Settings) -> Cmd {
    let parser = SrcFileParser::new().exclude(settings.out.clone());
    let generator = SpyGenerator::new(SpyOptions {
        prefix: settings.prefix.clone(),
        thread_safe: settings.thread_safe,
    });
    let cmd = Cmd::new(Box::new(parser), Box::new(generator), Box::new(DiskWriter))
        .with_package_suffix(settings.package_suffix.clone());
    if settings.goimports {
        cmd.with_normalizer(Box::new(GoImports::new(&settings.goimports_bin)))
    } else {
        cmd
    }
}

pub(crate) fn cmd_generate(dir: &Path, settings: &Settings, output: OutputFormat, quiet: bool) {
    match build_cmd(settings).run(dir, &settings.out) {
        Ok(report) => {
            if !quiet {
                print_report(&report, output);
            }
        }
        Err(e) => {
            match output {
                OutputFormat::Json => {
                    let err_json = serde_json::to_string_pretty(&e.to_json_value())
                        .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
                    eprintln!("{}", err_json);
                }
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("error: {}", e);
                    }
                }
            }
            process::exit(1);
        }
    }
}

fn print_report(report: &RunReport, output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            if report.artifacts.is_empty() {
                println!("no Go packages found");
            }
            for artifact in &report.artifacts {
                let noun = if artifact.spies.len() == 1 { "spy" } else { "spies" };
                println!(
                    "wrote {} ({} {})",
                    artifact.path.display(),
                    artifact.spies.len(),
                    noun
                );
                for skipped in &artifact.skipped {
                    println!(
                        "  skipped {} in {}: {}",
                        skipped.element, skipped.contract, skipped.reason
                    );
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
            println!("{}", json);
        }
    }
}
