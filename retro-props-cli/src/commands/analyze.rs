use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_props_lib::util::format_bytes;
use retro_props_lib::{
    AnalysisContext, AnalysisError, AnalysisOptions, FieldReport, FieldValue, FileStream,
    Platform, RegisteredConsole, RomFields, RomIdentification,
};

use crate::CliError;

/// Run the analyze command.
pub(crate) fn run_analyze(
    ctx: &AnalysisContext,
    files: &[PathBuf],
    console: Option<Platform>,
    options: &AnalysisOptions,
    json: bool,
) -> Result<(), CliError> {
    let forced = match console {
        Some(platform) => Some(ctx.get_by_platform(platform).ok_or_else(|| {
            CliError::unknown_system(format!("No analyzer for platform {}", platform))
        })?),
        None => None,
    };

    if !json {
        if options.quick {
            log::info!("Quick mode enabled");
        }
        if let Some(c) = forced {
            log::info!("Using {} analyzer", c.metadata.platform_name);
        }
        if options.quick || forced.is_some() {
            crate::log_blank();
        }
    }

    let mut failures = 0usize;
    for path in files {
        let file_options = options.clone().file_path(path.as_path());
        let result = identify_file(ctx, forced, path, &file_options);
        if result.is_err() {
            failures += 1;
        }

        if json {
            print_json(path, FieldReport::from_result(result))?;
        } else {
            match result {
                Ok(id) => print_identification(path, &id),
                Err(e) => log::warn!(
                    "{}: {} Analysis failed ({})",
                    display_name(path),
                    "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    e,
                ),
            }
            crate::log_blank();
        }
    }

    if failures > 0 {
        return Err(CliError::analysis(format!(
            "{} of {} files could not be analyzed",
            failures,
            files.len()
        )));
    }
    Ok(())
}

fn identify_file(
    ctx: &AnalysisContext,
    forced: Option<&RegisteredConsole>,
    path: &Path,
    options: &AnalysisOptions,
) -> Result<RomIdentification, AnalysisError> {
    let mut stream = FileStream::open(path)?;
    match forced {
        Some(console) => console.analyzer.analyze(&mut stream, options),
        None => ctx.identify(&mut stream, options),
    }
}

fn display_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
}

fn print_json(path: &Path, report: FieldReport) -> Result<(), CliError> {
    let value = serde_json::json!({
        "file": path.display().to_string(),
        "valid": report.valid,
        "error_code": report.error_code,
        "identification": serde_json::to_value(&report.identification)?,
    });
    log::info!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// -- Text output --

const INDENT: usize = 2;

fn log_pair(depth: usize, width: usize, name: &str, value: &str) {
    let label = format!("{:<width$}", format!("{}:", name), width = width);
    log::info!(
        "{:pad$}{} {}",
        "",
        label.if_supports_color(Stdout, |t| t.cyan()),
        value,
        pad = depth * INDENT,
    );
}

fn print_identification(path: &Path, id: &RomIdentification) {
    log::info!(
        "{}:",
        display_name(path).if_supports_color(Stdout, |t| t.bold()),
    );

    let mut summary: Vec<(&str, String)> = Vec::new();
    if let Some(ref system) = id.system_name {
        summary.push(("System", system.clone()));
    }
    if let Some(ref name) = id.internal_name {
        summary.push(("Name", name.clone()));
    }
    if let Some(ref serial) = id.serial_number {
        summary.push(("Serial", serial.clone()));
    }
    if let Some(ref maker) = id.maker_code {
        summary.push(("Maker", maker.clone()));
    }
    if let Some(ref version) = id.version {
        summary.push(("Version", version.clone()));
    }
    if !id.regions.is_empty() {
        let names: Vec<_> = id.regions.iter().map(|r| r.name()).collect();
        summary.push(("Region", names.join(", ")));
    }
    if let Some(size) = id.file_size {
        let text = match id.expected_size {
            Some(expected) => format!(
                "{} {}",
                format_bytes(size),
                size_verdict(size, expected)
            ),
            None => format_bytes(size),
        };
        summary.push(("File Size", text));
    }

    let width = summary.iter().map(|(n, _)| n.len()).max().unwrap_or(0) + 1;
    for (name, value) in &summary {
        log_pair(1, width, name, value);
    }

    print_fields(&id.fields, 1, true);
}

/// Print a field tree. Nested groups are indented one level below their name.
fn print_fields(fields: &RomFields, depth: usize, show_tabs: bool) {
    let width = fields
        .fields()
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0)
        + 1;

    for (tab_idx, tab) in fields.tabs().iter().enumerate() {
        let mut in_tab = fields.fields_in_tab(tab_idx).peekable();
        if in_tab.peek().is_none() {
            continue;
        }

        let mut depth = depth;
        if show_tabs && !tab.is_empty() {
            log::info!(
                "{:pad$}[{}]",
                "",
                tab.if_supports_color(Stdout, |t| t.bold()),
                pad = depth * INDENT,
            );
            depth += 1;
        }

        for field in in_tab {
            match &field.value {
                FieldValue::Group(group) => {
                    log::info!(
                        "{:pad$}{}",
                        "",
                        format!("{}:", field.name).if_supports_color(Stdout, |t| t.cyan()),
                        pad = depth * INDENT,
                    );
                    print_fields(group, depth + 1, false);
                }
                value => log_pair(depth, width, &field.name, &value.to_string()),
            }
        }
    }
}

// -- Size verdict --

fn size_verdict(file_size: u64, expected_size: u64) -> String {
    if file_size == expected_size {
        return format!("{}", "(OK)".if_supports_color(Stdout, |t| t.green()));
    }
    if file_size < expected_size {
        return format!(
            "{}",
            format!("(truncated, missing {})", format_bytes(expected_size - file_size))
                .if_supports_color(Stdout, |t| t.bright_red()),
        );
    }
    let excess = file_size - expected_size;
    let text = if excess == 512 {
        "(+512 bytes, likely copier header)".to_string()
    } else {
        format!("(+{} over header size)", format_bytes(excess))
    };
    format!("{}", text.if_supports_color(Stdout, |t| t.yellow()))
}
