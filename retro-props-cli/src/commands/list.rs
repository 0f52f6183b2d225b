use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_props_lib::AnalysisContext;

pub(crate) fn run_list(ctx: &AnalysisContext) {
    log::info!("Supported formats (in detection order):");
    crate::log_blank();

    for (i, console) in ctx.consoles().enumerate() {
        let meta = &console.metadata;
        log::info!(
            "{:>2}. {} [{}] {}",
            i + 1,
            meta.short_name.if_supports_color(Stdout, |t| t.bold()),
            meta.platform_name.if_supports_color(Stdout, |t| t.cyan()),
            format!("({})", meta.manufacturer).if_supports_color(Stdout, |t| t.dimmed()),
        );
        log::info!("    Extensions: {}", meta.extensions.join(", "));
        if !meta.mime_types.is_empty() {
            log::info!("    MIME types: {}", meta.mime_types.join(", "));
        }
    }
}
