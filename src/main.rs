use anyhow::Result;
use chrono::Utc;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotaboard::config::{Command, Config, Settings, StartView};
use quotaboard::source::{demo_snapshots, read_snapshots};
use quotaboard::ui::paint::AnsiPaint;
use quotaboard::ui::{App, SourceKind};
use quotaboard_core::{
    Dashboard, DashboardView, OverrideRegistry, Paint, PlainPaint, RenderContext,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();
    let registry = settings.registry()?;

    match &cli.command {
        Some(Command::Render {
            width,
            height,
            analytics,
        }) => render_once(&settings, &registry, *width, *height, *analytics).await,
        Some(Command::Demo) => App::new(settings, registry, SourceKind::Demo).run().await,
        None => App::new(settings, registry, SourceKind::File).run().await,
    }
}

/// Print one dashboard block to stdout
async fn render_once(
    settings: &Settings,
    registry: &OverrideRegistry,
    width: usize,
    height: usize,
    analytics: bool,
) -> Result<()> {
    let now = Utc::now();
    let snapshots = match &settings.snapshots {
        Some(path) => read_snapshots(path).await?,
        None => demo_snapshots(0, now),
    };

    let view = if analytics || settings.ui.start_view == StartView::Analytics {
        DashboardView::Analytics
    } else {
        DashboardView::Tiles
    };
    let ctx = RenderContext::new(now, width, height)
        .with_view(view)
        .with_filter(settings.filter.clone())
        .with_max_columns(settings.ui.max_columns);

    let paint: &dyn Paint = if settings.ui.color {
        &AnsiPaint
    } else {
        &PlainPaint
    };
    println!("{}", Dashboard::new(registry).render(&snapshots, &ctx, paint));
    Ok(())
}

/// Log file under the user cache directory; the terminal belongs to the UI
fn log_path() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("quotaboard");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("quotaboard.log"))
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("quotaboard=debug,quotaboard_core=debug")
    } else {
        EnvFilter::new("quotaboard=info,quotaboard_core=info")
    };

    let Some(file) = log_path().and_then(|path| File::create(path).ok()) else {
        return;
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}
