use std::process::ExitCode;

use ember_gate::app::{AppController, AppError, Session};
use ember_gate::backend::LocalBackend;
use ember_gate::config::{AssetSettings, BackendSettings, Settings};
use ember_gate::logging;
use ember_gate::ui::Rasterizer;

fn main() -> ExitCode {
    let _logging = logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "ember-gate failed");
            eprintln!("ember-gate: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let settings = Settings::default().validated()?;
    let backend_settings = BackendSettings::from_env()?;
    let assets = AssetSettings::from_env();

    let (width, height) = settings.panel.pixel_size();
    let rasterizer = Rasterizer::with_assets(width, height, &assets)?;
    let demo_key = backend_settings.accepted_keys.first().cloned();
    let backend = LocalBackend::new(backend_settings).into_backend();
    let session = Session::new(settings, backend);

    run_host(session, rasterizer, demo_key)
}

#[cfg(windows)]
fn run_host(session: Session, rasterizer: Rasterizer, _demo_key: Option<String>) -> Result<(), AppError> {
    use ember_gate::platform::LayeredWindow;

    let window = LayeredWindow::new(rasterizer.size())?;
    let summary = AppController::new(session, window, rasterizer).run()?;
    tracing::info!(frames = summary.frames, completed = summary.completed, "exiting");
    Ok(())
}

/// Without a layered window, plays a scripted sign-in and saves the last frame
#[cfg(not(windows))]
fn run_host(session: Session, rasterizer: Rasterizer, demo_key: Option<String>) -> Result<(), AppError> {
    use std::path::PathBuf;

    use ember_gate::input::Key;
    use ember_gate::platform::{HeadlessWindow, Script};
    use ember_gate::ui::screens::{LoginLayout, MenuLayout};

    let panel = session.settings().panel.panel_rect();
    let key = demo_key.unwrap_or_else(|| {
        tracing::warn!("no accepted keys configured, the scripted sign-in will be rejected");
        "DEMO-KEY".to_owned()
    });

    let script = Script::new((0, 0))
        .idle(30)
        .click(LoginLayout::new(panel).input.center())
        .type_text(&key)
        .press(Key::Enter)
        .idle(300)
        .click(MenuLayout::new(panel).button.center());

    // Paced so the backend's validation latency spans a realistic number of frames
    let window = HeadlessWindow::new(rasterizer.size())
        .with_script(script)
        .with_pacing(true);
    let mut controller = AppController::new(session, window, rasterizer).with_max_frames(1_200);
    let summary = controller.run()?;

    let snapshot = std::env::var("EMBER_GATE_SNAPSHOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("ember-gate").join("last-frame.png"));
    if let Some(dir) = snapshot.parent() {
        if let Err(err) = std::fs::create_dir_all(dir) {
            tracing::warn!(error = %err, "could not create snapshot directory");
        }
    }
    controller.rasterizer().save_png(&snapshot)?;

    println!(
        "{} frames, final phase {}, {}; last frame written to {}",
        summary.frames,
        summary.final_phase,
        if summary.completed { "launched" } else { "not launched" },
        snapshot.display()
    );
    Ok(())
}
