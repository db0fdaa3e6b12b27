//! keepsake CLI: append to, read and sync persistent text logs.
//!
//! - `keepsake append <resource> <text>`: append without a delimiter
//! - `keepsake cat <resource>`: stream a resource to stdout
//! - `keepsake sync`: push buffered writes to durable storage
//! - `keepsake demo`: record a visit and print every visit so far
//! - `keepsake frames`: draw the centered-text scene headlessly

mod commands;
mod parse;

use std::io::{self, Write};
use std::process;

use keepsake::frame::{
    CenteredText, DrawCommand, HeadlessSurface, HostEnvironment, ResizeForwarder, Surface,
    WindowConfig,
};
use keepsake::{Error, Keepsake, KeepsakeBuilder, LogConfig, Result};
use tracing::{debug, info};

use commands::build_cli;
use parse::{config_from_matches, matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    let (config, action) = match config_from_matches(&matches)
        .and_then(|config| Ok((config, matches_to_action(&matches)?)))
    {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    setup_tracing(&config.log_level);

    if let Err(e) = run(action, config) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Initialize the `tracing` subscriber.
///
/// Respects `KEEPSAKE_LOG` if set, otherwise uses the config level. Logs go
/// to stderr so `cat` output stays clean.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("KEEPSAKE_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(action: CliAction, config: LogConfig) -> Result<()> {
    if let CliAction::Frames {
        count,
        embedded,
        resize,
    } = action
    {
        return run_frames(count, embedded, resize);
    }

    debug!(?config, "Opening log");
    let log = KeepsakeBuilder::from_config(config)?.open()?;
    let result = run_with_log(&log, action);
    let closed = log.close();
    result.and(closed)
}

fn run_with_log(log: &Keepsake, action: CliAction) -> Result<()> {
    match action {
        CliAction::Append { resource, text } => {
            log.append_line(&resource, &text)?;
            info!(resource = %resource, bytes = text.len(), "Appended");
            Ok(())
        }
        CliAction::Cat { resource } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            log.stream_to(&resource, &mut out)?;
            Ok(())
        }
        CliAction::Sync => {
            log.flush()?;
            let metrics = log.metrics();
            let stdout = io::stdout();
            writeln!(
                stdout.lock(),
                "synced ({} completed, {} failed)",
                metrics.syncs_completed,
                metrics.syncs_failed
            )
            .map_err(stdout_error)
        }
        CliAction::Demo => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            log.record_visit(&mut out)?;
            Ok(())
        }
        CliAction::Frames {
            count,
            embedded,
            resize,
        } => run_frames(count, embedded, resize),
    }
}

fn run_frames(count: u64, embedded: bool, resize: Option<(i32, i32)>) -> Result<()> {
    let env = if embedded {
        HostEnvironment::Embedded
    } else {
        HostEnvironment::detect()
    };
    let window = WindowConfig::default();
    let mut surface = HeadlessSurface::new(&window)?.close_after(count);
    let forwarder = ResizeForwarder::new();
    if let Some((width, height)) = resize {
        forwarder.on_resize(width, height);
    }

    let mut scene = CenteredText::default();
    let mut driver = env.driver(Some(count));
    let frames = driver.run(&mut surface, &mut scene, &forwarder)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report_frames(&mut out, &surface, frames, driver.name()).map_err(stdout_error)
}

fn report_frames<W: Write>(
    out: &mut W,
    surface: &HeadlessSurface,
    frames: u64,
    driver: &str,
) -> io::Result<()> {
    let (width, height) = surface.screen_size();
    writeln!(
        out,
        "{}: {} frame(s) with the {} driver at {}x{}",
        surface.title(),
        frames,
        driver,
        width,
        height
    )?;
    for command in surface.last_frame() {
        if let DrawCommand::Text { text, x, y, .. } = command {
            writeln!(out, "  \"{}\" at ({}, {})", text, x, y)?;
        }
    }
    out.flush()
}

fn stdout_error(e: io::Error) -> Error {
    Error::Io(format!("writing to stdout: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake::frame::FrameUpdate;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn drawn_surface() -> HeadlessSurface {
        let mut surface = HeadlessSurface::new(&WindowConfig::default()).unwrap();
        CenteredText::default().update(&mut surface).unwrap();
        surface
    }

    #[test]
    fn test_report_lists_text_positions() {
        let mut out = Vec::new();
        report_frames(&mut out, &drawn_surface(), 1, "blocking").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("hello, raylib!: 1 frame(s) with the blocking driver at 300x300"));
        assert!(text.contains("\"Hello, emcc!\" at (84, 145)"));
    }

    #[test]
    fn test_report_surfaces_write_errors() {
        let err = report_frames(&mut ClosedPipe, &drawn_surface(), 1, "blocking").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(stdout_error(err).is_io_failure());
    }
}
