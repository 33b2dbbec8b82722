// Smoke test for the real binary: raw mode, bracketed paste and the runner
// loop all run inside a pseudo terminal allocated by expectrl.
//
// Unix-only and ignored by default since it needs a PTY.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("paceline");
    let cmd = format!(
        "{} --text hi --countdown 0 --no-history --log-file {}",
        bin.display(),
        dir.path().join("paceline.log").display()
    );

    // Spawn the TUI inside a pseudo terminal
    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(200));

    // Typing the passage finishes the session and shows the results popup
    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // First ESC dismisses the popup, the second quits from setup
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
