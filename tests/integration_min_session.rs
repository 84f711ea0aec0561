// Drives the compiled binary through a PTY, exercising the real event loop and crossterm
// input handling.
//
// Requires a TTY; expectrl allocates a pseudo terminal. Ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn oneshot_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("typist");
    let cmd = format!("{} -p hi --oneshot --no-theme", bin.display());

    let mut p = spawn(cmd)?;

    // let the app enter the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // leave the report; oneshot then exits
    p.send("\x1b")?;

    p.expect("test 1:")?;
    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn escape_while_typing_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("typist");
    let cmd = format!("{} -p hello --no-theme", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("he")?;
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
