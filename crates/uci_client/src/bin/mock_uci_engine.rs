//! Scriptable UCI engine for exercising the controller.
//!
//! It does not play chess: `go` is answered with a fixed move. Behaviour is
//! picked on the command line:
//!
//! ```text
//! mock_uci_engine [--mode normal|silent|malformed|no-uciok|exit-on-go]
//!                 [--move e2e4] [--ponder e7e5] [--info N] [--stderr TEXT]
//!                 [--latin1]
//! ```
//!
//! Unknown arguments are ignored so it can stand in for `java -jar x.jar`.

use std::env;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Handshake works, `go` is never answered
    Silent,
    /// `go` is answered with a bare `bestmove`
    Malformed,
    /// `uci` is never acknowledged
    NoUciOk,
    /// The process exits as soon as it is asked to search
    ExitOnGo,
}

struct Script {
    mode: Mode,
    best: String,
    ponder: Option<String>,
    info_lines: u32,
    stderr: Option<String>,
    /// Identify with a Latin-1 encoded author line
    latin1: bool,
}

fn parse_args(args: &[String]) -> Script {
    let mut script = Script {
        mode: Mode::Normal,
        best: "e2e4".to_string(),
        ponder: None,
        info_lines: 2,
        stderr: None,
        latin1: false,
    };

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--mode" => {
                script.mode = match value.as_deref() {
                    Some("silent") => Mode::Silent,
                    Some("malformed") => Mode::Malformed,
                    Some("no-uciok") => Mode::NoUciOk,
                    Some("exit-on-go") => Mode::ExitOnGo,
                    _ => Mode::Normal,
                };
                i += 1;
            }
            "--move" => {
                if let Some(v) = value {
                    script.best = v;
                }
                i += 1;
            }
            "--ponder" => {
                script.ponder = value;
                i += 1;
            }
            "--info" => {
                script.info_lines = value.and_then(|v| v.parse().ok()).unwrap_or(2);
                i += 1;
            }
            "--latin1" => script.latin1 = true,
            "--stderr" => {
                script.stderr = value;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    script
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let script = parse_args(&args);

    if let Some(text) = &script.stderr {
        eprintln!("{}", text);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                writeln!(stdout, "id name MockEngine 0.1").ok();
                if script.latin1 {
                    stdout.write_all(b"id author J\xe9r\xf4me\n").ok();
                } else {
                    writeln!(stdout, "id author ML-chess").ok();
                }
                writeln!(stdout, "option name UCI_LimitStrength type check default false").ok();
                writeln!(stdout, "option name UCI_Elo type spin default 1500 min 800 max 2800").ok();
                writeln!(stdout, "option name Threads type spin default 1 min 1 max 64").ok();
                if script.mode != Mode::NoUciOk {
                    writeln!(stdout, "uciok").ok();
                }
            }
            "isready" => {
                writeln!(stdout, "readyok").ok();
            }
            "go" => match script.mode {
                Mode::Silent => {}
                Mode::ExitOnGo => return,
                Mode::Malformed => {
                    writeln!(stdout, "bestmove").ok();
                }
                Mode::Normal | Mode::NoUciOk => {
                    for depth in 1..=script.info_lines {
                        writeln!(
                            stdout,
                            "info depth {} nodes {} score cp 10 pv {}",
                            depth,
                            depth * 100,
                            script.best
                        )
                        .ok();
                    }
                    match &script.ponder {
                        Some(ponder) => writeln!(stdout, "bestmove {} ponder {}", script.best, ponder),
                        None => writeln!(stdout, "bestmove {}", script.best),
                    }
                    .ok();
                }
            },
            "quit" => break,
            _ => {
                // setoption, position, ucinewgame: nothing to do
            }
        }
        stdout.flush().ok();
    }
}
