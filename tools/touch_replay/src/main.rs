use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use tdeck_touch::{
    drivers::gt911::GT911_ADDRESS,
    platform::ManualClock,
    replay::{BusFrame, FaultStage, ReplayBus},
    touch::{active_config, Gesture, TouchDriver},
};

/// Released tail appended after the last captured poll so a pending release
/// still gets classified.
const TAIL_FLUSH_MS: u64 = 200;

#[derive(Clone, Copy)]
struct TracePoll {
    ms: u64,
    frame: BusFrame,
}

struct ReplayEvent {
    ms: u64,
    gesture: Gesture,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    let polls = parse_trace(&trace_path)?;
    let events = replay(&polls);

    println!("event,ms,kind,x,y");
    for event in &events {
        let (x, y) = event
            .gesture
            .point()
            .map(|p| (p.x, p.y))
            .unwrap_or_default();
        println!(
            "event,{},{},{},{}",
            event.ms,
            event.gesture.kind_label(),
            x,
            y
        );
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_kinds(&expect_path)?;
        let actual: Vec<&'static str> = events.iter().map(|e| e.gesture.kind_label()).collect();
        if actual != expected {
            eprintln!("expected kinds: {}", expected.join(","));
            eprintln!("actual kinds:   {}", actual.join(","));
            return Err("event sequence mismatch".into());
        }
    }

    Ok(())
}

type ReplayDriver<'c> = TouchDriver<ReplayBus<2>, &'c ManualClock>;

fn replay(polls: &[TracePoll]) -> Vec<ReplayEvent> {
    let clock = ManualClock::new(0);
    let bus: ReplayBus<2> = ReplayBus::new(GT911_ADDRESS);
    let mut driver = TouchDriver::new(bus, &clock, *active_config());
    let mut events = Vec::new();

    for poll in polls {
        poll_once(&mut driver, &clock, &mut events, poll.ms, poll.frame);
    }
    if let Some(last) = polls.last() {
        let tail_ms = last.ms.saturating_add(TAIL_FLUSH_MS);
        poll_once(&mut driver, &clock, &mut events, tail_ms, BusFrame::released());
    }

    let diagnostics = driver.diagnostics();
    if diagnostics.total_faults() > 0 {
        eprintln!(
            "faults: bus={} malformed={} polls={}",
            diagnostics.bus_faults, diagnostics.malformed_samples, diagnostics.polls
        );
    }
    events
}

fn poll_once(
    driver: &mut ReplayDriver<'_>,
    clock: &ManualClock,
    events: &mut Vec<ReplayEvent>,
    ms: u64,
    frame: BusFrame,
) {
    clock.set(ms);
    // One frame per poll, so the two-slot deque never fills.
    let _ = driver.bus_mut().push(frame);
    let gesture = driver.read();
    if !gesture.is_none() {
        events.push(ReplayEvent { ms, gesture });
    }
}

fn usage() -> String {
    "usage: touch_replay <trace.csv> [--expect expected_kinds.txt]".to_string()
}

/// Trace lines are `ms,status,x,y` with raw controller coordinates, or
/// `ms,fault,<status|clear|point>` for a poll that fails on the bus.
fn parse_trace(path: &Path) -> Result<Vec<TracePoll>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<TracePoll> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "ms,status,x,y" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let ms = parse_u64(parts[0], path, line_no, "ms")?;
        if let Some(previous) = out.last() {
            if ms < previous.ms {
                return Err(format!(
                    "{}:{} timestamps must not go backwards",
                    path.display(),
                    line_no
                ));
            }
        }

        let frame = match parts.as_slice() {
            [_, "fault", stage] => {
                let stage = FaultStage::parse(stage).ok_or_else(|| {
                    format!(
                        "{}:{} invalid fault stage: {}",
                        path.display(),
                        line_no,
                        stage
                    )
                })?;
                BusFrame::faulted(stage)
            }
            [_, status, x, y] => BusFrame::raw(
                parse_status(status, path, line_no)?,
                parse_u16(x, path, line_no, "x")?,
                parse_u16(y, path, line_no, "y")?,
            ),
            _ => {
                return Err(format!(
                    "{}:{} invalid trace line, expected ms,status,x,y or ms,fault,<stage>",
                    path.display(),
                    line_no
                ))
            }
        };
        out.push(TracePoll { ms, frame });
    }

    Ok(out)
}

fn parse_expected_kinds(path: &Path) -> Result<Vec<&'static str>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut kinds = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let normalized = normalize_kind(token).ok_or_else(|| {
            format!(
                "{}:{} invalid expected event kind: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        kinds.push(normalized);
    }

    Ok(kinds)
}

fn normalize_kind(kind: &str) -> Option<&'static str> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "tap" => Some("tap"),
        "long_press" => Some("long_press"),
        "drag" => Some("drag"),
        _ => None,
    }
}

fn parse_status(raw: &str, path: &Path, line_no: usize) -> Result<u8, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    parsed.map_err(|e| format!("{}:{} invalid status '{}': {}", path.display(), line_no, raw, e))
}

fn parse_u64(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u64, String> {
    raw.parse::<u64>()
        .map_err(|e| format!("{}:{} invalid {} '{}': {}", path.display(), line_no, field, raw, e))
}

fn parse_u16(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u16, String> {
    raw.parse::<u16>()
        .map_err(|e| format!("{}:{} invalid {} '{}': {}", path.display(), line_no, field, raw, e))
}
