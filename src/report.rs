// Human-readable progress and outcome lines for the CLI

use crate::models::{RunProgress, RunState};

/// `1234567` -> `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `HH:MM:SS`, or `-` when the value is unknown.
pub fn duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => {
            let total = s.round() as u64;
            format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
        }
        _ => "-".into(),
    }
}

pub fn free_space_line(free_bytes: u64) -> String {
    format!("Free drive space : {} bytes", thousands(free_bytes))
}

/// One-line status for a snapshot; terminal states get the outcome message.
pub fn status_line(p: &RunProgress) -> String {
    match p.state {
        RunState::Running => format!(
            "Generating files...({}/{}) {:.1}% {}/{} bytes, elapsed {}, ETA {}",
            p.files_completed,
            p.files_target,
            p.percent_complete(),
            thousands(p.total_bytes_written),
            thousands(p.total_bytes_goal),
            duration(Some(p.elapsed_seconds)),
            duration(p.estimated_remaining_seconds),
        ),
        RunState::Completed => format!(
            "{} file(s) generated successfully. ({} bytes in {})",
            p.files_completed,
            thousands(p.total_bytes_written),
            duration(Some(p.elapsed_seconds)),
        ),
        RunState::Cancelled => format!(
            "Generation cancelled after {} file(s). ({} bytes, {:.1}%, {})",
            p.files_completed,
            thousands(p.total_bytes_written),
            p.percent_complete(),
            duration(Some(p.elapsed_seconds)),
        ),
        RunState::Failed => format!(
            "Error: {} ({} file(s) done, {:.1}%)",
            p.error.as_deref().unwrap_or("unknown failure"),
            p.files_completed,
            p.percent_complete(),
        ),
    }
}
