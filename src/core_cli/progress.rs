// Terminal rendering of transfer progress
use crate::constants::{PROGRESS_BAR_WIDTH, SPEED_UNITS};
use crate::core_transfer::Progress;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Formats a speed in bytes per second with the largest fitting unit.
pub fn convert_speed(speed: f64) -> String {
    let mut speed = speed;
    let mut unit_index = 0;
    while speed > 1024.0 && unit_index < SPEED_UNITS.len() - 1 {
        speed /= 1024.0;
        unit_index += 1;
    }
    format!("{:.1}{}", speed, SPEED_UNITS[unit_index])
}

/// Text shown after the bar: the speed, plus the time left when the total is
/// known.
pub fn status_message(progress: &Progress) -> String {
    let speed = convert_speed(progress.speed());
    match progress.fraction() {
        Some(_) => format!(
            "speed:{}; {} seconds left",
            speed,
            progress.seconds_left().unwrap_or(0)
        ),
        None => format!("speed:{}", speed),
    }
}

fn bar_style() -> ProgressStyle {
    let template = format!(
        "Progress: [{{bar:{}}}] {{percent}}% complete; {{msg}}",
        PROGRESS_BAR_WIDTH
    );
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█_")
}

fn counter_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} Progress: {bytes}; {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn start_bar(total: u64, hidden: bool) -> ProgressBar {
    let target = if hidden {
        ProgressDrawTarget::hidden()
    } else {
        ProgressDrawTarget::stderr()
    };
    if total > 0 {
        let bar = ProgressBar::with_draw_target(Some(total), target);
        bar.set_style(bar_style());
        bar
    } else {
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(counter_style());
        bar
    }
}

/// Progress callback drawing one stderr bar per transfer.
///
/// The bar is created from the first snapshot of a transfer: a known total
/// gives a bar with percentage and time left, an unknown one a spinner with a
/// byte counter. The completion snapshot finishes it.
#[derive(Default)]
pub struct ProgressPrinter {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl ProgressPrinter {
    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            bar: None,
            hidden: true,
        }
    }

    pub fn update(&mut self, progress: &Progress) {
        let hidden = self.hidden;
        let bar = self
            .bar
            .get_or_insert_with(|| start_bar(progress.bytes_total, hidden));
        bar.set_position(progress.bytes_done);
        bar.set_message(status_message(progress));

        if progress.is_complete() {
            if let Some(bar) = self.bar.take() {
                bar.finish();
            }
        }
    }
}
