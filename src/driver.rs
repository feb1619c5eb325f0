use std::thread::sleep;
use std::time::Duration;

use log::info;

use crate::accumulator::Accumulator;
use crate::framebuffer::Framebuffer;
use crate::picture::RGB8;

/// Display side of the render loop.
pub trait Presenter {
    /// Shows the current framebuffer. Called once per loop iteration.
    fn present(&mut self, frame: &Framebuffer<RGB8>);

    /// Polled before every iteration, e.g. set once the window was closed.
    fn should_stop(&self) -> bool;

    /// Called whenever the integer percentage of completed samples changes.
    fn show_progress(&mut self, percent: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A sample pass was accumulated.
    Sampled,
    /// The budget was just exhausted and the image denoised.
    Denoised,
    /// Nothing left to do.
    Idle,
}

const IDLE_INTERVAL: Duration = Duration::from_millis(16);

pub struct Driver {
    accumulator: Accumulator,
    last_percent: Option<u32>,
}

impl Driver {
    pub fn new(accumulator: Accumulator) -> Self {
        Driver {
            accumulator,
            last_percent: None,
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// One loop iteration: report progress, advance the render, present.
    pub fn tick(&mut self, presenter: &mut impl Presenter) -> Tick {
        let percent = self.accumulator.progress_percent();
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            presenter.show_progress(percent);
        }

        let tick = if !self.accumulator.is_complete() {
            self.accumulator.pass();
            Tick::Sampled
        } else if !self.accumulator.is_denoised() {
            self.accumulator.denoise();
            Tick::Denoised
        } else {
            Tick::Idle
        };

        presenter.present(self.accumulator.frame());
        tick
    }

    /// Ticks until the presenter asks to stop. Partial accumulation is simply
    /// abandoned on stop.
    pub fn run(&mut self, presenter: &mut impl Presenter) {
        while !presenter.should_stop() {
            if self.tick(presenter) == Tick::Idle {
                sleep(IDLE_INTERVAL);
            }
        }
        info!(target: "app", "Render loop stopped after {} samples", self.accumulator.samples());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::settings::RenderSettings;

    #[derive(Default)]
    struct Recorder {
        presented: usize,
        progress: Vec<u32>,
        stop_after: usize,
    }

    impl Presenter for Recorder {
        fn present(&mut self, frame: &Framebuffer<RGB8>) {
            assert_eq!(frame.size(), (2, 2));
            self.presented += 1;
        }

        fn should_stop(&self) -> bool {
            self.presented >= self.stop_after
        }

        fn show_progress(&mut self, percent: u32) {
            self.progress.push(percent);
        }
    }

    fn driver(samples: u32) -> Driver {
        let settings = RenderSettings::default()
            .with_size(2, 2)
            .with_samples(samples);
        Driver::new(Accumulator::new(Scene::cornell_box(), settings))
    }

    #[test]
    fn test_tick_sequence() {
        let mut driver = driver(4);
        let mut presenter = Recorder::default();

        let ticks: Vec<Tick> = (0..7).map(|_| driver.tick(&mut presenter)).collect();
        assert_eq!(ticks, vec![
            Tick::Sampled, Tick::Sampled, Tick::Sampled, Tick::Sampled,
            Tick::Denoised, Tick::Idle, Tick::Idle,
        ]);
        assert_eq!(presenter.presented, 7);
        assert_eq!(presenter.progress, vec![0, 25, 50, 75, 100]);
        assert!(driver.accumulator().is_denoised());
    }

    #[test]
    fn test_progress_reported_on_change_only() {
        let mut driver = driver(300);
        let mut presenter = Recorder::default();
        for _ in 0..6 {
            driver.tick(&mut presenter);
        }
        // 0/300, 1/300 and 2/300 all round down to 0%.
        assert_eq!(presenter.progress, vec![0, 1]);
    }

    #[test]
    fn test_run_until_stop() {
        let mut driver = driver(3);
        let mut presenter = Recorder { stop_after: 5, ..Default::default() };

        driver.run(&mut presenter);
        assert_eq!(presenter.presented, 5);
        assert_eq!(driver.accumulator().samples(), 3);
        assert!(driver.accumulator().is_denoised());
    }

    #[test]
    fn test_run_stops_mid_render() {
        let mut driver = driver(100);
        let mut presenter = Recorder { stop_after: 2, ..Default::default() };

        driver.run(&mut presenter);
        assert_eq!(driver.accumulator().samples(), 2);
        assert!(!driver.accumulator().is_denoised());
    }
}
