use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::cli::DemoOpts;
use crate::cmd::bring_up_target;
use crate::controller::Controller;
use crate::error;
use crate::link::Link;
use crate::pov::ViewVectors;

/// Environment flash ramp, white down to the resting palette. Bb Gg Rr.
const FLASH_STEPS: [u64; 10] = [
    0b11_11_11,
    0b10_11_11,
    0b01_11_11,
    0b10_11_10,
    0b10_11_01,
    0b10_10_01,
    0b10_01_01,
    0b10_01_00, // resting sky
    0b10_00_00,
    0b01_00_00, // resting floor
];

const RESTING_SKY: u64 = FLASH_STEPS[7];
const RESTING_FLOOR: u64 = FLASH_STEPS[9];

/// Triggered countdown through `FLASH_STEPS`. The sky stops updating two
/// steps before the floor, so each lands on its own resting color.
#[derive(Debug, Default)]
struct EnvFlash {
    step: usize,
}

impl EnvFlash {
    /// Advance one tick; returns the (sky, floor) colors to write, if any.
    fn tick(&mut self, trigger: bool) -> (Option<u64>, Option<u64>) {
        let count = FLASH_STEPS.len();
        if trigger {
            self.step = count;
        } else if self.step > 0 {
            self.step -= 1;
        }
        let sky = (self.step > 2).then(|| FLASH_STEPS[count - self.step]);
        let floor = (self.step > 0).then(|| FLASH_STEPS[count - self.step]);
        (sky, floor)
    }
}

#[derive(Debug)]
struct TickStats {
    ticks: u64,
    hits: u64,
    misses: u64,
    max_delta: Duration,
    t0: Instant,
    last: Instant,
}

impl TickStats {
    fn new() -> Self {
        Self {
            ticks: 0,
            hits: 0,
            misses: 0,
            max_delta: Duration::ZERO,
            t0: Instant::now(),
            last: Instant::now(),
        }
    }

    /// One wakeup that crossed `ticks` whole tick boundaries after `delta`.
    fn on_hit(&mut self, delta: Duration, ticks: u64) {
        self.hits += 1;
        self.ticks += ticks;
        if ticks > 1 {
            self.misses += 1;
        }
        if delta > self.max_delta {
            self.max_delta = delta;
        }
    }

    fn maybe_print(&mut self, stats_int: f64) {
        if self.last.elapsed().as_secs_f64() >= stats_int {
            let dur = self.t0.elapsed().as_secs_f64().max(1e-3);
            eprintln!(
                "[demo] ticks={} hits={} misses={} max_delta={:.2}ms over {:.1}s => {:.1} fps",
                self.ticks,
                self.hits,
                self.misses,
                self.max_delta.as_secs_f64() * 1e3,
                dur,
                self.hits as f64 / dur
            );
            self.last = Instant::now();
        }
    }
}

/// One display frame: the view update, then whatever the flash ramp owes.
fn send_frame<L: Link>(
    controller: &mut Controller<L>,
    view: &ViewVectors,
    flash: &mut EnvFlash,
    trigger: bool,
) -> error::Result<()> {
    controller.set_pov(view)?;
    let (sky, floor) = flash.tick(trigger);
    if let Some(color) = sky {
        controller.set_sky(color)?;
    }
    if let Some(color) = floor {
        controller.set_floor(color)?;
    }
    Ok(())
}

pub fn run(opts: DemoOpts) -> Result<()> {
    let mut controller = bring_up_target(&opts.target)?;
    let reply = controller.session_mut().probe()?;
    eprintln!("[demo] probe: {reply}");

    controller.set_leak(0)?;
    controller.set_sky(RESTING_SKY)?;
    controller.set_floor(RESTING_FLOOR)?;

    let tick = Duration::from_millis(opts.tick_ms.max(1));
    let run_for = Duration::from_secs_f64(opts.seconds);
    eprintln!(
        "[demo] board={} tick={}ms for {:.1}s (orbit r={} around ({}, {}))",
        controller.profile().name,
        tick.as_millis(),
        opts.seconds,
        opts.radius,
        opts.center_x,
        opts.center_y
    );

    let start = Instant::now();
    let mut timer = start;
    let mut stats = TickStats::new();
    let mut flash = EnvFlash::default();
    let mut angle = 0.0_f64;
    let mut tick_no: u64 = 0;
    let mut next_flash = opts.flash_every;

    while start.elapsed() < run_for {
        let delta = timer.elapsed();
        if delta < tick {
            thread::sleep(tick - delta);
            continue;
        }
        // Crossed at least one boundary; re-anchor the timer to the tick
        // grid so a late wakeup does not shift every later tick.
        let ticks = (delta.as_nanos() / tick.as_nanos()) as u64;
        timer += tick * ticks as u32;
        stats.on_hit(delta, ticks);
        tick_no += ticks;

        let trigger = opts.flash_every > 0 && tick_no >= next_flash;
        if trigger {
            next_flash += opts.flash_every;
        }

        angle += opts.turn_rate * tick.as_secs_f64() * ticks as f64;
        let view = ViewVectors::from_heading(
            opts.center_x + angle.cos() * opts.radius,
            opts.center_y + angle.sin() * opts.radius,
            angle,
        );
        send_frame(&mut controller, &view, &mut flash, trigger)?;
        stats.maybe_print(opts.stats);
    }

    eprintln!(
        "[demo] done: {} ticks over {:.1}s, {} hits, {} misses, max_delta {:.2}ms",
        stats.ticks,
        start.elapsed().as_secs_f64(),
        stats.hits,
        stats.misses,
        stats.max_delta.as_secs_f64() * 1e3
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::board::Board;
    use crate::link::mock::MockLink;
    use crate::repl::{ReplSession, Timeouts};

    #[test]
    fn flash_ramp_white_down_to_resting_palette() {
        let mut flash = EnvFlash::default();

        assert_eq!(
            flash.tick(true),
            (Some(0b11_11_11), Some(0b11_11_11)),
            "trigger tick goes white"
        );

        let mut last_sky = None;
        let mut last_floor = None;
        for _ in 0..9 {
            let (sky, floor) = flash.tick(false);
            if sky.is_some() {
                last_sky = sky;
            }
            if floor.is_some() {
                last_floor = floor;
            }
        }
        assert_eq!(last_sky, Some(RESTING_SKY));
        assert_eq!(last_floor, Some(RESTING_FLOOR));

        // Ramp exhausted; nothing more to write.
        assert_eq!(flash.tick(false), (None, None));
        assert_eq!(flash.tick(false), (None, None));
    }

    #[test]
    fn flash_sky_stops_two_steps_early() {
        let mut flash = EnvFlash::default();
        flash.tick(true);
        let mut writes = Vec::new();
        for _ in 0..9 {
            writes.push(flash.tick(false));
        }
        // Steps 2 and 1: floor only.
        assert_eq!(writes[7], (None, Some(0b10_00_00)));
        assert_eq!(writes[8], (None, Some(RESTING_FLOOR)));
    }

    #[test]
    fn idle_flash_writes_nothing() {
        let mut flash = EnvFlash::default();
        assert_eq!(flash.tick(false), (None, None));
    }

    #[test]
    fn retrigger_restarts_the_ramp() {
        let mut flash = EnvFlash::default();
        flash.tick(true);
        flash.tick(false);
        flash.tick(false);
        assert_eq!(flash.tick(true), (Some(0b11_11_11), Some(0b11_11_11)));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let mut stats = TickStats::new();
        stats.on_hit(Duration::from_millis(9), 1);
        assert_eq!((stats.hits, stats.ticks, stats.misses), (1, 1, 0));
        stats.on_hit(Duration::from_millis(17), 2);
        assert_eq!((stats.hits, stats.ticks, stats.misses), (2, 3, 1));
        assert_eq!(stats.max_delta, Duration::from_millis(17));
    }

    fn ready() -> Controller<MockLink> {
        let mut link = MockLink::new();
        link.feed_handshake();
        let session = ReplSession::connect(link).with_timeouts(Timeouts {
            handshake: Duration::from_millis(200),
            ack: Duration::from_millis(50),
            exec: Duration::from_millis(50),
        });
        let mut c = Controller::new(session, Board::Ci2311);
        c.bring_up(None).unwrap();
        c.session_mut().link.sent.clear();
        c
    }

    #[test]
    fn quiet_frame_touches_only_the_pov_channel() {
        let mut c = ready();
        for _ in 0..4 {
            c.session_mut().link.feed_exec_reply(b"", b"");
        }
        let view = ViewVectors::from_heading(11.5, 10.5, 0.0);
        send_frame(&mut c, &view, &mut EnvFlash::default(), false).unwrap();

        let sent = c.session_mut().link.sent_text();
        assert!(sent.contains("pov.spi.write("));
        assert!(!sent.contains("reg."));
    }

    #[test]
    fn triggered_frame_writes_white_sky_and_floor() {
        let mut c = ready();
        for _ in 0..12 {
            c.session_mut().link.feed_exec_reply(b"", b"");
        }
        let view = ViewVectors::from_heading(11.5, 10.5, 0.0);
        send_frame(&mut c, &view, &mut EnvFlash::default(), true).unwrap();

        let sent = c.session_mut().link.sent_text();
        assert!(sent.contains("reg.spi.write(b'\\x00\\x3f')"), "sky white");
        assert!(sent.contains("reg.spi.write(b'\\x10\\x3f')"), "floor white");
    }
}
