use std::collections::HashMap;
use std::fmt::Write;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[derive(Debug, Default)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn start_subtimer(&mut self, key: &'static str) {
        let t = self.0.entry(key).or_default();
        t.start();
    }

    pub fn total_time(&self) -> Duration {
        self.values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed())
    }

    // keys are sorted so that reports are stable
    fn report(&self, out: &mut String, depth: usize) {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort();
        for key in keys {
            let val = &self[key];
            let tabs = format!("{: <1$}", "", 4 * depth);
            let _ = writeln!(out, "{}{:} : {:?}", tabs, *key, val.elapsed);
            val.subtimers.report(out, depth + 1);
        }
    }
}

/// Nested named stopwatches
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;

        //first one gets special treatment since self is not
        //an InnerTimer and a common trait would be overkill
        let mut active_timer = self.subtimers.get_mut(first)?;

        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    /// starts a timer with name `key` as a child of the current timer
    pub fn start_as_current(&mut self, key: &'static str) {
        let active_timer = self.mut_active_timer();

        if let Some(active) = active_timer {
            // child of current active timer
            active.subtimers.start_subtimer(key);
        } else {
            // nothing active, create one at root
            self.subtimers.start_subtimer(key);
        }

        //append to timer call stack
        self.stack.push(key);
    }

    /// stops the current timer
    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }

        //remove from timer call stack
        self.stack.pop();
    }

    /// stops every running timer, innermost first.  Needed after an
    /// early return from inside a timed block.
    pub fn stop_all(&mut self) {
        while !self.stack.is_empty() {
            self.stop_current();
        }
    }

    /// sum of all top level timers
    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }

    /// elapsed time of the top level timer `key`
    pub fn elapsed(&self, key: &'static str) -> Option<Duration> {
        self.subtimers.get(key).map(|t| t.elapsed())
    }

    /// one line per timer, children indented under their parent
    pub fn report(&self) -> String {
        let mut out = String::new();
        self.subtimers.report(&mut out, 0);
        out
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[test]
fn test_timers_report() {
    let mut timers = Timers::default();

    timeit! {timers => "load"; {
        timeit! {timers => "linear"; {
            std::thread::sleep(Duration::from_millis(1));
        }}
    }}
    timeit! {timers => "extract"; {}}

    assert!(timers.elapsed("load").unwrap() >= Duration::from_millis(1));
    assert!(timers.elapsed("linear").is_none());
    assert!(timers.total_time() >= timers.elapsed("load").unwrap());

    let report = timers.report();
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("extract : "));
    assert!(lines[1].starts_with("load : "));
    assert!(lines[2].starts_with("    linear : "));
}

#[test]
fn test_timers_stop_all() {
    fn fails(timers: &mut Timers) -> Result<(), ()> {
        timeit! {timers => "optimize"; {
            let step: Result<(), ()> = Err(());
            step?;
        }}
        Ok(())
    }

    let mut timers = Timers::default();
    timers.start_as_current("session");
    assert!(fails(&mut timers).is_err());
    std::thread::sleep(Duration::from_millis(1));
    timers.stop_all();

    assert!(timers.elapsed("session").unwrap() >= Duration::from_millis(1));
    assert!(timers.report().contains("    optimize : "));
}
