use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

pub const VISIBILITY_THRESHOLD: f64 = 0.5;
pub const REVEAL_CLASS: &str = "animated";
pub const BAR_RESTORE_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEvent<K> {
    pub key: K,
    pub ratio: f64,
}

/// Anything that can report how much of an element is on screen.
///
/// In the browser this is an `IntersectionObserver`; tests push events by hand.
pub trait VisibilitySource<K> {
    fn take_events(&mut self) -> Vec<VisibilityEvent<K>>;
}

#[derive(Clone, Debug)]
pub struct ViewportTrigger<K> {
    threshold: f64,
    observed: HashSet<K>,
    fired: HashSet<K>,
}

impl<K: Eq + Hash + Clone> Default for ViewportTrigger<K> {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

impl<K: Eq + Hash + Clone> ViewportTrigger<K> {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            observed: HashSet::new(),
            fired: HashSet::new(),
        }
    }

    pub fn observe(&mut self, key: K) {
        if !self.fired.contains(&key) {
            self.observed.insert(key);
        }
    }

    pub fn has_fired(&self, key: &K) -> bool {
        self.fired.contains(key)
    }

    /// Returns `true` exactly once per observed key: the first time its
    /// visible fraction reaches the threshold.
    pub fn notify(&mut self, key: &K, ratio: f64) -> bool {
        if ratio < self.threshold || !self.observed.remove(key) {
            return false;
        }

        self.fired.insert(key.clone())
    }

    pub fn drain<S, F>(&mut self, source: &mut S, mut on_visible: F) -> usize
    where
        S: VisibilitySource<K>,
        F: FnMut(&K),
    {
        let mut fired = 0;
        for event in source.take_events() {
            if self.notify(&event.key, event.ratio) {
                on_visible(&event.key);
                fired += 1;
            }
        }
        fired
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarReveal {
    pub initial_width: &'static str,
    pub target_width: String,
    pub restore_after: Duration,
}

/// Zero-then-target width so the CSS width transition actually runs.
pub fn reveal_bar(level_percent: u8) -> BarReveal {
    BarReveal {
        initial_width: "0",
        target_width: format!("{}%", level_percent.min(100)),
        restore_after: BAR_RESTORE_DELAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSource {
        pending: Vec<VisibilityEvent<&'static str>>,
    }

    impl FakeSource {
        fn push(&mut self, key: &'static str, ratio: f64) {
            self.pending.push(VisibilityEvent { key, ratio });
        }
    }

    impl VisibilitySource<&'static str> for FakeSource {
        fn take_events(&mut self) -> Vec<VisibilityEvent<&'static str>> {
            std::mem::take(&mut self.pending)
        }
    }

    #[test]
    fn fires_once_per_element_across_repeated_events() {
        let mut trigger = ViewportTrigger::default();
        let mut source = FakeSource::default();
        let mut calls = Vec::new();

        trigger.observe("stats");
        trigger.observe("skills");
        source.push("stats", 0.2);
        source.push("stats", 0.5);
        source.push("stats", 1.0);
        source.push("skills", 0.49);
        assert_eq!(trigger.drain(&mut source, |key| calls.push(*key)), 1);

        source.push("stats", 0.9);
        source.push("skills", 0.75);
        source.push("skills", 0.8);
        trigger.drain(&mut source, |key| calls.push(*key));

        assert_eq!(calls, vec!["stats", "skills"]);
        assert!(trigger.has_fired(&"stats"));
    }

    #[test]
    fn unobserved_elements_never_fire() {
        let mut trigger = ViewportTrigger::default();
        assert!(!trigger.notify(&"ghost", 1.0));
    }

    #[test]
    fn re_observing_a_fired_element_does_not_rearm_it() {
        let mut trigger = ViewportTrigger::default();
        trigger.observe("stats");
        assert!(trigger.notify(&"stats", 0.6));

        trigger.observe("stats");
        assert!(!trigger.notify(&"stats", 0.6));
    }

    #[test]
    fn bar_reveal_starts_from_zero() {
        let reveal = reveal_bar(85);
        assert_eq!(reveal.initial_width, "0");
        assert_eq!(reveal.target_width, "85%");
        assert_eq!(reveal_bar(140).target_width, "100%");
    }
}
