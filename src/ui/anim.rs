//! Self-rescheduling animations as explicit state machines.
//!
//! The browser shell calls [`Animation::advance`], renders the frame and
//! schedules the next call after the returned delay. Tests drive the same
//! machines by summing delays instead of waiting on real timers.

use std::time::Duration;

pub const TYPING_DELAY: Duration = Duration::from_millis(100);
pub const DELETING_DELAY: Duration = Duration::from_millis(50);
pub const TYPED_PAUSE: Duration = Duration::from_millis(2000);
pub const DELETED_PAUSE: Duration = Duration::from_millis(500);
pub const COUNT_UP_INTERVAL: Duration = Duration::from_millis(20);
pub const COUNT_UP_STEPS: u64 = 50;

pub const HERO_PHRASES: [&str; 3] = [
    "Python Developer",
    "Linux Enthusiast",
    "Cybersecurity Learner",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step<F> {
    pub frame: F,
    /// `None` once the animation has finished.
    pub next: Option<Duration>,
}

pub trait Animation {
    type Frame;

    fn advance(&mut self) -> Step<Self::Frame>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationCursor {
    pub phrase_index: usize,
    pub char_index: usize,
    pub deleting: bool,
}

#[derive(Clone, Debug)]
pub struct Typewriter {
    phrases: Vec<Vec<char>>,
    cursor: AnimationCursor,
}

impl Typewriter {
    /// Empty phrases are dropped; returns `None` if nothing is left to type.
    pub fn new<I, S>(phrases: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<Vec<char>> = phrases
            .into_iter()
            .map(|phrase| phrase.as_ref().chars().collect::<Vec<_>>())
            .filter(|chars| !chars.is_empty())
            .collect();

        if phrases.is_empty() {
            return None;
        }

        Some(Self {
            phrases,
            cursor: AnimationCursor::default(),
        })
    }

    pub fn hero() -> Option<Self> {
        Self::new(HERO_PHRASES)
    }

    pub fn cursor(&self) -> AnimationCursor {
        self.cursor
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn current_len(&self) -> usize {
        self.phrases[self.cursor.phrase_index].len()
    }
}

impl Animation for Typewriter {
    type Frame = String;

    fn advance(&mut self) -> Step<String> {
        let phrase = &self.phrases[self.cursor.phrase_index];
        let len = phrase.len();

        if self.cursor.deleting {
            self.cursor.char_index = self.cursor.char_index.saturating_sub(1);
        } else {
            self.cursor.char_index = (self.cursor.char_index + 1).min(len);
        }

        let frame: String = phrase[..self.cursor.char_index].iter().collect();

        let delay = if !self.cursor.deleting && self.cursor.char_index == len {
            self.cursor.deleting = true;
            TYPED_PAUSE
        } else if self.cursor.deleting && self.cursor.char_index == 0 {
            self.cursor.deleting = false;
            self.cursor.phrase_index = (self.cursor.phrase_index + 1) % self.phrases.len();
            DELETED_PAUSE
        } else if self.cursor.deleting {
            DELETING_DELAY
        } else {
            TYPING_DELAY
        };

        Step {
            frame,
            next: Some(delay),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountUp {
    target: u64,
    step: u64,
    value: u64,
    plus: bool,
    done: bool,
}

impl CountUp {
    /// Reads the leading integer of a stat label such as `"2500+"`.
    ///
    /// Leading whitespace is skipped; text without leading digits does not
    /// animate.
    pub fn parse(text: &str) -> Option<Self> {
        let digits: String = text
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let target = digits.parse::<u64>().ok()?;

        Some(Self::new(target, text.contains('+')))
    }

    pub fn new(target: u64, plus: bool) -> Self {
        Self {
            target,
            step: target.div_ceil(COUNT_UP_STEPS),
            value: 0,
            plus,
            done: false,
        }
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn label(&self, value: u64) -> String {
        if self.plus {
            format!("{value}+")
        } else {
            value.to_string()
        }
    }
}

impl Animation for CountUp {
    type Frame = String;

    fn advance(&mut self) -> Step<String> {
        if self.done {
            return Step {
                frame: self.label(self.target),
                next: None,
            };
        }

        self.value = self.value.saturating_add(self.step);
        if self.value >= self.target {
            self.done = true;
            return Step {
                frame: self.label(self.target),
                next: None,
            };
        }

        Step {
            frame: self.label(self.value),
            next: Some(COUNT_UP_INTERVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_count_up(mut count_up: CountUp) -> (Vec<String>, usize) {
        let mut frames = Vec::new();
        let mut ticks = 0;
        loop {
            ticks += 1;
            let step = count_up.advance();
            frames.push(step.frame);
            if step.next.is_none() {
                return (frames, ticks);
            }
            assert!(ticks < 10_000, "count-up must terminate");
        }
    }

    #[test]
    fn typewriter_types_pauses_and_deletes() {
        let mut typewriter = Typewriter::new(["ab", "c"]).expect("non-empty phrases");

        let steps: Vec<_> = (0..6).map(|_| typewriter.advance()).collect();
        let frames: Vec<_> = steps.iter().map(|step| step.frame.as_str()).collect();
        let delays: Vec<_> = steps.iter().map(|step| step.next.expect("never finishes")).collect();

        assert_eq!(frames, vec!["a", "ab", "a", "", "c", ""]);
        assert_eq!(
            delays,
            vec![TYPING_DELAY, TYPED_PAUSE, DELETING_DELAY, DELETED_PAUSE, TYPED_PAUSE, DELETED_PAUSE]
        );
        assert_eq!(typewriter.cursor().phrase_index, 0);
    }

    #[test]
    fn typewriter_counts_characters_not_bytes() {
        let mut typewriter = Typewriter::new(["héllo"]).expect("non-empty phrase");
        let frames: Vec<_> = (0..5).map(|_| typewriter.advance().frame).collect();
        assert_eq!(frames.last().map(String::as_str), Some("héllo"));
    }

    #[test]
    fn typewriter_rejects_empty_input() {
        assert!(Typewriter::new(Vec::<String>::new()).is_none());
        assert!(Typewriter::new(["", ""]).is_none());
        assert_eq!(Typewriter::new(["", "x"]).map(|t| t.phrase_count()), Some(1));
    }

    #[test]
    fn hero_cycle_returns_to_first_phrase() {
        let mut typewriter = Typewriter::hero().expect("hero phrases");
        let ticks_per_cycle: usize = HERO_PHRASES.iter().map(|p| p.chars().count() * 2).sum();

        for _ in 0..3 * ticks_per_cycle {
            typewriter.advance();
        }

        assert_eq!(typewriter.cursor(), AnimationCursor::default());
    }

    #[test]
    fn count_up_lands_exactly_on_target_with_marker() {
        let count_up = CountUp::parse("2500+").expect("numeric stat");
        assert_eq!(count_up.step(), 50);

        let (frames, ticks) = run_count_up(count_up);
        assert_eq!(frames.last().map(String::as_str), Some("2500+"));
        assert!(ticks <= 2500 / 50 + 1);
    }

    #[test]
    fn count_up_without_marker_and_uneven_step() {
        let (frames, _) = run_count_up(CountUp::parse("  73 projects").expect("numeric stat"));
        assert_eq!(frames.first().map(String::as_str), Some("2"));
        assert_eq!(frames.last().map(String::as_str), Some("73"));
    }

    #[test]
    fn count_up_zero_finishes_on_first_tick() {
        let (frames, ticks) = run_count_up(CountUp::parse("0").expect("numeric stat"));
        assert_eq!(frames, vec!["0".to_string()]);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn non_numeric_stat_does_not_animate() {
        assert!(CountUp::parse("∞").is_none());
        assert!(CountUp::parse("").is_none());
    }

    proptest! {
        #[test]
        fn typewriter_cursor_stays_in_bounds(ticks in 0usize..400) {
            let mut typewriter = Typewriter::hero().expect("hero phrases");
            for _ in 0..ticks {
                typewriter.advance();
                let cursor = typewriter.cursor();
                prop_assert!(cursor.phrase_index < typewriter.phrase_count());
                prop_assert!(cursor.char_index <= typewriter.current_len());
            }
        }

        #[test]
        fn count_up_is_monotonic_and_bounded(target in 0u64..1_000_000, plus in any::<bool>()) {
            let mut count_up = CountUp::new(target, plus);
            let step = count_up.step().max(1);
            let limit = target.div_ceil(step) + 1;
            let mut previous = 0u64;
            let mut ticks = 0u64;

            loop {
                ticks += 1;
                let advanced = count_up.advance();
                let shown: u64 = advanced.frame.trim_end_matches('+').parse().expect("numeric frame");
                prop_assert!(shown >= previous);
                prop_assert!(shown <= target);
                previous = shown;
                if advanced.next.is_none() {
                    prop_assert_eq!(shown, target);
                    break;
                }
                prop_assert!(ticks <= limit);
            }
        }
    }
}
