pub const BACK_TO_TOP_THRESHOLD: f64 = 300.0;
pub const SECTION_ACTIVATION_OFFSET: f64 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SectionOffset {
    pub id: String,
    pub top: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
    /// Document order.
    pub sections: Vec<SectionOffset>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollView {
    pub progress_percent: f64,
    pub back_to_top_visible: bool,
    pub active_section: Option<String>,
}

impl ScrollView {
    pub fn is_link_active(&self, target: &str) -> bool {
        self.active_section.as_deref() == Some(target)
    }

    pub fn progress_style(&self) -> String {
        format!("width: {:.2}%;", self.progress_percent)
    }
}

pub fn progress_percent(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> f64 {
    let scrollable = scroll_height - viewport_height;
    if !scrollable.is_finite() || scrollable <= 0.0 || !scroll_top.is_finite() {
        return 0.0;
    }

    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

pub fn active_section(scroll_top: f64, sections: &[SectionOffset]) -> Option<&str> {
    sections
        .iter()
        .filter(|section| section.top <= scroll_top + SECTION_ACTIVATION_OFFSET)
        .last()
        .map(|section| section.id.as_str())
}

pub fn compute(metrics: &ScrollMetrics) -> ScrollView {
    ScrollView {
        progress_percent: progress_percent(
            metrics.scroll_top,
            metrics.scroll_height,
            metrics.viewport_height,
        ),
        back_to_top_visible: metrics.scroll_top > BACK_TO_TOP_THRESHOLD,
        active_section: active_section(metrics.scroll_top, &metrics.sections).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sections() -> Vec<SectionOffset> {
        [("home", 0.0), ("about", 700.0), ("projects", 1400.0), ("contact", 2100.0)]
            .into_iter()
            .map(|(id, top)| SectionOffset {
                id: id.to_string(),
                top,
            })
            .collect()
    }

    #[test]
    fn single_screen_page_reports_zero_progress() {
        assert_eq!(progress_percent(0.0, 800.0, 800.0), 0.0);
        assert_eq!(progress_percent(50.0, 600.0, 800.0), 0.0);
    }

    #[test]
    fn progress_at_bottom_is_full() {
        assert_eq!(progress_percent(2200.0, 3000.0, 800.0), 100.0);
        assert_eq!(progress_percent(1100.0, 3000.0, 800.0), 50.0);
    }

    #[test]
    fn back_to_top_appears_past_threshold() {
        let mut metrics = ScrollMetrics {
            scroll_top: 300.0,
            scroll_height: 3000.0,
            viewport_height: 800.0,
            sections: sections(),
        };
        assert!(!compute(&metrics).back_to_top_visible);

        metrics.scroll_top = 301.0;
        assert!(compute(&metrics).back_to_top_visible);
    }

    #[test]
    fn active_section_uses_lookahead_offset() {
        let sections = sections();
        assert_eq!(active_section(0.0, &sections), Some("home"));
        assert_eq!(active_section(499.0, &sections), Some("home"));
        assert_eq!(active_section(500.0, &sections), Some("about"));
        assert_eq!(active_section(5000.0, &sections), Some("contact"));
    }

    #[test]
    fn no_qualifying_section_leaves_every_link_inactive() {
        let sections = vec![SectionOffset {
            id: "about".to_string(),
            top: 900.0,
        }];
        let view = compute(&ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 3000.0,
            viewport_height: 800.0,
            sections,
        });

        assert_eq!(view.active_section, None);
        assert!(!view.is_link_active("about"));
        assert!(!view.is_link_active(""));
    }

    proptest! {
        #[test]
        fn progress_stays_within_bounds(
            scroll_height in 0.0f64..20_000.0,
            viewport_height in 0.0f64..4_000.0,
            fraction in 0.0f64..=1.0,
        ) {
            let doc_height = (scroll_height - viewport_height).max(0.0);
            let percent = progress_percent(doc_height * fraction, scroll_height, viewport_height);

            prop_assert!(percent.is_finite());
            prop_assert!((0.0..=100.0).contains(&percent));
            if doc_height <= 0.0 {
                prop_assert_eq!(percent, 0.0);
            }
        }
    }
}
