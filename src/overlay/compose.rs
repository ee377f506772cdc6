//! Overlay composition
//!
//! Turns [`DerivedFields`] into an [`Overlay`]: a per-page list of draw
//! operations holding only the record's variable content. The overlay never
//! touches a PDF; `pdf::render` replays it on top of the template.

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;

use super::layout::{ChartsLayout, Layout, Point, Rect, TextField, TextStyle};
use crate::config::PipelineVariant;
use crate::fields::{Anomaly, DerivedFields};
use crate::source::AssetOutcome;

/// One drawing primitive
#[derive(Debug, Clone)]
pub enum DrawOp {
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
    Image {
        image: Arc<DynamicImage>,
        /// File the image was decoded from
        source: PathBuf,
        rect: Rect,
    },
}

/// Draw operations for one overlay page, in painting order
#[derive(Debug, Clone, Default)]
pub struct OverlayPage {
    pub ops: Vec<DrawOp>,
}

impl OverlayPage {
    fn text(&mut self, text: impl Into<String>, at: Point, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            at,
            style,
        });
    }

    /// Strings drawn on this page, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Image { .. } => None,
            })
            .collect()
    }

    /// Rectangles that received an image
    pub fn image_rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { rect, .. } => Some(*rect),
                DrawOp::Text { .. } => None,
            })
            .collect()
    }
}

/// Variable content of one certificate
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub pages: Vec<OverlayPage>,
    /// Asset problems met while composing
    pub anomalies: Vec<Anomaly>,
}

impl Overlay {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&OverlayPage> {
        self.pages.get(index)
    }
}

/// Compose the overlay for one record.
///
/// Page 1 is always present. The first chart page is present when any chart
/// file exists (always, for the single-chart variant); each further chart page
/// only when one of its rounds has a chart file.
pub fn compose(fields: &DerivedFields, layout: &Layout, variant: PipelineVariant) -> Overlay {
    let mut overlay = Overlay::default();

    overlay.pages.push(identity_page(fields, layout, &mut overlay.anomalies));

    for (&round, outcome) in &fields.charts {
        if !outcome.is_located() {
            report_missing_chart(fields, round, outcome, &mut overlay.anomalies);
        }
    }

    let last_round = fields.charts.keys().next_back().copied().unwrap_or(0);
    let (last_page, _) = layout.charts.placement(last_round.max(1));

    for page_index in 1..=last_page {
        let emit = if page_index == 1 {
            fields.chart_count() > 0 || variant.always_emits_chart_page()
        } else {
            layout
                .charts
                .rounds_on_page(page_index)
                .any(|round| fields.has_chart(round))
        };

        if !emit {
            continue;
        }

        overlay.pages.push(chart_page(
            fields,
            &layout.charts,
            page_index,
            &mut overlay.anomalies,
        ));
    }

    overlay
}

fn identity_page(
    fields: &DerivedFields,
    layout: &Layout,
    anomalies: &mut Vec<Anomaly>,
) -> OverlayPage {
    let identity = &layout.identity;
    let mut page = OverlayPage::default();

    for slot in &identity.fields {
        let value = match slot.field {
            TextField::FullName => fields.full_name(),
            TextField::Instructor => fields.instructor.clone(),
            TextField::Aircraft => fields.aircraft.clone(),
            TextField::Map => fields.map.clone(),
            TextField::MissionType => fields.mission_type.clone(),
            TextField::MissionName => fields.mission_name.to_string(),
            TextField::Date => fields.date.clone(),
        };
        page.text(value, slot.at, identity.style);
    }

    match &fields.photo {
        AssetOutcome::Found { image, path } => page.ops.push(DrawOp::Image {
            image: Arc::clone(image),
            source: path.clone(),
            rect: identity.photo,
        }),
        AssetOutcome::NotFound { stem } => {
            tracing::warn!(id = %fields.identifier, path = %stem.display(), "Photo not found");
            anomalies.push(Anomaly::MissingPhoto {
                expected: stem.clone(),
            });
        }
        AssetOutcome::DecodeFailed { path, reason } => {
            report_decode_failure(fields, path, reason, anomalies);
        }
    }

    page
}

fn chart_page(
    fields: &DerivedFields,
    charts: &ChartsLayout,
    page_index: usize,
    anomalies: &mut Vec<Anomaly>,
) -> OverlayPage {
    let mut page = OverlayPage::default();
    page.text(
        charts.title_for_page(page_index),
        charts.title_at,
        charts.title_style,
    );

    for round in charts.rounds_on_page(page_index) {
        let (_, slot) = charts.placement(round);
        let outcome = fields.charts.get(&round);

        // Round 1 is always announced on the first chart page
        if round == 1 || outcome.map(AssetOutcome::is_located).unwrap_or(false) {
            page.text(ChartsLayout::heading(round), slot.heading, charts.heading_style);
        }

        match outcome {
            Some(AssetOutcome::Found { image, path }) => page.ops.push(DrawOp::Image {
                image: Arc::clone(image),
                source: path.clone(),
                rect: slot.chart,
            }),
            Some(AssetOutcome::DecodeFailed { path, reason }) => {
                report_decode_failure(fields, path, reason, anomalies);
            }
            Some(AssetOutcome::NotFound { .. }) | None => {}
        }
    }

    page
}

fn report_missing_chart(
    fields: &DerivedFields,
    round: u8,
    outcome: &AssetOutcome,
    anomalies: &mut Vec<Anomaly>,
) {
    if let AssetOutcome::NotFound { stem } = outcome {
        tracing::warn!(
            id = %fields.identifier,
            round,
            path = %stem.display(),
            "Chart not found"
        );
        anomalies.push(Anomaly::MissingChart {
            round,
            expected: stem.clone(),
        });
    }
}

fn report_decode_failure(
    fields: &DerivedFields,
    path: &std::path::Path,
    reason: &str,
    anomalies: &mut Vec<Anomaly>,
) {
    tracing::warn!(
        id = %fields.identifier,
        path = %path.display(),
        error = %reason,
        "Failed to load image, leaving its area blank"
    );
    anomalies.push(Anomaly::ImageDecodeFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::MissionName;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn found(name: &str) -> AssetOutcome {
        AssetOutcome::Found {
            path: PathBuf::from(name),
            image: Arc::new(DynamicImage::new_rgb8(2, 2)),
        }
    }

    fn missing(name: &str) -> AssetOutcome {
        AssetOutcome::NotFound {
            stem: PathBuf::from(name),
        }
    }

    fn broken(name: &str) -> AssetOutcome {
        AssetOutcome::DecodeFailed {
            path: PathBuf::from(name),
            reason: "bad header".to_string(),
        }
    }

    fn fields_with(photo: AssetOutcome, charts: Vec<(u8, AssetOutcome)>) -> DerivedFields {
        DerivedFields {
            identifier: "42".to_string(),
            last_name: "Dupont".to_string(),
            first_name: "Jean".to_string(),
            instructor: "ARESIA".to_string(),
            aircraft: "M-2000C".to_string(),
            map: "Caucasus".to_string(),
            mission_type: "AIR - GROUND".to_string(),
            mission_name: MissionName::Suippes,
            date: "28/05/2025".to_string(),
            photo,
            charts: charts.into_iter().collect::<BTreeMap<_, _>>(),
            anomalies: Vec::new(),
        }
    }

    fn four_rounds(outcomes: [AssetOutcome; 4]) -> Vec<(u8, AssetOutcome)> {
        outcomes
            .into_iter()
            .enumerate()
            .map(|(i, o)| (i as u8 + 1, o))
            .collect()
    }

    #[test]
    fn test_identity_page_text() {
        let fields = fields_with(
            missing("photos/42"),
            four_rounds([missing("c1"), missing("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.page_count(), 1);
        assert_eq!(
            overlay.pages[0].texts(),
            vec![
                "Dupont Jean",
                "ARESIA",
                "M-2000C",
                "Caucasus",
                "AIR - GROUND",
                "Suippes",
                "28/05/2025"
            ]
        );
        assert!(overlay.pages[0].image_rects().is_empty());
    }

    #[test]
    fn test_missing_assets_reported_once_each() {
        let fields = fields_with(
            missing("photos/42"),
            four_rounds([missing("c1"), missing("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.anomalies.len(), 5);
        assert_eq!(
            overlay.anomalies[0],
            Anomaly::MissingPhoto {
                expected: PathBuf::from("photos/42")
            }
        );
        assert_eq!(
            overlay.anomalies[4],
            Anomaly::MissingChart {
                round: 4,
                expected: PathBuf::from("c4")
            }
        );
    }

    #[test]
    fn test_photo_drawn_in_fixed_rect() {
        let fields = fields_with(
            found("photos/42.jpg"),
            four_rounds([missing("c1"), missing("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);
        assert_eq!(
            overlay.pages[0].image_rects(),
            vec![Rect::new(360.0, 278.0, 205.0, 280.0)]
        );
    }

    #[test]
    fn test_image_ops_carry_their_source_file() {
        let fields = fields_with(
            found("photos/42.jpg"),
            four_rounds([found("courbes/42_courbe1.png"), missing("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        let sources: Vec<_> = overlay
            .pages
            .iter()
            .flat_map(|page| &page.ops)
            .filter_map(|op| match op {
                DrawOp::Image { source, .. } => Some(source.clone()),
                DrawOp::Text { .. } => None,
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("photos/42.jpg"),
                PathBuf::from("courbes/42_courbe1.png")
            ]
        );
    }

    #[test]
    fn test_two_charts_give_two_pages() {
        let fields = fields_with(
            found("p"),
            four_rounds([found("c1"), found("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.page_count(), 2);
        assert_eq!(
            overlay.pages[1].texts(),
            vec![
                "Training Simulation Report - Shots Details",
                "Round 1",
                "Round 2"
            ]
        );
        assert_eq!(overlay.pages[1].image_rects().len(), 2);
    }

    #[test]
    fn test_round_two_heading_only_when_chart_exists() {
        let fields = fields_with(
            found("p"),
            four_rounds([found("c1"), missing("c2"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.page_count(), 2);
        assert_eq!(
            overlay.pages[1].texts(),
            vec!["Training Simulation Report - Shots Details", "Round 1"]
        );
    }

    #[test]
    fn test_round_three_adds_continuation_page() {
        let fields = fields_with(
            found("p"),
            four_rounds([found("c1"), found("c2"), found("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.page_count(), 3);
        assert_eq!(
            overlay.pages[2].texts(),
            vec!["Training Simulation Report - Shots Details (Suite)", "Round 3"]
        );
        assert_eq!(
            overlay.pages[2].image_rects(),
            vec![Rect::new(50.0, 465.0, 500.0, 280.0)]
        );
    }

    #[test]
    fn test_only_round_four_still_emits_both_chart_pages() {
        let fields = fields_with(
            found("p"),
            four_rounds([missing("c1"), missing("c2"), missing("c3"), found("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert_eq!(overlay.page_count(), 3);
        assert!(overlay.pages[1].image_rects().is_empty());
        assert_eq!(
            overlay.pages[2].texts(),
            vec!["Training Simulation Report - Shots Details (Suite)", "Round 4"]
        );
        assert_eq!(
            overlay.pages[2].image_rects(),
            vec![Rect::new(50.0, 150.0, 500.0, 280.0)]
        );
    }

    #[test]
    fn test_decode_failure_keeps_heading_and_blanks_rect() {
        let fields = fields_with(
            broken("p.jpg"),
            four_rounds([found("c1"), broken("c2.png"), missing("c3"), missing("c4")]),
        );
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::MultiChart);

        assert!(overlay.pages[0].image_rects().is_empty());
        assert_eq!(overlay.pages[1].texts().last(), Some(&"Round 2"));
        assert_eq!(overlay.pages[1].image_rects().len(), 1);

        let decode_failures = overlay
            .anomalies
            .iter()
            .filter(|a| matches!(a, Anomaly::ImageDecodeFailed { .. }))
            .count();
        assert_eq!(decode_failures, 2);
    }

    #[test]
    fn test_single_chart_variant_always_has_page_two() {
        let fields = fields_with(found("p"), vec![(1, missing("42_courbe"))]);
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::SingleChart);

        assert_eq!(overlay.page_count(), 2);
        assert_eq!(
            overlay.pages[1].texts(),
            vec!["Training Simulation Report - Shots Details", "Round 1"]
        );
        assert!(overlay.pages[1].image_rects().is_empty());
    }

    #[test]
    fn test_single_chart_variant_draws_its_chart() {
        let fields = fields_with(found("p"), vec![(1, found("42_courbe.png"))]);
        let overlay = compose(&fields, &Layout::default(), PipelineVariant::SingleChart);

        assert_eq!(overlay.page_count(), 2);
        assert_eq!(
            overlay.pages[1].image_rects(),
            vec![Rect::new(50.0, 465.0, 500.0, 280.0)]
        );
    }
}
