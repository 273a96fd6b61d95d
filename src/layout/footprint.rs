use super::geometry::Rectangle;
use crate::config::DeclutterConfig;
use crate::ir::{Label, TimeAnchor};
use crate::scale::TimeMapping;
use crate::text_metrics::measure_text_width;

/// Reference-zoom box of a label.
///
/// All labels of a row share one lane, so the vertical extent is centered on
/// the lane and never changes with zoom. Horizontally:
///
/// * an explicit width gives a box of constant screen width,
/// * an instant without width is as wide as its measured text,
/// * a span without width covers the span and grows with zoom.
///
/// `label_padding` is added on both sides.
pub fn label_rectangle(
    label: &Label,
    mapping: &dyn TimeMapping,
    config: &DeclutterConfig,
) -> Rectangle {
    let height = label.height.unwrap_or(config.label_height).max(0.0);
    let pad = config.label_padding.max(0.0) * 2.0;
    let center = mapping.to_px(label.anchor.midpoint());

    match (label.width, label.anchor) {
        (Some(width), _) => Rectangle::fixed_width(center, width.max(0.0) + pad, 0.0, height),
        (None, TimeAnchor::Instant(_)) => {
            let width = measure_text_width(
                label.display_text(),
                config.font_size,
                &config.font_family,
                config.fast_text,
            );
            Rectangle::fixed_width(center, width + pad, 0.0, height)
        }
        (None, TimeAnchor::Span { start, end }) => {
            let width = (mapping.to_px(end) - mapping.to_px(start)).abs();
            Rectangle::scalable_width(center, width + pad, 0.0, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::AxisScaling;
    use crate::scale::LinearTimeScale;
    use crate::text_metrics::estimate_text_width;

    fn scale() -> LinearTimeScale {
        LinearTimeScale::new((0.0, 100.0), (0.0, 1000.0)).unwrap()
    }

    fn config() -> DeclutterConfig {
        DeclutterConfig::default().with_padding(2.0).with_fast_text(true)
    }

    #[test]
    fn explicit_width_is_fixed_and_padded() {
        let label = Label::instant("a", 10.0).with_width(20.0);
        let rect = label_rectangle(&label, &scale(), &config());
        assert_eq!(rect.x.center, 100.0);
        assert_eq!(rect.x.half, 12.0);
        assert_eq!(rect.x.scaling, AxisScaling::Fixed);
        assert_eq!(rect.y.half, 9.0);
    }

    #[test]
    fn instant_without_width_measures_text() {
        let label = Label::instant("a", 10.0).with_text("Battle");
        let rect = label_rectangle(&label, &scale(), &config());
        let expected = (estimate_text_width("Battle", 13.0) + 4.0) * 0.5;
        assert!((rect.x.half - expected).abs() < 1e-9);
    }

    #[test]
    fn span_without_width_scales_with_zoom() {
        let label = Label::span("war", 20.0, 30.0);
        let rect = label_rectangle(&label, &scale(), &config());
        assert_eq!(rect.x.center, 250.0);
        assert_eq!(rect.x.half, 52.0);
        assert_eq!(rect.x.scaling, AxisScaling::Scalable);
    }
}
