use crate::plot::svg::{LineStyle, Panel, Series};
use crate::train::epoch_stats::History;

/// Groups histories by backend, one panel per backend in first-seen order.
///
/// Each history contributes a solid training curve and, when present, a
/// dashed validation curve.
pub fn panels_from_histories(histories: &[History]) -> Vec<Panel> {
    let mut panels: Vec<(crate::train::Backend, Panel)> = Vec::new();

    for history in histories {
        let idx = match panels.iter().position(|(b, _)| *b == history.backend) {
            Some(idx) => idx,
            None => {
                let title = format!("Losses: {}", history.backend.display_name());
                panels.push((history.backend, Panel::new(title)));
                panels.len() - 1
            }
        };
        let panel = &mut panels[idx].1;

        panel.series.push(Series::new(
            format!("{} - train", history.label),
            history.loss(),
            LineStyle::Solid,
        ));
        let val = history.val_loss();
        if !val.is_empty() {
            panel.series.push(Series::new(
                format!("{} - val", history.label),
                val,
                LineStyle::Dashed,
            ));
        }
    }

    panels.into_iter().map(|(_, panel)| panel).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::{Backend, EpochStats};

    fn history(name: &str, label: &str, backend: Backend, with_val: bool) -> History {
        let mut h = History::new(name, label, backend);
        for epoch in 1..=3 {
            h.push(EpochStats {
                epoch,
                total_epochs: 3,
                train_loss: 1.0 / epoch as f64,
                val_loss: with_val.then(|| 1.1 / epoch as f64),
                train_accuracy: None,
                val_accuracy: None,
                elapsed_ms: 0,
            });
        }
        h
    }

    #[test]
    fn groups_by_backend_in_order() {
        let panels = panels_from_histories(&[
            history("base_fit", "Base", Backend::Fit, true),
            history("advanced_fit", "Advanced", Backend::Fit, true),
            history("base_manual", "Base", Backend::Manual, true),
        ]);
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].title, "Losses: fit API");
        let labels: Vec<&str> = panels[0].series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Base - train", "Base - val", "Advanced - train", "Advanced - val"]);
        assert_eq!(panels[1].title, "Losses: manual loop");
        assert_eq!(panels[1].series.len(), 2);
    }

    #[test]
    fn missing_validation_gives_train_only() {
        let panels = panels_from_histories(&[history("a", "A", Backend::Fit, false)]);
        assert_eq!(panels[0].series.len(), 1);
    }
}
