use super::panel::Panel;
use crate::config::GuiConfig;
use crate::control::{Control, ControlBase};
use core::any::Any;
use std::sync::Arc;

/// A line of text without background or border.
#[derive(Debug)]
pub struct Label {
    panel: Panel,
}

impl Label {
    pub fn new(config: &GuiConfig, text: &str) -> Arc<Label> {
        let label = Arc::new_cyclic(|me| Label {
            panel: Panel::embedded(me, config, Panel::default_layout(config)),
        });
        label.panel.update_style(|style| {
            style.draw_background = false;
            style.draw_border = false;
        });
        label.panel.set_text(text);
        label
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn text(&self) -> String {
        self.panel.text()
    }

    pub fn set_text(&self, text: &str) {
        self.panel.set_text(text);
    }

    /// Switches to the configured large font size. Takes effect at the next load.
    pub fn use_large_font(&self, config: &GuiConfig) {
        self.panel.update_style(|style| style.font_size = config.large_font_size);
    }
}

impl Control for Label {
    fn base(&self) -> &ControlBase {
        self.panel.base()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn delegate(&self) -> Option<&dyn Control> {
        Some(&self.panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SharedAssets;
    use crate::testing::{Call, MemoryAssets, RecordingSurface};
    use cgmath::Vector2;
    use std::time::Duration;

    #[test]
    fn draws_only_text() {
        let label = Label::new(&GuiConfig::default(), "status");
        label.set_size(Vector2::new(120., 20.));
        let assets: SharedAssets = MemoryAssets::new();
        label.load_content(&assets).unwrap();
        label.update(Duration::from_millis(16));

        let mut surface = RecordingSurface::default();
        label.render(&mut surface).unwrap();
        assert!(surface.fills().is_empty());
        assert!(!surface.calls.iter().any(|c| matches!(c, Call::Stroke(_))));
        assert_eq!(surface.texts(), vec!["status".to_string()]);
    }

    #[test]
    fn changed_text_is_shaped_on_next_update() {
        let label = Label::new(&GuiConfig::default(), "one");
        label.set_size(Vector2::new(120., 20.));
        let assets: SharedAssets = MemoryAssets::new();
        label.load_content(&assets).unwrap();
        label.update(Duration::from_millis(16));
        label.set_text("two");
        assert_eq!(label.panel().text_layout().unwrap().text, "one");
        label.update(Duration::from_millis(16));
        assert_eq!(label.panel().text_layout().unwrap().text, "two");
    }

    #[test]
    fn large_font_is_used_for_shaping() {
        let config = GuiConfig {
            large_font_size: 18.,
            ..GuiConfig::default()
        };
        let label = Label::new(&config, "heading");
        label.use_large_font(&config);
        assert_eq!(label.panel().style().font_size, 18.);

        label.set_size(Vector2::new(200., 40.));
        let assets: SharedAssets = MemoryAssets::new();
        label.load_content(&assets).unwrap();
        label.update(Duration::from_millis(16));
        let layout = label.panel().text_layout().unwrap();
        assert_eq!(layout.bounds.size.y, 18.);
    }
}
