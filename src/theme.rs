use egui::{Color32, CornerRadius, Stroke};

pub struct AppTheme {
    pub background: Color32,
    pub card_background: Color32,
    pub card_shadow: Color32,
    pub text: Color32,
    pub secondary_text: Color32,
    pub highlight: Color32,
    pub link: Color32,
    pub error: Color32,
    pub separator: Color32,
    pub button_background: Color32,
    pub button_foreground: Color32,
    pub button_hover_background: Color32,
}

impl AppTheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(3, 54, 61), // deep teal
            card_background: Color32::from_rgb(3, 59, 67),
            card_shadow: Color32::from_rgb(3, 49, 55),
            text: Color32::from_rgb(236, 224, 206),
            secondary_text: Color32::from_rgb(176, 184, 178),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            link: Color32::from_rgb(130, 200, 230),
            error: Color32::from_rgb(240, 110, 110),
            separator: Color32::from_rgb(236, 224, 206),
            button_background: Color32::from_rgb(6, 72, 81),
            button_foreground: Color32::from_rgb(236, 224, 206),
            button_hover_background: Color32::from_rgb(10, 90, 100),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(236, 224, 206), // beige
            card_background: Color32::from_rgb(236, 224, 206),
            card_shadow: Color32::from_rgb(212, 202, 185),
            text: Color32::from_rgb(3, 54, 61),
            secondary_text: Color32::from_rgb(71, 85, 105),
            highlight: Color32::from_rgb(235, 92, 0),
            link: Color32::from_rgb(20, 100, 200),
            error: Color32::from_rgb(180, 20, 60),
            separator: Color32::from_rgb(3, 54, 61),
            button_background: Color32::from_rgb(227, 213, 192), // burlywood
            button_foreground: Color32::from_rgb(3, 54, 61),
            button_hover_background: Color32::from_rgb(212, 202, 185),
        }
    }

    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.extreme_bg_color = self.card_background;
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);
        style.visuals.override_text_color = Some(self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.weak_bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.weak_bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.highlight;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);
        style.visuals.hyperlink_color = self.link;

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }
}
