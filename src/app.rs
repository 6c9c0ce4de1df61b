use std::time::Instant;

use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui};
use tracing::{info, warn};

use crate::config::Config;
use crate::controller::SearchController;
use crate::detail::{visible_children, DetailState, DetailStatus};
use crate::html::plain_text;
use crate::models::{format_timestamp, Comment, Post, PostSummary};
use crate::theme::AppTheme;
use crate::worker::{Worker, WorkerEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Post(String),
}

/// What a click inside the list asked for. Applied after the list is drawn.
enum RowAction {
    OpenPost(String),
    OpenLink(String),
}

pub struct SearchApp {
    config: Config,
    controller: SearchController,
    worker: Worker,
    route: Route,
    detail: Option<DetailState>,
    query_input: String,
    theme: AppTheme,
    is_dark_mode: bool,
    last_scroll_offset: f32,
    // List generation currently drawn; a change scrolls back to the top.
    shown_list: u64,
    window_title: String,
}

impl SearchApp {
    pub fn new(config: Config, worker: Worker) -> Self {
        Self {
            controller: SearchController::new(config.clone()),
            config,
            worker,
            route: Route::Home,
            detail: None,
            query_input: String::new(),
            theme: AppTheme::dark(),
            is_dark_mode: true,
            last_scroll_offset: 0.0,
            shown_list: 0,
            window_title: String::new(),
        }
    }

    fn drain_worker(&mut self) {
        while let Some(event) = self.worker.try_recv() {
            match event {
                WorkerEvent::Search(outcome) => self.controller.apply(outcome, Instant::now()),
                WorkerEvent::Item { id, result } => {
                    if let Some(detail) = self.detail.as_mut() {
                        detail.apply(&id, result);
                    }
                }
            }
        }
    }

    fn open_post(&mut self, id: String) {
        info!(%id, "opening post");
        self.detail = Some(DetailState::loading(id.clone()));
        self.worker.load_item(id.clone());
        self.route = Route::Post(id);
    }

    fn reload_post(&mut self) {
        if let Route::Post(id) = &self.route {
            let id = id.clone();
            self.open_post(id);
        }
    }

    fn go_home(&mut self) {
        self.route = Route::Home;
        self.detail = None;
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(%url, error = %e, "failed to open link");
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = if self.is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn set_window_title(&mut self, ctx: &egui::Context, title: String) {
        if self.window_title != title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if self.route != Route::Home {
                let back = ui.add(
                    egui::Button::new(RichText::new("← Back").size(16.0))
                        .corner_radius(CornerRadius::same(6)),
                );
                if back.clicked() {
                    self.go_home();
                }
                ui.add_space(8.0);
            }

            ui.heading(
                RichText::new("Search Hacker News")
                    .color(self.theme.highlight)
                    .size(24.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui
                    .add(
                        egui::Button::new(RichText::new(theme_icon).size(20.0))
                            .min_size(egui::vec2(32.0, 32.0))
                            .corner_radius(CornerRadius::same(16)),
                    )
                    .on_hover_text(if self.is_dark_mode {
                        "Switch to Light Mode"
                    } else {
                        "Switch to Dark Mode"
                    });
                if theme_btn.clicked() {
                    self.toggle_theme();
                }
            });
        });
        ui.add_space(8.0);
    }

    fn render_home(&mut self, ui: &mut Ui) {
        let now = Instant::now();

        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("query")
                    .color(self.theme.secondary_text)
                    .size(13.0),
            );
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.query_input)
                    .hint_text("query")
                    .font(egui::TextStyle::Heading)
                    .desired_width((ui.available_width() * 0.6).max(240.0)),
            );
            if input.changed() {
                self.controller.set_query(self.query_input.clone(), now);
            }
        });
        ui.add_space(6.0);

        self.render_status_line(ui);
        ui.add_space(6.0);

        let reset_scroll = self.shown_list != self.controller.list_generation();
        if reset_scroll {
            self.shown_list = self.controller.list_generation();
            self.last_scroll_offset = 0.0;
        }

        let spacing = ui.spacing().item_spacing.y;
        let row_height = (self.config.row_height - spacing).max(1.0);
        let results = self.controller.results();
        let theme = &self.theme;
        let mut action = None;

        let mut scroll = ScrollArea::vertical()
            .id_salt("results")
            .auto_shrink([false, false]);
        if reset_scroll {
            scroll = scroll.vertical_scroll_offset(0.0);
        }
        let output = scroll.show_rows(ui, row_height, results.len(), |ui, rows| {
            for index in rows {
                if let Some(row_action) = render_row(ui, theme, &results[index], row_height) {
                    action = Some(row_action);
                }
            }
        });

        let offset = output.state.offset.y;
        if (offset - self.last_scroll_offset).abs() > f32::EPSILON {
            self.last_scroll_offset = offset;
            let viewport_height = output.inner_rect.height();
            if let Some(request) = self.controller.on_scroll(offset, viewport_height) {
                self.worker.dispatch(request);
            }
        }

        match action {
            Some(RowAction::OpenPost(id)) => self.open_post(id),
            Some(RowAction::OpenLink(url)) => self.open_link(&url),
            None => {}
        }
    }

    fn render_status_line(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if self.controller.is_searching() {
                ui.spinner();
                ui.label(RichText::new("Searching…").color(self.theme.secondary_text));
            } else if self.controller.is_debouncing() {
                ui.label(
                    RichText::new(format!("Searching for '{}' soon…", self.controller.query()))
                        .color(self.theme.secondary_text),
                );
            } else if !self.controller.active_query().is_empty() {
                let cursor = self.controller.cursor();
                ui.label(
                    RichText::new(format!(
                        "{} results for '{}' · page {} of {}",
                        self.controller.results().len(),
                        self.controller.active_query(),
                        cursor.current_page(),
                        cursor.total_pages()
                    ))
                    .color(self.theme.secondary_text),
                );
                if cursor.fetch_in_flight() {
                    ui.spinner();
                } else if cursor.fetched_current_page() && cursor.is_exhausted() {
                    ui.label(RichText::new("· all loaded").color(self.theme.secondary_text));
                }
            }

            if let Some(notice) = self.controller.notice() {
                ui.add_space(12.0);
                ui.label(RichText::new(&notice.message).color(self.theme.error));
            }
        });
    }

    fn render_post_page(&mut self, ui: &mut Ui) {
        if ui.ctx().input(|i| i.key_pressed(egui::Key::Escape)) {
            self.go_home();
            return;
        }

        let Some(detail) = self.detail.as_ref() else {
            self.route = Route::Home;
            return;
        };

        let mut toggled = None;
        let mut link = None;
        let mut retry = false;
        let mut fold_all = None;

        match detail.status() {
            DetailStatus::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                });
            }
            DetailStatus::NotFound => {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() / 3.0);
                    ui.label(RichText::new("404").size(72.0).strong());
                });
            }
            DetailStatus::Failed(message) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        RichText::new(format!("Could not load this post: {}", message))
                            .color(self.theme.error),
                    );
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            DetailStatus::Loaded(post) => {
                ScrollArea::vertical()
                    .id_salt("post")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        render_post_body(ui, &self.theme, post, &mut link);
                        ui.add_space(12.0);
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(format!("{} comments", detail.comment_count()))
                                    .color(self.theme.secondary_text),
                            );
                            if ui.small_button("Collapse all").clicked() {
                                fold_all = Some(true);
                            }
                            if ui.small_button("Expand all").clicked() {
                                fold_all = Some(false);
                            }
                        });
                        for comment in visible_children(&post.comments) {
                            render_comment(ui, &self.theme, detail, comment, 0, &mut toggled);
                        }
                    });
            }
        }

        if retry {
            self.reload_post();
            return;
        }
        if let Some(url) = link {
            self.open_link(&url);
        }
        if let Some(detail) = self.detail.as_mut() {
            if let Some(id) = toggled {
                detail.toggle_collapsed(&id);
            }
            match fold_all {
                Some(true) => detail.collapse_all(),
                Some(false) => detail.expand_all(),
                None => {}
            }
        }
    }
}

fn render_row(ui: &mut Ui, theme: &AppTheme, post: &PostSummary, height: f32) -> Option<RowAction> {
    let mut action = None;
    let width = ui.available_width();

    ui.allocate_ui(egui::vec2(width, height), |ui| {
        egui::Frame::new()
            .fill(theme.card_background)
            .corner_radius(CornerRadius::same(8))
            .stroke(Stroke::new(1.0, theme.card_shadow))
            .shadow(egui::epaint::Shadow {
                offset: [4, 4],
                blur: 8,
                spread: 0,
                color: theme.card_shadow,
            })
            .inner_margin(12.0)
            .outer_margin(egui::vec2(8.0, 4.0))
            .show(ui, |ui| {
                ui.set_min_width(width - 40.0);
                ui.set_max_height(height - 32.0);

                let title = if post.title.is_empty() {
                    "(untitled)"
                } else {
                    post.title.as_str()
                };
                ui.add(egui::Label::new(RichText::new(title).size(18.0).strong()).truncate());

                ui.horizontal(|ui| {
                    ui.label(RichText::new("by").color(theme.secondary_text));
                    ui.label(RichText::new(&post.author).italics());
                    ui.label(RichText::new("on").color(theme.secondary_text));
                    ui.label(RichText::new(format_timestamp(post.created_at)).italics());
                });

                ui.horizontal(|ui| {
                    if !post.url.is_empty() {
                        let url = ui
                            .add(
                                egui::Label::new(RichText::new(&post.url).color(theme.link))
                                    .truncate()
                                    .sense(egui::Sense::click()),
                            )
                            .on_hover_cursor(egui::CursorIcon::PointingHand);
                        if url.clicked() {
                            action = Some(RowAction::OpenLink(post.url.clone()));
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("View Post").clicked() {
                            action = Some(RowAction::OpenPost(post.id.clone()));
                        }
                    });
                });
            });
    });

    action
}

fn render_post_body(ui: &mut Ui, theme: &AppTheme, post: &Post, link: &mut Option<String>) {
    ui.add_space(8.0);
    ui.label(RichText::new(&post.title).size(24.0).strong());
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new(&post.author).italics().color(theme.secondary_text));
        ui.label(RichText::new("at").color(theme.secondary_text));
        ui.label(
            RichText::new(format_timestamp(post.created_at))
                .italics()
                .color(theme.secondary_text),
        );
    });

    if !post.url.is_empty() {
        let url = ui
            .add(
                egui::Label::new(RichText::new(&post.url).color(theme.link))
                    .sense(egui::Sense::click()),
            )
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        if url.clicked() {
            *link = Some(post.url.clone());
        }
    }

    if !post.text.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new(plain_text(&post.text)).size(15.0));
    }
}

fn render_comment(
    ui: &mut Ui,
    theme: &AppTheme,
    detail: &DetailState,
    comment: &Comment,
    depth: usize,
    toggled: &mut Option<String>,
) {
    let collapsed = detail.is_collapsed(&comment.id);
    let card_bg = if depth % 2 == 0 {
        theme.card_background
    } else {
        Color32::from_rgba_premultiplied(
            theme.card_background.r(),
            theme.card_background.g(),
            theme.card_background.b(),
            220,
        )
    };

    ui.horizontal(|ui| {
        ui.add_space((depth.min(12) * 20) as f32);
        egui::Frame::new()
            .fill(card_bg)
            .corner_radius(CornerRadius::same(6))
            .stroke(Stroke::new(1.0, theme.card_shadow))
            .inner_margin(10.0)
            .outer_margin(egui::vec2(4.0, 4.0))
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&comment.author).italics().strong());
                        ui.label(RichText::new("at").color(theme.secondary_text));
                        ui.label(
                            RichText::new(format_timestamp(comment.created_at))
                                .italics()
                                .color(theme.secondary_text),
                        );
                        let toggle = ui.add(
                            egui::Button::new(
                                RichText::new(if collapsed { "[+]" } else { "[-]" }).monospace(),
                            )
                            .frame(false),
                        );
                        if toggle.clicked() {
                            *toggled = Some(comment.id.clone());
                        }
                        if collapsed && !comment.children.is_empty() {
                            ui.label(
                                RichText::new(format!("{} replies", comment.reply_count()))
                                    .italics()
                                    .color(theme.secondary_text),
                            );
                        }
                    });

                    if !collapsed {
                        if !comment.text.is_empty() {
                            ui.label(RichText::new(plain_text(&comment.text)).size(15.0));
                        }
                        for child in visible_children(&comment.children) {
                            render_comment(ui, theme, detail, child, depth + 1, toggled);
                        }
                    }
                });
            });
    });
}

impl eframe::App for SearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.drain_worker();

        let now = Instant::now();
        if let Some(request) = self.controller.tick(now) {
            self.worker.dispatch(request);
        }
        if let Some(wait) = self.controller.next_wake(now) {
            ctx.request_repaint_after(wait);
        }

        let title = match (&self.route, self.detail.as_ref()) {
            (Route::Post(_), Some(detail)) => match detail.status() {
                DetailStatus::Loaded(post) => post.title.clone(),
                DetailStatus::NotFound => format!("Post {} not found", detail.post_id()),
                _ => format!("Post {}", detail.post_id()),
            },
            _ => "Search Hacker News".to_string(),
        };
        self.set_window_title(ctx, title);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            if self.route == Route::Home {
                self.render_home(ui);
            } else {
                self.render_post_page(ui);
            }
        });
    }
}
