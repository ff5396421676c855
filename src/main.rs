//! IPTV Bouquets - Rust Edition
//! Download IPTV bouquets for Enigma2 receivers, install them and edit them

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod bouquet_index;
mod bouquet_parser;
mod catalog;
mod config;
mod confirm;
mod editor;
mod error;
mod installer;
mod models;
mod reload;
mod store;

use catalog::{CatalogClient, UreqFetcher};
use config::AppConfig;
use confirm::{ConfirmAction, PendingConfirmation};
use editor::{EditSession, ExitDecision, SaveOutcome, SessionResume, SimilarOutcome};
use error::BouquetError;
use installer::InstallReport;
use models::*;
use reload::ServiceReloader;
use store::BouquetStore;

/// Get current local time as HH:MM:SS
fn timestamp_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Background task messages
enum TaskResult {
    CatalogLoaded(Vec<CatalogEntry>),
    BouquetViewed { title: String, channels: Vec<String> },
    InstallFinished(InstallReport),
    Reloaded(bool),
    Error(String),
}

/// Message box shown over the current screen
struct Notice {
    text: String,
    is_error: bool,
    /// Auto-dismiss time (egui input time, seconds)
    expires_at: Option<f64>,
}

impl Notice {
    /// Any failed item makes the batch notice an error, even when others installed
    fn for_install(report: &InstallReport) -> Self {
        Self {
            text: report.summary(),
            is_error: !report.is_success(),
            expires_at: None,
        }
    }
}

/// Editor screen actions collected while drawing
#[derive(Debug, Clone, Copy)]
enum EditorAction {
    Cursor(usize),
    ToggleSelect,
    SelectSimilar,
    ToggleMoveMode,
    Navigate(isize),
    Delete,
    Save,
    Close,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "iptv_bouquets=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), eframe::Error> {
    init_logging();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1250.0, 760.0])
            .with_min_inner_size([900.0, 500.0]),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "IPTV Bouquets - Rust Edition",
        options,
        Box::new(|cc| {
            let app = BouquetApp::new();
            cc.egui_ctx.set_visuals(if app.config.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            Ok(Box::new(app))
        }),
    )
}

struct BouquetApp {
    config: AppConfig,
    current_tab: Tab,
    status_message: String,
    loading: bool,

    // Background task channel
    task_receiver: Receiver<TaskResult>,
    task_sender: Sender<TaskResult>,

    // Catalog screen
    catalog: Vec<CatalogEntry>,
    catalog_cursor: Option<usize>,
    catalog_selected: Vec<usize>,
    viewer: Option<(String, Vec<String>)>,

    // IPTV manager screen
    installed: Vec<BouquetIndexEntry>,
    manager_cursor: Option<usize>,
    manager_selected: Vec<String>,

    // Editor screen
    session: Option<EditSession>,
    scroll_to_cursor: bool,

    // Cleaner screen
    deleted_files: Vec<String>,
    cleaner_selected: Option<String>,
    cleaner_all: bool,

    // Dialogs
    pending: Option<PendingConfirmation>,
    notice: Option<Notice>,
    show_settings: bool,

    // Console log
    console_log: Vec<String>,
}

impl BouquetApp {
    fn new() -> Self {
        let config = AppConfig::load();
        let (task_sender, task_receiver) = channel();

        let mut app = Self {
            config,
            current_tab: Tab::Catalog,
            status_message: "Ready".to_string(),
            loading: false,
            task_receiver,
            task_sender,
            catalog: Vec::new(),
            catalog_cursor: None,
            catalog_selected: Vec::new(),
            viewer: None,
            installed: Vec::new(),
            manager_cursor: None,
            manager_selected: Vec::new(),
            session: None,
            scroll_to_cursor: false,
            deleted_files: Vec::new(),
            cleaner_selected: None,
            cleaner_all: false,
            pending: None,
            notice: None,
            show_settings: false,
            console_log: vec![format!("[{}] [INFO] IPTV Bouquets started", timestamp_now())],
        };
        app.load_catalog();
        app
    }

    fn log(&mut self, message: &str) {
        if message.starts_with("[ERROR]") {
            tracing::error!("{}", message);
        } else if message.starts_with("[WARN]") {
            tracing::warn!("{}", message);
        } else {
            tracing::info!("{}", message);
        }
        self.console_log.push(format!("[{}] {}", timestamp_now(), message));
        // Keep last 500 lines
        if self.console_log.len() > 500 {
            self.console_log.remove(0);
        }
    }

    fn report_error(&mut self, context: &str, error: &BouquetError) {
        let message = format!("{}: {}", context, error);
        self.log(&format!("[ERROR] {}", message));
        self.status_message = message.clone();
        self.notice = Some(Notice {
            text: message,
            is_error: true,
            expires_at: None,
        });
    }

    fn inform(&mut self, text: &str) {
        self.log(&format!("[INFO] {}", text));
        self.status_message = text.to_string();
        self.notice = Some(Notice {
            text: text.to_string(),
            is_error: false,
            expires_at: None,
        });
    }

    fn store(&self) -> BouquetStore {
        BouquetStore::new(&self.config.bouquet_dir, self.config.filter())
    }

    fn catalog_client(config: &AppConfig) -> CatalogClient<UreqFetcher> {
        let fetcher = UreqFetcher::new(&config.user_agent, config.http_timeout_secs);
        CatalogClient::new(fetcher, &config.catalog_url)
    }

    // ---------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------

    fn load_catalog(&mut self) {
        self.loading = true;
        self.status_message = "Fetching bouquets from GitHub...".to_string();
        self.log(&format!("[INFO] Loading catalog: {}", self.config.catalog_url));

        let config = self.config.clone();
        let sender = self.task_sender.clone();
        thread::spawn(move || {
            let client = Self::catalog_client(&config);
            let result = match client.list_bouquets() {
                Ok(entries) => TaskResult::CatalogLoaded(entries),
                Err(e) => TaskResult::Error(format!("Error loading bouquets: {}", e)),
            };
            let _ = sender.send(result);
        });
    }

    fn toggle_catalog_selection(&mut self) {
        if let Some(idx) = self.catalog_cursor {
            if let Some(pos) = self.catalog_selected.iter().position(|i| *i == idx) {
                self.catalog_selected.remove(pos);
            } else if idx < self.catalog.len() {
                self.catalog_selected.push(idx);
            }
        }
    }

    fn view_catalog_entry(&mut self) {
        let Some(entry) = self.catalog_cursor.and_then(|i| self.catalog.get(i)).cloned() else {
            self.notice = Some(Notice {
                text: "Please select a bouquet to view!".to_string(),
                is_error: true,
                expires_at: None,
            });
            return;
        };

        self.loading = true;
        self.status_message = format!("Loading {}...", entry.display_name);
        let config = self.config.clone();
        let sender = self.task_sender.clone();
        thread::spawn(move || {
            let client = Self::catalog_client(&config);
            let result = match client.view(&entry) {
                Ok(bouquet) => TaskResult::BouquetViewed {
                    title: entry.display_name.clone(),
                    channels: bouquet
                        .records
                        .iter()
                        .map(|r| r.display_text().to_string())
                        .collect(),
                },
                Err(e) => TaskResult::Error(format!("Error loading channels: {}", e)),
            };
            let _ = sender.send(result);
        });
    }

    fn request_install(&mut self) {
        if self.catalog_selected.is_empty() {
            self.report_error("Install", &BouquetError::NothingSelected);
            return;
        }
        let filenames = self
            .catalog_selected
            .iter()
            .filter_map(|i| self.catalog.get(*i))
            .map(|e| e.filename.clone())
            .collect();
        self.pending = Some(PendingConfirmation::request(ConfirmAction::InstallBouquets {
            filenames,
        }));
    }

    fn start_install(&mut self) {
        let entries: Vec<CatalogEntry> = self
            .catalog_selected
            .iter()
            .filter_map(|i| self.catalog.get(*i))
            .cloned()
            .collect();

        self.loading = true;
        self.status_message = "Installing bouquets...".to_string();
        self.log(&format!("[INFO] Installing {} bouquet(s) into {}", entries.len(), self.config.bouquet_dir));

        let config = self.config.clone();
        let store = self.store();
        let sender = self.task_sender.clone();
        thread::spawn(move || {
            let client = Self::catalog_client(&config);
            let result = match installer::install_selected(&client, &store, &entries) {
                Ok(report) => TaskResult::InstallFinished(report),
                Err(e) => TaskResult::Error(format!("Error installing bouquets: {}", e)),
            };
            let _ = sender.send(result);
        });
    }

    // ---------------------------------------------------------------
    // IPTV manager and cleaner
    // ---------------------------------------------------------------

    fn refresh_installed(&mut self) {
        match self.store().list_bouquets() {
            Ok(entries) => {
                self.manager_selected.retain(|f| entries.iter().any(|e| &e.filename == f));
                self.log(&format!("[INFO] Found {} IPTV bouquet(s) in {}", entries.len(), self.config.bouquet_dir));
                self.installed = entries;
                if self.manager_cursor.is_some_and(|c| c >= self.installed.len()) {
                    self.manager_cursor = None;
                }
            }
            Err(e) => {
                self.installed.clear();
                self.report_error("Error reading bouquets", &e);
            }
        }
    }

    fn toggle_manager_selection(&mut self) {
        let Some(entry) = self.manager_cursor.and_then(|i| self.installed.get(i)) else {
            return;
        };
        let filename = entry.filename.clone();
        if let Some(pos) = self.manager_selected.iter().position(|f| *f == filename) {
            self.manager_selected.remove(pos);
        } else {
            self.manager_selected.push(filename);
        }
    }

    fn request_delete_bouquets(&mut self) {
        if self.manager_selected.is_empty() {
            self.report_error("No bouquets selected for deletion", &BouquetError::NothingSelected);
            return;
        }
        self.pending = Some(PendingConfirmation::request(ConfirmAction::DeleteBouquets {
            filenames: self.manager_selected.clone(),
        }));
    }

    fn open_editor(&mut self) {
        let Some(entry) = self.manager_cursor.and_then(|i| self.installed.get(i)).cloned() else {
            self.notice = Some(Notice {
                text: "Please select a bouquet to edit!".to_string(),
                is_error: true,
                expires_at: None,
            });
            return;
        };
        if let Some(session) = &self.session {
            if session.is_modified() {
                self.notice = Some(Notice {
                    text: "Save or close the open bouquet first".to_string(),
                    is_error: true,
                    expires_at: None,
                });
                self.current_tab = Tab::Editor;
                return;
            }
        }
        match self.store().open_session(&entry.filename) {
            Ok(session) => {
                self.log(&format!("[INFO] Editing {} ({} channels)", entry.display_name, session.len()));
                self.session = Some(session);
                self.scroll_to_cursor = true;
                self.current_tab = Tab::Editor;
            }
            Err(e) => self.report_error("Error loading channels", &e),
        }
    }

    fn refresh_deleted(&mut self) {
        match self.store().deleted_files() {
            Ok(files) => {
                self.deleted_files = files;
                self.cleaner_selected = None;
                self.cleaner_all = false;
            }
            Err(e) => self.report_error("Error reading .del files", &e),
        }
    }

    fn request_purge(&mut self) {
        if self.deleted_files.is_empty() {
            self.inform("No .del files to delete!");
            return;
        }
        let filenames = if self.cleaner_all {
            self.deleted_files.clone()
        } else if let Some(file) = &self.cleaner_selected {
            vec![file.clone()]
        } else {
            self.report_error("No files selected for deletion", &BouquetError::NothingSelected);
            return;
        };
        self.pending = Some(PendingConfirmation::request(ConfirmAction::PurgeDeleted { filenames }));
    }

    // ---------------------------------------------------------------
    // Reload and confirmations
    // ---------------------------------------------------------------

    fn offer_reload(&mut self) {
        if !self.config.reload_url.trim().is_empty() {
            self.pending = Some(PendingConfirmation::request(ConfirmAction::ReloadServices));
        }
    }

    fn start_reload(&mut self) {
        self.loading = true;
        self.status_message = "Reloading settings...".to_string();
        let config = self.config.clone();
        let sender = self.task_sender.clone();
        thread::spawn(move || {
            let fetcher = UreqFetcher::new(&config.user_agent, config.http_timeout_secs);
            let reloader = ServiceReloader::new(fetcher, &config.reload_url);
            let result = match reloader.reload() {
                Ok(done) => TaskResult::Reloaded(done),
                Err(e) => TaskResult::Error(format!("Reload failed: {}", e)),
            };
            let _ = sender.send(result);
        });
    }

    fn resolve_confirmation(&mut self, pending: PendingConfirmation, accepted: bool) {
        match pending.action.clone() {
            ConfirmAction::InstallBouquets { .. } => {
                if accepted {
                    self.start_install();
                }
            }
            ConfirmAction::DeleteBouquets { filenames } => {
                if !accepted {
                    return;
                }
                let result = self.store().remove_bouquets(&filenames);
                self.manager_selected.clear();
                self.refresh_installed();
                match result {
                    Ok(count) => {
                        self.inform(&format!("Deleted {} bouquet(s) successfully!", count));
                        self.offer_reload();
                    }
                    Err(e) => self.report_error("Error deleting bouquets", &e),
                }
            }
            ConfirmAction::PurgeDeleted { filenames } => {
                if !accepted {
                    return;
                }
                let result = self.store().purge_deleted(&filenames);
                self.refresh_deleted();
                match result {
                    Ok(count) => self.inform(&format!("Deleted {} file(s) successfully!", count)),
                    Err(e) => self.report_error("Error deleting files", &e),
                }
            }
            ConfirmAction::ReloadServices => {
                if accepted {
                    self.start_reload();
                }
            }
            ConfirmAction::DeleteChannels { .. } | ConfirmAction::DiscardChanges => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                match session.resume(pending, accepted) {
                    SessionResume::Deleted(count) => {
                        self.inform(&format!("Deleted {} channel(s)", count));
                    }
                    SessionResume::Close => self.close_editor(),
                    SessionResume::Stay | SessionResume::Ignored => {}
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Editor
    // ---------------------------------------------------------------

    fn close_editor(&mut self) {
        self.session = None;
        self.current_tab = Tab::Manager;
        self.refresh_installed();
    }

    fn apply_editor_action(&mut self, action: EditorAction) {
        let page = self.config.page_offset();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match action {
            EditorAction::Cursor(idx) => session.set_cursor(idx),
            EditorAction::ToggleSelect => {
                let cursor = session.cursor();
                session.toggle_select(cursor);
            }
            EditorAction::SelectSimilar => {
                let cursor = session.cursor();
                match session.select_similar(cursor) {
                    Some(SimilarOutcome::Selected { prefix, count }) => {
                        self.status_message = format!("Selected {} channel(s) like '{}'", count, prefix);
                    }
                    Some(SimilarOutcome::Deselected { prefix, count }) => {
                        self.status_message = format!("Deselected {} channel(s) like '{}'", count, prefix);
                    }
                    Some(SimilarOutcome::NoMatch { text }) => {
                        self.inform(&format!("No similar channels found for: {}", text));
                    }
                    None => {}
                }
            }
            EditorAction::ToggleMoveMode => {
                let on = session.toggle_move_mode();
                self.status_message = if on { "Move mode on" } else { "Move mode off" }.to_string();
            }
            EditorAction::Navigate(offset) => {
                let offset = match offset {
                    o if o > 1 => page,
                    o if o < -1 => -page,
                    o => o,
                };
                session.navigate(offset);
                self.scroll_to_cursor = true;
            }
            EditorAction::Delete => match session.request_delete() {
                Ok(pending) => self.pending = Some(pending),
                Err(e) => self.report_error("No channels selected for deletion", &e),
            },
            EditorAction::Save => match session.save() {
                Ok(SaveOutcome::NothingToSave) => self.inform("No changes to save!"),
                Ok(SaveOutcome::Saved { records }) => {
                    self.inform(&format!("Changes saved successfully! ({} channels)", records));
                    self.offer_reload();
                }
                Err(e) => self.report_error("Error saving changes", &e),
            },
            EditorAction::Close => match session.request_exit() {
                ExitDecision::Close => self.close_editor(),
                ExitDecision::Confirm(pending) => self.pending = Some(pending),
            },
        }
    }

    fn editor_keyboard(&mut self, ctx: &egui::Context) -> Option<EditorAction> {
        if self.pending.is_some() || self.notice.is_some() || ctx.wants_keyboard_input() {
            return None;
        }
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowUp) {
                Some(EditorAction::Navigate(-1))
            } else if i.key_pressed(egui::Key::ArrowDown) {
                Some(EditorAction::Navigate(1))
            } else if i.key_pressed(egui::Key::ArrowLeft) {
                Some(EditorAction::Navigate(-2))
            } else if i.key_pressed(egui::Key::ArrowRight) {
                Some(EditorAction::Navigate(2))
            } else if i.key_pressed(egui::Key::Enter) {
                Some(EditorAction::ToggleSelect)
            } else {
                None
            }
        })
    }

    // ---------------------------------------------------------------
    // Screens
    // ---------------------------------------------------------------

    fn show_catalog_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("✔ Select").clicked() {
                self.toggle_catalog_selection();
            }
            if ui.button("📦 Install").clicked() {
                self.request_install();
            }
            if ui.button("👁 Viewer").clicked() {
                self.view_catalog_entry();
            }
            ui.separator();
            if ui.add_enabled(!self.loading, egui::Button::new("🔄 Refresh")).clicked() {
                self.load_catalog();
            }
        });
        ui.separator();

        let mut clicked: Option<usize> = None;
        let mut toggled: Option<usize> = None;

        ui.columns(2, |columns| {
            columns[0].heading("Available bouquets");
            egui::ScrollArea::vertical()
                .id_salt("catalog_scroll")
                .auto_shrink([false, false])
                .show(&mut columns[0], |ui| {
                    if self.catalog.is_empty() && !self.loading {
                        ui.label(egui::RichText::new("No bouquet files found!").weak());
                    }
                    for (idx, entry) in self.catalog.iter().enumerate() {
                        let is_selected = self.catalog_selected.contains(&idx);
                        let text = if is_selected {
                            egui::RichText::new(format!("✔ {}", entry.display_name)).color(egui::Color32::GREEN)
                        } else {
                            egui::RichText::new(&entry.display_name)
                        };
                        let response = ui
                            .selectable_label(self.catalog_cursor == Some(idx), text)
                            .on_hover_text(&entry.filename);
                        if response.double_clicked() {
                            toggled = Some(idx);
                        } else if response.clicked() {
                            clicked = Some(idx);
                        }
                    }
                });

            columns[1].heading("Selected for install");
            egui::ScrollArea::vertical()
                .id_salt("catalog_selected_scroll")
                .auto_shrink([false, false])
                .show(&mut columns[1], |ui| {
                    for idx in &self.catalog_selected {
                        if let Some(entry) = self.catalog.get(*idx) {
                            ui.label(&entry.display_name);
                        }
                    }
                });
        });

        if let Some(idx) = clicked {
            self.catalog_cursor = Some(idx);
        }
        if let Some(idx) = toggled {
            self.catalog_cursor = Some(idx);
            self.toggle_catalog_selection();
        }
    }

    fn show_manager_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("✔ Select").clicked() {
                self.toggle_manager_selection();
            }
            if ui.button(egui::RichText::new("🗑 Delete").color(egui::Color32::from_rgb(200, 80, 80))).clicked() {
                self.request_delete_bouquets();
            }
            if ui.button("✏ IPTV Editor").clicked() {
                self.open_editor();
            }
            if ui.button("🧹 Cleaner").clicked() {
                self.current_tab = Tab::Cleaner;
                self.refresh_deleted();
            }
            ui.separator();
            if ui.button("🔄 Refresh").clicked() {
                self.refresh_installed();
            }
        });
        ui.label(egui::RichText::new(format!("Directory: {}", self.config.bouquet_dir)).weak());
        ui.separator();

        let mut clicked: Option<usize> = None;
        let mut open: Option<usize> = None;

        egui::ScrollArea::vertical()
            .id_salt("manager_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.installed.is_empty() {
                    ui.label(egui::RichText::new("No IPTV bouquets found").weak());
                }
                for (idx, entry) in self.installed.iter().enumerate() {
                    let label = if self.manager_selected.contains(&entry.filename) {
                        egui::RichText::new(format!("{} [SELECTED]", entry.display_name))
                            .color(egui::Color32::from_rgb(200, 80, 80))
                    } else {
                        egui::RichText::new(&entry.display_name)
                    };
                    let response = ui
                        .selectable_label(self.manager_cursor == Some(idx), label)
                        .on_hover_text(&entry.filename);
                    if response.double_clicked() {
                        open = Some(idx);
                    } else if response.clicked() {
                        clicked = Some(idx);
                    }
                }
            });

        if let Some(idx) = clicked {
            self.manager_cursor = Some(idx);
        }
        if let Some(idx) = open {
            self.manager_cursor = Some(idx);
            self.open_editor();
        }
    }

    fn show_editor_tab(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.session else {
            ui.vertical_centered(|ui| {
                ui.add_space(100.0);
                ui.label("Open a bouquet from the IPTV Manager to edit it");
            });
            return;
        };

        let mut action: Option<EditorAction> = None;
        let move_mode = session.move_mode();

        ui.horizontal(|ui| {
            ui.heading(session.name());
            if session.is_modified() {
                ui.label(egui::RichText::new("● modified").color(egui::Color32::YELLOW));
            }
            ui.label(
                egui::RichText::new(format!(
                    "{} channels, {} selected",
                    session.len(),
                    session.selection().len()
                ))
                .weak(),
            );
        });

        ui.horizontal(|ui| {
            if ui.button("✔ Select").clicked() {
                action = Some(EditorAction::ToggleSelect);
            }
            if ui.button(egui::RichText::new("🗑 Delete").color(egui::Color32::from_rgb(200, 80, 80))).clicked() {
                action = Some(EditorAction::Delete);
            }
            if ui.button(egui::RichText::new("💾 Save").color(egui::Color32::GREEN)).clicked() {
                action = Some(EditorAction::Save);
            }
            let move_label = if move_mode { "Disable Move" } else { "Move Mode" };
            if ui.button(egui::RichText::new(move_label).color(egui::Color32::YELLOW)).clicked() {
                action = Some(EditorAction::ToggleMoveMode);
            }
            if ui.button(egui::RichText::new("Select Similar").color(egui::Color32::LIGHT_BLUE)).clicked() {
                action = Some(EditorAction::SelectSimilar);
            }
            ui.separator();
            if ui.button("⏶").on_hover_text("Up").clicked() {
                action = Some(EditorAction::Navigate(-1));
            }
            if ui.button("⏷").on_hover_text("Down").clicked() {
                action = Some(EditorAction::Navigate(1));
            }
            if ui.button("⏫").on_hover_text("Page up").clicked() {
                action = Some(EditorAction::Navigate(-2));
            }
            if ui.button("⏬").on_hover_text("Page down").clicked() {
                action = Some(EditorAction::Navigate(2));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕ Close").clicked() {
                    action = Some(EditorAction::Close);
                }
            });
        });
        ui.separator();

        let cursor = session.cursor();
        let scroll_to_cursor = self.scroll_to_cursor;

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if session.is_empty() {
                    ui.label(egui::RichText::new("No channels in this bouquet").weak());
                }
                for idx in 0..session.len() {
                    let label = session.row_label(idx);
                    let text = if session.is_selected(idx) {
                        let color = if move_mode {
                            egui::Color32::YELLOW
                        } else {
                            egui::Color32::from_rgb(200, 80, 80)
                        };
                        egui::RichText::new(label).color(color)
                    } else {
                        egui::RichText::new(label)
                    };
                    let response = ui.selectable_label(cursor == idx, text);
                    if cursor == idx && scroll_to_cursor {
                        response.scroll_to_me(Some(egui::Align::Center));
                    }
                    if response.double_clicked() {
                        action = Some(EditorAction::ToggleSelect);
                    } else if response.clicked() {
                        action = Some(EditorAction::Cursor(idx));
                    }
                }
            });
        self.scroll_to_cursor = false;

        if let Some(action) = action {
            self.apply_editor_action(action);
        }
    }

    fn show_cleaner_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button(egui::RichText::new("🗑 Delete").color(egui::Color32::from_rgb(200, 80, 80))).clicked() {
                self.request_purge();
            }
            if ui.button("Select All").clicked() && !self.deleted_files.is_empty() {
                self.cleaner_all = true;
                self.cleaner_selected = None;
            }
            ui.separator();
            if ui.button("🔄 Refresh").clicked() {
                self.refresh_deleted();
            }
        });
        ui.separator();

        let mut clicked: Option<String> = None;
        egui::ScrollArea::vertical()
            .id_salt("cleaner_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.deleted_files.is_empty() {
                    ui.label(egui::RichText::new("No .del files found").weak());
                }
                for file in &self.deleted_files {
                    let selected = self.cleaner_all || self.cleaner_selected.as_ref() == Some(file);
                    let label = if selected {
                        format!("{} [SELECTED]", file)
                    } else {
                        file.clone()
                    };
                    if ui.selectable_label(selected, label).clicked() {
                        clicked = Some(file.clone());
                    }
                }
            });

        if let Some(file) = clicked {
            self.cleaner_all = false;
            self.cleaner_selected = Some(file);
        }
    }

    fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console_log.clear();
                    self.console_log.push(format!("[{}] Console cleared", timestamp_now()));
                }
            });
        });
        ui.separator();

        // Display log entries with monospace font
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.console_log {
                    let color = if line.contains("[ERROR]") {
                        egui::Color32::RED
                    } else if line.contains("[WARN]") {
                        egui::Color32::YELLOW
                    } else if line.contains("[INFO]") {
                        egui::Color32::LIGHT_BLUE
                    } else {
                        egui::Color32::GRAY
                    };

                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save = false;

        egui::Window::new("⚙ Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid").num_columns(2).spacing([10.0, 6.0]).show(ui, |ui| {
                    ui.label("Bouquet directory:");
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut self.config.bouquet_dir).desired_width(320.0));
                        if ui.button("📁").on_hover_text("Browse for the bouquet directory").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .set_title("Select bouquet directory")
                                .set_directory(&self.config.bouquet_dir)
                                .pick_folder()
                            {
                                self.config.bouquet_dir = path.display().to_string();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Catalog URL:");
                    ui.add(egui::TextEdit::singleline(&mut self.config.catalog_url).desired_width(360.0));
                    ui.end_row();

                    ui.label("Reload URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.config.reload_url)
                            .hint_text("empty disables reload")
                            .desired_width(360.0),
                    );
                    ui.end_row();

                    ui.label("User agent:");
                    ui.add(egui::TextEdit::singleline(&mut self.config.user_agent).desired_width(360.0));
                    ui.end_row();

                    ui.label("Page step:");
                    ui.add(egui::DragValue::new(&mut self.config.page_step).range(1..=100));
                    ui.end_row();

                    ui.label("HTTP timeout:");
                    ui.add(egui::DragValue::new(&mut self.config.http_timeout_secs).range(5..=600).suffix("s"));
                    ui.end_row();

                    ui.label("Theme:");
                    ui.checkbox(&mut self.config.dark_mode, "🌙 Dark");
                    ui.end_row();
                });

                ui.add_space(10.0);
                if ui.button("💾 Save").clicked() {
                    save = true;
                }
            });

        if save {
            self.config.save();
            ctx.set_visuals(if self.config.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.log("[INFO] Settings saved");
            self.refresh_installed();
            open = false;
        }
        self.show_settings = open;
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);

        if let Some((title, channels)) = &self.viewer {
            let mut close = false;
            egui::Window::new(format!("Bouquet Viewer: {}", title))
                .collapsible(false)
                .default_size([500.0, 500.0])
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("viewer_scroll")
                        .max_height(450.0)
                        .show(ui, |ui| {
                            if channels.is_empty() {
                                ui.label("No channels found in this bouquet");
                            }
                            for channel in channels {
                                ui.label(channel);
                            }
                        });
                    ui.separator();
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            if close {
                self.viewer = None;
            }
        }

        if let Some(pending) = self.pending.clone() {
            let mut answer: Option<bool> = None;
            egui::Window::new("Confirm")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(&pending.prompt).strong());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            answer = Some(false);
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Yes").clicked() {
                                answer = Some(true);
                            }
                        });
                    });
                });
            if let Some(accepted) = answer {
                self.pending = None;
                self.resolve_confirmation(pending, accepted);
            }
            return;
        }

        if let Some(notice) = &self.notice {
            if notice.expires_at.is_some_and(|t| now >= t) {
                self.notice = None;
                return;
            }
            let mut dismiss = false;
            let color = if notice.is_error {
                egui::Color32::from_rgb(200, 80, 80)
            } else {
                egui::Color32::LIGHT_BLUE
            };
            egui::Window::new(if notice.is_error { "Error" } else { "Info" })
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(&notice.text).color(color));
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        dismiss = true;
                    }
                });
            if dismiss {
                self.notice = None;
            } else if notice.expires_at.is_some() {
                ctx.request_repaint_after(Duration::from_millis(250));
            }
        }
    }

    fn handle_task_results(&mut self, ctx: &egui::Context) {
        // Process background task results (non-blocking)
        while let Ok(result) = self.task_receiver.try_recv() {
            self.loading = false;
            match result {
                TaskResult::CatalogLoaded(entries) => {
                    self.catalog_selected.clear();
                    self.catalog_cursor = None;
                    self.catalog = entries;
                    self.status_message = if self.catalog.is_empty() {
                        "No bouquet files found!".to_string()
                    } else {
                        "Bouquets loaded successfully".to_string()
                    };
                    self.log(&format!("[INFO] Catalog: {} bouquet(s)", self.catalog.len()));
                }
                TaskResult::BouquetViewed { title, channels } => {
                    self.status_message = format!("{}: {} channels", title, channels.len());
                    self.viewer = Some((title, channels));
                }
                TaskResult::InstallFinished(report) => {
                    for (filename, e) in &report.failed {
                        self.log(&format!("[WARN] {}: {}", filename, e));
                    }
                    let notice = Notice::for_install(&report);
                    let tag = if report.installed.is_empty() {
                        "[ERROR]"
                    } else if notice.is_error {
                        "[WARN]"
                    } else {
                        "[INFO]"
                    };
                    self.log(&format!("{} {}", tag, notice.text));
                    self.status_message = notice.text.clone();
                    self.notice = Some(notice);
                    if !report.installed.is_empty() {
                        self.catalog_selected.clear();
                        self.refresh_installed();
                        self.offer_reload();
                    }
                }
                TaskResult::Reloaded(done) => {
                    let text = if done {
                        "Reload successful! Settings updated."
                    } else {
                        "Reload is not configured"
                    };
                    self.log(&format!("[INFO] {}", text));
                    self.status_message = text.to_string();
                    self.notice = Some(Notice {
                        text: text.to_string(),
                        is_error: false,
                        expires_at: Some(ctx.input(|i| i.time) + 5.0),
                    });
                }
                TaskResult::Error(msg) => {
                    self.log(&format!("[ERROR] {}", msg));
                    self.status_message = msg.clone();
                    self.notice = Some(Notice {
                        text: msg,
                        is_error: true,
                        expires_at: None,
                    });
                }
            }
        }
    }
}

impl eframe::App for BouquetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_task_results(ctx);

        // Request repaint while a background task is running
        if self.loading {
            ctx.request_repaint();
        }

        if self.current_tab == Tab::Editor {
            if let Some(action) = self.editor_keyboard(ctx) {
                self.apply_editor_action(action);
            }
        }

        let previous_tab = self.current_tab;

        // Confirmation windows are not modal; lock the screens behind them
        let locked = self.pending.is_some();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            if locked {
                ui.disable();
            }
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Catalog, "📥 Catalog");
                ui.selectable_value(&mut self.current_tab, Tab::Manager, "📺 IPTV Manager");
                ui.selectable_value(&mut self.current_tab, Tab::Editor, "✏ Editor");
                ui.selectable_value(&mut self.current_tab, Tab::Cleaner, "🧹 Cleaner");
                ui.selectable_value(&mut self.current_tab, Tab::Console, "📜 Console");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = true;
                    }
                    ui.label(egui::RichText::new(format!("v{}", env!("CARGO_PKG_VERSION"))).weak());
                });
            });
            ui.add_space(5.0);
        });

        if self.current_tab != previous_tab {
            match self.current_tab {
                Tab::Manager => self.refresh_installed(),
                Tab::Cleaner => self.refresh_deleted(),
                _ => {}
            }
        }

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.loading {
                    ui.spinner();
                }
                ui.label(&self.status_message);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if locked {
                ui.disable();
            }
            match self.current_tab {
                Tab::Catalog => self.show_catalog_tab(ui),
                Tab::Manager => self.show_manager_tab(ui),
                Tab::Editor => self.show_editor_tab(ui),
                Tab::Cleaner => self.show_cleaner_tab(ui),
                Tab::Console => self.show_console_tab(ui),
            }
        });

        if self.show_settings {
            self.show_settings_window(ctx);
        }
        self.show_dialogs(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_notice_flags_partial_failure() {
        let report = InstallReport {
            installed: vec!["userbouquet.iptv_news.tv".to_string()],
            failed: vec![(
                "userbouquet.iptv_sport.tv".to_string(),
                BouquetError::MalformedBouquet {
                    filename: "userbouquet.iptv_sport.tv".to_string(),
                },
            )],
        };
        let notice = Notice::for_install(&report);
        assert!(notice.is_error);
        assert!(notice.text.starts_with("Installed 1 bouquet(s), 1 failed"));
    }

    #[test]
    fn test_install_notice_success() {
        let report = InstallReport {
            installed: vec!["userbouquet.iptv_news.tv".to_string()],
            failed: Vec::new(),
        };
        let notice = Notice::for_install(&report);
        assert!(!notice.is_error);
        assert_eq!(notice.text, "Installed 1 bouquet(s) successfully!");
    }
}
